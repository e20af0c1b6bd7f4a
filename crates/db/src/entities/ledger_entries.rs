//! `SeaORM` Entity for ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub entry_number: String,
    pub date_gregorian: Date,
    pub date_nepali: String,
    pub account_code: String,
    pub account_type: String,
    pub entry_type: String,
    pub amount: Decimal,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub company: String,
    pub transaction_number: Option<String>,
    pub invoice_number: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionNumber",
        to = "super::transactions::Column::TransactionNumber"
    )]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
