//! `SeaORM` Entity for invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub invoice_type: String,
    pub status: String,
    pub date_gregorian: Date,
    pub date_nepali: String,
    pub due_date_gregorian: Date,
    pub due_date_nepali: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub customer: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub line_items: Json,
    pub subtotal: Decimal,
    pub vat_total: Decimal,
    pub total: Decimal,
    pub company: String,
    pub transaction_number: Option<String>,
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
