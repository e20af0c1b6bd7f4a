//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub transaction_number: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub vat_amount: Decimal,
    pub tds_amount: Decimal,
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub date_gregorian: Date,
    pub date_nepali: String,
    pub payment_status: String,
    pub company: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,
    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
