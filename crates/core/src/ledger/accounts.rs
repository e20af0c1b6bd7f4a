//! Chart of accounts used when deriving postings.

use serde::{Deserialize, Serialize};

use super::entry::AccountType;

/// An account a posting leg can target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Chart-of-accounts code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
}

impl Account {
    /// Creates an account.
    #[must_use]
    pub fn new(code: &str, name: &str, account_type: AccountType) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
        }
    }
}

/// The accounts transactions are posted against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingAccounts {
    /// Cash and bank.
    pub cash: Account,
    /// Input VAT recoverable on purchases.
    pub vat_receivable: Account,
    /// Tax withheld by customers, claimable.
    pub tds_receivable: Account,
    /// Output VAT owed on sales.
    pub vat_payable: Account,
    /// Tax withheld from suppliers, owed to the tax office.
    pub tds_payable: Account,
    /// Sales revenue.
    pub sales: Account,
    /// General expense.
    pub expense: Account,
    /// Clearing account for transfers between own accounts.
    pub transfer_clearing: Account,
}

impl Default for PostingAccounts {
    fn default() -> Self {
        Self {
            cash: Account::new("1000", "Cash", AccountType::Asset),
            vat_receivable: Account::new("1200", "VAT Receivable", AccountType::Asset),
            tds_receivable: Account::new("1300", "TDS Receivable", AccountType::Asset),
            vat_payable: Account::new("2100", "VAT Payable", AccountType::Liability),
            tds_payable: Account::new("2200", "TDS Payable", AccountType::Liability),
            sales: Account::new("4000", "Sales", AccountType::Revenue),
            expense: Account::new("5000", "Expense", AccountType::Expense),
            transfer_clearing: Account::new("1900", "Transfer Clearing", AccountType::Asset),
        }
    }
}
