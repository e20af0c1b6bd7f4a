//! Posting schema.
//!
//! Creates the transactions, ledger entries and invoices tables, plus a
//! deferred trigger that rejects any transaction whose entries do not balance.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_number VARCHAR(64) NOT NULL UNIQUE,
    transaction_type VARCHAR(16) NOT NULL
        CHECK (transaction_type IN ('income', 'expense', 'transfer')),
    amount NUMERIC(18, 2) NOT NULL CHECK (amount >= 0),
    vat_amount NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (vat_amount >= 0),
    tds_amount NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (tds_amount >= 0),
    discount_amount NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (discount_amount >= 0),
    description TEXT NOT NULL,
    category VARCHAR(255) NOT NULL,
    date_gregorian DATE NOT NULL,
    date_nepali VARCHAR(10) NOT NULL,
    payment_status VARCHAR(16) NOT NULL DEFAULT 'pending'
        CHECK (payment_status IN ('paid', 'pending', 'overdue', 'cancelled')),
    company VARCHAR(255) NOT NULL,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_by UUID NOT NULL,
    updated_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Listing: newest first within a company
CREATE INDEX idx_txn_company_date ON transactions(company, date_gregorian DESC, transaction_number DESC);
-- Prefix scans for the next sequence in a number space
CREATE INDEX idx_txn_number_pattern ON transactions(transaction_number varchar_pattern_ops);
CREATE INDEX idx_txn_company_type ON transactions(company, transaction_type);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entry_number VARCHAR(80) NOT NULL UNIQUE,
    date_gregorian DATE NOT NULL,
    date_nepali VARCHAR(10) NOT NULL,
    account_code VARCHAR(32) NOT NULL,
    account_type VARCHAR(16) NOT NULL
        CHECK (account_type IN ('asset', 'liability', 'equity', 'revenue', 'expense')),
    entry_type VARCHAR(8) NOT NULL CHECK (entry_type IN ('debit', 'credit')),
    amount NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    description TEXT NOT NULL,
    company VARCHAR(255) NOT NULL,
    transaction_number VARCHAR(64) REFERENCES transactions(transaction_number) ON DELETE CASCADE,
    invoice_number VARCHAR(64),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_entries_transaction ON ledger_entries(transaction_number);
CREATE INDEX idx_entries_invoice ON ledger_entries(invoice_number) WHERE invoice_number IS NOT NULL;
CREATE INDEX idx_entries_company_account ON ledger_entries(company, account_code, date_gregorian);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    invoice_number VARCHAR(64) NOT NULL UNIQUE,
    invoice_type VARCHAR(16) NOT NULL CHECK (invoice_type IN ('sales', 'purchase')),
    status VARCHAR(16) NOT NULL DEFAULT 'draft'
        CHECK (status IN ('draft', 'sent', 'paid', 'overdue', 'cancelled')),
    date_gregorian DATE NOT NULL,
    date_nepali VARCHAR(10) NOT NULL,
    due_date_gregorian DATE NOT NULL,
    due_date_nepali VARCHAR(10) NOT NULL,
    customer JSONB NOT NULL,
    line_items JSONB NOT NULL,
    subtotal NUMERIC(18, 2) NOT NULL CHECK (subtotal >= 0),
    vat_total NUMERIC(18, 2) NOT NULL CHECK (vat_total >= 0),
    total NUMERIC(18, 2) NOT NULL CHECK (total >= 0),
    company VARCHAR(255) NOT NULL,
    transaction_number VARCHAR(64) REFERENCES transactions(transaction_number),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_due_after_issue CHECK (due_date_gregorian >= date_gregorian)
);

CREATE INDEX idx_invoices_company ON invoices(company, date_gregorian DESC);
CREATE INDEX idx_invoices_transaction ON invoices(transaction_number) WHERE transaction_number IS NOT NULL;
CREATE INDEX idx_invoices_number_pattern ON invoices(invoice_number varchar_pattern_ops);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_transaction_balance
-- Debits must equal credits for every transaction at commit
-- ============================================================
CREATE OR REPLACE FUNCTION check_transaction_balance()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC(18, 2);
    total_credit NUMERIC(18, 2);
BEGIN
    IF NEW.transaction_number IS NULL THEN
        RETURN NEW;
    END IF;

    SELECT
        COALESCE(SUM(amount) FILTER (WHERE entry_type = 'debit'), 0),
        COALESCE(SUM(amount) FILTER (WHERE entry_type = 'credit'), 0)
    INTO total_debit, total_credit
    FROM ledger_entries
    WHERE transaction_number = NEW.transaction_number;

    IF total_debit <> total_credit THEN
        RAISE EXCEPTION 'Transaction % is not balanced. Debit: %, Credit: %',
            NEW.transaction_number, total_debit, total_credit;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_balance
AFTER INSERT OR UPDATE ON ledger_entries
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_transaction_balance();
";

const DROP_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_check_balance ON ledger_entries;
DROP FUNCTION IF EXISTS check_transaction_balance();
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
";
