//! PostgreSQL implementation of LedgerStore.
//!
//! The ceiling check and the increment run inside one conditional UPDATE,
//! so the row lock serializes concurrent debits for the same account. Two
//! requests racing on the last credit resolve to exactly one applied
//! debit.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entitlement::{
    CreditCategory, UsageLedger, UNLIMITED_CREDIT_THRESHOLD,
};
use crate::domain::foundation::{AccountId, DomainError};
use crate::ports::{DebitOutcome, LedgerStore};

/// PostgreSQL implementation of the LedgerStore port.
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a usage ledger.
#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    account_id: uuid::Uuid,
    price_checks_used: i32,
    optimisations_used: i32,
    photo_studio_used: i32,
    credit_limit: i32,
}

fn to_u32(value: i32) -> u32 {
    value.max(0) as u32
}

impl From<LedgerRow> for UsageLedger {
    fn from(row: LedgerRow) -> Self {
        UsageLedger {
            account_id: AccountId::from_uuid(row.account_id),
            price_checks_used: to_u32(row.price_checks_used),
            optimisations_used: to_u32(row.optimisations_used),
            photo_studio_used: to_u32(row.photo_studio_used),
            credit_limit: to_u32(row.credit_limit),
        }
    }
}

/// Column the debit targets, fixed per category so the statement stays a
/// constant string.
fn debit_statement(category: CreditCategory) -> &'static str {
    match category {
        CreditCategory::PriceChecks => {
            r#"
            UPDATE usage_ledgers
            SET price_checks_used = price_checks_used + $2, updated_at = NOW()
            WHERE account_id = $1
              AND (credit_limit >= $3
                   OR price_checks_used + optimisations_used + photo_studio_used + $2 <= credit_limit)
            RETURNING account_id, price_checks_used, optimisations_used,
                      photo_studio_used, credit_limit
            "#
        }
        CreditCategory::Optimisations => {
            r#"
            UPDATE usage_ledgers
            SET optimisations_used = optimisations_used + $2, updated_at = NOW()
            WHERE account_id = $1
              AND (credit_limit >= $3
                   OR price_checks_used + optimisations_used + photo_studio_used + $2 <= credit_limit)
            RETURNING account_id, price_checks_used, optimisations_used,
                      photo_studio_used, credit_limit
            "#
        }
        CreditCategory::PhotoStudio => {
            r#"
            UPDATE usage_ledgers
            SET photo_studio_used = photo_studio_used + $2, updated_at = NOW()
            WHERE account_id = $1
              AND (credit_limit >= $3
                   OR price_checks_used + optimisations_used + photo_studio_used + $2 <= credit_limit)
            RETURNING account_id, price_checks_used, optimisations_used,
                      photo_studio_used, credit_limit
            "#
        }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn get(&self, account_id: &AccountId) -> Result<Option<UsageLedger>, DomainError> {
        let row: Option<LedgerRow> = sqlx::query_as(
            r#"
            SELECT account_id, price_checks_used, optimisations_used,
                   photo_studio_used, credit_limit
            FROM usage_ledgers
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(row.map(UsageLedger::from))
    }

    async fn create(&self, account_id: &AccountId, credit_limit: u32) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO usage_ledgers (account_id, credit_limit)
            VALUES ($1, $2)
            ON CONFLICT (account_id) DO NOTHING
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(credit_limit as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(())
    }

    async fn debit_within_limit(
        &self,
        account_id: &AccountId,
        category: CreditCategory,
        amount: u32,
    ) -> Result<DebitOutcome, DomainError> {
        let row: Option<LedgerRow> = sqlx::query_as(debit_statement(category))
            .bind(account_id.as_uuid())
            .bind(amount as i32)
            .bind(UNLIMITED_CREDIT_THRESHOLD as i32)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        match row {
            Some(row) => Ok(DebitOutcome::Applied {
                remaining: UsageLedger::from(row).remaining(),
            }),
            None => {
                // Distinguish "over the ceiling" from "no ledger row".
                if self.get(account_id).await?.is_some() {
                    Ok(DebitOutcome::InsufficientCredits)
                } else {
                    Err(DomainError::ledger_not_found(account_id))
                }
            }
        }
    }

    async fn set_credit_limit(
        &self,
        account_id: &AccountId,
        limit: u32,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE usage_ledgers SET credit_limit = $2, updated_at = NOW()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(limit as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ledger_not_found(account_id));
        }
        Ok(())
    }

    async fn add_to_credit_limit(
        &self,
        account_id: &AccountId,
        amount: u32,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE usage_ledgers SET credit_limit = credit_limit + $2, updated_at = NOW()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(amount as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ledger_not_found(account_id));
        }
        Ok(())
    }
}
