//! PostgreSQL implementation of AccountStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entitlement::{Account, PlanTier};
use crate::domain::foundation::{AccountId, DomainError, Timestamp};
use crate::ports::AccountStore;

/// PostgreSQL implementation of the AccountStore port.
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an account.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    external_ref: String,
    tier: String,
    timezone: String,
    first_item_pass_used: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::from_uuid(row.id),
            external_ref: row.external_ref,
            // Fail closed: a tier name this build does not know grants the
            // least access.
            tier: PlanTier::parse_or_free(&row.tier),
            timezone: row.timezone,
            first_item_pass_used: row.first_item_pass_used,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, external_ref, tier, timezone, first_item_pass_used,
                   created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(row.map(Account::from))
    }

    async fn find_by_external_ref(
        &self,
        external_ref: &str,
    ) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, external_ref, tier, timezone, first_item_pass_used,
                   created_at, updated_at
            FROM accounts
            WHERE external_ref = $1
            "#,
        )
        .bind(external_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(row.map(Account::from))
    }

    async fn upsert(&self, account: &Account) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, external_ref, tier, timezone, first_item_pass_used,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                external_ref = EXCLUDED.external_ref,
                tier = EXCLUDED.tier,
                timezone = EXCLUDED.timezone,
                first_item_pass_used = EXCLUDED.first_item_pass_used,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.external_ref)
        .bind(account.tier.as_str())
        .bind(&account.timezone)
        .bind(account.first_item_pass_used)
        .bind(account.created_at.as_datetime())
        .bind(account.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(())
    }

    async fn set_tier(&self, id: &AccountId, tier: PlanTier) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET tier = $2, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(tier.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::account_not_found(id));
        }
        Ok(())
    }

    async fn mark_first_item_pass_used(&self, id: &AccountId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET first_item_pass_used = TRUE, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::account_not_found(id));
        }
        Ok(())
    }
}
