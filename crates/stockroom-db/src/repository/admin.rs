//! # Admin Repository
//!
//! Contact lookups for event payloads and notification routing. The full
//! admin profile belongs to the auth domain; settlement only ever needs an
//! email address.

use async_trait::async_trait;
use sqlx::PgPool;

use stockroom_core::types::AdminContact;
use stockroom_settlement::contracts::AdminDirectory;
use stockroom_settlement::SettlementError;

use crate::error::{DbError, DbResult};

/// Repository for admin contact rows.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    /// Creates a new AdminRepository.
    pub fn new(pool: PgPool) -> Self {
        AdminRepository { pool }
    }

    /// Inserts or refreshes a contact row. Used by provisioning, not by the
    /// settlement flows.
    pub async fn upsert(&self, contact: &AdminContact) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admins (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email
            "#,
        )
        .bind(&contact.id)
        .bind(&contact.email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AdminDirectory for AdminRepository {
    async fn contact(&self, admin_id: &str) -> Result<Option<AdminContact>, SettlementError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id, email FROM admins WHERE id = $1")
                .bind(admin_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(DbError::from)?;

        Ok(row.map(|(id, email)| AdminContact { id, email }))
    }
}
