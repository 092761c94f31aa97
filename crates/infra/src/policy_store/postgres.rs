//! Postgres-backed policy store.
//!
//! One row per policy, keyed by `(org_id, policy_id)`, with the normalized
//! policy kept as a JSONB document. Every query is scoped by `org_id`.

use std::sync::Arc;

use sqlx::types::Json;
use sqlx::{PgPool, Row};

use orgadmin_auth::abac::{AbacPolicy, validate_policy, validate_policy_set};
use orgadmin_core::OrgId;

use super::{PolicyStore, PolicyStoreError, sort_for_listing};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS abac_policies (
    org_id      UUID        NOT NULL,
    policy_id   TEXT        NOT NULL,
    priority    INTEGER     NOT NULL,
    document    JSONB       NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (org_id, policy_id)
)
"#;

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> PolicyStoreError {
    tracing::error!(operation, error = %err, "policy store query failed");
    PolicyStoreError::Storage(format!("{operation}: {err}"))
}

pub struct PostgresPolicyStore {
    pool: Arc<PgPool>,
}

impl PostgresPolicyStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the backing table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), PolicyStoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

fn decode_row(row: &sqlx::postgres::PgRow) -> Result<AbacPolicy, PolicyStoreError> {
    let Json(policy) = row
        .try_get::<Json<AbacPolicy>, _>("document")
        .map_err(|e| map_sqlx_error("decode_policy", e))?;
    Ok(policy)
}

#[async_trait::async_trait]
impl PolicyStore for PostgresPolicyStore {
    async fn list(&self, org_id: OrgId) -> Result<Vec<AbacPolicy>, PolicyStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT document
            FROM abac_policies
            WHERE org_id = $1
            ORDER BY priority DESC, policy_id ASC
            "#,
        )
        .bind(org_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_policies", e))?;

        let mut policies = rows.iter().map(decode_row).collect::<Result<Vec<_>, _>>()?;
        // Collation-independent id order.
        sort_for_listing(&mut policies);
        Ok(policies)
    }

    async fn get(&self, org_id: OrgId, policy_id: &str) -> Result<Option<AbacPolicy>, PolicyStoreError> {
        let row = sqlx::query(
            r#"
            SELECT document
            FROM abac_policies
            WHERE org_id = $1 AND policy_id = $2
            "#,
        )
        .bind(org_id.as_uuid())
        .bind(policy_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_policy", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    async fn replace_all(
        &self,
        org_id: OrgId,
        policies: Vec<AbacPolicy>,
    ) -> Result<Vec<AbacPolicy>, PolicyStoreError> {
        let validated = validate_policy_set(policies)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_replace", e))?;

        sqlx::query("DELETE FROM abac_policies WHERE org_id = $1")
            .bind(org_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_policies", e))?;

        for policy in &validated {
            sqlx::query(
                r#"
                INSERT INTO abac_policies (org_id, policy_id, priority, document)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(org_id.as_uuid())
            .bind(&policy.id)
            .bind(policy.effective_priority())
            .bind(Json(policy))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_policy", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_replace", e))?;
        tracing::info!(%org_id, count = validated.len(), "policy set replaced");

        let mut listed = validated;
        sort_for_listing(&mut listed);
        Ok(listed)
    }

    async fn upsert(&self, org_id: OrgId, policy: AbacPolicy) -> Result<AbacPolicy, PolicyStoreError> {
        let policy = validate_policy(policy)?;

        sqlx::query(
            r#"
            INSERT INTO abac_policies (org_id, policy_id, priority, document)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (org_id, policy_id)
            DO UPDATE SET priority = EXCLUDED.priority,
                          document = EXCLUDED.document,
                          updated_at = now()
            "#,
        )
        .bind(org_id.as_uuid())
        .bind(&policy.id)
        .bind(policy.effective_priority())
        .bind(Json(&policy))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_policy", e))?;

        tracing::info!(%org_id, policy_id = %policy.id, "policy upserted");
        Ok(policy)
    }

    async fn delete(&self, org_id: OrgId, policy_id: &str) -> Result<(), PolicyStoreError> {
        let result = sqlx::query("DELETE FROM abac_policies WHERE org_id = $1 AND policy_id = $2")
            .bind(org_id.as_uuid())
            .bind(policy_id)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_policy", e))?;

        if result.rows_affected() == 0 {
            return Err(PolicyStoreError::NotFound(policy_id.to_string()));
        }
        tracing::info!(%org_id, policy_id, "policy deleted");
        Ok(())
    }
}
