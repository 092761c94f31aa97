//! Service wiring: policy store, directory, and resource registry.

use std::sync::Arc;

use orgadmin_auth::ResourceRegistry;
use orgadmin_infra::directory::{Directory, DirectoryAttributeResolver};
use orgadmin_infra::policy_store::{InMemoryPolicyStore, PolicyStore, PolicyStoreError};

use crate::config::ApiConfig;

pub struct AppServices {
    pub policies: Arc<dyn PolicyStore>,
    pub directory: Directory,
    pub attributes: DirectoryAttributeResolver,
    pub registry: ResourceRegistry,
}

impl AppServices {
    pub fn new(policies: Arc<dyn PolicyStore>, directory: Directory) -> Self {
        Self {
            policies,
            attributes: DirectoryAttributeResolver::new(directory.clone()),
            directory,
            registry: ResourceRegistry::with_defaults(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryPolicyStore::new()), Directory::in_memory())
    }
}

/// Build services for `config`: Postgres-backed policies when a database URL
/// is configured (and the `postgres` feature is on), in-memory otherwise.
pub async fn build_services(config: &ApiConfig) -> Result<AppServices, PolicyStoreError> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::info!("using in-memory policy store");
        return Ok(AppServices::in_memory());
    };

    postgres_services(url).await
}

#[cfg(feature = "postgres")]
async fn postgres_services(url: &str) -> Result<AppServices, PolicyStoreError> {
    use orgadmin_infra::policy_store::PostgresPolicyStore;

    let pool = sqlx::PgPool::connect(url)
        .await
        .map_err(|e| PolicyStoreError::Storage(format!("connect: {e}")))?;
    let store = PostgresPolicyStore::new(pool);
    store.ensure_schema().await?;

    tracing::info!("using postgres policy store");
    Ok(AppServices::new(Arc::new(store), Directory::in_memory()))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_services(_url: &str) -> Result<AppServices, PolicyStoreError> {
    tracing::warn!("DATABASE_URL is set but the postgres feature is disabled; using in-memory policy store");
    Ok(AppServices::in_memory())
}
