use std::sync::Arc;

use crate::catalog::provider::{CatalogProvider, StaticCatalog};
use crate::config::{AppConfig, JwtConfig};
use crate::notify::DEFAULT_NOTIFICATION_TTL;
use crate::session::registry::SessionRegistry;
use crate::session::store::{FileProfileStore, MemoryProfileStore, ProfileStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let catalog = match &config.catalog_path {
            Some(path) => StaticCatalog::from_json_file(path).await?,
            None => StaticCatalog::bundled()?,
        };
        let catalog = Arc::new(catalog) as Arc<dyn CatalogProvider>;

        let store = Arc::new(FileProfileStore::new(&config.profile_dir)) as Arc<dyn ProfileStore>;
        let sessions = Arc::new(SessionRegistry::new(store, config.notification_ttl));

        Ok(Self {
            config,
            catalog,
            sessions,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        catalog: Arc<dyn CatalogProvider>,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(store, config.notification_ttl));
        Self {
            config,
            catalog,
            sessions,
        }
    }

    /// Bundled catalog, in-memory profile store, fixed test secrets.
    pub fn fake() -> Self {
        Self::fake_with_store(Arc::new(MemoryProfileStore::new()))
    }

    pub fn fake_with_store(store: Arc<dyn ProfileStore>) -> Self {
        let config = Arc::new(AppConfig {
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
            profile_dir: "./profiles".into(),
            catalog_path: None,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        });
        let catalog = StaticCatalog::bundled().expect("bundled catalog parses");
        Self::from_parts(config, Arc::new(catalog), store)
    }
}
