use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, IdentityResolver, PostService, SeaOrmAuthService, SeaOrmPostService,
    SeaOrmUserService, TokenService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub identity: Arc<IdentityResolver>,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub post_service: Arc<dyn PostService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = Arc::new(TokenService::from_config(&config.security));
        Ok(Self::with_store(config, store, tokens))
    }

    /// Wires the services around an existing store and token service.
    #[must_use]
    pub fn with_store(config: Config, store: Store, tokens: Arc<TokenService>) -> Self {
        let identity = Arc::new(IdentityResolver::new(store.clone(), tokens.clone()));

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), tokens.clone()))
            as Arc<dyn AuthService + Send + Sync + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn UserService + Send + Sync + 'static>;

        let post_service = Arc::new(SeaOrmPostService::new(store.clone()))
            as Arc<dyn PostService + Send + Sync + 'static>;

        Self {
            config: Arc::new(config),
            store,
            tokens,
            identity,
            auth_service,
            user_service,
            post_service,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
