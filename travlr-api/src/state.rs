use std::sync::Arc;

use travlr_core::{AuthService, CatalogService, SessionKeys};
use travlr_store::Repositories;

#[derive(Clone)]
pub struct AuthConfig {
    pub secure_cookies: bool,
    pub bcrypt_cost: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub auth: Arc<AuthService>,
    pub auth_config: AuthConfig,
}

impl AppState {
    pub fn new(repos: Repositories, keys: SessionKeys, auth_config: AuthConfig) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(repos.trips)),
            auth: Arc::new(AuthService::new(repos.users, keys, auth_config.bcrypt_cost)),
            auth_config,
        }
    }

    pub fn keys(&self) -> &SessionKeys {
        self.auth.keys()
    }
}
