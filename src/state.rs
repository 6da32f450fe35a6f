use crate::{
    config::AppConfig,
    gateway::Backend,
    identity::LocalAuth,
    middleware::auth::AuthUser,
    store::{AdminConsole, CartStore, CatalogCache, WishlistStore},
};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Backend,
    pub auth: LocalAuth<Backend>,
    pub provider_secret: Option<String>,
}

impl AppState {
    pub fn new(gateway: impl Into<Backend>, config: &AppConfig) -> Self {
        let gateway = gateway.into();
        let auth = LocalAuth::new(gateway.clone(), &config.jwt_secret, config.jwt_ttl_hours);
        Self {
            gateway,
            auth,
            provider_secret: config.provider_secret.clone(),
        }
    }

    pub fn catalog(&self) -> CatalogCache<Backend> {
        CatalogCache::new(self.gateway.clone())
    }

    pub fn cart(&self, user: &AuthUser) -> CartStore<Backend> {
        CartStore::new(self.gateway.clone(), user.session())
    }

    pub fn wishlist(&self, user: &AuthUser) -> WishlistStore<Backend> {
        WishlistStore::new(self.gateway.clone(), user.session())
    }

    pub fn admin(&self, user: &AuthUser) -> AdminConsole<Backend> {
        AdminConsole::new(self.gateway.clone(), user.session())
    }
}
