use crate::client::ApiClient;
use crate::session::AuthService;
use crate::storage::SessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(api_base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api: ApiClient::new(api_base_url),
            auth: AuthService::new(store),
        }
    }
}
