use std::sync::Arc;

use crate::auth::UserDirectory;
use crate::config::ApiConfig;
use crate::database::CardStore;

/// Shared handles cloned into every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CardStore>,
    pub users: Arc<UserDirectory>,
    pub api: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn CardStore>, users: UserDirectory, api: ApiConfig) -> Self {
        Self {
            store,
            users: Arc::new(users),
            api: Arc::new(api),
        }
    }
}
