use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::ContactStore;
use crate::secrets::TokenVerifier;
use crate::services::ContactService;

/// Shared per-process dependencies, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ContactStore>,
    pub service: ContactService,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn ContactStore>,
        verifier: Arc<TokenVerifier>,
    ) -> Self {
        let service = ContactService::new(store.clone());
        Self { config, store, service, verifier }
    }
}
