//! Shared handler state.

use crate::ProviderProxy;
use std::sync::Arc;
use storybook_interface::{BookRepository, SettingsRepository};

/// Repositories and proxy shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Book persistence
    pub books: Arc<dyn BookRepository>,
    /// Global settings record
    pub settings: Arc<dyn SettingsRepository>,
    /// Provider proxy
    pub proxy: Arc<ProviderProxy>,
}

impl AppState {
    /// Bundle the handler dependencies.
    pub fn new(
        books: Arc<dyn BookRepository>,
        settings: Arc<dyn SettingsRepository>,
        proxy: ProviderProxy,
    ) -> Self {
        Self {
            books,
            settings,
            proxy: Arc::new(proxy),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}
