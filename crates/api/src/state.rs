use std::sync::Arc;

use lacquer_db::inventory::Inventory;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Inventory service over the injected catalog and image stores.
    pub inventory: Inventory,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
