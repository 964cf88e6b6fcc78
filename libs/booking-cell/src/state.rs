// libs/booking-cell/src/state.rs
use std::sync::Arc;

use shared_config::AppConfig;
use shared_store::{InMemoryStore, SlotStore, SpecialtyRegistry};

use crate::services::BookingCoordinator;

/// Shared application state: reads go straight to the repositories, writes go
/// through the coordinator.
pub struct AppState {
    pub config: AppConfig,
    pub slots: Arc<dyn SlotStore>,
    pub registry: Arc<dyn SpecialtyRegistry>,
    pub coordinator: BookingCoordinator,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        slots: Arc<dyn SlotStore>,
        registry: Arc<dyn SpecialtyRegistry>,
    ) -> Self {
        let coordinator =
            BookingCoordinator::new(Arc::clone(&slots), Arc::clone(&registry), config);
        Self {
            config: config.clone(),
            slots,
            registry,
            coordinator,
        }
    }

    /// State backed by the seeded in-memory store.
    pub fn in_memory(config: &AppConfig) -> Self {
        let store = Arc::new(InMemoryStore::seeded());
        Self::new(
            config,
            Arc::clone(&store) as Arc<dyn SlotStore>,
            store as Arc<dyn SpecialtyRegistry>,
        )
    }
}
