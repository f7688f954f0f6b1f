mod contact;
mod event;

use crate::config::Config;
pub use contact::{IContactRepo, InMemoryContactRepo};
pub use event::{IEventStore, InMemoryEventStore, StoreAction, StoreError};
use std::sync::Arc;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventStore>,
    pub contacts: Arc<dyn IContactRepo>,
}

impl Repos {
    pub fn create_inmemory(config: &Config) -> Self {
        Self {
            events: Arc::new(InMemoryEventStore::with_authkey_len(
                config.status_authkey_len,
            )),
            contacts: Arc::new(InMemoryContactRepo::new()),
        }
    }
}
