mod config;
mod repos;
mod system;

pub use config::Config;
pub use repos::{
    IContactRepo, IEventStore, InMemoryContactRepo, InMemoryEventStore, Repos, StoreAction,
    StoreError,
};
use std::sync::Arc;
pub use system::{ISys, RealSys};

#[derive(Clone)]
pub struct SkemaContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

impl SkemaContext {
    pub fn create_inmemory() -> Self {
        let config = Config::new();
        Self {
            repos: Repos::create_inmemory(&config),
            config,
            sys: Arc::new(RealSys {}),
        }
    }
}

pub fn setup_context() -> SkemaContext {
    SkemaContext::create_inmemory()
}
