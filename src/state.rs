use crate::cache::StatsCache;
use crate::config::Config;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub stats: Arc<StatsCache>,
    pub config: Arc<Config>,
}
