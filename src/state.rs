use crate::reconciler::Reconciler;
use crate::remote::HttpEndpoint;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared handle to the one reconciler. Every action holds the lock for its
/// whole round trip, so only one fetch or submission is ever in flight.
#[derive(Clone)]
pub struct AppState {
    pub icons_dir: PathBuf,
    pub reconciler: Arc<Mutex<Reconciler<HttpEndpoint>>>,
}

impl AppState {
    pub fn new(icons_dir: PathBuf, reconciler: Reconciler<HttpEndpoint>) -> Self {
        Self {
            icons_dir,
            reconciler: Arc::new(Mutex::new(reconciler)),
        }
    }
}
