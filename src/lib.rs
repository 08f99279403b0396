pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod reconciler;
pub mod remote;
pub mod state;
pub mod storage;
pub mod ui;
pub mod validation;

pub use app::router;
pub use config::Config;
pub use errors::{DashboardError, Rejection};
pub use reconciler::{Reconciler, View};
pub use remote::{Endpoint, HttpEndpoint};
pub use state::AppState;
pub use storage::SessionStore;
