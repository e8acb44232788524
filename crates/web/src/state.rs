use std::sync::Arc;

use storage::Database;
use storage::notify::{EmailSink, NotificationSink};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub notifier: Arc<dyn NotificationSink>,
    pub emailer: Arc<dyn EmailSink>,
}
