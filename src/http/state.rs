use crate::session::FeedbackSession;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single active feedback session
    pub session: Arc<FeedbackSession>,
}

impl AppState {
    pub fn new(session: Arc<FeedbackSession>) -> Self {
        Self { session }
    }
}
