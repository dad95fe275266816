//! Shared application state.

use std::sync::Arc;

use articlebite_core::NotecardPipeline;

use crate::store::DeckStore;

/// State handed to every request handler: the generation pipeline and the
/// deck store behind it.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<NotecardPipeline>,
    pub store: Arc<dyn DeckStore>,
}

impl AppState {
    pub fn new(pipeline: Arc<NotecardPipeline>, store: Arc<dyn DeckStore>) -> Self {
        Self { pipeline, store }
    }
}
