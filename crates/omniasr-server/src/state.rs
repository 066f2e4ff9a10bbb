//! Shared application state.

use std::sync::Arc;

use omniasr_core::AsrEngine;

/// Handed to every handler; the engine is the only shared resource.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AsrEngine>,
}

impl AppState {
    pub fn new(engine: AsrEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
