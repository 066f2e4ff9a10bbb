//! HTTP gateway translating OpenAI-shaped requests into engine calls.

pub mod api;
pub mod error;
pub mod state;

pub use api::create_router;
pub use state::AppState;
