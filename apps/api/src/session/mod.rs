// Session memory: per-user state and the registry that owns it.

pub mod state;
pub mod store;

pub use state::SessionState;
pub use store::{SessionStore, SharedSession};
