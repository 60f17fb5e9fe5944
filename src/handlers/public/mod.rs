// handlers/public/mod.rs - Handlers that need no session
//
// Account creation and session acquisition/teardown. Everything here must
// validate its own input since there is no trusted user context.

pub mod auth;

pub use auth::*;
