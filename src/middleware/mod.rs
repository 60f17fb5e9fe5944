pub mod auth;
pub mod response;

pub use auth::{expired_cookie, extract_credential, session_cookie, CurrentUser};
pub use response::{ApiResponse, ApiResult, Message};
