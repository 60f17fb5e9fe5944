// handlers/public/auth/mod.rs - Session acquisition endpoints

pub mod login; // POST /api/v1/login - verify credentials, set session cookie
pub mod logout; // POST /api/v1/logout - expire session cookie
pub mod register; // POST /api/v1/register - create account

pub use login::login_post;
pub use logout::logout_post;
pub use register::register_post;
