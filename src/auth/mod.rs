pub mod guard;
pub mod password;
pub mod session;
pub mod token;

pub use guard::{authorize, require_owner};
pub use password::{PasswordError, PasswordHashing};
pub use session::{Credential, SessionError, SessionResolver};
pub use token::{Claims, TokenError, TokenIssuer};
