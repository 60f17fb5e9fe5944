pub mod list;
pub mod task;
pub mod user;

pub use list::{List, NewList};
pub use task::{NewTask, Task};
pub use user::{NewUser, User};
