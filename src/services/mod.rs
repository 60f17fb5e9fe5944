pub mod error;
pub mod list_service;
pub mod task_service;
pub mod upload_service;
pub mod user_service;

pub use error::ServiceError;
pub use list_service::{ListInput, ListService};
pub use task_service::{NewTaskInput, TaskEdit, TaskService};
pub use upload_service::UploadService;
pub use user_service::{Registration, UserService};
