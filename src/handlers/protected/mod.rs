// handlers/protected/mod.rs - Handlers that require a session
//
// Every handler here takes a `CurrentUser`; requests without a valid session
// are answered with 401 before the handler body runs. Ownership checks happen
// in the services.

pub mod files; // POST /api/v1/files
pub mod lists; // /api/v1/lists/*
pub mod tasks; // /api/v1/tasks/*
pub mod user; // GET /api/v1/user
