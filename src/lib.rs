pub mod authz;
pub mod config;
pub mod db;
pub mod errors;
pub mod events;
pub mod lookup;
pub mod models;

// Re-export commonly used items for handlers and tests
pub use authz::{Action, Authorizer, AuthzMode, Decision, Reason};
pub use config::AuthzConfig;
pub use errors::{AppError, AppResult, AuthzError};
pub use models::{Actor, Role};
