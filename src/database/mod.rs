pub mod manager;
pub mod models;
pub mod repository;
pub mod sanitize;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{PgUserRepository, UserRepository};
pub use sanitize::{sanitize_update_params, SanitizeError, SanitizedParams, SqlParam};
