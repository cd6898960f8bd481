pub mod extract;
pub mod response;

pub use extract::{Payload, ValidatedJson};
pub use response::{ApiResponse, ApiResult};
