//! Stateless business-rule checks used by the service layer.

pub mod cpf;
pub mod date;
pub mod email;

pub use cpf::is_valid_cpf;
pub use date::{is_underage, is_zero_instant, time_between, Elapsed, AGE_OF_MAJORITY};
pub use email::is_valid_email;
