pub mod enums;
pub mod flag;
pub mod report;

pub use enums::*;
pub use flag::*;
pub use report::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
}
