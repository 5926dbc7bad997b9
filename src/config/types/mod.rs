//! Configuration utility types.
//!
//! | Module  | Purpose                        |
//! |---------|--------------------------------|
//! | `error` | Configuration error types      |
//! | `field` | Field paths for diagnostics    |

mod error;
mod field;

pub use error::{ConfigDiagnostics, ConfigError};
pub use field::FieldPath;
