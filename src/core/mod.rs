// Module declarations
pub mod error;
pub mod value;
pub mod record;

// Re-exports for convenience
pub use error::DataAccessError;
pub use value::{FromValue, Value};
pub use record::Record;
