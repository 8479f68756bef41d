pub mod error;
pub mod logger;
pub mod manifold;
pub mod uncertainty;

pub use error::{ApexError, ApexResult};
pub use logger::{init_logger, init_logger_with_level};
