//! Core error, logging and type plumbing

pub mod types;
pub mod error;
pub mod logging;

pub use types::*;
pub use error::Error;
