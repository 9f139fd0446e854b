//! Types shared by the directory client crates and the report service

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
