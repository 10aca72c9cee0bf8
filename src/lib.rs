pub mod cli;
pub mod commands;
pub mod error;
pub mod profile;
pub mod request;
pub mod target;

pub use error::{Error, Result};
