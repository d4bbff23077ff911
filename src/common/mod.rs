pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, Profile};
pub use error::{EnvdoError, Result};
