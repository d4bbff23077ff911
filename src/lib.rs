pub mod common;
pub mod runner;

pub use common::{Config, EnvdoError, Profile};
pub use runner::{EnvBuilder, Settings};
