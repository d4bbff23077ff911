pub mod args;
pub mod env;
pub mod process;

pub use args::Settings;
pub use env::EnvBuilder;
pub use process::Launcher;
