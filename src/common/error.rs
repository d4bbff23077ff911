use std::path::PathBuf;
use thiserror::Error;

/// Every way an `envdo` invocation can fail. All of them are fatal.
#[derive(Error, Debug)]
pub enum EnvdoError {
    #[error("command not given")]
    Usage,

    #[error("unknown flag {0}")]
    UnknownFlag(String),

    #[error("could not resolve config file {path}")]
    ConfigPath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read config file {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: ConfigReadError,
    },

    #[error("could not find env profile \"{profile}\" in {}", path.display())]
    ProfileNotFound { profile: String, path: PathBuf },

    #[error("could not find executable {command} on $PATH")]
    ExecutableNotFound {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not run {}", path.display())]
    ExecFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Cause of a [`EnvdoError::ConfigParse`].
#[derive(Error, Debug)]
pub enum ConfigReadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EnvdoError>;
