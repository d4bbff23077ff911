use crate::common::{EnvdoError, Result};
use log::debug;

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_CONFIG_PATH: &str = "~/.envdo.toml";

/// Options that precede the wrapped command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub profile: String,
    pub config_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            profile: DEFAULT_PROFILE.to_string(),
            config_path: DEFAULT_CONFIG_PATH.to_string(),
        }
    }
}

/// Split the raw arguments (program name excluded) into [`Settings`] and the command line.
///
/// Only `-p/--profile <name>` and `-f/--config <path>` are understood, and only as a
/// contiguous run before the command. Everything from the command onwards is returned
/// untouched, so the command is free to use `-p` or `-f` itself.
pub fn resolve(args: Vec<String>) -> Result<(Settings, Vec<String>)> {
    let mut settings = Settings::default();
    let mut rest = args.as_slice();

    // A flag only counts when a value follows it; a lone trailing flag is unknown.
    loop {
        match rest {
            [flag, value, tail @ ..] if flag == "-f" || flag == "--config" => {
                settings.config_path = value.clone();
                rest = tail;
            }
            [flag, value, tail @ ..] if flag == "-p" || flag == "--profile" => {
                settings.profile = value.clone();
                rest = tail;
            }
            [first, ..] if first.starts_with('-') => {
                return Err(EnvdoError::UnknownFlag(first.clone()));
            }
            _ => break,
        }
    }

    if rest.is_empty() {
        return Err(EnvdoError::Usage);
    }

    debug!("Resolved settings: {:?}", settings);
    debug!("Command line: {:?}", rest);

    Ok((settings, rest.to_vec()))
}
