use crate::common::error::{ConfigReadError, EnvdoError, Result};
use log::{debug, error, trace};
use nix::unistd::User;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// One named set of environment variables.
pub type Profile = BTreeMap<String, String>;

/// Profiles read from an envdo TOML file, keyed by section name.
///
/// ```toml
/// [default]
/// FOO = "yes"
///
/// [other]
/// FOO = "correct"
/// ```
#[derive(Debug, Default)]
pub struct Config {
    path: PathBuf,
    profiles: BTreeMap<String, Profile>,
}

impl Config {
    /// Expand a leading `~` in `path` and load the file it points to.
    pub fn load(path: &str) -> Result<Self> {
        let config_path = expand_home(path)?;
        Self::load_from(config_path)
    }

    /// Load an already resolved path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read config file '{}': {}", path.display(), e);
            EnvdoError::ConfigParse {
                path: path.clone(),
                source: ConfigReadError::Io(e),
            }
        })?;

        debug!("Configuration file size: {} bytes", content.len());
        Self::parse(path, &content)
    }

    /// Parse TOML `content`, remembering `path` for diagnostics.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let profiles: BTreeMap<String, Profile> = toml::from_str(content).map_err(|e| {
            error!("Failed to parse TOML configuration: {}", e);
            EnvdoError::ConfigParse {
                path: path.clone(),
                source: ConfigReadError::Toml(e),
            }
        })?;

        debug!("Configuration parsed: {} profile(s)", profiles.len());
        for (name, vars) in &profiles {
            trace!("  [{}] {} variable(s)", name, vars.len());
        }

        Ok(Config { path, profiles })
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles.get(name).ok_or_else(|| {
            debug!(
                "No profile '{}' in {}, available: {:?}",
                name,
                self.path.display(),
                self.profile_names().collect::<Vec<_>>()
            );
            EnvdoError::ProfileNotFound {
                profile: name.to_string(),
                path: self.path.clone(),
            }
        })
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// The file this configuration was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Expand `~`, `~/rest`, `~user` and `~user/rest`. Anything else is returned as is.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    expand_home_with(path, dirs::home_dir)
}

fn expand_home_with(path: &str, home_dir: impl FnOnce() -> Option<PathBuf>) -> Result<PathBuf> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };

    let (user, tail) = rest.split_once('/').unwrap_or((rest, ""));

    let home = if user.is_empty() {
        home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "home directory could not be determined")
        })
    } else {
        user_home(user)
    }
    .map_err(|source| {
        error!("Could not expand '{}': {}", path, source);
        EnvdoError::ConfigPath {
            path: path.to_string(),
            source,
        }
    })?;

    let expanded = if tail.is_empty() {
        home
    } else {
        home.join(tail)
    };
    debug!("Expanded '{}' to '{}'", path, expanded.display());

    Ok(expanded)
}

fn user_home(name: &str) -> io::Result<PathBuf> {
    match User::from_name(name) {
        Ok(Some(user)) => Ok(user.dir),
        Ok(None) => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such user '{}'", name),
        )),
        Err(errno) => Err(io::Error::from(errno)),
    }
}
