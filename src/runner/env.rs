use crate::common::{Config, Profile, Result};
use log::{debug, trace};
use std::env;
use std::ffi::{OsStr, OsString};

/// Builds the `KEY=VALUE` list handed to the replacement process.
///
/// Starts from a snapshot of an environment and only ever appends; duplicate keys are
/// left in place so the later entry wins in the new process. The real process
/// environment is never touched.
#[derive(Debug, Default, Clone)]
pub struct EnvBuilder {
    vars: Vec<OsString>,
}

impl EnvBuilder {
    /// Snapshot of the current process environment, in the order the OS reports it.
    pub fn inherited() -> Self {
        let builder = Self::from_entries(env::vars_os().map(|(key, value)| entry(&key, &value)));
        debug!("Inherited {} environment variables", builder.vars.len());
        builder
    }

    /// Start from explicit `KEY=VALUE` entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            vars: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Append one entry per profile variable.
    pub fn merge_profile(mut self, profile: &Profile) -> Self {
        debug!("Merging {} profile variables", profile.len());
        for (key, value) in profile {
            trace!("  Adding: {} = {}", key, value);
            self.vars.push(entry(OsStr::new(key), OsStr::new(value)));
        }
        self
    }

    pub fn build(self) -> Vec<OsString> {
        debug!("Final environment has {} entries", self.vars.len());
        self.vars
    }
}

/// Look up `profile` in `config` and append it to the inherited environment.
pub fn merge(config: &Config, profile: &str) -> Result<Vec<OsString>> {
    let vars = config.profile(profile)?;
    Ok(EnvBuilder::inherited().merge_profile(vars).build())
}

fn entry(key: &OsStr, value: &OsStr) -> OsString {
    let mut line = OsString::with_capacity(key.len() + value.len() + 1);
    line.push(key);
    line.push("=");
    line.push(value);
    line
}
