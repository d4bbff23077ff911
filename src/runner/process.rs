use crate::common::{EnvdoError, Result};
use log::{debug, info, trace};
use nix::unistd::execve;
use std::convert::Infallible;
use std::env;
use std::ffi::{CString, OsStr, OsString};
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Replaces the current process with the wrapped command.
#[derive(Debug)]
pub struct Launcher {
    exec: PathBuf,
    args: Vec<String>,
    vars: Vec<OsString>,
}

impl Launcher {
    /// Resolve `args[0]` on `$PATH`. `args` becomes the new argv as is, so `argv[0]`
    /// stays the token the user typed.
    pub fn new(args: Vec<String>, vars: Vec<OsString>) -> Result<Self> {
        let command = args.first().map(String::as_str).unwrap_or_default();
        let exec = lookup_executable(command)?;
        debug!("Resolved '{}' to '{}'", command, exec.display());

        Ok(Launcher { exec, args, vars })
    }

    pub fn executable(&self) -> &Path {
        &self.exec
    }

    /// `execve(2)` into the resolved executable. Only returns on failure.
    pub fn execute(self) -> Result<Infallible> {
        let fail = |source: io::Error| EnvdoError::ExecFailed {
            path: self.exec.clone(),
            source,
        };

        let path = to_cstring(self.exec.as_os_str()).map_err(fail)?;
        let argv = self
            .args
            .iter()
            .map(|arg| to_cstring(OsStr::new(arg)))
            .collect::<io::Result<Vec<_>>>()
            .map_err(fail)?;
        let envp = self
            .vars
            .iter()
            .map(|var| to_cstring(var))
            .collect::<io::Result<Vec<_>>>()
            .map_err(fail)?;

        info!(
            "Executing: {} {:?}",
            self.exec.display(),
            self.args.get(1..).unwrap_or_default()
        );
        debug!("Passing {} environment entries", envp.len());

        let errno = match execve(&path, &argv, &envp) {
            Ok(never) => match never {},
            Err(errno) => errno,
        };
        Err(fail(io::Error::from(errno)))
    }
}

/// Find `command` the way a shell would, using the current `$PATH`.
pub fn lookup_executable(command: &str) -> Result<PathBuf> {
    lookup_in(command, env::var_os("PATH").as_deref())
}

/// Find `command` using `search_path` as `$PATH`.
///
/// Commands containing a `/` are not searched for, only checked. Empty and relative
/// `$PATH` entries are skipped so the result is always absolute.
pub fn lookup_in(command: &str, search_path: Option<&OsStr>) -> Result<PathBuf> {
    find(command, search_path).map_err(|source| EnvdoError::ExecutableNotFound {
        command: command.to_string(),
        source,
    })
}

fn find(command: &str, search_path: Option<&OsStr>) -> io::Result<PathBuf> {
    if command.is_empty() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "empty command"));
    }

    if command.contains('/') {
        let path = std::path::absolute(command)?;
        check_executable(&path)?;
        return Ok(path);
    }

    let search_path = search_path
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "$PATH is not set"))?;

    for dir in env::split_paths(search_path) {
        if !dir.is_absolute() {
            debug!("Skipping non-absolute $PATH entry '{}'", dir.display());
            continue;
        }

        let candidate = dir.join(command);
        match check_executable(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) => trace!("  {}: {}", candidate.display(), e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "executable file not found in $PATH",
    ))
}

fn check_executable(path: &Path) -> io::Result<()> {
    let metadata = fs::metadata(path)?;
    if metadata.is_file() && metadata.permissions().mode() & 0o111 != 0 {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "not an executable file",
        ))
    }
}

fn to_cstring(value: &OsStr) -> io::Result<CString> {
    Ok(CString::new(value.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn make_file(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn bin_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        make_file(dir.path(), "tool", 0o755);
        make_file(dir.path(), "data", 0o644);
        fs::create_dir(dir.path().join("folder")).unwrap();
        dir
    }

    #[test]
    fn test_lookup_echo() {
        let path = lookup_executable("echo").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("echo"));
    }

    #[test]
    fn test_lookup_missing_command() {
        match lookup_executable("envdo-definitely-not-a-command") {
            Err(EnvdoError::ExecutableNotFound { command, source }) => {
                assert_eq!(command, "envdo-definitely-not-a-command");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected ExecutableNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_in_custom_path() {
        let dir = bin_dir();
        let found = lookup_in("tool", Some(dir.path().as_os_str())).unwrap();
        assert_eq!(found, dir.path().join("tool"));
    }

    #[test]
    fn test_first_match_wins() {
        let first = bin_dir();
        let second = bin_dir();
        let search = env::join_paths([first.path(), second.path()]).unwrap();

        let found = lookup_in("tool", Some(search.as_os_str())).unwrap();
        assert_eq!(found, first.path().join("tool"));
    }

    #[test]
    fn test_skips_non_executable_and_directories() {
        let dir = bin_dir();
        let search = Some(dir.path().as_os_str());

        assert!(matches!(
            lookup_in("data", search),
            Err(EnvdoError::ExecutableNotFound { .. })
        ));
        assert!(matches!(
            lookup_in("folder", search),
            Err(EnvdoError::ExecutableNotFound { .. })
        ));
    }

    #[test]
    fn test_non_executable_shadowed_entry_falls_through() {
        let first = tempfile::tempdir().unwrap();
        make_file(first.path(), "tool", 0o644);
        let second = bin_dir();
        let search = env::join_paths([first.path(), second.path()]).unwrap();

        let found = lookup_in("tool", Some(search.as_os_str())).unwrap();
        assert_eq!(found, second.path().join("tool"));
    }

    #[test]
    fn test_relative_path_entries_are_skipped() {
        assert!(lookup_in("sh", Some(OsStr::new("bin:.:"))).is_err());
    }

    #[test]
    fn test_no_search_path() {
        assert!(matches!(
            lookup_in("echo", None),
            Err(EnvdoError::ExecutableNotFound { .. })
        ));
    }

    #[test]
    fn test_command_with_slash_is_not_searched() {
        let dir = bin_dir();
        let tool = dir.path().join("tool");

        let found = lookup_in(tool.to_str().unwrap(), None).unwrap();
        assert_eq!(found, tool);

        let data = dir.path().join("data");
        match lookup_in(data.to_str().unwrap(), None) {
            Err(EnvdoError::ExecutableNotFound { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied)
            }
            other => panic!("expected ExecutableNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_command() {
        assert!(lookup_in("", Some(OsStr::new("/usr/bin"))).is_err());
    }

    #[test]
    fn test_launcher_keeps_original_argv() {
        let launcher = Launcher::new(
            vec!["echo".to_string(), "-p".to_string(), "x".to_string()],
            vec![],
        )
        .unwrap();
        assert!(launcher.executable().is_absolute());
        assert_eq!(launcher.args, ["echo", "-p", "x"]);
    }

    #[test]
    fn test_execute_rejects_nul_bytes() {
        let launcher = Launcher {
            exec: PathBuf::from("/bin/echo"),
            args: vec!["echo".to_string()],
            vars: vec![OsString::from("BAD=a\0b")],
        };

        match launcher.execute() {
            Err(EnvdoError::ExecFailed { path, source }) => {
                assert_eq!(path, PathBuf::from("/bin/echo"));
                assert_eq!(source.kind(), io::ErrorKind::InvalidInput);
            }
            Err(other) => panic!("expected ExecFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_reports_os_failure() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Launcher {
            exec: dir.path().join("vanished"),
            args: vec!["vanished".to_string()],
            vars: vec![],
        };

        match launcher.execute() {
            Err(EnvdoError::ExecFailed { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            Err(other) => panic!("expected ExecFailed, got {:?}", other),
        }
    }
}
