//! Candidate directories for `log.conf`
//!
//! Priority (highest to lowest):
//! 1. The directory named by `LOGGA_CONF`
//! 2. The current working directory
//! 3. The user's home directory
//!
//! This works like shell rc files: the first directory holding a `log.conf`
//! wins and the others are never read.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable naming a directory that holds `log.conf`
pub const CONFIG_ENV: &str = "LOGGA_CONF";

/// File name looked up in each candidate directory
pub const CONFIG_FILE_NAME: &str = "log.conf";

/// The three candidate directories, any of which may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateLocations
{
    /// Directory from `LOGGA_CONF`
    pub env_override: Option<PathBuf>,
    /// Current working directory
    pub current_dir: Option<PathBuf>,
    /// Home directory
    pub home_dir: Option<PathBuf>,
}

impl CandidateLocations
{
    /// Candidates from explicit directories.
    #[must_use]
    pub fn new(env_override: Option<PathBuf>, current_dir: Option<PathBuf>, home_dir: Option<PathBuf>) -> Self
    {
        Self { env_override, current_dir, home_dir }
    }

    /// Candidates from the process environment.
    ///
    /// An unset or empty `LOGGA_CONF` leaves the override absent. A current
    /// directory that cannot be read (deleted, no permission) is absent too.
    #[must_use]
    pub fn from_env() -> Self
    {
        let env_override = env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()).map(PathBuf::from);
        Self::new(env_override, env::current_dir().ok(), dirs::home_dir())
    }

    /// Present candidates in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Path>
    {
        [&self.env_override, &self.current_dir, &self.home_dir]
            .into_iter()
            .filter_map(|dir| dir.as_deref())
    }

    /// Read the first `log.conf` found, in priority order.
    ///
    /// Returns the file's path and raw bytes, or `None` if no candidate has a
    /// readable file. Unreadable files (missing, permission denied, a directory
    /// named `log.conf`) are skipped. Decoding is left to
    /// [`LoggingConfig::parse_bytes`](super::LoggingConfig::parse_bytes), so a
    /// file that reads fine but is not UTF-8 is still found.
    #[must_use]
    pub fn find(&self) -> Option<(PathBuf, Vec<u8>)>
    {
        self.iter().find_map(|dir| {
            let path = dir.join(CONFIG_FILE_NAME);
            match std::fs::read(&path) {
                Ok(contents) => Some((path, contents)),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "no usable log.conf");
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn dir_with_config(contents: &str) -> TempDir
    {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), contents).unwrap();
        dir
    }

    #[test]
    fn test_iter_skips_absent_candidates()
    {
        let locations = CandidateLocations::new(None, Some(PathBuf::from("/work")), None);
        let dirs: Vec<&Path> = locations.iter().collect();
        assert_eq!(dirs, vec![Path::new("/work")]);
    }

    #[test]
    fn test_iter_order()
    {
        let locations = CandidateLocations::new(
            Some(PathBuf::from("/env")),
            Some(PathBuf::from("/cwd")),
            Some(PathBuf::from("/home")),
        );
        let dirs: Vec<&Path> = locations.iter().collect();
        assert_eq!(dirs, vec![Path::new("/env"), Path::new("/cwd"), Path::new("/home")]);
    }

    #[test]
    fn test_find_first_match_wins()
    {
        let env_dir = dir_with_config("env");
        let cwd = dir_with_config("cwd");
        let home = dir_with_config("home");
        let locations = CandidateLocations::new(
            Some(env_dir.path().to_path_buf()),
            Some(cwd.path().to_path_buf()),
            Some(home.path().to_path_buf()),
        );

        let (path, contents) = locations.find().unwrap();
        assert_eq!(path, env_dir.path().join(CONFIG_FILE_NAME));
        assert_eq!(contents, b"env");
    }

    #[test]
    fn test_find_skips_missing_and_directories()
    {
        let empty = TempDir::new().unwrap();
        let shadowed = TempDir::new().unwrap();
        std::fs::create_dir(shadowed.path().join(CONFIG_FILE_NAME)).unwrap();
        let home = dir_with_config("home");
        let locations = CandidateLocations::new(
            Some(empty.path().to_path_buf()),
            Some(shadowed.path().to_path_buf()),
            Some(home.path().to_path_buf()),
        );

        let (_, contents) = locations.find().unwrap();
        assert_eq!(contents, b"home");
    }

    #[test]
    fn test_find_returns_undecodable_file()
    {
        let cwd = TempDir::new().unwrap();
        std::fs::write(cwd.path().join(CONFIG_FILE_NAME), b"level = \"\xff\"").unwrap();
        let home = dir_with_config("home");
        let locations = CandidateLocations::new(None, Some(cwd.path().to_path_buf()), Some(home.path().to_path_buf()));

        let (path, contents) = locations.find().unwrap();
        assert_eq!(path, cwd.path().join(CONFIG_FILE_NAME));
        assert_eq!(contents.last(), Some(&b'"'));
    }

    #[test]
    fn test_find_nothing()
    {
        let empty = TempDir::new().unwrap();
        let locations = CandidateLocations::new(None, Some(empty.path().to_path_buf()), None);
        assert!(locations.find().is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_override()
    {
        let dir = TempDir::new().unwrap();
        // SAFETY: serialized with the other environment tests
        unsafe { env::set_var(CONFIG_ENV, dir.path()) };
        let locations = CandidateLocations::from_env();
        unsafe { env::remove_var(CONFIG_ENV) };

        assert_eq!(locations.env_override.as_deref(), Some(dir.path()));
        assert!(locations.current_dir.is_some());
    }

    #[test]
    #[serial]
    fn test_from_env_empty_override_is_absent()
    {
        // SAFETY: serialized with the other environment tests
        unsafe { env::set_var(CONFIG_ENV, "") };
        let locations = CandidateLocations::from_env();
        unsafe { env::remove_var(CONFIG_ENV) };

        assert!(locations.env_override.is_none());
    }
}
