//! Configuration for the `mpi` CLI: a `serde` + `toml` struct loaded
//! from a well-known file, falling back to built-in defaults when none
//! is found. The language itself has no notion of a project/config
//! file; this only covers CLI-level defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MiniparCliError, Result};

pub const CONFIG_FILE_NAME: &str = "mpi.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Default verbosity when `--verbose` isn't passed on the command line.
    #[serde(default)]
    pub verbose: bool,

    /// Disable ANSI color in log output by default.
    #[serde(default)]
    pub no_color: bool,

    /// Directory `run`/`check`/`tokens` resolve relative source paths
    /// against when given a bare filename.
    #[serde(default = "default_source_dir")]
    pub default_source_dir: String,
}

fn default_source_dir() -> String {
    ".".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            no_color: false,
            default_source_dir: default_source_dir(),
        }
    }
}

impl Config {
    /// Searches the current directory, then the user's config
    /// directory (`dirs::config_dir()/mpi/mpi.toml`), falling back to
    /// defaults if neither exists.
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MiniparCliError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| MiniparCliError::Config(format!("failed to parse configuration: {e}")))
    }

    fn find_config_file() -> Option<PathBuf> {
        let here = PathBuf::from(CONFIG_FILE_NAME);
        if here.exists() {
            return Some(here);
        }
        dirs::config_dir()
            .map(|dir| dir.join("mpi").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_current_dir_as_source_dir() {
        let config = Config::default();
        assert!(!config.verbose);
        assert_eq!(config.default_source_dir, ".");
    }

    #[test]
    fn load_from_path_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mpi.toml");
        std::fs::write(&path, "verbose = true\ndefault_source_dir = \"src\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert!(config.verbose);
        assert_eq!(config.default_source_dir, "src");
    }

    #[test]
    fn load_from_missing_path_is_an_error() {
        let result = Config::load_from_path(Path::new("/nonexistent/mpi.toml"));
        assert!(result.is_err());
    }
}
