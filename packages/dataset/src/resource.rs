//! Resource locations for datasets.
//!
//! View configs name their CSV relative to a data root (the equivalent of the
//! frontend's public `data/` directory). The root is either a local directory
//! or an HTTP base URL, configured via `GAME_VIZ_DATA_ROOT`.

use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the default data root.
pub const DATA_ROOT_ENV: &str = "GAME_VIZ_DATA_ROOT";

/// Default data root when the environment variable is not set.
pub const DEFAULT_DATA_ROOT: &str = "data";

/// A concrete location a dataset is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataResource {
    /// A file on the local filesystem.
    File(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl fmt::Display for DataResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Base location that relative dataset names are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRoot {
    /// A local directory.
    Dir(PathBuf),
    /// A base URL.
    Url(String),
}

impl Default for DataRoot {
    fn default() -> Self {
        Self::Dir(PathBuf::from(DEFAULT_DATA_ROOT))
    }
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

impl DataRoot {
    /// Parses a root from a string; anything with an HTTP scheme is a URL.
    #[must_use]
    pub fn parse(root: &str) -> Self {
        if is_url(root) {
            Self::Url(root.trim_end_matches('/').to_owned())
        } else {
            Self::Dir(PathBuf::from(root))
        }
    }

    /// Reads the root from `GAME_VIZ_DATA_ROOT`, falling back to `data`.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(DATA_ROOT_ENV).map_or_else(|_| Self::default(), |v| Self::parse(&v))
    }

    /// Resolves a dataset location. Absolute URLs and absolute paths are
    /// used as-is; anything else is joined onto the root.
    #[must_use]
    pub fn resolve(&self, location: &str) -> DataResource {
        if is_url(location) {
            return DataResource::Url(location.to_owned());
        }
        if Path::new(location).is_absolute() {
            return DataResource::File(PathBuf::from(location));
        }
        match self {
            Self::Dir(dir) => DataResource::File(dir.join(location)),
            Self::Url(base) => {
                DataResource::Url(format!("{base}/{}", location.trim_start_matches('/')))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_against_dir() {
        let root = DataRoot::parse("public/data");
        assert_eq!(
            root.resolve("incomedata_ca.csv"),
            DataResource::File(PathBuf::from("public/data/incomedata_ca.csv"))
        );
    }

    #[test]
    fn resolves_relative_against_url() {
        let root = DataRoot::parse("https://example.org/data/");
        assert_eq!(
            root.resolve("/la_with_game_data.csv"),
            DataResource::Url("https://example.org/data/la_with_game_data.csv".to_string())
        );
    }

    #[test]
    fn absolute_locations_ignore_root() {
        let root = DataRoot::default();
        assert_eq!(
            root.resolve("http://host/x.csv"),
            DataResource::Url("http://host/x.csv".to_string())
        );
        assert_eq!(
            root.resolve("/tmp/x.csv"),
            DataResource::File(PathBuf::from("/tmp/x.csv"))
        );
    }
}
