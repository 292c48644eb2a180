// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "peek-rs.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),
}

/// Default search paths for `peek-rs.toml`
/// (current directory → XDG config → /etc).
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("peek-rs").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from("/etc/peek-rs").join(CONFIG_FILE_NAME));
    paths
}

/// Parse the `key` section of TOML text.
///
/// `Ok(None)` when the section is absent.
pub fn parse_section<T: DeserializeOwned>(
    content: &str,
    key: &str,
    origin: &Path,
) -> Result<Option<T>, ConfigError> {
    let table: toml::Table = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(origin.to_path_buf(), e.to_string()))?;

    let Some(section) = table.get(key) else {
        return Ok(None);
    };

    // Round-trip through text so serde defaults apply to missing keys.
    let section_toml = toml::to_string(section)
        .map_err(|e| ConfigError::ParseError(origin.to_path_buf(), e.to_string()))?;
    let cfg = toml::from_str::<T>(&section_toml)
        .map_err(|e| ConfigError::ParseError(origin.to_path_buf(), e.to_string()))?;
    Ok(Some(cfg))
}

fn load_section_from_file<T: DeserializeOwned>(
    path: &Path,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
    parse_section(&content, key, path)
}

/// A configuration type stored as one section of `peek-rs.toml`.
pub trait ConfigFile: Sized + Default + DeserializeOwned {
    /// Section key, e.g. `"peek-http"`.
    fn section_key() -> &'static str;

    /// Load the section from a specific file. A missing section is an error.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        load_section_from_file::<Self>(path, Self::section_key())?.ok_or_else(|| {
            ConfigError::ParseError(
                path.to_path_buf(),
                format!("missing [{}] section", Self::section_key()),
            )
        })
    }

    /// Load the first default-path file that contains the section.
    ///
    /// Returns `(Default::default(), None)` when no file has it.
    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in config_search_paths() {
            if path.exists() {
                if let Some(cfg) = load_section_from_file::<Self>(&path, Self::section_key())? {
                    return Ok((cfg, Some(path)));
                }
            }
        }
        Ok((Self::default(), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        host: String,
        retries: u32,
    }

    impl ConfigFile for Sample {
        fn section_key() -> &'static str {
            "sample"
        }
    }

    #[test]
    fn test_section_defaults_apply() {
        let parsed: Option<Sample> =
            parse_section("[sample]\nhost = \"10.0.0.1\"\n", "sample", Path::new("x")).unwrap();
        assert_eq!(
            parsed,
            Some(Sample {
                host: "10.0.0.1".into(),
                retries: 0
            })
        );
    }

    #[test]
    fn test_absent_section() {
        let parsed: Option<Sample> =
            parse_section("[other]\na = 1\n", "sample", Path::new("x")).unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_load_from_file_requires_section() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[other]\na = 1").expect("write");
        let err = Sample::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing [sample] section"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[sample]\nhost = \"h\"\nretries = 2").expect("write");
        let cfg = Sample::load_from_file(file.path()).expect("load");
        assert_eq!(cfg.retries, 2);
    }

    #[test]
    fn test_bad_toml() {
        let err =
            parse_section::<Sample>("[sample\n", "sample", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_, _)));
    }
}
