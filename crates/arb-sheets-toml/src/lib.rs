#![doc = include_str!("../README.md")]

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use unic_langid::{LanguageIdentifier, LanguageIdentifierError};

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "arb-sheets.toml";

fn default_file_prefix() -> String {
    "app".to_string()
}

#[derive(Debug, Error)]
pub enum SyncConfigError {
    /// Configuration file not found.
    #[error("arb-sheets.toml not found at {}", .path.display())]
    NotFound { path: PathBuf },
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse configuration file.
    #[error("Failed to parse {}: {}", .path.display(), .source.message())]
    ParseError {
        path: PathBuf,
        /// The file content, kept so callers can point at the error span.
        content: String,
        #[source]
        source: toml::de::Error,
    },
    /// The template language is not a language identifier.
    #[error("Invalid template language '{name}'")]
    InvalidTemplateLanguage {
        name: String,
        #[source]
        source: LanguageIdentifierError,
    },
}

/// How language codes are spelled in new file names and header cells.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCaseSetting {
    /// `pt_BR`
    #[default]
    Canonical,
    /// `pt_br`
    Lower,
    /// Whatever spelling was found first.
    Preserve,
}

/// Default sheet location used when none is given on the command line.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetConfig {
    /// Google Sheets spreadsheet key, the id in its URL.
    #[serde(default)]
    pub key: Option<String>,
    /// A local JSON file holding the rows, relative to the project root.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// The configuration for `arb-sheets`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Directory holding the ARB files, relative to the project root.
    pub arb_dir: PathBuf,
    /// ARB files are named `{file_prefix}_{language}.arb`.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Language listed first in a sheet built from the files.
    #[serde(default)]
    pub template_language: Option<String>,
    #[serde(default)]
    pub language_case: LanguageCaseSetting,
    #[serde(default)]
    pub sheet: Option<SheetConfig>,
}

impl SyncConfig {
    /// Reads the configuration from a path.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, SyncConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SyncConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;

        let config: SyncConfig =
            toml::from_str(&content).map_err(|source| SyncConfigError::ParseError {
                path: path.to_path_buf(),
                content: content.clone(),
                source,
            })?;
        config.template_language_identifier()?;

        Ok(config)
    }

    /// Reads `arb-sheets.toml` from a project directory.
    pub fn read_from_dir(dir: &Path) -> Result<Self, SyncConfigError> {
        Self::read_from_path(dir.join(CONFIG_FILE_NAME))
    }

    /// Returns the ARB directory resolved against a project directory.
    pub fn arb_dir_from_base(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.arb_dir)
    }

    /// Returns the sheet file resolved against a project directory, if configured.
    pub fn sheet_file_from_base(&self, base_dir: &Path) -> Option<PathBuf> {
        self.sheet
            .as_ref()
            .and_then(|sheet| sheet.file.as_ref())
            .map(|file| base_dir.join(file))
    }

    pub fn sheet_key(&self) -> Option<&str> {
        self.sheet.as_ref().and_then(|sheet| sheet.key.as_deref())
    }

    /// Returns the template language as a `LanguageIdentifier`, if one is set.
    pub fn template_language_identifier(
        &self,
    ) -> Result<Option<LanguageIdentifier>, SyncConfigError> {
        let Some(name) = &self.template_language else {
            return Ok(None);
        };

        name.replace('_', "-")
            .parse::<LanguageIdentifier>()
            .map(Some)
            .map_err(|source| SyncConfigError::InvalidTemplateLanguage {
                name: name.clone(),
                source,
            })
    }
}
