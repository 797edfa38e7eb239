//! Sheet backends available from the command line.

mod file;
mod google;

pub use file::JsonFileSheet;
pub use google::GoogleSheet;

use crate::core::{CliError, MissingSheetError, SetupError};
use arb_sheets::SheetBackend;
use arb_sheets_toml::SyncConfig;
use std::path::{Path, PathBuf};

/// Where the sheet lives, after merging flags and configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SheetSource {
    File(PathBuf),
    Google { key: String },
}

impl SheetSource {
    /// Flags win over `[sheet]` in the configuration; a file wins over a key.
    pub fn resolve(
        sheet_file: Option<&Path>,
        sheet_key: Option<&str>,
        config: &SyncConfig,
        base_dir: &Path,
    ) -> Result<Self, CliError> {
        if let Some(file) = sheet_file {
            return Ok(SheetSource::File(file.to_path_buf()));
        }
        if let Some(key) = sheet_key {
            return Ok(SheetSource::Google {
                key: key.to_string(),
            });
        }
        if let Some(file) = config.sheet_file_from_base(base_dir) {
            return Ok(SheetSource::File(file));
        }
        if let Some(key) = config.sheet_key() {
            return Ok(SheetSource::Google {
                key: key.to_string(),
            });
        }
        Err(MissingSheetError.into())
    }

    pub fn open(&self, token: Option<&str>) -> Result<Box<dyn SheetBackend>, CliError> {
        match self {
            SheetSource::File(path) => {
                tracing::debug!("Using sheet file {}", path.display());
                Ok(Box::new(JsonFileSheet::new(path)))
            },
            SheetSource::Google { key } => {
                let token = token.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
                    CliError::from(SetupError {
                        message: "an access token is required for Google Sheets".to_string(),
                        help: Some(
                            "Pass --token or set ARB_SHEETS_TOKEN, e.g. to the output of \
                             `gcloud auth print-access-token`"
                                .to_string(),
                        ),
                    })
                })?;
                tracing::debug!("Using Google spreadsheet {}", key);
                Ok(Box::new(GoogleSheet::new(key.as_str(), token)?))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sheet: &str) -> SyncConfig {
        toml::from_str(&format!("arb_dir = \"l10n\"\n{sheet}")).unwrap()
    }

    #[test]
    fn test_flags_win_over_config() {
        let config = config("[sheet]\nkey = \"from-config\"\n");
        let base = Path::new("/project");

        assert_eq!(
            SheetSource::resolve(Some(Path::new("rows.json")), None, &config, base).unwrap(),
            SheetSource::File(PathBuf::from("rows.json"))
        );
        assert_eq!(
            SheetSource::resolve(None, Some("from-flag"), &config, base).unwrap(),
            SheetSource::Google {
                key: "from-flag".to_string()
            }
        );
        assert_eq!(
            SheetSource::resolve(None, None, &config, base).unwrap(),
            SheetSource::Google {
                key: "from-config".to_string()
            }
        );
    }

    #[test]
    fn test_config_file_is_relative_to_project() {
        let config = config("[sheet]\nfile = \"sheet.json\"\n");

        assert_eq!(
            SheetSource::resolve(None, None, &config, Path::new("/project")).unwrap(),
            SheetSource::File(PathBuf::from("/project/sheet.json"))
        );
    }

    #[test]
    fn test_no_sheet() {
        let err = SheetSource::resolve(None, None, &config(""), Path::new(".")).unwrap_err();
        assert!(matches!(err, CliError::MissingSheet(_)));
    }

    #[test]
    fn test_google_requires_token() {
        let source = SheetSource::Google {
            key: "abc".to_string(),
        };
        assert!(matches!(source.open(None), Err(CliError::Setup(_))));
        assert!(matches!(source.open(Some("  ")), Err(CliError::Setup(_))));
    }
}
