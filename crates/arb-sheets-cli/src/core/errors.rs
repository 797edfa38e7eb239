//! CLI error types using miette diagnostics.
//!
//! Every library failure is grouped by its [`ErrorKind`] into one diagnostic
//! code, with help text for the cases a user can fix.

// Fields in these structs are read by miette's Diagnostic derive macro
#![allow(unused)]

use arb_sheets::{ErrorKind, SyncError};
use arb_sheets_toml::SyncConfigError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Error when the arb-sheets.toml configuration file is not found.
#[derive(Debug, Diagnostic, Error)]
#[error("arb-sheets.toml configuration file not found")]
#[diagnostic(
    code(arb_sheets::config::not_found),
    help(
        "Create an arb-sheets.toml file in your project root with the following content:\n\n  \
          arb_dir = \"lib/l10n\"\n  \
          template_language = \"en\"\n"
    )
)]
pub struct ConfigNotFoundError {
    /// The path where the config was expected.
    pub expected_path: PathBuf,
}

/// Error when parsing the arb-sheets.toml configuration file.
#[derive(Debug, Diagnostic, Error)]
#[error("failed to parse arb-sheets.toml configuration")]
#[diagnostic(code(arb_sheets::config::parse_error))]
pub struct ConfigParseError {
    #[source_code]
    pub src: NamedSource<String>,

    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    /// The underlying parse error message.
    #[help]
    pub help: String,
}

/// Error when the template language is invalid.
#[derive(Debug, Diagnostic, Error)]
#[error("invalid template language: {identifier}")]
#[diagnostic(
    code(arb_sheets::config::invalid_language),
    help("Use a language code such as 'en', 'pt_BR' or 'zh_Hant'")
)]
pub struct InvalidLanguageError {
    pub identifier: String,
}

/// Error when no sheet was given on the command line or in the configuration.
#[derive(Debug, Diagnostic, Error)]
#[error("no sheet to sync with")]
#[diagnostic(
    code(arb_sheets::config::missing_sheet),
    help(
        "Pass --sheet-key KEY (with --token or ARB_SHEETS_TOKEN) or --sheet-file FILE, \
         or add a [sheet] table to arb-sheets.toml"
    )
)]
pub struct MissingSheetError;

/// Invalid setup: flags, directory, ARB files or sheet header.
#[derive(Debug, Diagnostic, Error)]
#[error("{message}")]
#[diagnostic(code(arb_sheets::config))]
pub struct SetupError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

/// A malformed ARB file or sheet.
#[derive(Debug, Diagnostic, Error)]
#[error("{message}")]
#[diagnostic(code(arb_sheets::parse))]
pub struct ParseError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

/// The sheet backend failed.
#[derive(Debug, Diagnostic, Error)]
#[error("{message}")]
#[diagnostic(
    code(arb_sheets::remote),
    help("Check the sheet key and that the access token may edit the sheet")
)]
pub struct RemoteError {
    pub message: String,

    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Diagnostic, Error)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    ConfigNotFound(#[from] ConfigNotFoundError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ConfigParse(#[from] ConfigParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidLanguage(#[from] InvalidLanguageError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    MissingSheet(#[from] MissingSheetError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Remote(#[from] RemoteError),

    #[error("IO error: {0}")]
    #[diagnostic(code(arb_sheets::io))]
    Io(#[from] std::io::Error),
}

fn help_for(err: &SyncError) -> Option<String> {
    let help = match err {
        SyncError::ConflictingModes => "Pass either --init or --push, not both".to_string(),
        SyncError::MissingDirectory { .. } => {
            "Create the directory or update arb_dir in arb-sheets.toml".to_string()
        },
        SyncError::NoDocuments { pattern, .. } => {
            format!("Add at least one file matching {pattern}, or update file_prefix in arb-sheets.toml")
        },
        SyncError::MissingHeader => {
            "The first row must hold 'id' followed by language codes; run with --init to build it"
                .to_string()
        },
        SyncError::DuplicateDocument { .. } => {
            "Language codes ignore case and '-' versus '_'; remove or rename one of the files"
                .to_string()
        },
        SyncError::Row { .. } => "Every key may appear in one row only".to_string(),
        SyncError::Header { .. } => "Every language may appear in one column only".to_string(),
        SyncError::Document { .. } => {
            "ARB files must be a flat JSON object of strings; only '@' keys may hold objects"
                .to_string()
        },
        SyncError::Remote { .. } | SyncError::Io(_) => return None,
    };
    Some(help)
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        let help = help_for(&err);
        let message = err.to_string();

        match (err.kind(), err) {
            (_, SyncError::Io(err)) => CliError::Io(err),
            (_, SyncError::Remote { source, .. }) => {
                CliError::Remote(RemoteError { message, source })
            },
            (ErrorKind::Parse, _) => CliError::Parse(ParseError { message, help }),
            _ => CliError::Setup(SetupError { message, help }),
        }
    }
}

impl From<SyncConfigError> for CliError {
    fn from(err: SyncConfigError) -> Self {
        match err {
            SyncConfigError::NotFound { path } => CliError::ConfigNotFound(ConfigNotFoundError {
                expected_path: path,
            }),
            SyncConfigError::ReadError(err) => CliError::Io(err),
            SyncConfigError::ParseError {
                path,
                content,
                source,
            } => CliError::ConfigParse(ConfigParseError {
                src: NamedSource::new(path.display().to_string(), content),
                span: source.span().map(SourceSpan::from),
                help: source.message().to_string(),
            }),
            SyncConfigError::InvalidTemplateLanguage { name, .. } => {
                CliError::InvalidLanguage(InvalidLanguageError { identifier: name })
            },
        }
    }
}
