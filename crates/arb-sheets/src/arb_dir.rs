//! Access to a directory of `<prefix>_<language>.arb` files.

use crate::document::Document;
use crate::error::SyncError;
use crate::language::{LanguageCase, LanguageCode};
use fs_err as fs;
use indexmap::IndexMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

pub const ARB_EXTENSION: &str = "arb";
pub const DEFAULT_PREFIX: &str = "app";

/// A directory holding one ARB file per language.
#[derive(Clone, Debug)]
pub struct ArbDirectory {
    dir: PathBuf,
    prefix: String,
    case: LanguageCase,
    template: Option<LanguageCode>,
}

impl ArbDirectory {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, case: LanguageCase) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            case,
            template: None,
        }
    }

    /// Put `template` first whenever documents are listed.
    pub fn with_template(mut self, template: Option<LanguageCode>) -> Self {
        self.template = template;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn case(&self) -> LanguageCase {
        self.case
    }

    /// Glob-like pattern of the files this directory considers.
    pub fn pattern(&self) -> String {
        format!("{}_*.{ARB_EXTENSION}", self.prefix)
    }

    pub fn file_name(&self, language: &LanguageCode) -> String {
        format!("{}_{}.{ARB_EXTENSION}", self.prefix, language)
    }

    /// Where a new document for `language` is written.
    pub fn path_for(&self, language: &LanguageCode) -> PathBuf {
        self.dir.join(self.file_name(language))
    }

    /// Language of a file name, `None` when it does not match the pattern.
    fn language_of(&self, file_name: &str) -> Option<Result<LanguageCode, ()>> {
        let stem = file_name.strip_suffix(&format!(".{ARB_EXTENSION}"))?;
        let suffix = stem.strip_prefix(&self.prefix)?.strip_prefix('_')?;
        Some(LanguageCode::parse(suffix, self.case).ok_or(()))
    }

    /// Every ARB file of the directory with its language, sorted by file name
    /// with the template language first.
    pub fn list_documents(&self) -> Result<Vec<(LanguageCode, PathBuf)>, SyncError> {
        if !self.dir.is_dir() {
            return Err(SyncError::MissingDirectory {
                path: self.dir.clone(),
            });
        }

        let mut files: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                files.push((name.to_string(), path.clone()));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut found: IndexMap<LanguageCode, PathBuf> = IndexMap::new();
        for (name, path) in files {
            let language = match self.language_of(&name) {
                Some(Ok(language)) => language,
                Some(Err(())) => {
                    tracing::warn!("Skipping {}: suffix is not a language code", path.display());
                    continue;
                },
                None => continue,
            };

            if let Some(first) = found.get(&language) {
                return Err(SyncError::DuplicateDocument {
                    language: language.to_string(),
                    first: first.clone(),
                    second: path,
                });
            }
            tracing::debug!("Found {} for {}", path.display(), language);
            found.insert(language, path);
        }

        if found.is_empty() {
            return Err(SyncError::NoDocuments {
                dir: self.dir.clone(),
                pattern: self.pattern(),
            });
        }

        if let Some(template) = &self.template
            && let Some(index) = found.get_index_of(template)
        {
            found.move_index(index, 0);
        }

        Ok(found.into_iter().collect())
    }

    pub fn read_document(
        &self,
        language: LanguageCode,
        path: &Path,
    ) -> Result<Document, SyncError> {
        let content = fs::read_to_string(path)?;
        let mut document =
            Document::parse(language, &content).map_err(|reason| SyncError::Document {
                path: path.to_path_buf(),
                reason,
            })?;
        document.file = Some(path.to_path_buf());
        Ok(document)
    }

    /// Read every document listed by [`ArbDirectory::list_documents`].
    pub fn load_documents(&self) -> Result<Vec<Document>, SyncError> {
        self.list_documents()?
            .into_iter()
            .map(|(language, path)| self.read_document(language, &path))
            .collect()
    }

    /// The path `document` is written to.
    pub fn target_of(&self, document: &Document) -> PathBuf {
        document
            .file
            .clone()
            .unwrap_or_else(|| self.path_for(&document.language))
    }

    /// The exact bytes [`ArbDirectory::write_document`] writes.
    pub fn render_document(&self, document: &Document) -> Result<String, SyncError> {
        document.render().map_err(|e| SyncError::Document {
            path: self.target_of(document),
            reason: e.to_string(),
        })
    }

    /// Replace the document's file atomically, creating it if needed.
    pub fn write_document(&self, document: &Document) -> Result<PathBuf, SyncError> {
        let target = self.target_of(document);
        let content = self.render_document(document)?;
        let parent = target.parent().unwrap_or(&self.dir);

        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&target).map_err(|e| e.error)?;

        tracing::debug!("Wrote {}", target.display());
        Ok(target)
    }
}
