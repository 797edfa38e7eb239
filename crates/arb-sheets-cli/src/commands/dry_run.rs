use crate::utils::ui;
use arb_sheets::{ArbDirectory, DocumentChange, SyncError};
use fs_err as fs;
use std::path::PathBuf;

/// What writing one document would change on disk.
#[derive(Debug, Clone)]
pub struct DryRunDiff {
    path: PathBuf,
    before: String,
    after: String,
}

impl DryRunDiff {
    pub fn new(path: PathBuf, before: String, after: String) -> Self {
        Self {
            path,
            before,
            after,
        }
    }

    /// Compare the file on disk with what `change` would write.
    pub fn for_document(arb: &ArbDirectory, change: &DocumentChange) -> Result<Self, SyncError> {
        let path = arb.target_of(&change.document);
        let before = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };
        let after = arb.render_document(&change.document)?;
        Ok(Self::new(path, before, after))
    }

    pub fn is_empty(&self) -> bool {
        self.before == self.after
    }

    pub fn print(&self) {
        ui::print_diff(&self.path, &self.before, &self.after);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arb_sheets::{Document, LanguageCase, LanguageCode};
    use assert_fs::TempDir;

    #[test]
    fn test_diff_against_missing_file() {
        let temp = TempDir::new().unwrap();
        let arb = ArbDirectory::new(temp.path(), "app", LanguageCase::Canonical);
        let language = LanguageCode::parse("fr", LanguageCase::Canonical).unwrap();
        let change = DocumentChange {
            document: Document::from_translations(language, [("hello", "Salut")]),
            created: true,
            added: vec!["hello".to_string()],
            updated: Vec::new(),
        };

        let diff = DryRunDiff::for_document(&arb, &change).unwrap();

        assert_eq!(diff.path, temp.path().join("app_fr.arb"));
        assert_eq!(diff.before, "");
        assert_eq!(diff.after, "{\n  \"hello\": \"Salut\"\n}\n");
        assert!(!diff.is_empty());
    }
}
