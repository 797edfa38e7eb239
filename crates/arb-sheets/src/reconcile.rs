//! The reconciliation engine.
//!
//! Every mode works on the union of keys and languages found in both stores
//! and decides, cell by cell, which side wins. Blank and absent values never
//! overwrite anything.

use crate::document::{Document, SetOutcome};
use crate::error::SyncError;
use crate::grid::{Grid, Row};
use crate::language::LanguageCode;
use crate::value::Cell;
use indexmap::{IndexMap, IndexSet};

/// Which way a run flows and who wins on conflict.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Sheet → ARB files; non-blank sheet cells overwrite file entries.
    #[default]
    Update,
    /// ARB files → sheet; the sheet is rebuilt from scratch.
    Init,
    /// ARB files → sheet; only keys the sheet lacks are appended.
    Push,
}

impl Mode {
    /// Whether the run needs the current sheet content.
    pub fn reads_sheet(self) -> bool {
        !matches!(self, Mode::Init)
    }
}

/// What happened to one document during an update run.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentChange {
    pub document: Document,
    /// The language had no ARB file yet.
    pub created: bool,
    pub added: Vec<String>,
    pub updated: Vec<String>,
}

impl DocumentChange {
    pub fn is_changed(&self) -> bool {
        self.created || !self.added.is_empty() || !self.updated.is_empty()
    }
}

/// Columns and rows to add to the sheet in push mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridAppend {
    pub columns: Vec<LanguageCode>,
    /// Rows as wide as the existing header plus `columns`.
    pub rows: Vec<Row>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GridChange {
    Unchanged,
    Replace(Grid),
    Append(GridAppend),
}

/// The outcome of one reconciliation pass, before anything is written.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    pub mode: Mode,
    pub documents: Vec<DocumentChange>,
    pub grid: GridChange,
}

impl Reconciliation {
    /// Documents that need to be written.
    pub fn changed_documents(&self) -> impl Iterator<Item = &DocumentChange> {
        self.documents.iter().filter(|change| change.is_changed())
    }

    pub fn is_noop(&self) -> bool {
        self.changed_documents().next().is_none() && matches!(self.grid, GridChange::Unchanged)
    }
}

/// Run the engine for `mode`.
///
/// `grid` is required by update and push mode and ignored by init mode.
pub fn reconcile(
    mode: Mode,
    grid: Option<&Grid>,
    documents: Vec<Document>,
) -> Result<Reconciliation, SyncError> {
    let (documents, grid) = match mode {
        Mode::Update => {
            let grid = grid.ok_or(SyncError::MissingHeader)?;
            (update_documents(grid, documents), GridChange::Unchanged)
        },
        Mode::Init => (Vec::new(), GridChange::Replace(init_grid(&documents))),
        Mode::Push => {
            let grid = grid.ok_or(SyncError::MissingHeader)?;
            (Vec::new(), push_new_keys(grid, &documents))
        },
    };

    Ok(Reconciliation {
        mode,
        documents,
        grid,
    })
}

/// Languages of all documents, first-seen order, one entry per language.
pub fn document_languages(documents: &[Document]) -> IndexSet<LanguageCode> {
    documents.iter().map(|doc| doc.language.clone()).collect()
}

/// Keys of all documents, first-seen order.
pub fn document_keys(documents: &[Document]) -> IndexSet<&str> {
    documents.iter().flat_map(Document::keys).collect()
}

fn by_language(documents: &[Document]) -> IndexMap<&LanguageCode, &Document> {
    let mut map = IndexMap::new();
    for doc in documents {
        map.entry(&doc.language).or_insert(doc);
    }
    map
}

/// Update mode: copy every non-blank sheet cell into the matching document.
///
/// Returns one change per language column of the sheet, in header order.
/// Documents whose language has no column are left out and stay untouched.
pub fn update_documents(grid: &Grid, documents: Vec<Document>) -> Vec<DocumentChange> {
    let mut by_language: IndexMap<LanguageCode, Document> = IndexMap::new();
    for doc in documents {
        by_language.entry(doc.language.clone()).or_insert(doc);
    }

    grid.languages()
        .map(|(column, language)| {
            let (mut document, created) = match by_language.shift_remove(language) {
                Some(document) => (document, false),
                None => (Document::new(language.clone()), true),
            };

            let mut added = Vec::new();
            let mut updated = Vec::new();
            for (key, cells) in grid.rows() {
                let Some(text) = Cell::from_text(&cells[column]).text() else {
                    continue;
                };
                match document.set(key, text) {
                    SetOutcome::Added => added.push(key.to_string()),
                    SetOutcome::Updated => updated.push(key.to_string()),
                    SetOutcome::Unchanged => {},
                }
            }

            tracing::debug!(
                "{}: {} added, {} updated{}",
                language,
                added.len(),
                updated.len(),
                if created { " (new file)" } else { "" }
            );

            DocumentChange {
                document,
                created,
                added,
                updated,
            }
        })
        .collect()
}

/// Init mode: a fresh grid holding every key and language of the documents.
pub fn init_grid(documents: &[Document]) -> Grid {
    let languages = document_languages(documents);
    let docs = by_language(documents);
    let mut grid = Grid::new(languages.iter().cloned());

    for key in document_keys(documents) {
        let cells = languages
            .iter()
            .map(|language| {
                docs.get(language)
                    .and_then(|doc| doc.get(key).text())
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        grid.push_row(Row {
            key: key.to_string(),
            cells,
        });
    }

    tracing::debug!(
        "Built sheet with {} language(s) and {} key(s)",
        languages.len(),
        grid.len()
    );
    grid
}

/// Push mode: rows for keys the sheet does not have yet, plus header cells
/// for languages it does not have yet. Existing rows are never touched.
pub fn push_new_keys(grid: &Grid, documents: &[Document]) -> GridChange {
    let mut columns: Vec<LanguageCode> = Vec::new();
    let mut column_of: IndexMap<&LanguageCode, usize> = IndexMap::new();

    for (index, language) in grid.languages() {
        column_of.entry(language).or_insert(index);
    }
    for doc in documents {
        if !column_of.contains_key(&doc.language) {
            // New headers go after every column in use, stray cells included
            column_of.insert(&doc.language, grid.extent() + columns.len());
            columns.push(doc.language.clone());
        }
    }
    let width = grid.extent() + columns.len();

    let rows: Vec<Row> = document_keys(documents)
        .into_iter()
        .filter(|key| !grid.contains_key(key))
        .map(|key| {
            let mut cells = vec![String::new(); width];
            for doc in documents {
                if let Some(text) = doc.get(key).text()
                    && let Some(&index) = column_of.get(&doc.language)
                    && cells[index].is_empty()
                {
                    cells[index] = text.to_string();
                }
            }
            Row {
                key: key.to_string(),
                cells,
            }
        })
        .collect();

    tracing::debug!(
        "{} new key(s), {} new language column(s)",
        rows.len(),
        columns.len()
    );

    if columns.is_empty() && rows.is_empty() {
        GridChange::Unchanged
    } else {
        GridChange::Append(GridAppend { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageCase;

    fn code(raw: &str) -> LanguageCode {
        LanguageCode::parse(raw, LanguageCase::Canonical).unwrap()
    }

    fn doc(language: &str, entries: &[(&str, &str)]) -> Document {
        Document::from_translations(code(language), entries.iter().copied())
    }

    fn grid(rows: &[&[&str]]) -> Grid {
        let values = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        Grid::from_values(values, LanguageCase::Canonical).unwrap()
    }

    fn translations(document: &Document) -> Vec<(&str, &str)> {
        document.translations().collect()
    }

    #[test]
    fn test_update_fills_empty_documents() {
        let sheet = grid(&[&["id", "en", "es"], &["welcome_message", "Hello", "Hola"]]);
        let changes = update_documents(&sheet, vec![doc("en", &[]), doc("es", &[])]);

        assert_eq!(changes.len(), 2);
        assert_eq!(
            translations(&changes[0].document),
            vec![("welcome_message", "Hello")]
        );
        assert_eq!(
            translations(&changes[1].document),
            vec![("welcome_message", "Hola")]
        );
        assert_eq!(changes[0].added, vec!["welcome_message"]);
        assert!(!changes[0].created);
    }

    #[test]
    fn test_update_overwrites_and_keeps_document_only_keys() {
        let sheet = grid(&[&["id", "en"], &["hello", "Hi there"]]);
        let changes = update_documents(
            &sheet,
            vec![doc("en", &[("hello", "Hello"), ("local_only", "Stay")])],
        );

        assert_eq!(
            translations(&changes[0].document),
            vec![("hello", "Hi there"), ("local_only", "Stay")]
        );
        assert_eq!(changes[0].updated, vec!["hello"]);
    }

    #[test]
    fn test_update_blank_cell_never_overwrites() {
        let sheet = grid(&[&["id", "en", "es"], &["hello", "  ", ""], &["new", "", "Nuevo"]]);
        let changes = update_documents(&sheet, vec![doc("en", &[("hello", "Hello")])]);

        assert_eq!(translations(&changes[0].document), vec![("hello", "Hello")]);
        assert!(!changes[0].is_changed());
        // A blank cell does not create an entry either
        assert_eq!(changes[0].document.get("new"), Cell::Absent);
    }

    #[test]
    fn test_update_creates_document_for_new_language() {
        let sheet = grid(&[&["id", "en", "DE"], &["hello", "Hello", "Hallo"]]);
        let changes = update_documents(&sheet, vec![doc("en", &[("hello", "Hello")])]);

        assert!(!changes[0].is_changed());
        assert!(changes[1].created);
        assert_eq!(changes[1].document.language.as_str(), "de");
        assert_eq!(translations(&changes[1].document), vec![("hello", "Hallo")]);
    }

    #[test]
    fn test_update_skips_documents_without_column() {
        let sheet = grid(&[&["id", "en"], &["hello", "Hello"]]);
        let changes = update_documents(
            &sheet,
            vec![doc("en", &[]), doc("fr", &[("hello", "Bonjour")])],
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].document.language, code("en"));
    }

    #[test]
    fn test_update_is_idempotent() {
        let sheet = grid(&[
            &["id", "en", "fr"],
            &["a", "A", ""],
            &["b", "B", "Bé"],
            &["c", "", "Cé"],
        ]);
        let first = update_documents(&sheet, vec![doc("en", &[("z", "Z")]), doc("fr", &[])]);
        let documents: Vec<Document> = first.iter().map(|c| c.document.clone()).collect();
        let second = update_documents(&sheet, documents);

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.document, b.document);
            assert!(!b.is_changed());
        }
    }

    #[test]
    fn test_update_matches_languages_case_insensitively() {
        let sheet = grid(&[&["id", "PT-br"], &["hello", "Olá"]]);
        let changes = update_documents(&sheet, vec![doc("pt_BR", &[])]);

        assert_eq!(changes.len(), 1);
        assert!(!changes[0].created);
        assert_eq!(changes[0].document.get("hello"), Cell::Text("Olá"));
    }

    #[test]
    fn test_init_builds_union_grid() {
        let documents = vec![
            doc("en", &[("goodbye", "Bye")]),
            doc("fr", &[("goodbye", "Au revoir"), ("hello", "Salut")]),
        ];
        let built = init_grid(&documents);

        assert_eq!(
            built.to_values(),
            vec![
                vec!["id", "en", "fr"],
                vec!["goodbye", "Bye", "Au revoir"],
                vec!["hello", "", "Salut"],
            ]
        );
    }

    #[test]
    fn test_init_covers_every_document_entry() {
        let documents = vec![
            doc("en", &[("a", "A"), ("b", "B")]),
            doc("es", &[("c", "C"), ("a", "Á")]),
            doc("de", &[("d", r"D\nD")]),
        ];
        let built = init_grid(&documents);

        for document in &documents {
            for (key, text) in document.translations() {
                assert_eq!(built.cell(key, &document.language), Cell::Text(text));
            }
        }
        assert_eq!(built.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_init_leaves_blank_document_values_empty() {
        let built = init_grid(&[doc("en", &[("a", "  ")])]);
        assert_eq!(built.cell("a", &code("en")), Cell::Blank);
    }

    #[test]
    fn test_push_appends_only_new_keys() {
        let sheet = grid(&[&["id", "en", "fr"], &["hello", "Hi", "Salut"]]);
        let documents = vec![doc("en", &[("hello", "Hello!"), ("new_key", "New")])];

        let GridChange::Append(append) = push_new_keys(&sheet, &documents) else {
            panic!("expected an append");
        };
        assert!(append.columns.is_empty());
        assert_eq!(
            append.rows,
            vec![Row {
                key: "new_key".to_string(),
                cells: vec!["New".to_string(), String::new()],
            }]
        );
    }

    #[test]
    fn test_push_never_changes_existing_rows() {
        let sheet = grid(&[&["id", "en", "fr"], &["hello", "Hi", ""], &["bye", "Bye", "Salut"]]);
        let documents = vec![
            doc("en", &[("hello", "Changed"), ("bye", "Changed")]),
            doc("fr", &[("hello", "Bonjour"), ("bye", "Changed")]),
        ];

        assert_eq!(push_new_keys(&sheet, &documents), GridChange::Unchanged);
    }

    #[test]
    fn test_push_adds_columns_for_new_languages() {
        let sheet = grid(&[&["id", "en", "notes"], &["hello", "Hi", "greeting"]]);
        let documents = vec![
            doc("en", &[("hello", "Hi"), ("bye", "Bye")]),
            doc("it", &[("bye", "Ciao"), ("hello", "Ciao!")]),
        ];

        let GridChange::Append(append) = push_new_keys(&sheet, &documents) else {
            panic!("expected an append");
        };
        assert_eq!(append.columns, vec![code("it")]);
        assert_eq!(
            append.rows,
            vec![Row {
                key: "bye".to_string(),
                cells: vec!["Bye".to_string(), String::new(), "Ciao".to_string()],
            }]
        );
    }

    #[test]
    fn test_push_places_new_columns_after_stray_cells() {
        let sheet = grid(&[&["id", "en"], &["hello", "Hi", "stray"]]);
        let documents = vec![doc("en", &[("bye", "Bye")]), doc("it", &[("bye", "Ciao")])];

        let GridChange::Append(append) = push_new_keys(&sheet, &documents) else {
            panic!("expected an append");
        };
        assert_eq!(append.columns, vec![code("it")]);
        assert_eq!(
            append.rows[0].cells,
            vec!["Bye".to_string(), String::new(), "Ciao".to_string()]
        );
    }

    #[test]
    fn test_update_never_touches_metadata() {
        let sheet = grid(&[&["id", "en"], &["@hello", "oops"], &["hello", "Hi"]]);
        let content = r#"{"hello": "Hi", "@hello": {"description": "Greeting"}}"#;
        let document = Document::parse(code("en"), content).unwrap();

        let changes = update_documents(&sheet, vec![document]);

        assert!(!changes[0].is_changed());
        assert!(matches!(
            changes[0].document.entries()["@hello"],
            crate::document::Entry::Metadata(_)
        ));
    }

    #[test]
    fn test_reconcile_requires_grid_for_update() {
        let err = reconcile(Mode::Update, None, Vec::new()).unwrap_err();
        assert!(matches!(err, SyncError::MissingHeader));
    }

    #[test]
    fn test_reconcile_init_ignores_grid() {
        let stale = grid(&[&["id", "en"], &["old", "Old"]]);
        let result = reconcile(Mode::Init, Some(&stale), vec![doc("en", &[("new", "New")])]).unwrap();

        let GridChange::Replace(built) = result.grid else {
            panic!("expected a replacement grid");
        };
        assert!(!built.contains_key("old"));
        assert!(result.documents.is_empty());
    }
}
