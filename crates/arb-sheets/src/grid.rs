//! In-memory form of the translation sheet.

use crate::document::is_metadata_key;
use crate::error::SyncError;
use crate::language::{LanguageCase, LanguageCode};
use crate::value::Cell;
use indexmap::IndexMap;

/// Label written in the top-left cell of a sheet built from scratch.
pub const KEY_COLUMN: &str = "id";

/// A column after the key column.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Language(LanguageCode),
    /// A column whose header is not a language code; kept but never synced.
    Other(String),
}

impl Column {
    pub fn label(&self) -> &str {
        match self {
            Column::Language(code) => code.as_str(),
            Column::Other(label) => label,
        }
    }
}

/// One data row: a key and one cell per column, empty string for empty cells.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Row {
    pub key: String,
    pub cells: Vec<String>,
}

impl Row {
    pub fn to_values(&self) -> Vec<String> {
        std::iter::once(self.key.clone())
            .chain(self.cells.iter().cloned())
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    key_label: String,
    columns: Vec<Column>,
    rows: IndexMap<String, Vec<String>>,
    /// Widest row seen in the sheet, key column excluded.
    extent: usize,
}

impl Grid {
    /// An empty grid with one column per language.
    pub fn new(languages: impl IntoIterator<Item = LanguageCode>) -> Self {
        Self {
            key_label: KEY_COLUMN.to_string(),
            columns: languages.into_iter().map(Column::Language).collect(),
            rows: IndexMap::new(),
            extent: 0,
        }
    }

    /// Interpret raw sheet values: the first row is the header, the first
    /// column holds the keys.
    pub fn from_values(values: Vec<Vec<String>>, case: LanguageCase) -> Result<Self, SyncError> {
        let mut values = values.into_iter();

        let header = values
            .next()
            .filter(|header| header.iter().any(|cell| !cell.trim().is_empty()))
            .ok_or(SyncError::MissingHeader)?;

        let mut header = header.into_iter();
        let key_label = header.next().unwrap_or_default().trim().to_string();

        let mut columns: Vec<Column> = Vec::new();
        for label in header {
            let column = match LanguageCode::parse(&label, case) {
                Some(code) => {
                    if columns
                        .iter()
                        .any(|c| matches!(c, Column::Language(existing) if *existing == code))
                    {
                        return Err(SyncError::Header {
                            reason: format!("language '{code}' appears more than once"),
                        });
                    }
                    Column::Language(code)
                },
                None => {
                    if !label.trim().is_empty() {
                        tracing::warn!("Ignoring sheet column '{}': not a language code", label);
                    }
                    Column::Other(label)
                },
            };
            columns.push(column);
        }

        let mut rows: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut extent = columns.len();
        for (index, row) in values.enumerate() {
            // 1-based, counting the header
            let sheet_row = index + 2;
            let mut row = row.into_iter();
            let key = row.next().unwrap_or_default().trim().to_string();
            let mut cells: Vec<String> = row.collect();

            extent = extent.max(cells.len());

            if key.is_empty() {
                if cells.iter().any(|cell| !cell.trim().is_empty()) {
                    tracing::warn!("Skipping sheet row {}: it has values but no key", sheet_row);
                }
                continue;
            }

            if is_metadata_key(&key) {
                tracing::warn!(
                    "Skipping sheet row {}: '{}' is an ARB metadata key",
                    sheet_row,
                    key
                );
                continue;
            }

            if cells.len() > columns.len() {
                tracing::warn!(
                    "Sheet row {} has {} cells beyond the header, ignoring them",
                    sheet_row,
                    cells.len() - columns.len()
                );
            }
            cells.resize(columns.len(), String::new());

            if rows.contains_key(&key) {
                return Err(SyncError::Row {
                    row: sheet_row,
                    reason: format!("duplicate key '{key}'"),
                });
            }
            rows.insert(key, cells);
        }

        Ok(Self {
            key_label,
            columns,
            rows,
            extent,
        })
    }

    /// Raw sheet values, header first, every row as wide as the header.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let header = std::iter::once(self.key_label.clone())
            .chain(self.columns.iter().map(|c| c.label().to_string()))
            .collect();

        std::iter::once(header)
            .chain(self.rows.iter().map(|(key, cells)| {
                std::iter::once(key.clone())
                    .chain(cells.iter().cloned())
                    .collect()
            }))
            .collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns after the key column.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of sheet columns after the key column holding any cell, header
    /// or data. New header cells go after these.
    pub fn extent(&self) -> usize {
        self.extent.max(self.columns.len())
    }

    /// Language columns as `(column index, code)`, in header order.
    pub fn languages(&self) -> impl Iterator<Item = (usize, &LanguageCode)> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(index, column)| match column {
                Column::Language(code) => Some((index, code)),
                Column::Other(_) => None,
            })
    }

    pub fn column_of(&self, language: &LanguageCode) -> Option<usize> {
        self.languages()
            .find(|(_, code)| *code == language)
            .map(|(index, _)| index)
    }

    /// Rows as `(key, cells)`, in sheet order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rows
            .iter()
            .map(|(key, cells)| (key.as_str(), cells.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, key: &str, language: &LanguageCode) -> Cell<'_> {
        let Some(column) = self.column_of(language) else {
            return Cell::Absent;
        };
        match self.rows.get(key) {
            Some(cells) => Cell::from_text(&cells[column]),
            None => Cell::Absent,
        }
    }

    /// Add a language column, returning its index. Existing rows get an empty cell.
    pub fn push_language(&mut self, language: LanguageCode) -> usize {
        if let Some(index) = self.column_of(&language) {
            return index;
        }
        self.columns.push(Column::Language(language));
        for cells in self.rows.values_mut() {
            cells.push(String::new());
        }
        self.columns.len() - 1
    }

    /// Add or replace a row; `cells` is padded or cut to the grid width.
    pub fn push_row(&mut self, row: Row) {
        let Row { key, mut cells } = row;
        cells.resize(self.columns.len(), String::new());
        self.rows.insert(key, cells);
    }
}
