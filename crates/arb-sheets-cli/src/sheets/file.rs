//! A sheet stored as a JSON array of rows in a local file.

use arb_sheets::{SheetBackend, SyncError};
use fs_err as fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct JsonFileSheet {
    path: PathBuf,
}

impl JsonFileSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Vec<String>>, SyncError> {
        if !self.path.exists() {
            tracing::debug!("{} does not exist yet, treating it as empty", self.path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            SyncError::remote_with(
                format!("{} is not a JSON array of rows", self.path.display()),
                e,
            )
        })
    }

    fn save(&self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        let mut content = serde_json::to_string_pretty(rows).map_err(|e| {
            SyncError::remote_with(format!("cannot serialize {}", self.path.display()), e)
        })?;
        content.push('\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        temp.write_all(content.as_bytes())?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Drop trailing empty cells and rows, the way spreadsheet APIs report ranges.
fn trim_rows(mut rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    for row in &mut rows {
        while row.last().is_some_and(|cell| cell.is_empty()) {
            row.pop();
        }
    }
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    rows
}

impl SheetBackend for JsonFileSheet {
    fn fetch_rows(&mut self) -> Result<Vec<Vec<String>>, SyncError> {
        self.load()
    }

    fn replace_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        self.save(&trim_rows(rows.to_vec()))
    }

    fn write_header_cells(
        &mut self,
        first_column: usize,
        cells: &[String],
    ) -> Result<(), SyncError> {
        let mut rows = self.load()?;
        if rows.is_empty() {
            rows.push(Vec::new());
        }
        let header = &mut rows[0];
        if header.len() < first_column + cells.len() {
            header.resize(first_column + cells.len(), String::new());
        }
        header[first_column..first_column + cells.len()].clone_from_slice(cells);
        self.save(&rows)
    }

    fn append_rows(&mut self, new_rows: &[Vec<String>]) -> Result<(), SyncError> {
        let mut rows = trim_rows(self.load()?);
        rows.extend(trim_rows(new_rows.to_vec()));
        self.save(&rows)
    }
}
