//! Access to the translation sheet.
//!
//! [`SheetBackend`] is the transport seam: it only moves rows of strings.
//! [`SheetAdapter`] turns those rows into a [`Grid`] and back.

use crate::error::SyncError;
use crate::grid::{Grid, Row};
use crate::language::{LanguageCase, LanguageCode};

/// Raw access to a spreadsheet-like store.
///
/// Rows may be ragged; trailing empty cells can be omitted by the backend.
pub trait SheetBackend {
    /// Read every non-empty row, header included.
    fn fetch_rows(&mut self) -> Result<Vec<Vec<String>>, SyncError>;

    /// Replace the whole content in a single operation.
    fn replace_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError>;

    /// Write `cells` into the header row starting at the 0-based `first_column`,
    /// leaving every other cell alone.
    fn write_header_cells(
        &mut self,
        first_column: usize,
        cells: &[String],
    ) -> Result<(), SyncError>;

    /// Append rows after the last non-empty row.
    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError>;
}

impl<T: SheetBackend + ?Sized> SheetBackend for &mut T {
    fn fetch_rows(&mut self) -> Result<Vec<Vec<String>>, SyncError> {
        (**self).fetch_rows()
    }

    fn replace_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        (**self).replace_rows(rows)
    }

    fn write_header_cells(
        &mut self,
        first_column: usize,
        cells: &[String],
    ) -> Result<(), SyncError> {
        (**self).write_header_cells(first_column, cells)
    }

    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        (**self).append_rows(rows)
    }
}

impl<T: SheetBackend + ?Sized> SheetBackend for Box<T> {
    fn fetch_rows(&mut self) -> Result<Vec<Vec<String>>, SyncError> {
        (**self).fetch_rows()
    }

    fn replace_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        (**self).replace_rows(rows)
    }

    fn write_header_cells(
        &mut self,
        first_column: usize,
        cells: &[String],
    ) -> Result<(), SyncError> {
        (**self).write_header_cells(first_column, cells)
    }

    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        (**self).append_rows(rows)
    }
}

/// Grid-level operations on top of a [`SheetBackend`].
#[derive(Debug)]
pub struct SheetAdapter<B> {
    backend: B,
    case: LanguageCase,
    /// Columns in use (key column included) as of the last read or write.
    sheet_width: Option<usize>,
}

impl<B: SheetBackend> SheetAdapter<B> {
    pub fn new(backend: B, case: LanguageCase) -> Self {
        Self {
            backend,
            case,
            sheet_width: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn read_grid(&mut self) -> Result<Grid, SyncError> {
        let values = self.backend.fetch_rows()?;
        tracing::debug!("Fetched {} sheet row(s)", values.len());

        let grid = Grid::from_values(values, self.case)?;
        self.sheet_width = Some(grid.extent() + 1);
        Ok(grid)
    }

    pub fn write_grid(&mut self, grid: &Grid) -> Result<(), SyncError> {
        let values = grid.to_values();
        tracing::debug!("Replacing sheet with {} row(s)", values.len());

        self.backend.replace_rows(&values)?;
        self.sheet_width = Some(grid.width() + 1);
        Ok(())
    }

    /// Add header cells for `languages` to the right of every column in use,
    /// so no stray cell ends up under a new language.
    pub fn append_columns(&mut self, languages: &[LanguageCode]) -> Result<(), SyncError> {
        if languages.is_empty() {
            return Ok(());
        }

        let first_column = match self.sheet_width {
            Some(width) => width,
            None => self.read_grid()?.extent() + 1,
        };
        let cells: Vec<String> = languages.iter().map(|code| code.to_string()).collect();
        tracing::debug!(
            "Appending {} column(s) at sheet column {}",
            cells.len(),
            first_column + 1
        );

        self.backend.write_header_cells(first_column, &cells)?;
        self.sheet_width = Some(first_column + cells.len());
        Ok(())
    }

    /// Append rows below the last row without touching existing ones.
    pub fn append_rows(&mut self, rows: &[Row]) -> Result<(), SyncError> {
        if rows.is_empty() {
            return Ok(());
        }

        let values: Vec<Vec<String>> = rows.iter().map(Row::to_values).collect();
        tracing::debug!("Appending {} row(s)", values.len());
        self.backend.append_rows(&values)
    }
}

/// One write received by a [`MemorySheet`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SheetWrite {
    Replace { rows: usize },
    Header { first_column: usize, cells: usize },
    Append { rows: usize },
}

/// A sheet held in memory, recording every write it receives.
#[derive(Clone, Debug, Default)]
pub struct MemorySheet {
    rows: Vec<Vec<String>>,
    writes: Vec<SheetWrite>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows<R, C>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
            writes: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn writes(&self) -> &[SheetWrite] {
        &self.writes
    }
}

impl SheetBackend for MemorySheet {
    fn fetch_rows(&mut self) -> Result<Vec<Vec<String>>, SyncError> {
        Ok(self.rows.clone())
    }

    fn replace_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        self.rows = rows.to_vec();
        self.writes.push(SheetWrite::Replace { rows: rows.len() });
        Ok(())
    }

    fn write_header_cells(
        &mut self,
        first_column: usize,
        cells: &[String],
    ) -> Result<(), SyncError> {
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        let header = &mut self.rows[0];
        if header.len() < first_column + cells.len() {
            header.resize(first_column + cells.len(), String::new());
        }
        header[first_column..first_column + cells.len()].clone_from_slice(cells);

        self.writes.push(SheetWrite::Header {
            first_column,
            cells: cells.len(),
        });
        Ok(())
    }

    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        self.rows.extend(rows.iter().cloned());
        self.writes.push(SheetWrite::Append { rows: rows.len() });
        Ok(())
    }
}
