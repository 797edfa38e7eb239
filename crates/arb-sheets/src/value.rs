/// The content of one (key, language) slot in either store.
///
/// `Blank` and `Absent` are kept apart so a run can tell "the sheet has an
/// empty cell here" from "the sheet has no such row or column", although
/// neither ever overwrites existing text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cell<'a> {
    /// Non-blank text.
    Text(&'a str),
    /// Present, but empty or whitespace only.
    Blank,
    /// No entry at all.
    Absent,
}

impl<'a> Cell<'a> {
    /// Classify stored text, treating empty and whitespace-only text as blank.
    pub fn from_text(text: &'a str) -> Self {
        if text.trim().is_empty() {
            Cell::Blank
        } else {
            Cell::Text(text)
        }
    }

    pub fn from_option(text: Option<&'a str>) -> Self {
        text.map_or(Cell::Absent, Cell::from_text)
    }

    /// The text to propagate, if any.
    pub fn text(self) -> Option<&'a str> {
        match self {
            Cell::Text(text) => Some(text),
            Cell::Blank | Cell::Absent => None,
        }
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Cell::Absent)
    }
}
