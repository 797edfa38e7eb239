//! In-memory form of one ARB file.

use crate::codec;
use crate::language::LanguageCode;
use crate::value::Cell;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use serde_json::value::RawValue;
use std::path::PathBuf;

/// One top-level entry of an ARB file.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// A translation, already decoded to sheet text.
    Text(String),
    /// `@@locale`, `@key` and other metadata, carried through untouched.
    Metadata(Value),
}

/// Result of [`Document::set`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SetOutcome {
    Added,
    Updated,
    Unchanged,
}

/// The translations of one language.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub language: LanguageCode,
    /// The file this document was read from, if any.
    pub file: Option<PathBuf>,
    entries: IndexMap<String, Entry>,
}

/// ARB metadata keys start with `@` (`@@locale`, `@welcome_message`).
pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with('@')
}

impl Document {
    pub fn new(language: LanguageCode) -> Self {
        Self {
            language,
            file: None,
            entries: IndexMap::new(),
        }
    }

    /// Build a document from key/text pairs.
    pub fn from_translations<K, V>(
        language: LanguageCode,
        translations: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = translations
            .into_iter()
            .map(|(key, text)| (key.into(), Entry::Text(text.into())))
            .collect();

        Self {
            language,
            file: None,
            entries,
        }
    }

    /// Parse the content of an ARB file.
    ///
    /// The error is a human readable reason; the caller attaches the path.
    pub fn parse(language: LanguageCode, content: &str) -> Result<Self, String> {
        let mut document = Self::new(language);

        if content.trim().is_empty() {
            return Ok(document);
        }

        let raw: IndexMap<String, Box<RawValue>> =
            serde_json::from_str(content).map_err(|e| e.to_string())?;

        for (key, value) in raw {
            let json = value.get();
            let entry = if is_metadata_key(&key) {
                Entry::Metadata(serde_json::from_str(json).map_err(|e| e.to_string())?)
            } else if let Some(body) = json.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
                Entry::Text(codec::decode(body))
            } else {
                return Err(format!("value of '{key}' must be a string"));
            };
            document.entries.insert(key, entry);
        }

        Ok(document)
    }

    /// Serialize to ARB text: two-space indentation, entry order preserved,
    /// trailing newline.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        #[serde(untagged)]
        enum Rendered<'a> {
            Text(Box<RawValue>),
            Metadata(&'a Value),
        }

        let mut rendered: IndexMap<&str, Rendered<'_>> = IndexMap::new();
        for (key, entry) in &self.entries {
            let value = match entry {
                Entry::Text(text) => {
                    Rendered::Text(RawValue::from_string(format!("\"{}\"", codec::encode(text)))?)
                },
                Entry::Metadata(value) => Rendered::Metadata(value),
            };
            rendered.insert(key, value);
        }

        let mut out = serde_json::to_string_pretty(&rendered)?;
        out.push('\n');
        Ok(out)
    }

    pub fn get(&self, key: &str) -> Cell<'_> {
        match self.entries.get(key) {
            Some(Entry::Text(text)) => Cell::from_text(text),
            Some(Entry::Metadata(_)) | None => Cell::Absent,
        }
    }

    /// Set a translation, appending the key if it is new. Metadata entries
    /// are never replaced.
    pub fn set(&mut self, key: &str, text: &str) -> SetOutcome {
        match self.entries.get_mut(key) {
            Some(Entry::Text(current)) if current == text => SetOutcome::Unchanged,
            Some(Entry::Text(current)) => {
                *current = text.to_string();
                SetOutcome::Updated
            },
            Some(Entry::Metadata(_)) => {
                tracing::warn!("Not replacing metadata entry '{}'", key);
                SetOutcome::Unchanged
            },
            None => {
                self.entries.insert(key.to_string(), Entry::Text(text.to_string()));
                SetOutcome::Added
            },
        }
    }

    /// Translation keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.translations().map(|(key, _)| key)
    }

    /// Translations in file order, metadata skipped.
    pub fn translations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(key, entry)| match entry {
            Entry::Text(text) => Some((key.as_str(), text.as_str())),
            Entry::Metadata(_) => None,
        })
    }

    pub fn entries(&self) -> &IndexMap<String, Entry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageCase;
    use insta::assert_snapshot;

    fn en() -> LanguageCode {
        LanguageCode::parse("en", LanguageCase::Canonical).unwrap()
    }

    #[test]
    fn test_parse_splits_translations_and_metadata() {
        let content = r#"{
  "@@locale": "en",
  "hello": "Hello {name}",
  "@hello": {
    "placeholders": { "name": {} }
  },
  "bye": "Bye"
}"#;
        let doc = Document::parse(en(), content).unwrap();

        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["hello", "bye"]);
        assert_eq!(doc.get("hello"), Cell::Text("Hello {name}"));
        assert_eq!(doc.get("@hello"), Cell::Absent);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.entries().len(), 4);
    }

    #[test]
    fn test_parse_keeps_escape_pairs_literal() {
        let doc = Document::parse(en(), r#"{"multi": "one\ntwo", "quote": "\"hi\""}"#).unwrap();

        assert_eq!(doc.get("multi"), Cell::Text(r"one\ntwo"));
        assert_eq!(doc.get("quote"), Cell::Text(r#""hi""#));
    }

    #[test]
    fn test_parse_empty_file() {
        let doc = Document::parse(en(), "  \n").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_rejects_nested_translation() {
        let err = Document::parse(en(), r#"{"hello": {"one": "x"}}"#).unwrap_err();
        assert_eq!(err, "value of 'hello' must be a string");
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(Document::parse(en(), r#"["hello"]"#).is_err());
        assert!(Document::parse(en(), r#"{"hello": "x""#).is_err());
    }

    #[test]
    fn test_set_outcomes() {
        let mut doc = Document::from_translations(en(), [("hello", "Hello")]);

        assert_eq!(doc.set("hello", "Hello"), SetOutcome::Unchanged);
        assert_eq!(doc.set("hello", "Hi"), SetOutcome::Updated);
        assert_eq!(doc.set("bye", "Bye"), SetOutcome::Added);
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["hello", "bye"]);
    }

    #[test]
    fn test_set_keeps_metadata() {
        let content = r#"{"hello": "Hi", "@hello": {"description": "Greeting"}}"#;
        let mut doc = Document::parse(en(), content).unwrap();

        assert_eq!(doc.set("@hello", "oops"), SetOutcome::Unchanged);
        assert!(matches!(doc.entries()["@hello"], Entry::Metadata(_)));
        assert!(doc.render().unwrap().contains(r#""description": "Greeting""#));
    }

    #[test]
    fn test_render() {
        let content = r#"{"@@locale":"en","hello":"Hello\nWorld","@hello":{"description":"Greeting"}}"#;
        let mut doc = Document::parse(en(), content).unwrap();
        doc.set("path", r"C:\work");

        assert_snapshot!(doc.render().unwrap().trim_end(), @r#"
        {
          "@@locale": "en",
          "hello": "Hello\nWorld",
          "@hello": {
            "description": "Greeting"
          },
          "path": "C:\\work"
        }
        "#);
    }

    #[test]
    fn test_render_empty() {
        let doc = Document::new(en());
        assert_eq!(doc.render().unwrap(), "{}\n");
    }

    #[test]
    fn test_file_round_trip_is_byte_identical() {
        let content = "{\n  \"a\": \"caf\\u00e9 \\\\n \\t\",\n  \"b\": \"\\\"q\\\"\"\n}\n";
        let doc = Document::parse(en(), content).unwrap();
        assert_eq!(doc.render().unwrap(), content);
    }
}
