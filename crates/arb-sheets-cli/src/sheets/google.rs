//! The first worksheet of a Google spreadsheet, through the Sheets API v4.
//!
//! Authentication is a bearer access token obtained outside this tool, for
//! example with `gcloud auth print-access-token`.

use arb_sheets::{SheetBackend, SyncError};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: usize,
    #[serde(default)]
    column_count: usize,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

pub struct GoogleSheet {
    client: Client,
    base: Url,
    key: String,
    token: String,
    properties: Option<SheetProperties>,
}

impl std::fmt::Debug for GoogleSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheet")
            .field("key", &self.key)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl GoogleSheet {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Result<Self, SyncError> {
        let client = Client::builder()
            .user_agent(concat!("arb-sheets/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::remote_with("cannot create HTTP client", e))?;
        let base = Url::parse(API_BASE).map_err(|e| SyncError::remote_with("invalid API URL", e))?;

        Ok(Self {
            client,
            base,
            key: key.into(),
            token: token.into(),
            properties: None,
        })
    }

    /// `{base}{key}` followed by `segments`, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, SyncError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SyncError::remote("invalid API URL"))?
            .pop_if_empty()
            .push(&self.key)
            .extend(segments);
        Ok(url)
    }

    fn send<T: DeserializeOwned>(
        &self,
        what: &str,
        request: RequestBuilder,
    ) -> Result<T, SyncError> {
        tracing::debug!("Sheets API: {}", what);
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SyncError::remote_with(format!("{what}: request failed"), e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SyncError::remote_with(format!("{what}: cannot read response"), e))?;

        if !status.is_success() {
            return Err(SyncError::remote(format!(
                "{what}: {}",
                api_error_message(status.as_u16(), &body)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| SyncError::remote_with(format!("{what}: unexpected response"), e))
    }

    fn properties(&mut self) -> Result<SheetProperties, SyncError> {
        if let Some(properties) = &self.properties {
            return Ok(properties.clone());
        }

        let url = self.url(&[])?;
        let request = self
            .client
            .get(url)
            .query(&[("fields", "sheets.properties")]);
        let spreadsheet: Spreadsheet = self.send("read spreadsheet", request)?;

        let properties = spreadsheet
            .sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.properties)
            .ok_or_else(|| SyncError::remote("the spreadsheet has no worksheet"))?;
        tracing::debug!("Using worksheet '{}'", properties.title);

        self.properties = Some(properties.clone());
        Ok(properties)
    }

    fn batch_update(&self, what: &str, body: Value) -> Result<(), SyncError> {
        let mut url = self.url(&[])?;
        // `{key}:batchUpdate` is one path segment
        let last = format!("{}:batchUpdate", self.key);
        url.path_segments_mut()
            .map_err(|()| SyncError::remote("invalid API URL"))?
            .pop()
            .push(&last);

        let request = self.client.post(url).json(&body);
        let _: Value = self.send(what, request)?;
        Ok(())
    }

    fn grow_to(&mut self, rows: usize, columns: usize) {
        if let Some(properties) = &mut self.properties {
            let grid = &mut properties.grid_properties;
            grid.row_count = grid.row_count.max(rows);
            grid.column_count = grid.column_count.max(columns);
        }
    }
}

/// A1 range covering a whole worksheet; quotes in the title are doubled.
fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Cell values as text; numbers and booleans keep their JSON spelling.
fn value_to_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn api_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody { error }) => match error.status {
            Some(code) => format!("HTTP {status} {code}: {}", error.message),
            None => format!("HTTP {status}: {}", error.message),
        },
        Err(_) => format!("HTTP {status}"),
    }
}

/// `RowData` entries holding every cell as a string value.
fn row_data(rows: &[Vec<String>]) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let values: Vec<Value> = row
                .iter()
                .map(|cell| json!({ "userEnteredValue": { "stringValue": cell } }))
                .collect();
            json!({ "values": values })
        })
        .collect()
}

fn append_dimension(sheet_id: i64, dimension: &str, length: usize) -> Value {
    json!({
        "appendDimension": {
            "sheetId": sheet_id,
            "dimension": dimension,
            "length": length,
        }
    })
}

/// Grow the grid so `rows` x `columns` fits.
fn grow_requests(properties: &SheetProperties, rows: usize, columns: usize) -> Vec<Value> {
    let grid = properties.grid_properties;
    let mut requests = Vec::new();
    if rows > grid.row_count {
        requests.push(append_dimension(
            properties.sheet_id,
            "ROWS",
            rows - grid.row_count,
        ));
    }
    if columns > grid.column_count {
        requests.push(append_dimension(
            properties.sheet_id,
            "COLUMNS",
            columns - grid.column_count,
        ));
    }
    requests
}

/// One batch that clears every value and writes `rows` from A1.
fn replace_body(properties: &SheetProperties, rows: &[Vec<String>]) -> Value {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut requests = grow_requests(properties, rows.len(), width);

    requests.push(json!({
        "updateCells": {
            "range": { "sheetId": properties.sheet_id },
            "fields": "userEnteredValue",
        }
    }));
    if !rows.is_empty() {
        requests.push(json!({
            "updateCells": {
                "start": { "sheetId": properties.sheet_id, "rowIndex": 0, "columnIndex": 0 },
                "rows": row_data(rows),
                "fields": "userEnteredValue",
            }
        }));
    }

    json!({ "requests": requests })
}

/// One batch writing `cells` into the first row from `first_column` on.
fn header_body(properties: &SheetProperties, first_column: usize, cells: &[String]) -> Value {
    let mut requests = grow_requests(properties, 1, first_column + cells.len());
    requests.push(json!({
        "updateCells": {
            "start": {
                "sheetId": properties.sheet_id,
                "rowIndex": 0,
                "columnIndex": first_column,
            },
            "rows": row_data(&[cells.to_vec()]),
            "fields": "userEnteredValue",
        }
    }));
    json!({ "requests": requests })
}

impl SheetBackend for GoogleSheet {
    fn fetch_rows(&mut self) -> Result<Vec<Vec<String>>, SyncError> {
        let properties = self.properties()?;
        let url = self.url(&["values", &sheet_range(&properties.title)])?;
        let request = self.client.get(url).query(&[
            ("majorDimension", "ROWS"),
            ("valueRenderOption", "FORMATTED_VALUE"),
        ]);
        let range: ValueRange = self.send("read values", request)?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(value_to_text).collect())
            .collect())
    }

    fn replace_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        let properties = self.properties()?;
        let body = replace_body(&properties, rows);
        self.batch_update("replace sheet", body)?;

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        self.grow_to(rows.len(), width);
        Ok(())
    }

    fn write_header_cells(
        &mut self,
        first_column: usize,
        cells: &[String],
    ) -> Result<(), SyncError> {
        let properties = self.properties()?;
        let body = header_body(&properties, first_column, cells);
        self.batch_update("write header", body)?;

        self.grow_to(1, first_column + cells.len());
        Ok(())
    }

    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<(), SyncError> {
        let properties = self.properties()?;
        let segment = format!("{}:append", sheet_range(&properties.title));
        let url = self.url(&["values", &segment])?;
        let request = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": rows }));
        let _: Value = self.send("append rows", request)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties(rows: usize, columns: usize) -> SheetProperties {
        SheetProperties {
            sheet_id: 7,
            title: "Translations".to_string(),
            grid_properties: GridProperties {
                row_count: rows,
                column_count: columns,
            },
        }
    }

    fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_spreadsheet_properties() {
        let body = r#"{"sheets": [
            {"properties": {"sheetId": 0, "title": "Sheet1",
                "gridProperties": {"rowCount": 1000, "columnCount": 26}}},
            {"properties": {"sheetId": 5, "title": "Other"}}
        ]}"#;
        let spreadsheet: Spreadsheet = serde_json::from_str(body).unwrap();

        assert_eq!(spreadsheet.sheets.len(), 2);
        assert_eq!(spreadsheet.sheets[0].properties.title, "Sheet1");
        assert_eq!(
            spreadsheet.sheets[0].properties.grid_properties,
            GridProperties {
                row_count: 1000,
                column_count: 26
            }
        );
    }

    #[test]
    fn test_value_range_without_values() {
        let range: ValueRange = serde_json::from_str(r#"{"range": "Sheet1!A1:Z1000"}"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(json!("Hola")), "Hola");
        assert_eq!(value_to_text(json!(42)), "42");
        assert_eq!(value_to_text(json!(true)), "true");
        assert_eq!(value_to_text(Value::Null), "");
    }

    #[test]
    fn test_sheet_range_quotes_title() {
        assert_eq!(sheet_range("Sheet1"), "'Sheet1'");
        assert_eq!(sheet_range("Bob's strings"), "'Bob''s strings'");
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(
            api_error_message(403, body),
            "HTTP 403 PERMISSION_DENIED: The caller does not have permission"
        );
        assert_eq!(api_error_message(502, "<html>"), "HTTP 502");
    }

    #[test]
    fn test_replace_body_clears_then_writes_strings() {
        let body = replace_body(&properties(1000, 26), &rows(&[&["id", "en"], &["n", "12"]]));

        assert_eq!(
            body,
            json!({ "requests": [
                { "updateCells": {
                    "range": { "sheetId": 7 },
                    "fields": "userEnteredValue",
                }},
                { "updateCells": {
                    "start": { "sheetId": 7, "rowIndex": 0, "columnIndex": 0 },
                    "rows": [
                        { "values": [
                            { "userEnteredValue": { "stringValue": "id" } },
                            { "userEnteredValue": { "stringValue": "en" } },
                        ]},
                        { "values": [
                            { "userEnteredValue": { "stringValue": "n" } },
                            { "userEnteredValue": { "stringValue": "12" } },
                        ]},
                    ],
                    "fields": "userEnteredValue",
                }},
            ]})
        );
    }

    #[test]
    fn test_replace_body_grows_small_sheet() {
        let body = replace_body(&properties(1, 1), &rows(&[&["id", "en", "fr"], &["a"], &["b"]]));
        let requests = body["requests"].as_array().unwrap();

        assert_eq!(
            requests[0],
            json!({ "appendDimension": { "sheetId": 7, "dimension": "ROWS", "length": 2 } })
        );
        assert_eq!(
            requests[1],
            json!({ "appendDimension": { "sheetId": 7, "dimension": "COLUMNS", "length": 2 } })
        );
        assert_eq!(requests.len(), 4);
    }

    #[test]
    fn test_header_body_starts_at_column() {
        let body = header_body(&properties(100, 3), 3, &["de".to_string(), "it".to_string()]);
        let requests = body["requests"].as_array().unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["appendDimension"]["length"], 2);
        assert_eq!(
            requests[1]["updateCells"]["start"],
            json!({ "sheetId": 7, "rowIndex": 0, "columnIndex": 3 })
        );
    }

    #[test]
    fn test_urls_encode_segments() {
        let sheet = GoogleSheet::new("abc123", "token").unwrap();
        let url = sheet.url(&["values", &sheet_range("My Sheet")]).unwrap();

        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/'My%20Sheet'"
        );
    }
}
