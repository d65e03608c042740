//! Flat-table reading and writing for import/export.
//!
//! A [`Table`] is a header row plus string cells — the common shape the
//! import engine maps from and the export engine serializes to. CSV is read
//! and written here directly (RFC 4180 quoting, embedded commas/newlines);
//! spreadsheet workbooks (.xlsx, .xls, .xlsm, .ods) come in through calamine,
//! first sheet only, first row as header.

use std::path::Path;

use crate::error::CrmError;

/// Rows of named columns. All cells are strings; numeric spreadsheet cells
/// are stringified on read.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Index of a header by exact name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell by row index and column name; empty string when out of range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Read a table from a file, dispatching on extension: `.csv` is parsed
    /// here, workbook formats go through calamine. Anything else is an
    /// unsupported-format error. A malformed file fails as a whole — no rows
    /// are produced from a file that doesn't parse.
    pub fn from_path(path: &Path) -> Result<Self, CrmError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" => {
                let text = std::fs::read_to_string(path)?;
                Self::from_csv_str(&text)
            }
            "xlsx" | "xls" | "xlsm" | "ods" => Self::from_workbook(path),
            other => Err(CrmError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Parse CSV text. First record is the header; short rows are padded to
    /// the header width, long rows keep their extra cells.
    pub fn from_csv_str(text: &str) -> Result<Self, CrmError> {
        let mut records = parse_csv(text)?;
        if records.is_empty() {
            return Ok(Self::default());
        }
        let headers = records.remove(0);
        let width = headers.len();
        for row in &mut records {
            while row.len() < width {
                row.push(String::new());
            }
        }
        Ok(Self {
            headers,
            rows: records,
        })
    }

    /// Read the first sheet of a workbook, first row as header.
    fn from_workbook(path: &Path) -> Result<Self, CrmError> {
        use calamine::{open_workbook_auto, Reader};

        let mut workbook =
            open_workbook_auto(path).map_err(|e| CrmError::Workbook(e.to_string()))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| CrmError::Workbook("workbook has no sheets".to_string()))?;
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| CrmError::Workbook(format!("sheet {}: {}", sheet, e)))?;

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header) => header.iter().map(cell_to_string).collect(),
            None => return Ok(Self::default()),
        };
        let rows = rows
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        Ok(Self { headers, rows })
    }

    /// Serialize to CSV with a header row, quoting only when needed.
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, &self.headers);
        for row in &self.rows {
            write_record(&mut out, row);
        }
        out
    }

    /// Write the table as CSV to a file. Single blocking pass.
    pub fn write_csv(&self, path: &Path) -> Result<(), CrmError> {
        std::fs::write(path, self.to_csv_string())?;
        Ok(())
    }
}

fn cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => format!("{}", f),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR({:?})", e),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// RFC 4180 parser: handles quoted fields, doubled quotes, embedded commas
/// and newlines, and CRLF line endings. An unterminated quote is an error.
fn parse_csv(text: &str) -> Result<Vec<Vec<String>>, CrmError> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    // True once the current record has any content; avoids emitting a
    // phantom empty record for a trailing newline.
    let mut record_started = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                record_started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                record_started = true;
            }
            '\r' => {
                // Swallowed; the '\n' of a CRLF ends the record
            }
            '\n' => {
                line += 1;
                if record_started || !field.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                record_started = false;
            }
            _ => {
                field.push(c);
                record_started = true;
            }
        }
    }
    if in_quotes {
        return Err(CrmError::Csv {
            line,
            msg: "unterminated quoted field".to_string(),
        });
    }
    if record_started || !field.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

fn write_record(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
