//! Bulk contact import from tabular files.
//!
//! The caller parses a file into a [`Table`], reconciles its arbitrary column
//! names against the canonical contact fields through a [`ColumnMapping`]
//! (seeded by a best-effort auto-guess, overridable before the import runs),
//! and hands both to [`import_contacts`]. Values are normalized per cell —
//! "nan"-like noise becomes empty, dates are folded to ISO with a day-first
//! preference — and rows that carry neither a name nor a phone are dropped
//! as blank. Import is not idempotent unless a dedupe key is chosen:
//! re-importing the same file with [`Dedupe::None`] creates duplicates.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::db::{ContactStatus, CrmDb, NewContact, CONTACT_FIELDS};
use crate::error::CrmError;
use crate::tabular::Table;

/// Duplicate-prevention policy for an import run.
///
/// `None` mirrors the original tool (every row inserts, duplicates and all);
/// `Phone`/`Email` skip rows whose non-empty key already matches an existing
/// contact. Which to use is a stakeholder choice, so it is a parameter, not
/// a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dedupe {
    #[default]
    None,
    Phone,
    Email,
}

/// What an import run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows inserted as contacts.
    pub inserted: usize,
    /// Rows dropped as blank (no name, no phone) or by the dedupe policy.
    pub skipped: usize,
}

/// Canonical field name → source column name. A field mapped to `None` is
/// skipped: the contact gets an empty value for it.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    map: HashMap<&'static str, Option<String>>,
}

impl ColumnMapping {
    /// Best-effort auto-guess: for each canonical field, propose the source
    /// column whose name equals the field name once both are lowercased and
    /// stripped of spaces and underscores ("Action Needed" → action_needed).
    /// Advisory only — override with [`set`](Self::set) before importing.
    pub fn guess(headers: &[String]) -> Self {
        let mut map = HashMap::new();
        for field in CONTACT_FIELDS {
            let want = normalize_header(field);
            let found = headers
                .iter()
                .find(|h| normalize_header(h) == want)
                .cloned();
            map.insert(*field, found);
        }
        Self { map }
    }

    /// Map a canonical field to a source column, or to `None` to skip it.
    pub fn set(&mut self, field: &'static str, column: Option<&str>) -> &mut Self {
        self.map.insert(field, column.map(str::to_string));
        self
    }

    /// The source column currently mapped for a field.
    pub fn source(&self, field: &str) -> Option<&str> {
        self.map.get(field).and_then(|c| c.as_deref())
    }
}

fn normalize_header(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace([' ', '_'], "")
}

/// Read a file and import it in one step with guessed mappings. Convenience
/// wrapper for callers that don't need a mapping-review stage.
pub fn import_contacts_from_path(
    db: &CrmDb,
    path: &Path,
    dedupe: Dedupe,
) -> Result<ImportSummary, CrmError> {
    let table = Table::from_path(path)?;
    let mapping = ColumnMapping::guess(&table.headers);
    import_contacts(db, &table, &mapping, dedupe)
}

/// Bulk-insert one contact per table row according to the mapping.
///
/// Per-row behavior:
/// - every mapped cell is normalized ("nan"-like and blank values → "");
/// - the `date` field gets a permissive day-first parse, normalized to
///   `YYYY-MM-DD`; an unparseable date is stored verbatim (a bad date never
///   rejects a row);
/// - a row with an empty name AND an empty phone is skipped as blank;
/// - with a dedupe key chosen, a row whose key already exists is skipped.
pub fn import_contacts(
    db: &CrmDb,
    table: &Table,
    mapping: &ColumnMapping,
    dedupe: Dedupe,
) -> Result<ImportSummary, CrmError> {
    // Resolve mapped columns to indices once, up front
    let mut indices: HashMap<&'static str, usize> = HashMap::new();
    for field in CONTACT_FIELDS {
        if let Some(source) = mapping.source(field) {
            if let Some(idx) = table.column(source) {
                indices.insert(*field, idx);
            } else {
                log::warn!("Mapped column {:?} not found in file, skipping field {}", source, field);
            }
        }
    }

    let mut summary = ImportSummary::default();
    for row in 0..table.rows.len() {
        let value = |field: &str| -> String {
            match indices.get(field) {
                Some(&idx) => clean_cell(table.cell(row, idx)),
                None => String::new(),
            }
        };

        let name = value("name");
        let phone = value("phone");
        if name.is_empty() && phone.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let duplicate = match dedupe {
            Dedupe::None => false,
            Dedupe::Phone => !phone.is_empty() && db.phone_exists(&phone)?,
            Dedupe::Email => {
                let email = value("email");
                !email.is_empty() && db.email_exists(&email)?
            }
        };
        if duplicate {
            summary.skipped += 1;
            continue;
        }

        let contact = NewContact {
            name,
            phone,
            email: value("email"),
            source: value("source"),
            interest: value("interest"),
            status: ContactStatus::from_store(&value("status")),
            tags: value("tags"),
            assigned: value("assigned"),
            notes: value("notes"),
            action_needed: value("action_needed"),
            action_taken: value("action_taken"),
            username: value("username"),
            password: value("password"),
            date: normalize_date(&value("date")),
            country: value("country"),
            province: value("province"),
            city: value("city"),
        };
        db.insert_contact(&contact)?;
        summary.inserted += 1;
    }

    log::info!(
        "Imported {} contacts ({} rows skipped)",
        summary.inserted,
        summary.skipped
    );
    Ok(summary)
}

/// Collapse blank and "nan"-like cells (pandas exports, SQL NULL spellings)
/// to the empty string.
fn clean_cell(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" | "nan" | "none" | "null" => String::new(),
        _ => trimmed.to_string(),
    }
}

/// Date formats tried in order. Day-first interpretations come before
/// month-first, so `03/04/2024` reads as 3 April.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%m/%d/%Y",
];

/// Normalize a date string to `YYYY-MM-DD`, preferring day-first parses.
/// Anything that parses under no known format is returned verbatim — a bad
/// date degrades to passthrough, it never fails the row.
pub fn normalize_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    // Datetime cells: take the date part before the first space or 'T'
    let date_part = raw
        .split(|c| c == ' ' || c == 'T')
        .next()
        .unwrap_or(raw);
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}
