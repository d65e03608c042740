//! Contact export to flat CSV.
//!
//! The export materializes the full (or filtered) contact set as rows of the
//! canonical field list — plus the store-assigned ID and creation timestamp —
//! in repository order, under display-cased headers.

use std::path::Path;

use crate::db::{ContactFilter, CrmDb};
use crate::error::CrmError;
use crate::tabular::Table;

/// Export header row. Display-cased counterparts of the canonical field
/// list, bracketed by ID and Created.
pub const EXPORT_HEADERS: &[&str] = &[
    "ID",
    "Name",
    "Phone",
    "Email",
    "Source",
    "Interest",
    "Status",
    "Tags",
    "Assigned",
    "Notes",
    "ActionNeeded",
    "ActionTaken",
    "Username",
    "Password",
    "Date",
    "Country",
    "Province",
    "City",
    "Created",
];

/// Materialize contacts matching the filter (all of them for a default
/// filter) as a table, newest-created first.
pub fn export_contacts(db: &CrmDb, filter: &ContactFilter) -> Result<Table, CrmError> {
    let contacts = db.search_contacts(filter)?;
    let mut table = Table::new(EXPORT_HEADERS.iter().map(|h| h.to_string()).collect());
    for c in contacts {
        table.rows.push(vec![
            c.id.to_string(),
            c.name,
            c.phone,
            c.email,
            c.source,
            c.interest,
            c.status,
            c.tags,
            c.assigned,
            c.notes,
            c.action_needed,
            c.action_taken,
            c.username,
            c.password,
            c.date,
            c.country,
            c.province,
            c.city,
            c.created_at,
        ]);
    }
    Ok(table)
}

/// Export straight to a CSV file. Returns the number of contact rows written
/// (excluding the header).
pub fn export_contacts_to_path(
    db: &CrmDb,
    filter: &ContactFilter,
    path: &Path,
) -> Result<usize, CrmError> {
    let table = export_contacts(db, filter)?;
    table.write_csv(path)?;
    log::info!("Exported {} contacts to {}", table.rows.len(), path.display());
    Ok(table.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{sample_contact, test_db};
    use crate::db::{ContactStatus, NewContact};
    use crate::import::{import_contacts, ColumnMapping, Dedupe};

    #[test]
    fn test_export_has_display_headers_and_all_fields() {
        let db = test_db();
        db.insert_contact(&NewContact {
            name: "Thandi".to_string(),
            phone: "0821234567".to_string(),
            status: ContactStatus::Hot,
            country: "South Africa".to_string(),
            ..Default::default()
        })
        .expect("insert");

        let table = export_contacts(&db, &ContactFilter::default()).expect("export");
        assert_eq!(table.headers, EXPORT_HEADERS);
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row[table.column("Name").unwrap()], "Thandi");
        assert_eq!(row[table.column("Status").unwrap()], "Hot");
        assert_eq!(row[table.column("Country").unwrap()], "South Africa");
        assert!(!row[table.column("Created").unwrap()].is_empty());
    }

    #[test]
    fn test_export_respects_filter() {
        let db = test_db();
        db.insert_contact(&NewContact {
            name: "Hot Lead".to_string(),
            status: ContactStatus::Hot,
            ..Default::default()
        })
        .expect("hot");
        db.insert_contact(&sample_contact("Cold Lead", "")).expect("cold");

        let table = export_contacts(
            &db,
            &ContactFilter {
                status: Some(ContactStatus::Hot),
                ..Default::default()
            },
        )
        .expect("export");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], "Hot Lead");
    }

    #[test]
    fn test_import_export_round_trip_preserves_mapped_values() {
        let db = test_db();
        let source = Table::from_csv_str(
            "name,phone,tags,date\nThandi,0821234567,\"rejoin,vip\",31/01/2024\n",
        )
        .expect("csv");
        let mapping = ColumnMapping::guess(&source.headers);
        import_contacts(&db, &source, &mapping, Dedupe::None).expect("import");

        let exported = export_contacts(&db, &ContactFilter::default()).expect("export");
        let row = &exported.rows[0];
        assert_eq!(row[exported.column("Name").unwrap()], "Thandi");
        assert_eq!(row[exported.column("Phone").unwrap()], "0821234567");
        assert_eq!(row[exported.column("Tags").unwrap()], "rejoin,vip");
        // Dates come out normalized, not verbatim
        assert_eq!(row[exported.column("Date").unwrap()], "2024-01-31");
    }

    #[test]
    fn test_export_to_file_round_trips_through_csv() {
        let db = test_db();
        db.insert_contact(&NewContact {
            name: "Nkosi, Thandi".to_string(),
            notes: "said \"maybe\"".to_string(),
            ..Default::default()
        })
        .expect("insert");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("contacts_export.csv");
        let written =
            export_contacts_to_path(&db, &ContactFilter::default(), &path).expect("export");
        assert_eq!(written, 1);

        let back = Table::from_path(&path).expect("reparse");
        assert_eq!(back.rows.len(), 1);
        assert_eq!(back.rows[0][1], "Nkosi, Thandi");
        assert_eq!(back.rows[0][9], "said \"maybe\"");
    }
}
