//! SQLite-backed store for contacts, orders, campaigns, and activities.
//!
//! The database is a single local file (default `~/.vanto-crm/crm.sqlite3`).
//! One `CrmDb` owns one connection; every repository call is a single
//! statement that commits before returning, so no call spans user
//! interactions and no call leaves the store partially written. Concurrent
//! writers get whatever SQLite gives them at the statement level
//! (last-write-wins on racing edits).

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::CrmError;

pub mod types;
pub use types::*;

pub mod activities;
pub mod campaigns;
pub mod contacts;
pub mod orders;

/// Outcome of the additive contact-column migration. An empty `added` list
/// means the schema was already current.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub added: Vec<String>,
}

impl MigrationReport {
    pub fn already_migrated(&self) -> bool {
        self.added.is_empty()
    }
}

pub struct CrmDb {
    conn: Connection,
}

impl CrmDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at `~/.vanto-crm/crm.sqlite3` and bring
    /// its schema up to date.
    pub fn open() -> Result<Self, CrmError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self, CrmError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::initialize(conn)
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self, CrmError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    /// Apply the baseline schema and the additive column migration, then
    /// enable foreign-key enforcement (cascade deletes depend on it).
    fn initialize(conn: Connection) -> Result<Self, CrmError> {
        conn.execute_batch(include_str!("../schema.sql"))?;
        let report = Self::ensure_contact_columns(&conn)?;
        if !report.already_migrated() {
            log::info!("Migrated contacts table: added columns {:?}", report.added);
        }
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.vanto-crm/crm.sqlite3`.
    fn db_path() -> Result<PathBuf, CrmError> {
        let home = dirs::home_dir().ok_or(CrmError::HomeDirNotFound)?;
        Ok(home.join(".vanto-crm").join("crm.sqlite3"))
    }

    /// Append any canonical contact column missing from an existing table.
    ///
    /// Columns are only ever added (as nullable TEXT), never dropped or
    /// renamed, so this is idempotent and preserves all existing row values.
    /// A "duplicate column name" race (another process migrated first) is
    /// treated as already-migrated; any other SQLite error propagates.
    pub fn ensure_contact_columns(conn: &Connection) -> Result<MigrationReport, CrmError> {
        let mut stmt = conn.prepare("PRAGMA table_info(contacts)")?;
        let existing: HashSet<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        let mut added = Vec::new();
        for field in CONTACT_FIELDS {
            if existing.contains(*field) {
                continue;
            }
            let sql = format!("ALTER TABLE contacts ADD COLUMN {} TEXT;", field);
            match conn.execute_batch(&sql) {
                Ok(()) => added.push(field.to_string()),
                Err(e) if is_duplicate_column(&e) => {
                    log::debug!("Column {} already present, skipping", field);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(MigrationReport { added })
    }

    /// Dashboard counters: contact totals by status, order count, and revenue
    /// over paid-or-later orders.
    pub fn kpis(&self) -> Result<Kpis, CrmError> {
        let count = |sql: &str| -> Result<i64, rusqlite::Error> {
            self.conn.query_row(sql, [], |row| row.get(0))
        };
        Ok(Kpis {
            total_contacts: count("SELECT COUNT(*) FROM contacts")?,
            customers: count("SELECT COUNT(*) FROM contacts WHERE status = 'Customer'")?,
            hot: count("SELECT COUNT(*) FROM contacts WHERE status = 'Hot'")?,
            orders: count("SELECT COUNT(*) FROM orders")?,
            revenue: self.conn.query_row(
                "SELECT IFNULL(SUM(amount), 0) FROM orders
                 WHERE status IN ('Paid', 'Shipped', 'Delivered')",
                [],
                |row| row.get(0),
            )?,
        })
    }

    /// Insertion timestamp in the same format as SQLite's CURRENT_TIMESTAMP.
    pub(crate) fn now_timestamp() -> String {
        Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn is_duplicate_column(e: &rusqlite::Error) -> bool {
    e.to_string().contains("duplicate column name")
}

// =============================================================================
// Shared test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use super::{Contact, CrmDb, NewContact};

    /// Open a fresh in-memory database with the full schema applied.
    pub fn test_db() -> CrmDb {
        CrmDb::open_in_memory().expect("Failed to open in-memory database")
    }

    /// A contact payload with only the interesting fields set.
    pub fn sample_contact(name: &str, phone: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    /// An all-empty contact row for unit tests that never touch the store.
    pub fn blank_contact() -> Contact {
        Contact {
            id: 0,
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            source: String::new(),
            interest: String::new(),
            status: String::new(),
            tags: String::new(),
            assigned: String::new(),
            notes: String::new(),
            action_needed: String::new(),
            action_taken: String::new(),
            username: String::new(),
            password: String::new(),
            date: String::new(),
            country: String::new(),
            province: String::new(),
            city: String::new(),
            created_at: String::new(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_utils::{sample_contact, test_db};
    use super::*;

    #[test]
    fn test_open_creates_tables() {
        let db = test_db();
        for table in ["contacts", "orders", "campaigns", "activities"] {
            let count: i64 = db
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
                .unwrap_or_else(|_| panic!("{} table should exist", table));
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn test_migration_is_idempotent() {
        let db = test_db();
        // Fresh schema already carries every canonical column
        let report = CrmDb::ensure_contact_columns(db.conn_ref()).expect("migration");
        assert!(report.already_migrated());

        let report = CrmDb::ensure_contact_columns(db.conn_ref()).expect("second run");
        assert!(report.already_migrated());
    }

    #[test]
    fn test_migration_backfills_old_table_and_preserves_rows() {
        // Simulate a v1 database: no date/country/province/city columns.
        let conn = Connection::open_in_memory().expect("in-memory db");
        conn.execute_batch(
            "CREATE TABLE contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT,
                email TEXT,
                source TEXT,
                interest TEXT,
                status TEXT,
                tags TEXT,
                assigned TEXT,
                notes TEXT,
                action_needed TEXT,
                action_taken TEXT,
                username TEXT,
                password TEXT,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO contacts (name, phone, status) VALUES ('Thandi', '0821234567', 'Hot');",
        )
        .expect("seed v1 schema");

        let report = CrmDb::ensure_contact_columns(&conn).expect("migration");
        assert_eq!(report.added, vec!["date", "country", "province", "city"]);

        // Existing row untouched, new columns readable as NULL
        let (name, status, country): (String, String, Option<String>) = conn
            .query_row(
                "SELECT name, status, country FROM contacts WHERE phone = '0821234567'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .expect("migrated row");
        assert_eq!(name, "Thandi");
        assert_eq!(status, "Hot");
        assert_eq!(country, None);

        // Second run adds nothing
        let report = CrmDb::ensure_contact_columns(&conn).expect("second run");
        assert!(report.already_migrated());
    }

    #[test]
    fn test_open_at_reopens_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("crm.sqlite3");

        let id;
        {
            let db = CrmDb::open_at(&path).expect("first open");
            id = db
                .insert_contact(&sample_contact("Sipho", "0831112222"))
                .expect("insert");
        }
        let db = CrmDb::open_at(&path).expect("reopen");
        let contact = db.get_contact(id).expect("query").expect("row survives reopen");
        assert_eq!(contact.name, "Sipho");
    }

    #[test]
    fn test_kpis() {
        let db = test_db();
        let hot = db
            .insert_contact(&NewContact {
                name: "Lindiwe".to_string(),
                status: ContactStatus::Hot,
                ..Default::default()
            })
            .expect("insert hot");
        let customer = db
            .insert_contact(&NewContact {
                name: "Pieter".to_string(),
                status: ContactStatus::Customer,
                ..Default::default()
            })
            .expect("insert customer");

        let mut order = NewOrder::new(customer);
        order.amount = 375.0;
        order.status = OrderStatus::Paid;
        db.insert_order(&order).expect("paid order");

        let mut pending = NewOrder::new(hot);
        pending.amount = 99.0;
        db.insert_order(&pending).expect("pending order");

        let kpis = db.kpis().expect("kpis");
        assert_eq!(kpis.total_contacts, 2);
        assert_eq!(kpis.customers, 1);
        assert_eq!(kpis.hot, 1);
        assert_eq!(kpis.orders, 2);
        // Pending orders don't count toward revenue
        assert_eq!(kpis.revenue, 375.0);
    }
}
