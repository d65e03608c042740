use super::*;

const CONTACT_COLUMNS: &str = "id, name, phone, email, source, interest, status, tags, assigned, \
     notes, action_needed, action_taken, username, password, date, country, province, city, \
     created_at";

impl CrmDb {
    // =========================================================================
    // Contacts
    // =========================================================================

    /// Insert a new contact. Returns the store-assigned identifier.
    ///
    /// Required-field checks (non-empty name) are the presentation layer's
    /// job; the repository stores whatever it is given.
    pub fn insert_contact(&self, contact: &NewContact) -> Result<i64, CrmError> {
        self.conn.execute(
            "INSERT INTO contacts (
                name, phone, email, source, interest, status, tags, assigned,
                notes, action_needed, action_taken, username, password,
                date, country, province, city
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                contact.name,
                contact.phone,
                contact.email,
                contact.source,
                contact.interest,
                contact.status.as_str(),
                contact.tags,
                contact.assigned,
                contact.notes,
                contact.action_needed,
                contact.action_taken,
                contact.username,
                contact.password,
                contact.date,
                contact.country,
                contact.province,
                contact.city,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Full-replace of all mutable fields for one contact. `created_at` is
    /// immutable and never touched.
    ///
    /// Returns `ContactNotFound` when the identifier matches no row, so
    /// callers can tell success from a missed target.
    pub fn update_contact(&self, id: i64, contact: &NewContact) -> Result<(), CrmError> {
        let affected = self.conn.execute(
            "UPDATE contacts SET
                name = ?1, phone = ?2, email = ?3, source = ?4, interest = ?5,
                status = ?6, tags = ?7, assigned = ?8, notes = ?9,
                action_needed = ?10, action_taken = ?11, username = ?12,
                password = ?13, date = ?14, country = ?15, province = ?16,
                city = ?17
             WHERE id = ?18",
            params![
                contact.name,
                contact.phone,
                contact.email,
                contact.source,
                contact.interest,
                contact.status.as_str(),
                contact.tags,
                contact.assigned,
                contact.notes,
                contact.action_needed,
                contact.action_taken,
                contact.username,
                contact.password,
                contact.date,
                contact.country,
                contact.province,
                contact.city,
                id,
            ],
        )?;
        if affected == 0 {
            return Err(CrmError::ContactNotFound(id));
        }
        Ok(())
    }

    /// Delete a contact. Dependent orders and activities go with it via
    /// `ON DELETE CASCADE`.
    pub fn delete_contact(&self, id: i64) -> Result<(), CrmError> {
        let affected = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(CrmError::ContactNotFound(id));
        }
        log::info!("Deleted contact #{} (orders/activities cascaded)", id);
        Ok(())
    }

    /// Fetch one contact by identifier.
    pub fn get_contact(&self, id: i64) -> Result<Option<Contact>, CrmError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM contacts WHERE id = ?1",
            CONTACT_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_contact_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All contacts, newest-created first.
    pub fn list_contacts(&self) -> Result<Vec<Contact>, CrmError> {
        self.search_contacts(&ContactFilter::default())
    }

    /// Filtered contact search. Criteria AND together; empty criteria are
    /// no-op filters (an all-empty filter returns everything).
    ///
    /// The text query is a case-insensitive substring match across name,
    /// phone, email, interest, notes, action_needed, and action_taken. The
    /// status filter is an exact match; the tag filter is a substring match
    /// within the tags field.
    pub fn search_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>, CrmError> {
        let mut sql = format!("SELECT {} FROM contacts", CONTACT_COLUMNS);
        let mut conds: Vec<&str> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if !filter.query.is_empty() {
            conds.push(
                "(name LIKE ? OR phone LIKE ? OR email LIKE ? OR interest LIKE ?
                  OR notes LIKE ? OR action_needed LIKE ? OR action_taken LIKE ?)",
            );
            let like = format!("%{}%", filter.query);
            for _ in 0..7 {
                args.push(like.clone());
            }
        }
        if let Some(status) = &filter.status {
            conds.push("status = ?");
            args.push(status.as_str().to_string());
        }
        if !filter.tag.is_empty() {
            conds.push("tags LIKE ?");
            args.push(format!("%{}%", filter.tag));
        }
        if !conds.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conds.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(args.iter()),
            Self::map_contact_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Whether any contact already stores this exact phone value. Used by
    /// the import dedupe policy.
    pub fn phone_exists(&self, phone: &str) -> Result<bool, CrmError> {
        self.field_exists("phone", phone)
    }

    /// Whether any contact already stores this exact email value.
    pub fn email_exists(&self, email: &str) -> Result<bool, CrmError> {
        self.field_exists("email", email)
    }

    fn field_exists(&self, column: &str, value: &str) -> Result<bool, CrmError> {
        let exists: bool = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM contacts WHERE {} = ?1)",
                column
            ),
            params![value],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub(crate) fn map_contact_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
        let text = |idx: usize| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
        };
        Ok(Contact {
            id: row.get(0)?,
            name: text(1)?,
            phone: text(2)?,
            email: text(3)?,
            source: text(4)?,
            interest: text(5)?,
            status: text(6)?,
            tags: text(7)?,
            assigned: text(8)?,
            notes: text(9)?,
            action_needed: text(10)?,
            action_taken: text(11)?,
            username: text(12)?,
            password: text(13)?,
            date: text(14)?,
            country: text(15)?,
            province: text(16)?,
            city: text(17)?,
            created_at: text(18)?,
        })
    }
}
