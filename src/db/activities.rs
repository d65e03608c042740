use super::*;

impl CrmDb {
    // =========================================================================
    // Activities (append-only interaction log)
    // =========================================================================

    /// Append an activity. `contact_id` may be None — orphan activities are
    /// permitted; a non-null reference must point at an existing contact.
    /// An empty `activity_date` becomes the insertion timestamp.
    pub fn insert_activity(&self, activity: &NewActivity) -> Result<i64, CrmError> {
        let date = if activity.activity_date.is_empty() {
            Self::now_timestamp()
        } else {
            activity.activity_date.clone()
        };
        self.conn.execute(
            "INSERT INTO activities (contact_id, activity_date, type, summary, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                activity.contact_id,
                date,
                activity.kind,
                activity.summary,
                activity.details,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Activity log for one contact, newest-first.
    pub fn list_activities(&self, contact_id: i64) -> Result<Vec<Activity>, CrmError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, activity_date, type, summary, details
             FROM activities
             WHERE contact_id = ?1
             ORDER BY activity_date DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![contact_id], |row| {
            let text = |idx: usize| -> rusqlite::Result<String> {
                Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
            };
            Ok(Activity {
                id: row.get(0)?,
                contact_id: row.get(1)?,
                activity_date: text(2)?,
                kind: text(3)?,
                summary: text(4)?,
                details: text(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{sample_contact, test_db};
    use super::super::*;

    #[test]
    fn test_log_and_list_scoped_to_contact() {
        let db = test_db();
        let a = db.insert_contact(&sample_contact("A", "")).expect("a");
        let b = db.insert_contact(&sample_contact("B", "")).expect("b");

        db.insert_activity(&NewActivity {
            contact_id: Some(a),
            kind: "whatsapp".to_string(),
            summary: "Sent template".to_string(),
            details: "Hi A".to_string(),
            ..Default::default()
        })
        .expect("log a");
        db.insert_activity(&NewActivity {
            contact_id: Some(b),
            kind: "call".to_string(),
            summary: "Follow-up call".to_string(),
            ..Default::default()
        })
        .expect("log b");

        let log = db.list_activities(a).expect("list");
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, "whatsapp");
        assert_eq!(log[0].details, "Hi A");
        assert!(!log[0].activity_date.is_empty());
    }

    #[test]
    fn test_orphan_activity_is_permitted() {
        let db = test_db();
        let id = db
            .insert_activity(&NewActivity {
                contact_id: None,
                kind: "note".to_string(),
                summary: "Walk-in enquiry".to_string(),
                ..Default::default()
            })
            .expect("orphan insert");
        assert!(id > 0);
    }

    #[test]
    fn test_newest_first_by_activity_date() {
        let db = test_db();
        let c = db.insert_contact(&sample_contact("C", "")).expect("c");
        for (date, summary) in [
            ("2024-01-01 08:00:00", "older"),
            ("2024-03-01 08:00:00", "newer"),
        ] {
            db.insert_activity(&NewActivity {
                contact_id: Some(c),
                activity_date: date.to_string(),
                summary: summary.to_string(),
                ..Default::default()
            })
            .expect("insert");
        }
        let log = db.list_activities(c).expect("list");
        assert_eq!(log[0].summary, "newer");
        assert_eq!(log[1].summary, "older");
    }
}
