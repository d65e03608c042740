use super::*;

impl CrmDb {
    // =========================================================================
    // Campaigns (append-only)
    // =========================================================================

    /// Append a campaign record. An empty date becomes the insertion
    /// timestamp.
    pub fn insert_campaign(&self, campaign: &NewCampaign) -> Result<i64, CrmError> {
        let date = if campaign.date.is_empty() {
            Self::now_timestamp()
        } else {
            campaign.date.clone()
        };
        self.conn.execute(
            "INSERT INTO campaigns (date, channel, name, audience, message, outcome, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                date,
                campaign.channel.as_str(),
                campaign.name,
                campaign.audience,
                campaign.message,
                campaign.outcome.as_str(),
                campaign.notes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List campaigns newest-first, optionally narrowed by a substring match
    /// over name, audience, message, and notes. An empty query returns all.
    pub fn search_campaigns(&self, query: &str) -> Result<Vec<Campaign>, CrmError> {
        let mut sql = String::from(
            "SELECT id, date, channel, name, audience, message, outcome, notes FROM campaigns",
        );
        if !query.is_empty() {
            sql.push_str(" WHERE (name LIKE ?1 OR audience LIKE ?1 OR message LIKE ?1 OR notes LIKE ?1)");
        }
        sql.push_str(" ORDER BY date DESC, id DESC");

        let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Campaign> {
            let text = |idx: usize| -> rusqlite::Result<String> {
                Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
            };
            Ok(Campaign {
                id: row.get(0)?,
                date: text(1)?,
                channel: text(2)?,
                name: text(3)?,
                audience: text(4)?,
                message: text(5)?,
                outcome: text(6)?,
                notes: text(7)?,
            })
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = if query.is_empty() {
            stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![format!("%{}%", query)], map)?
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::super::*;

    #[test]
    fn test_insert_defaults_date_to_now() {
        let db = test_db();
        db.insert_campaign(&NewCampaign {
            channel: Channel::WhatsApp,
            name: "Rejoin push".to_string(),
            ..Default::default()
        })
        .expect("insert");

        let rows = db.search_campaigns("").expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].channel, "WhatsApp");
        assert!(!rows[0].date.is_empty(), "empty date becomes insert time");
        assert_eq!(rows[0].outcome, "", "unrecorded outcome stays empty");
    }

    #[test]
    fn test_search_matches_message_substring() {
        let db = test_db();
        db.insert_campaign(&NewCampaign {
            name: "Spring promo".to_string(),
            message: "MyAPL World is here".to_string(),
            ..Default::default()
        })
        .expect("a");
        db.insert_campaign(&NewCampaign {
            name: "Winter promo".to_string(),
            audience: "Expired members".to_string(),
            ..Default::default()
        })
        .expect("b");

        let hits = db.search_campaigns("myapl").expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Spring promo");

        let hits = db.search_campaigns("expired").expect("search audience");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Winter promo");

        assert_eq!(db.search_campaigns("").expect("all").len(), 2);
    }
}
