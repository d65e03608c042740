use super::*;

impl CrmDb {
    // =========================================================================
    // Orders (append-only ledger: no update, no delete)
    // =========================================================================

    /// Append an order for a contact. The foreign key requires the contact
    /// to exist at insertion time; a bad reference propagates as a store
    /// error.
    pub fn insert_order(&self, order: &NewOrder) -> Result<i64, CrmError> {
        self.conn.execute(
            "INSERT INTO orders (contact_id, product, quantity, amount, status, pop_url, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                order.contact_id,
                order.product,
                order.quantity,
                order.amount,
                order.status.as_str(),
                order.pop_url,
                order.notes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List orders newest-first, joined with the owning contact's display
    /// name. Scoped to one contact when `contact_id` is given.
    pub fn list_orders(&self, contact_id: Option<i64>) -> Result<Vec<OrderRow>, CrmError> {
        let mut sql = String::from(
            "SELECT o.id, o.contact_id, c.name, o.product, o.quantity, o.amount,
                    o.status, o.pop_url, o.notes, o.created_at
             FROM orders o
             LEFT JOIN contacts c ON c.id = o.contact_id",
        );
        if contact_id.is_some() {
            sql.push_str(" WHERE o.contact_id = ?1");
        }
        sql.push_str(" ORDER BY o.created_at DESC, o.id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<OrderRow> {
            Ok(OrderRow {
                id: row.get(0)?,
                contact_id: row.get(1)?,
                contact_name: row.get(2)?,
                product: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                quantity: row.get::<_, Option<i64>>(4)?.unwrap_or(1),
                amount: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                status: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                pop_url: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                notes: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
                created_at: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            })
        };
        let rows = match contact_id {
            Some(id) => stmt
                .query_map(params![id], map)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?,
        };
        Ok(rows)
    }
}
