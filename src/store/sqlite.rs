//! [`ImportStore`] for SQLite via `rusqlite`.

use rusqlite::{Connection, params_from_iter};

use crate::error::StoreError;

use super::ImportStore;

impl ImportStore for Connection {
    fn execute_statement(&mut self, sql: &str) -> Result<(), StoreError> {
        Connection::execute_batch(self, sql)?;
        Ok(())
    }

    fn execute_batch(&mut self, sql: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        // Dropping `tx` on any early return rolls the whole batch back.
        let tx = self.transaction()?;
        {
            let mut stmt = tx.prepare_cached(sql)?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
