//! Atomic multi-document write batches.
//!
//! A [`WriteBatch`] accumulates an ordered sequence of create and
//! merge-update operations and commits them as a single SurrealDB
//! transaction: one `BEGIN TRANSACTION; …; COMMIT TRANSACTION;` query.
//! If any statement fails, SurrealDB cancels the transaction and no
//! queued write becomes visible.

use serde_json::Value;
use surrealdb::{Connection, Surreal};

use crate::error::DbError;

#[derive(Debug, Default)]
pub struct WriteBatch {
    statements: Vec<String>,
    binds: Vec<(String, Value)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Queue creation of a document with a known id. Fails the whole
    /// batch at commit time if the record already exists.
    pub fn create(&mut self, table: &'static str, id: &str, content: Value) {
        let n = self.statements.len();
        self.statements.push(format!(
            "CREATE type::record('{table}', $id_{n}) CONTENT $doc_{n} RETURN NONE"
        ));
        self.binds
            .push((format!("id_{n}"), Value::String(id.to_string())));
        self.binds.push((format!("doc_{n}"), content));
    }

    /// Queue a field-level merge into an existing document. Fields not
    /// named in `patch` are left untouched.
    pub fn update_merge(&mut self, table: &'static str, id: &str, patch: Value) {
        let n = self.statements.len();
        self.statements.push(format!(
            "UPDATE type::record('{table}', $id_{n}) MERGE $doc_{n} RETURN NONE"
        ));
        self.binds
            .push((format!("id_{n}"), Value::String(id.to_string())));
        self.binds.push((format!("doc_{n}"), patch));
    }

    /// Commit every queued operation atomically. An empty batch is a
    /// no-op.
    pub async fn commit<C: Connection>(self, db: &Surreal<C>) -> Result<(), DbError> {
        if self.statements.is_empty() {
            return Ok(());
        }

        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for statement in &self.statements {
            sql.push_str(statement);
            sql.push_str(";\n");
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = db.query(sql);
        for (name, value) in self.binds {
            query = query.bind((name, value));
        }

        let result = query.await?;
        result
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statements_are_numbered_in_order() {
        let mut batch = WriteBatch::new();
        batch.create("store", "a1", json!({"name": "A"}));
        batch.update_merge("store", "b2", json!({"name_lower": "b"}));

        assert_eq!(batch.len(), 2);
        assert!(batch.statements[0].contains("$id_0"));
        assert!(batch.statements[0].contains("CREATE type::record('store'"));
        assert!(batch.statements[1].contains("$doc_1"));
        assert!(batch.statements[1].contains("MERGE"));
        assert_eq!(batch.binds.len(), 4);
    }
}
