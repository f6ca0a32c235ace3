use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;

/// Ordered schema migrations. Index `n` moves the database from
/// `user_version` n to n + 1.
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE clients (
        id INTEGER PRIMARY KEY,
        dob TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        preferred_name TEXT,
        full_name TEXT NOT NULL,
        phone_number TEXT,
        gender TEXT,
        diagnosis TEXT,
        language TEXT NOT NULL DEFAULT 'english',
        active INTEGER NOT NULL DEFAULT 1
    );
    CREATE TABLE questionnaires (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL REFERENCES clients(id),
        questionnaire_type TEXT NOT NULL,
        link TEXT,
        sent TEXT,
        status TEXT NOT NULL,
        reminded INTEGER NOT NULL DEFAULT 0,
        last_reminded TEXT
    );
    CREATE INDEX idx_questionnaires_client ON questionnaires(client_id);
    CREATE TABLE failures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL REFERENCES clients(id),
        reason TEXT NOT NULL,
        evaluation_type TEXT,
        failed_date TEXT NOT NULL,
        reminded INTEGER NOT NULL DEFAULT 0,
        last_reminded TEXT,
        UNIQUE (client_id, reason)
    );",
    // Resolution used to be encoded by pushing `reminded` past 100.
    "ALTER TABLE failures ADD COLUMN resolved INTEGER NOT NULL DEFAULT 0;
    UPDATE failures SET resolved = 1, reminded = reminded - 100 WHERE reminded >= 100;",
    "ALTER TABLE clients ADD COLUMN ifsp INTEGER NOT NULL DEFAULT 0;
    ALTER TABLE clients ADD COLUMN ifsp_downloaded INTEGER NOT NULL DEFAULT 0;",
];

pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

/// Bring the database up to [`SCHEMA_VERSION`].
pub fn migrate(conn: &Connection) -> Result<(), StoreError> {
    let current: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let next = index as i64 + 1;
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", next)?;
        tx.commit()?;
        info!(from = index, to = next, "applied schema migration");
    }
    Ok(())
}
