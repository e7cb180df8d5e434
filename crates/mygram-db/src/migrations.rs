use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                age         INTEGER NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE photos (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                photo_url   TEXT NOT NULL,
                user_id     TEXT NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE comments (
                id          TEXT PRIMARY KEY,
                message     TEXT NOT NULL,
                user_id     TEXT NOT NULL REFERENCES users(id),
                photo_id    TEXT NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_comments_photo ON comments(photo_id);

            CREATE TABLE social_media (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                social_media_url    TEXT NOT NULL,
                user_id             TEXT NOT NULL REFERENCES users(id),
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
