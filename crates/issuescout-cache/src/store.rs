// SQLite-backed store for per-repository language lists
//
// Repository languages barely change, so a 24-hour TTL saves a lot of
// API calls. SQLite because it's zero-config, embedded, and doesn't need
// a separate process.
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

/// 24 hours in seconds
const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

pub struct LanguageStore {
    conn: Connection,
    ttl_secs: i64,
}

impl LanguageStore {
    pub fn open(db_path: &str) -> crate::Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn,
            ttl_secs: DEFAULT_TTL_SECS,
        })
    }

    /// In-memory database, handy for tests
    pub fn open_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn,
            ttl_secs: DEFAULT_TTL_SECS,
        })
    }

    pub fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    fn init_schema(conn: &Connection) -> crate::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS repo_languages (
                repository TEXT PRIMARY KEY,
                languages TEXT NOT NULL,
                cached_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Look up the cached language list for a repository full name.
    /// Entries older than the TTL count as misses (and get removed).
    pub fn get(&self, repository: &str) -> crate::Result<Option<Vec<String>>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT languages, cached_at FROM repo_languages WHERE repository = ?1",
                [repository],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (languages_json, cached_at) = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        if Utc::now().timestamp() - cached_at > self.ttl_secs {
            debug!("Language cache expired for {}", repository);
            self.conn.execute(
                "DELETE FROM repo_languages WHERE repository = ?1",
                [repository],
            )?;
            return Ok(None);
        }

        let languages: Vec<String> = serde_json::from_str(&languages_json)?;
        Ok(Some(languages))
    }

    pub fn set(&self, repository: &str, languages: &[String]) -> crate::Result<()> {
        self.set_at(repository, languages, Utc::now().timestamp())
    }

    fn set_at(&self, repository: &str, languages: &[String], cached_at: i64) -> crate::Result<()> {
        let languages_json = serde_json::to_string(languages)?;
        self.conn.execute(
            "INSERT INTO repo_languages (repository, languages, cached_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(repository) DO UPDATE SET
                 languages = excluded.languages,
                 cached_at = excluded.cached_at",
            rusqlite::params![repository, languages_json, cached_at],
        )?;
        Ok(())
    }

    /// Sweep out everything past the TTL
    pub fn purge_expired(&self) -> crate::Result<usize> {
        let cutoff = Utc::now().timestamp() - self.ttl_secs;
        let removed = self.conn.execute(
            "DELETE FROM repo_languages WHERE cached_at < ?1",
            [cutoff],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let store = LanguageStore::open_in_memory().unwrap();
        store
            .set("rust-lang/rust", &["Rust".into(), "Python".into()])
            .unwrap();

        let languages = store.get("rust-lang/rust").unwrap().unwrap();
        assert_eq!(languages, vec!["Rust".to_string(), "Python".to_string()]);
    }

    #[test]
    fn unknown_repository_is_a_miss() {
        let store = LanguageStore::open_in_memory().unwrap();
        assert!(store.get("nobody/nothing").unwrap().is_none());
    }

    #[test]
    fn stale_entries_expire() {
        let store = LanguageStore::open_in_memory().unwrap();
        let two_days_ago = Utc::now().timestamp() - 2 * 24 * 60 * 60;
        store
            .set_at("old/repo", &["C".into()], two_days_ago)
            .unwrap();

        assert!(store.get("old/repo").unwrap().is_none());
    }

    #[test]
    fn set_overwrites_previous_entry() {
        let store = LanguageStore::open_in_memory().unwrap();
        store.set("o/r", &["Go".into()]).unwrap();
        store.set("o/r", &["Go".into(), "HTML".into()]).unwrap();

        let languages = store.get("o/r").unwrap().unwrap();
        assert_eq!(languages.len(), 2);
    }

    #[test]
    fn purge_removes_only_expired_rows() {
        let store = LanguageStore::open_in_memory().unwrap();
        let two_days_ago = Utc::now().timestamp() - 2 * 24 * 60 * 60;
        store.set_at("old/repo", &["C".into()], two_days_ago).unwrap();
        store.set("fresh/repo", &["Rust".into()]).unwrap();

        let removed = store.purge_expired().unwrap();

        assert_eq!(removed, 1);
        assert!(store.get("fresh/repo").unwrap().is_some());
    }
}
