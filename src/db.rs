use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

pub const DEFAULT_DB_PATH: &str = "data/castaways.sqlite";

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating cache directory {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("opening page cache {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pages (
            url        TEXT PRIMARY KEY,
            html       TEXT NOT NULL,
            status     INTEGER NOT NULL,
            fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

// ── Page cache ──

pub fn cached_page(conn: &Connection, url: &str) -> Result<Option<String>> {
    let html = conn
        .query_row("SELECT html FROM pages WHERE url = ?1", [url], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(html)
}

pub fn save_page(conn: &Connection, url: &str, html: &str, status: u16) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO pages (url, html, status, fetched_at)
         VALUES (?1, ?2, ?3, datetime('now'))",
        rusqlite::params![url, html, status],
    )?;
    Ok(())
}

// ── Stats ──

pub struct Stats {
    pub pages: usize,
    pub bytes: usize,
    pub oldest: Option<String>,
    pub newest: Option<String>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let (pages, bytes, oldest, newest) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(LENGTH(html)), 0), MIN(fetched_at), MAX(fetched_at)
         FROM pages",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get(2)?,
                row.get(3)?,
            ))
        },
    )?;
    Ok(Stats {
        pages: pages as usize,
        bytes: bytes as usize,
        oldest,
        newest,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn save_then_hit() {
        let conn = memory();
        let url = "https://www.bbc.co.uk/programmes/m000cyvf";
        assert_eq!(cached_page(&conn, url).unwrap(), None);

        save_page(&conn, url, "<h1>Rupert Everett</h1>", 200).unwrap();
        assert_eq!(
            cached_page(&conn, url).unwrap().as_deref(),
            Some("<h1>Rupert Everett</h1>")
        );

        // refetch replaces
        save_page(&conn, url, "<h1>Rupert Everett (2)</h1>", 200).unwrap();
        assert_eq!(
            cached_page(&conn, url).unwrap().as_deref(),
            Some("<h1>Rupert Everett (2)</h1>")
        );
    }

    #[test]
    fn stats_count_pages() {
        let conn = memory();
        let empty = get_stats(&conn).unwrap();
        assert_eq!(empty.pages, 0);
        assert_eq!(empty.bytes, 0);
        assert!(empty.oldest.is_none());

        save_page(&conn, "a", "12345", 200).unwrap();
        save_page(&conn, "b", "678", 200).unwrap();
        let s = get_stats(&conn).unwrap();
        assert_eq!(s.pages, 2);
        assert_eq!(s.bytes, 8);
        assert!(s.newest.is_some());
    }
}
