//! Read-only access to a beets SQLite library.
//!
//! The same queries serve the local library and the staged copy of a remote
//! one, so query logic exists exactly once.

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::adapter::format_length;
use super::error::{BridgeError, BridgeResult};
use super::models::{AlbumSummary, LibraryItem, SortKey};

pub const MAX_SEARCH_RESULTS: usize = 100;

const ITEM_COLUMNS: &str = "id, title, artist, album, year, length, format, bitrate, albumartist";
const KNOWN_COLUMNS: [&str; 9] = [
    "id",
    "title",
    "artist",
    "album",
    "year",
    "length",
    "format",
    "bitrate",
    "albumartist",
];

pub struct LibraryStore {
    conn: Connection,
    path: PathBuf,
}

impl LibraryStore {
    /// Opens the library at `path` read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(BridgeError::StoreNotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!("Opened beets library at {:?}", path);
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn count_items(&self) -> BridgeResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    /// One page of items ordered by `sort`. `page` and `limit` are clamped to at least 1.
    pub fn list_items(&self, page: usize, limit: usize, sort: SortKey) -> BridgeResult<Vec<LibraryItem>> {
        let page = page.max(1);
        let limit = i64::try_from(limit.max(1)).unwrap_or(i64::MAX);
        // Pages starting past what SQLite can address are simply empty.
        let offset = match i64::try_from(page - 1)
            .ok()
            .and_then(|skipped| skipped.checked_mul(limit))
        {
            Some(offset) => offset,
            None => return Ok(Vec::new()),
        };

        // The sort column comes from a closed set, never from the caller.
        let sql = format!(
            "SELECT {} FROM items ORDER BY {} LIMIT ?1 OFFSET ?2",
            ITEM_COLUMNS,
            sort.column()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![limit, offset], |row| item_from_row(row, false))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Case-insensitive substring search over title, artist, album and album artist.
    pub fn search(&self, query: &str) -> BridgeResult<Vec<LibraryItem>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            "SELECT {} FROM items \
             WHERE title LIKE ?1 ESCAPE '\\' OR artist LIKE ?1 ESCAPE '\\' \
             OR album LIKE ?1 ESCAPE '\\' OR albumartist LIKE ?1 ESCAPE '\\' \
             ORDER BY artist, album, track \
             LIMIT ?2",
            ITEM_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![pattern, MAX_SEARCH_RESULTS as i64], |row| {
                item_from_row(row, false)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn artists(&self) -> BridgeResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT artist FROM items ORDER BY artist")?;
        let artists = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .filter(|artist| !artist.is_empty())
            .collect();
        Ok(artists)
    }

    /// Distinct albums, newest first. A non-empty `artist` keeps the albums where it
    /// is either the track artist or the album artist.
    pub fn albums(&self, artist: Option<&str>) -> BridgeResult<Vec<AlbumSummary>> {
        let artist = artist.filter(|a| !a.is_empty());
        let rows = match artist {
            Some(artist) => {
                let mut stmt = self.conn.prepare(
                    "SELECT DISTINCT album, artist, albumartist, year FROM items \
                     WHERE artist = ?1 OR albumartist = ?1 \
                     ORDER BY year DESC, album",
                )?;
                let rows = stmt
                    .query_map(params![artist], album_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT DISTINCT album, artist, albumartist, year FROM items \
                     ORDER BY year DESC, album",
                )?;
                let rows = stmt
                    .query_map([], album_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows.into_iter().flatten().collect())
    }

    /// Full row of a single item, including the columns outside the summary projection.
    pub fn item(&self, id: i64) -> BridgeResult<Option<LibraryItem>> {
        let item = self
            .conn
            .query_row("SELECT * FROM items WHERE id = ?1", params![id], |row| {
                item_from_row(row, true)
            })
            .optional()?;
        Ok(item)
    }
}

fn item_from_row(row: &Row, with_extra: bool) -> rusqlite::Result<LibraryItem> {
    let length: Option<f64> = row.get("length")?;
    let mut extra = BTreeMap::new();
    if with_extra {
        let stmt = row.as_ref();
        for (idx, name) in stmt.column_names().into_iter().enumerate() {
            if KNOWN_COLUMNS.contains(&name) {
                continue;
            }
            extra.insert(name.to_string(), value_to_json(row.get_ref(idx)?));
        }
    }
    Ok(LibraryItem {
        id: row.get("id")?,
        title: row.get("title")?,
        artist: row.get("artist")?,
        album: row.get("album")?,
        year: row.get("year")?,
        length,
        format: row.get("format")?,
        bitrate: row.get("bitrate")?,
        albumartist: row.get("albumartist")?,
        length_formatted: format_length(length),
        extra,
    })
}

fn album_from_row(row: &Row) -> rusqlite::Result<Option<AlbumSummary>> {
    let album: Option<String> = row.get(0)?;
    let album = match album.filter(|a| !a.is_empty()) {
        Some(album) => album,
        None => return Ok(None),
    };
    Ok(Some(AlbumSummary {
        album,
        artist: row.get(1)?,
        albumartist: row.get(2)?,
        year: row.get(3)?,
    }))
}

fn value_to_json(value: ValueRef) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        // beets stores paths as blobs
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
