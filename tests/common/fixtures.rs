//! Test fixtures: a small beets library and a fake `beet` executable

use anyhow::Result;
use rusqlite::{params, Connection};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// (title, artist, album, albumartist, year, track, length)
const FIXTURE_ITEMS: [(&str, &str, Option<&str>, &str, i64, i64, f64); 6] = [
    ("Idioteque", "Radiohead", Some("Kid A"), "Radiohead", 2000, 8, 309.0),
    ("Airbag", "Radiohead", Some("OK Computer"), "Radiohead", 1997, 1, 284.0),
    ("Teardrop", "Massive Attack", Some("Mezzanine"), "Massive Attack", 1998, 3, 330.0),
    ("Angel", "Massive Attack", Some("Mezzanine"), "Massive Attack", 1998, 1, 379.0),
    ("Roads", "Portishead", Some("Dummy"), "Portishead", 1994, 10, 305.0),
    ("Untitled", "", None, "", 0, 0, 0.0),
];

/// Shell stand-in for `beet`, answering the subcommands the server uses
const FAKE_BEET_SCRIPT: &str = r#"#!/bin/sh
case "$1" in
  version|--version)
    echo "beets version 1.6.0"
    echo "Python version 3.11.2"
    echo "plugins: fetchart, lastgenre"
    ;;
  albumart)
    if [ "$4" = "album:Kid A" ]; then
      printf '\211PNG\r\n\032\n'
    else
      echo "no art found" >&2
      exit 1
    fi
    ;;
  import)
    echo "import $2"
    ;;
  stats)
    echo "Tracks: 6"
    ;;
  ls)
    shift
    echo "ls $*"
    ;;
  *)
    echo "unknown command: $1" >&2
    exit 2
    ;;
esac
"#;

/// Creates a beets library database with the fixture items
pub fn create_test_library(path: &Path) -> Result<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE items (
            id INTEGER PRIMARY KEY,
            path BLOB,
            title TEXT,
            artist TEXT,
            album TEXT,
            albumartist TEXT,
            year INTEGER,
            track INTEGER,
            length REAL,
            format TEXT,
            bitrate INTEGER,
            added REAL
        );",
    )?;
    for (i, (title, artist, album, albumartist, year, track, length)) in
        FIXTURE_ITEMS.iter().enumerate()
    {
        conn.execute(
            "INSERT INTO items (path, title, artist, album, albumartist, year, track, length, format, bitrate, added)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'FLAC', 900000, ?9)",
            params![
                format!("/music/{}.flac", title).into_bytes(),
                title,
                artist,
                album,
                albumartist,
                year,
                track,
                length,
                i as f64
            ],
        )?;
    }
    Ok(())
}

/// Writes the fake `beet` into `dir` and returns its path
pub fn create_fake_beet(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("beet");
    fs::write(&path, FAKE_BEET_SCRIPT)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}
