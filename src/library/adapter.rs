//! Normalization of raw outcomes into the shared result shapes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::process::Output;

use super::models::{AlbumArt, CommandResult, LibraryItem};

/// Formats a duration in seconds as `m:ss`. Absent or zero lengths have no formatting.
pub fn format_length(length: Option<f64>) -> Option<String> {
    let seconds = length? as i64;
    if seconds == 0 {
        return None;
    }
    Some(format!("{}:{:02}", seconds / 60, seconds % 60))
}

pub fn command_result_from_output(output: &Output) -> CommandResult {
    // Processes killed by a signal have no exit code.
    let return_code = output.status.code().unwrap_or(-1);
    CommandResult::new(
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        return_code,
    )
}

/// Wraps raw image bytes, empty output means no art.
pub fn encode_album_art(bytes: &[u8]) -> Option<AlbumArt> {
    if bytes.is_empty() {
        return None;
    }
    let mime_type = infer::get(bytes)
        .filter(|kind| kind.mime_type().starts_with("image/"))
        .map(|kind| kind.mime_type().to_string());
    Some(AlbumArt {
        data: STANDARD.encode(bytes),
        mime_type,
    })
}

/// Builds the beets query selecting the album of `item`, qualified by the
/// album artist (or the track artist) when known.
pub fn album_query_for(item: &LibraryItem) -> Option<Vec<String>> {
    let album = item.album.as_deref().filter(|a| !a.is_empty())?;
    let mut query = vec![format!("album:{}", album)];
    if let Some(albumartist) = item.albumartist.as_deref().filter(|a| !a.is_empty()) {
        query.push(format!("albumartist:{}", albumartist));
    } else if let Some(artist) = item.artist.as_deref().filter(|a| !a.is_empty()) {
        query.push(format!("artist:{}", artist));
    }
    Some(query)
}
