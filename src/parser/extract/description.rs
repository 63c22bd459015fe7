use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::model::{Track, TrackList};
use crate::parser::patterns::ORDINALS;
use crate::parser::text::normalize;

/// Token that introduces each track in an unstructured long description.
pub const DISC_MARKER: &str = "DISC ";

/// Detection ignores case; segments are only cut at the upper-case marker so a
/// lower-case "disc" inside a track line stays part of it.
static DISC_PRESENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b{}", regex::escape(DISC_MARKER))).unwrap());
static DISC_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b{}", regex::escape(DISC_MARKER))).unwrap());
static DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*:(?P<artist>.*) - (?P<song>.*)").unwrap());
static BY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i).*:(?P<song>.*) by (?P<artist>.*)").unwrap());

pub fn has_disc_marker(text: &str) -> bool {
    DISC_PRESENT_RE.is_match(text)
}

/// Tracks listed as "DISC ONE: Artist - Song" (or "Song by Artist") inside
/// free text.
pub fn extract(text: &str, max_tracks: usize) -> TrackList {
    let mut tracks = TrackList::new(max_tracks);

    // Whatever precedes the first marker is the introduction.
    for segment in DISC_SPLIT_RE.split(text).skip(1) {
        if let Some(track) = template_match(segment) {
            tracks.push(track);
            continue;
        }

        let Some(rest) = strip_ordinal(segment) else {
            debug!(segment, "Disc segment matched no template");
            continue;
        };

        let track = template_match(rest).unwrap_or_else(|| {
            let both = normalize(rest);
            warn!(segment = %both, "Disc segment unparseable; using it as artist and song");
            Track::new(both.clone(), both)
        });
        tracks.push(track);
    }

    tracks
}

fn template_match(segment: &str) -> Option<Track> {
    let caps = if segment.contains(" - ") {
        DASH_RE.captures(segment)
    } else if segment.to_lowercase().contains(" by ") {
        BY_RE.captures(segment)
    } else {
        None
    }?;
    Some(track_from(&caps))
}

fn track_from(caps: &Captures) -> Track {
    Track::new(normalize(&caps["artist"]), normalize(&caps["song"]))
}

/// The segment with a leading ordinal word ("ONE", "two", ...) removed.
fn strip_ordinal(segment: &str) -> Option<&str> {
    ORDINALS.iter().find_map(|ordinal| {
        let head = segment.get(..ordinal.len())?;
        head.eq_ignore_ascii_case(ordinal)
            .then(|| &segment[ordinal.len()..])
    })
}

// ── Tests ──
