use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// Tracks a castaway may choose; also the number of Artist/Song column pairs.
pub const DEFAULT_MAX_TRACKS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub artist: String,
    pub song: String,
}

impl Track {
    pub fn new(artist: impl Into<String>, song: impl Into<String>) -> Self {
        Track {
            artist: artist.into(),
            song: song.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("track {index} does not exist ({len} tracks)")]
pub struct TrackIndexError {
    pub index: usize,
    pub len: usize,
}

/// Tracks in extraction order, capped at `max`.
#[derive(Debug, Clone)]
pub struct TrackList {
    tracks: Vec<Track>,
    max: usize,
}

impl TrackList {
    pub fn new(max: usize) -> Self {
        TrackList {
            tracks: Vec::with_capacity(max),
            max,
        }
    }

    /// Appends a track. Returns false (and drops it) once the list is full.
    pub fn push(&mut self, track: Track) -> bool {
        if self.tracks.len() >= self.max {
            tracing::warn!(
                artist = %track.artist,
                song = %track.song,
                max = self.max,
                "track list full, dropping track"
            );
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub fn get(&self, index: usize) -> Result<&Track, TrackIndexError> {
        self.tracks.get(index).ok_or(TrackIndexError {
            index,
            len: self.tracks.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }
}

/// Serialized as a plain array of tracks; the cap is not part of the data.
impl Serialize for TrackList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.tracks.len()))?;
        for track in &self.tracks {
            seq.serialize_element(track)?;
        }
        seq.end()
    }
}

impl<'a> IntoIterator for &'a TrackList {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

/// One broadcast's choices. Empty strings mean "not found by any strategy".
#[derive(Debug, Clone, Serialize)]
pub struct Episode {
    pub title: String,
    pub tracks: TrackList,
    pub book: String,
    pub luxury: String,
    pub favourite_track: String,
    pub presenter: String,
    pub broadcast_date: Option<NaiveDate>,
    pub broadcast_time: Option<NaiveTime>,
}

impl Episode {
    pub fn date_text(&self) -> String {
        self.broadcast_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    pub fn time_text(&self) -> String {
        self.broadcast_time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Title: {}", self.title)?;
        if !self.tracks.is_empty() {
            write!(f, "\nTracks:")?;
            for (i, t) in self.tracks.iter().enumerate() {
                write!(f, "\n{}. {}: {}", i + 1, t.artist, t.song)?;
            }
        }
        for (label, value) in [
            ("Book", &self.book),
            ("Luxury", &self.luxury),
            ("Favourite track", &self.favourite_track),
            ("Presenter", &self.presenter),
        ] {
            if !value.is_empty() {
                write!(f, "\n{}: {}", label, value)?;
            }
        }
        if self.broadcast_date.is_some() {
            write!(
                f,
                "\nBroadcast date and time: {} {}",
                self.date_text(),
                self.time_text()
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Castaway {
    pub name: String,
    pub job: String,
    pub url: String,
    pub episode: Episode,
}

/// Castaways in listing order. Repeat appearances are kept as separate
/// entries; there is no lookup by name.
#[derive(Debug, Default, Serialize)]
pub struct CastawayCollection {
    castaways: Vec<Castaway>,
}

impl CastawayCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, castaway: Castaway) {
        self.castaways.push(castaway);
    }

    pub fn len(&self) -> usize {
        self.castaways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.castaways.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Castaway> {
        self.castaways.iter()
    }
}

// ── Tests ──
