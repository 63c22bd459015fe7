use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use tracing::warn;

use super::ExtractError;
use crate::model::{Track, TrackList};
use crate::parser::text::{normalize, text};

static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.segment__track").unwrap());
static ARTIST_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.artist").unwrap());
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.title").unwrap());
static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static SPAN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

/// Class of the inline elements naming who performed a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistLabel {
    Artist,
    /// Used by content blocks that mark the performer with `span.title`.
    Title,
}

/// Structured track list: every track row in document order. Malformed rows
/// are logged and skipped.
pub fn extract(root: ElementRef, max_tracks: usize) -> TrackList {
    let mut tracks = TrackList::new(max_tracks);
    for row in root.select(&ROW_SEL) {
        match track_from_row(row, ArtistLabel::Artist) {
            Ok(track) => {
                tracks.push(track);
            }
            Err(e) => warn!(error = %e, "Ignoring track row"),
        }
    }
    tracks
}

/// Artist and song from one row. Several performers are joined with " & ";
/// the song is the first span inside the row's paragraph.
pub fn track_from_row(row: ElementRef, label: ArtistLabel) -> Result<Track, ExtractError> {
    let artist_sel = match label {
        ArtistLabel::Artist => &*ARTIST_SEL,
        ArtistLabel::Title => &*TITLE_SEL,
    };
    let artist = row
        .select(artist_sel)
        .map(text)
        .collect::<Vec<_>>()
        .join(" & ");

    let p = row
        .select(&P_SEL)
        .next()
        .ok_or_else(|| ExtractError::malformed("track row without a paragraph", row))?;
    let song = p.select(&SPAN_SEL).next().map(text).unwrap_or_default();

    Ok(Track::new(normalize(&artist), normalize(&song)))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn row(artist: &str, song: &str) -> String {
        format!(
            r#"<div class="segment__track"><h3><span class="artist">{}</span></h3><p class="no-margin"><span property="name">{}</span></p></div>"#,
            artist, song
        )
    }

    #[test]
    fn rows_in_document_order() {
        let html = format!(
            "<html><body>{}{}{}</body></html>",
            row("Chic", "Le Freak"),
            row("The Doors", "The End"),
            row("Chic", "Good Times")
        );
        let doc = Html::parse_document(&html);
        let tracks = extract(doc.root_element(), 8);
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks.get(0).unwrap(), &Track::new("Chic", "Le Freak"));
        assert_eq!(tracks.get(2).unwrap().song, "Good Times");
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let html = format!(
            r#"<html><body>{}<div class="segment__track"><span class="artist">Nobody</span></div>{}</body></html>"#,
            row("David Bowie", "Life On Mars?"),
            row("David Bowie", "Word On A Wing")
        );
        let doc = Html::parse_document(&html);
        let tracks = extract(doc.root_element(), 8);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks.get(1).unwrap().song, "Word On A Wing");
    }

    #[test]
    fn several_artists_are_joined() {
        let html = r#"<div class="segment__track"><h3><span class="artist">Ella Fitzgerald</span><span class="artist">Louis Armstrong</span></h3><p><span>Dream A Little Dream Of Me</span></p></div>"#;
        let doc = Html::parse_fragment(html);
        let tracks = extract(doc.root_element(), 8);
        assert_eq!(tracks.get(0).unwrap().artist, "Ella Fitzgerald & Louis Armstrong");
    }

    #[test]
    fn paragraph_without_span_gives_empty_song() {
        let html = r#"<div class="segment__track"><span class="artist">Traditional</span><p>unnamed</p></div>"#;
        let doc = Html::parse_fragment(html);
        let tracks = extract(doc.root_element(), 8);
        assert_eq!(tracks.get(0).unwrap(), &Track::new("Traditional", ""));
    }
}
