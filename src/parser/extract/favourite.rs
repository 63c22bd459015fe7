use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::tracks::{track_from_row, ArtistLabel};
use super::ExtractError;
use crate::model::Track;
use crate::parser::patterns::FAVOURITE;
use crate::parser::text::text;

static ITEM_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.segments-list__item").unwrap());
static H3_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static TRACK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.segment__track").unwrap());
static CONTENT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.segment__content").unwrap());

/// Favourite track marked by a heading inside the track list: the track that
/// sits below the first "favourite" heading.
pub fn extract(root: ElementRef) -> Result<String, ExtractError> {
    let Some(item) = root.select(&ITEM_SEL).find(|li| {
        li.select(&H3_SEL)
            .next()
            .is_some_and(|h3| FAVOURITE.heading_matches(&text(h3)))
    }) else {
        return Ok(String::new());
    };

    let track = if let Some(row) = item.select(&TRACK_SEL).next() {
        track_from_row(row, ArtistLabel::Artist)?
    } else if let Some(block) = item.select(&CONTENT_SEL).next() {
        track_from_row(block, ArtistLabel::Title)?
    } else {
        return Err(ExtractError::malformed(
            "favourite heading without a track",
            item,
        ));
    };
    Ok(describe(&track))
}

/// "<song> by <artist>", or whichever part is known.
pub fn describe(track: &Track) -> String {
    match (track.artist.is_empty(), track.song.is_empty()) {
        (false, false) => format!("{} by {}", track.song, track.artist),
        (false, true) => track.artist.clone(),
        _ => track.song.clone(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn run(body: &str) -> Result<String, ExtractError> {
        let doc = Html::parse_document(&format!("<html><body><ul>{}</ul></body></html>", body));
        extract(doc.root_element())
    }

    #[test]
    fn track_row_below_heading() {
        let fav = run(r#"
            <li class="segments-list__item"><div class="segment__track"><h3><span class="artist">Chic</span></h3><p><span>Le Freak</span></p></div></li>
            <li class="segments-list__item"><h3>Castaway's Favourite</h3>
              <div class="segment__track"><h4><span class="artist">The Doors</span></h4><p><span>The End</span></p></div></li>"#)
        .unwrap();
        assert_eq!(fav, "The End by The Doors");
    }

    #[test]
    fn content_block_uses_title_label() {
        let fav = run(r#"
            <li class="segments-list__item"><h3>Favourite</h3>
              <div class="segment__content"><h4><span class="title">Dylan Thomas</span></h4><p><span>Extract from Poem in October</span></p></div></li>"#)
        .unwrap();
        assert_eq!(fav, "Extract from Poem in October by Dylan Thomas");
    }

    #[test]
    fn no_heading_no_favourite() {
        assert_eq!(run(r#"<li class="segments-list__item"><h3>Book</h3></li>"#).unwrap(), "");
    }

    #[test]
    fn heading_without_track_is_an_error() {
        assert!(run(r#"<li class="segments-list__item"><h3>Favourite</h3><p>?</p></li>"#).is_err());
    }

    #[test]
    fn partial_tracks() {
        assert_eq!(describe(&Track::new("Billie Holiday", "")), "Billie Holiday");
        assert_eq!(describe(&Track::new("", "These Foolish Things")), "These Foolish Things");
        assert_eq!(describe(&Track::new("", "")), "");
    }
}
