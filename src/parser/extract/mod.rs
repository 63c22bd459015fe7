pub mod broadcast;
pub mod description;
pub mod favourite;
pub mod headings;
pub mod presenter;
pub mod tracks;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::model::{Episode, DEFAULT_MAX_TRACKS};
use crate::parser::patterns::{FieldPatterns, BOOK, FAVOURITE, LUXURY};
use crate::parser::text::{normalize, text, text_with_breaks};

static H1_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("episode page has no title")]
    MissingTitle,
    #[error("{context}: {markup}")]
    MalformedElement {
        context: &'static str,
        markup: String,
    },
    #[error("unparseable timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl ExtractError {
    pub fn malformed(context: &'static str, el: ElementRef) -> Self {
        ExtractError::MalformedElement {
            context,
            markup: el.html(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub max_tracks: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            max_tracks: DEFAULT_MAX_TRACKS,
        }
    }
}

/// Run every strategy over one episode page, most trustworthy first.
///
/// Only a missing title is fatal. Any other strategy failure is logged and
/// the field is left for the next strategy in line.
pub fn extract_episode(
    doc: &Html,
    castaway: &str,
    config: &ExtractConfig,
) -> Result<Episode, ExtractError> {
    let root = doc.root_element();

    let title = root
        .select(&H1_SEL)
        .next()
        .map(|h1| normalize(&text(h1)))
        .ok_or(ExtractError::MissingTitle)?;
    let castaway = if castaway.trim().is_empty() {
        title.as_str()
    } else {
        castaway
    };

    let paragraphs: Vec<ElementRef> = root.select(&P_SEL).collect();

    // 1. Tracks: structured list, else the long description.
    let mut tracks = tracks::extract(root, config.max_tracks);
    if tracks.is_empty() {
        let fallback = paragraphs
            .iter()
            .map(|p| text_with_breaks(*p))
            .filter(|t| description::has_disc_marker(t))
            .map(|t| description::extract(&t, config.max_tracks))
            .find(|found| !found.is_empty());
        if let Some(found) = fallback {
            debug!(count = found.len(), "Tracks taken from long description");
            tracks = found;
        }
    }

    let mut book = String::new();
    let mut luxury = String::new();
    let mut favourite_track = String::new();
    let mut presenter = String::new();

    // 2. Free text in every paragraph.
    for p in &paragraphs {
        let markup = p.html();
        fill(&mut luxury, "free text", &LUXURY, || {
            Ok(headings::from_free_text(&markup, &LUXURY))
        });
        fill(&mut favourite_track, "free text", &FAVOURITE, || {
            Ok(headings::from_free_text(&markup, &FAVOURITE))
        });
        fill(&mut book, "free text", &BOOK, || {
            Ok(headings::from_free_text(&markup, &BOOK))
        });
        if presenter.is_empty() {
            presenter = presenter::extract(&markup, castaway);
        }
    }

    // 3. Headings below the track list.
    fill(&mut book, "content blocks", &BOOK, || {
        Ok(headings::from_content_blocks(root, &BOOK))
    });
    fill(&mut luxury, "content blocks", &LUXURY, || {
        Ok(headings::from_content_blocks(root, &LUXURY))
    });
    fill(&mut favourite_track, "favourite heading", &FAVOURITE, || {
        favourite::extract(root)
    });
    let (broadcast_date, broadcast_time) = broadcast::extract(root);

    // 4. List items.
    fill(&mut book, "list items", &BOOK, || {
        Ok(headings::from_list_items(root, &BOOK))
    });
    fill(&mut luxury, "list items", &LUXURY, || {
        Ok(headings::from_list_items(root, &LUXURY))
    });

    Ok(Episode {
        title,
        tracks,
        book,
        luxury,
        favourite_track,
        presenter,
        broadcast_date,
        broadcast_time,
    })
}

/// Try `strategy` only while `slot` is still empty. A failing strategy
/// counts as "found nothing".
fn fill<F>(slot: &mut String, strategy: &str, patterns: &FieldPatterns, f: F)
where
    F: FnOnce() -> Result<String, ExtractError>,
{
    if !slot.is_empty() {
        return;
    }
    match f() {
        Ok(value) if !value.is_empty() => {
            debug!(field = patterns.field.name(), strategy, %value, "Field found");
            *slot = value;
        }
        Ok(_) => {}
        Err(e) => warn!(
            field = patterns.field.name(),
            strategy,
            error = %e,
            "Extraction strategy failed"
        ),
    }
}

// ── Tests ──
