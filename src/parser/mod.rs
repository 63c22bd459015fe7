pub mod extract;
pub mod listing;
pub mod patterns;
pub mod text;

use scraper::Html;

use crate::model::Episode;
use extract::{ExtractConfig, ExtractError};

/// Parse raw episode HTML and run the extraction cascade over it.
pub fn episode_from_html(
    html: &str,
    castaway: &str,
    config: &ExtractConfig,
) -> Result<Episode, ExtractError> {
    let doc = Html::parse_document(html);
    extract::extract_episode(&doc, castaway, config)
}
