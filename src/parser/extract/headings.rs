use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::trace;

use crate::parser::patterns::FieldPatterns;
use crate::parser::text::{normalize, text, text_with_breaks};

/// Joins values when several blocks (one per guest) name the same field.
pub const MULTI_VALUE_SEPARATOR: &str = " / ";

static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static CONTENT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.segment__content").unwrap());
static LIST_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.segments-list").unwrap());
static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static H3_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static H4_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h4").unwrap());
static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static SPAN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

/// Method 1: a "LABEL: value" line inside a paragraph's markup.
///
/// The first indicator (by priority) present anywhere in the markup decides
/// which label is looked for; the markup is then read line by line, lines
/// being separated by `<br>`.
pub fn from_free_text(markup: &str, patterns: &FieldPatterns) -> String {
    let Some((priority, indicator)) = patterns.find(markup) else {
        return String::new();
    };
    trace!(
        field = patterns.field.name(),
        indicator = indicator.label,
        priority,
        "Indicator present"
    );
    BR_RE
        .split(markup)
        .map(normalize)
        .find_map(|line| indicator.value_in_line(&line).map(normalize))
        .unwrap_or_default()
}

/// Method 2: heading/paragraph pairs in content blocks below the track list.
/// Values from several matching blocks are joined in document order.
pub fn from_content_blocks(root: ElementRef, patterns: &FieldPatterns) -> String {
    let values: Vec<String> = root
        .select(&CONTENT_SEL)
        .filter_map(|block| block_value(block, patterns))
        .filter(|v| !v.is_empty())
        .collect();
    values.join(MULTI_VALUE_SEPARATOR)
}

fn block_value(block: ElementRef, patterns: &FieldPatterns) -> Option<String> {
    let p = block.select(&P_SEL).next()?;
    // older pages use h4 for the heading
    let heading = [&*H3_SEL, &*H4_SEL]
        .into_iter()
        .filter_map(|sel| block.select(sel).next())
        .find(|h| patterns.heading_matches(&text(*h)));
    heading.map(|_| normalize(&text_with_breaks(p)))
}

/// Method 3: `li > h3` heading followed by an `h4 > span` value, inside the
/// segments list. First match wins.
pub fn from_list_items(root: ElementRef, patterns: &FieldPatterns) -> String {
    let Some(list) = root.select(&LIST_SEL).next() else {
        return String::new();
    };
    list.select(&LI_SEL)
        .filter(|li| {
            li.select(&H3_SEL)
                .next()
                .is_some_and(|h3| patterns.heading_matches(&text(h3)))
        })
        .find_map(|li| {
            let span = li.select(&H4_SEL).next()?.select(&SPAN_SEL).next()?;
            Some(normalize(&text(span)))
        })
        .unwrap_or_default()
}

// ── Tests ──
