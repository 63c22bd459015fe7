use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Node};

/// Characters trimmed from both ends of every extracted value, besides whitespace.
pub const DECORATIVE: &[char] = &['-', ':', ',', '.', '–', '‘', '’'];

static LEADING_P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<p(?:\s[^>]*)?>").unwrap());
static TRAILING_P_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p>$").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").unwrap());

/// Clean a raw value: decode entities, trim decorative characters and drop a
/// `<p>`/`</p>` wrapper. Repeats until nothing changes, so it is idempotent.
pub fn normalize(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(s: &str) -> String {
    let decoded = decode_entities(s);
    let trimmed = trim_decorative(&decoded);
    let unwrapped = LEADING_P_RE.replace(trimmed, "");
    let unwrapped = TRAILING_P_RE.replace(&unwrapped, "");
    trim_decorative(&unwrapped).to_string()
}

fn trim_decorative(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || DECORATIVE.contains(&c))
}

/// Decode named, decimal and hex character references. Unknown names are kept.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    ENTITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            let body = &caps[1];
            let decoded = if let Some(num) = body.strip_prefix("#x").or(body.strip_prefix("#X")) {
                u32::from_str_radix(num, 16).ok().and_then(char::from_u32)
            } else if let Some(num) = body.strip_prefix('#') {
                num.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "eacute" => 'é',
        "egrave" => 'è',
        "aacute" => 'á',
        "agrave" => 'à',
        "acirc" => 'â',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "auml" => 'ä',
        "ccedil" => 'ç',
        "pound" => '£',
        _ => return None,
    };
    Some(c)
}

/// Concatenated text of an element.
pub fn text(el: ElementRef) -> String {
    el.text().collect()
}

/// Element text with each `<br>` rendered as a newline.
pub fn text_with_breaks(el: ElementRef) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if e.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn strips_paragraph_wrapper() {
        let s = "  <p>Luxury: Ice machine or hot water bottle</p>  ";
        assert_eq!(normalize(s), "Luxury: Ice machine or hot water bottle");
        assert_eq!(normalize("  <p>Luxury: X</p>  "), "Luxury: X");
    }

    #[test]
    fn decodes_entities() {
        let s = "The Leopard (In Italian &amp; English) by Giuseppe di Lampedusa";
        assert_eq!(
            normalize(s),
            "The Leopard (In Italian & English) by Giuseppe di Lampedusa"
        );
        assert_eq!(decode_entities("Ch&#226;teau d&#x27;Yquem"), "Château d'Yquem");
        assert_eq!(decode_entities("a &bogus; b"), "a &bogus; b");
    }

    #[test]
    fn trims_exactly_the_decorative_set() {
        assert_eq!(normalize(" – ‘Hitmaker’ guitar. "), "Hitmaker’ guitar");
        assert_eq!(normalize("- Life On Mars?"), "Life On Mars?");
        assert_eq!(normalize("Believin'"), "Believin'");
        assert_eq!(normalize("(live)"), "(live)");
        assert_eq!(normalize("“Quoted”"), "“Quoted”");
    }

    #[test]
    fn idempotent() {
        for s in [
            "  <p>Luxury: X</p>  ",
            "Luxury: X. </p>",
            "&amp;amp; ",
            "<p><p>nested</p></p>",
            "",
            " :- ",
            "plain",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input {:?}", s);
        }
    }

    #[test]
    fn br_becomes_newline() {
        let doc = Html::parse_fragment("<p>DISC ONE: A - B<br>DISC TWO: C - D<br/>end</p>");
        let p = doc.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert_eq!(text_with_breaks(p), "DISC ONE: A - B\nDISC TWO: C - D\nend");
        assert_eq!(text(p), "DISC ONE: A - BDISC TWO: C - Dend");
    }
}
