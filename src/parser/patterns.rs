use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Book,
    Luxury,
    Favourite,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Book => "book",
            Field::Luxury => "luxury",
            Field::Favourite => "favourite",
        }
    }
}

/// One wording a field may be introduced with, e.g. "BOOK CHOICE".
#[derive(Debug)]
pub struct Indicator {
    pub label: &'static str,
    presence: Regex,
    line: Regex,
}

impl Indicator {
    fn new(label: &'static str) -> Self {
        let escaped = regex::escape(label);
        Indicator {
            label,
            presence: Regex::new(&format!("(?i){}", escaped)).unwrap(),
            // non-greedy so the value starts after the first colon
            line: Regex::new(&format!("(?i)^{}.*?: (.*)", escaped)).unwrap(),
        }
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.presence.is_match(s)
    }

    /// Value of a `<label>...: <value>` line, if this line introduces one.
    pub fn value_in_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.line
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

/// Priority-ordered indicators for one field. `heading` selects the indicator
/// used when matching headings below the track list.
#[derive(Debug)]
pub struct FieldPatterns {
    pub field: Field,
    indicators: Vec<Indicator>,
    heading: usize,
}

impl FieldPatterns {
    fn new(field: Field, labels: &[&'static str], heading: usize) -> Self {
        FieldPatterns {
            field,
            indicators: labels.iter().map(|&l| Indicator::new(l)).collect(),
            heading,
        }
    }

    /// First indicator, in priority order, that occurs anywhere in `s`.
    pub fn find(&self, s: &str) -> Option<(usize, &Indicator)> {
        self.indicators.iter().enumerate().find(|(_, ind)| ind.is_match(s))
    }

    pub fn heading_matches(&self, text: &str) -> bool {
        self.indicators[self.heading].is_match(text)
    }

    #[cfg(test)]
    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }
}

pub static BOOK: LazyLock<FieldPatterns> =
    LazyLock::new(|| FieldPatterns::new(Field::Book, &["book choice", "book"], 1));

pub static LUXURY: LazyLock<FieldPatterns> =
    LazyLock::new(|| FieldPatterns::new(Field::Luxury, &["luxury item", "luxury"], 1));

pub static FAVOURITE: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(
        Field::Favourite,
        &["castaway's choice", "castaway's favourite", "favourite"],
        2,
    )
});

/// Two consecutive capitalised words: the presenter's first and last name.
const NAME: &str = r"([A-Z]\w+) ([A-Z]\w+)";

/// Phrases that introduce the presenter, most specific first. `{N}` marks the
/// captured name.
const PRESENTER_PHRASES: &[&str] = &[
    r"Presenter:?\s+{N}",
    r"{N}['’]s castaway",
    r"{N} casts away",
    r"[Ii]nterviewed by {N}",
    r"{N} interviews",
    r"speaking to {N}",
    r"{N} talks to ",
    r"talks to {N}",
    r"castaway choices with {N}",
    r"{N} chats to",
    r"chats to {N}",
    r"[A-Z]\w+ [A-Z]\w+ joins {N}",
];

pub static PRESENTER_TEMPLATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PRESENTER_PHRASES
        .iter()
        .map(|p| Regex::new(&p.replace("{N}", NAME)).unwrap())
        .collect()
});

/// Ordinal words that may lead a disc entry in a long description.
pub const ORDINALS: &[&str] = &["one", "two", "three", "four", "five", "six", "seven", "eight"];

// ── Tests ──
