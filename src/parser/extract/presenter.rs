use crate::parser::patterns::PRESENTER_TEMPLATES;

/// Presenter named in `text`. Only the first hit of each template counts, and
/// a name that is part of the castaway's own name is rejected: in "A B chats
/// with C D" either person may be the guest.
pub fn extract(text: &str, castaway: &str) -> String {
    PRESENTER_TEMPLATES
        .iter()
        .filter_map(|re| re.captures(text))
        .map(|caps| format!("{} {}", &caps[1], &caps[2]))
        .find(|name| !castaway.contains(name.as_str()))
        .unwrap_or_default()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_the_castaway() {
        let text = "John Doe's castaway choices with Jane Smith";
        assert_eq!(extract(text, "Jane Smith"), "John Doe");

        let text = "Jane Smith's castaway choices with John Doe";
        assert_eq!(extract(text, "Jane Smith"), "John Doe");
    }

    #[test]
    fn template_priority() {
        assert_eq!(extract("Presenter: Kirsty Young", "Nile Rodgers"), "Kirsty Young");
        assert_eq!(
            extract("Lauren Laverne interviews Thom Yorke", "Thom Yorke"),
            "Lauren Laverne"
        );
        assert_eq!(
            extract("Sue Lawley talks to the cricketer", "Freddie Flintoff"),
            "Sue Lawley"
        );
        assert_eq!(
            extract("Roy Plomley chats to actor Leo McKern", "Leo McKern"),
            "Roy Plomley"
        );
        assert_eq!(
            extract("Michael Lewis joins Kirsty Young on the island", "Michael Lewis"),
            "Kirsty Young"
        );
    }

    #[test]
    fn needs_two_capitalised_words() {
        assert_eq!(extract("interviewed by the producer", "Cilla Black"), "");
        assert_eq!(extract("", "Cilla Black"), "");
    }

    #[test]
    fn curly_apostrophe() {
        assert_eq!(
            extract("Kirsty Young’s castaway this week", "Isabella Tree"),
            "Kirsty Young"
        );
    }
}
