const STROKE_TRANSLATIONS: &[(&str, &str)] = &[
    ("butterfly", "fjärilsim"),
    ("backstroke", "ryggsim"),
    ("breaststroke", "bröstsim"),
    ("freestyle", "frisim"),
];

fn translate(token: &str) -> &str {
    STROKE_TRANSLATIONS
        .iter()
        .find(|(english, _)| *english == token)
        .map_or(token, |(_, swedish)| *swedish)
}

/// Whether a result table header row (`"Gren 3 100m Frisim Damer"`) belongs
/// to `event_name` (`"100m Frisim"`). English stroke names in either side are
/// accepted.
pub fn is_correct_event(row_text: &str, event_name: &str) -> bool {
    let row = row_text.to_lowercase();
    let row_tokens: Vec<&str> = row.split(' ').skip(2).take(2).collect();
    let name = event_name.to_lowercase();
    let name_tokens: Vec<&str> = name.split(' ').collect();
    if row_tokens == name_tokens {
        return true;
    }
    row_tokens.iter().map(|t| translate(t)).eq(name_tokens.iter().map(|t| translate(t)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_swedish_header() {
        assert!(is_correct_event("Gren 3 100m Frisim Damer", "100m Frisim"));
        assert!(!is_correct_event("Gren 3 100m Frisim Damer", "200m Frisim"));
        assert!(!is_correct_event("Gren 4 100m Ryggsim Herrar", "100m Frisim"));
    }

    #[test]
    fn matches_english_header() {
        assert!(is_correct_event("Event 12 50m Butterfly Women", "50m Fjärilsim"));
        assert!(is_correct_event("Event 2 200m Breaststroke Men", "200m bröstsim"));
    }

    #[test]
    fn short_rows_never_match() {
        assert!(!is_correct_event("Gren 3", "100m Frisim"));
    }
}
