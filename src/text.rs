use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

pub static ROWS: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
pub static CELLS: LazyLock<Selector> = LazyLock::new(|| selector("td"));
pub static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Parse a CSS selector that is known to be valid at compile time.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid selector {css:?}: {err}"))
}

/// Collapse every whitespace run (non-breaking spaces included) into a single
/// ASCII space and trim both ends.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Normalized text content of an element and all of its descendants.
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize(&element.text().collect::<String>())
}

/// `href` of the first link inside `element`.
pub fn first_href<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element
        .select(&LINKS)
        .next()
        .and_then(|a| a.value().attr("href"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn collapses_runs_and_nbsp() {
        assert_eq!(normalize("  50m:\u{a0}\u{a0}31.94 \n\t 100m: "), "50m: 31.94 100m:");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \u{a0} "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(" Gren 3\u{a0} 100m   Frisim ");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn element_text_joins_descendants() {
        let doc = Html::parse_fragment(
            "<table><tr><td> 1 </td><td>Anna&nbsp;<b>Berg</b></td></tr></table>",
        );
        let row = doc.select(&ROWS).next().unwrap();
        assert_eq!(element_text(row), "1 Anna Berg");
        assert_eq!(first_href(row), None);
    }
}
