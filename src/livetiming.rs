use std::sync::LazyLock;

use anyhow::{Context, Result};
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::debug;

use crate::http_client::{Fetched, PageSource};
use crate::meet_matcher::meet_names_match;
use crate::model::{Lookup, MeetRef, SwimmerIdentity};
use crate::text::{CELLS, ROWS, element_text, first_href, selector};

pub const LIVETIMING_BASE_URL: &str = "https://www.livetiming.se";

/// Any meet id works; the archive page lists every meet regardless.
const ARCHIVE_CID: &str = "6644";
const HEAT_LIST_LINK_TEXT: &str = "Heatlista";
const POOL_PREFIX: &str = "Bassäng: ";
const HEAT_HEADER_PREFIX: &str = "Gren ";

static HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static TABLE_BODY_ROWS: LazyLock<Selector> = LazyLock::new(|| selector("tbody tr"));

/// URLs and lookups against livetiming.se.
#[derive(Debug, Clone)]
pub struct LiveTiming {
    base: Url,
}

impl LiveTiming {
    pub fn new(base: &str) -> Result<Self> {
        let base =
            Url::parse(base).with_context(|| format!("invalid LiveTiming base url {base:?}"))?;
        Ok(Self { base })
    }

    fn root(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn archive_url(&self) -> String {
        format!("{}/archive.php?cid={ARCHIVE_CID}", self.root())
    }

    /// Every result of every session of a meet on one page.
    pub fn results_url(&self, meet_id: &str) -> String {
        format!("{}/results.php?cid={meet_id}&session=0&all=1", self.root())
    }

    /// Heat list links on the session page are relative to the site root.
    pub fn heat_list_url(&self, href: &str) -> String {
        format!("{}/{}", self.root(), href.trim_start_matches('/'))
    }

    /// Scan the meet archive for the meet Tempus calls `name`.
    pub fn find_meet(&self, source: &dyn PageSource, name: &str, date: &str) -> Lookup<MeetRef> {
        let html = match source.get(&self.archive_url()) {
            Fetched::Page(html) => html,
            Fetched::Unavailable => return Lookup::Unavailable,
        };
        let found = parse_archive(&html)
            .into_iter()
            .find(|entry| meet_names_match(name, date, &entry.name, &entry.date));
        match found {
            Some(entry) => Lookup::Found(MeetRef {
                id: entry.id,
                location: entry.location,
            }),
            None => Lookup::NotFound,
        }
    }

    pub fn meet_results(&self, source: &dyn PageSource, meet_id: &str) -> Lookup<Vec<String>> {
        match source.get(&self.results_url(meet_id)) {
            Fetched::Page(html) => Lookup::Found(parse_result_rows(&html)),
            Fetched::Unavailable => Lookup::Unavailable,
        }
    }
}

impl Default for LiveTiming {
    fn default() -> Self {
        Self {
            base: Url::parse(LIVETIMING_BASE_URL).expect("valid LiveTiming base url"),
        }
    }
}

/// One row of the meet archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub id: String,
    pub name: String,
    pub location: String,
    pub date: String,
}

pub fn parse_archive(html: &str) -> Vec<ArchiveEntry> {
    let doc = Html::parse_document(html);
    let mut entries = Vec::new();
    for row in doc.select(&ROWS).skip(1) {
        let cells: Vec<_> = row.select(&CELLS).collect();
        if cells.len() < 4 {
            continue;
        }
        let Some(id) = first_href(cells[0]).and_then(|href| href.rsplit('=').next()) else {
            continue;
        };
        entries.push(ArchiveEntry {
            id: id.to_string(),
            name: element_text(cells[0]),
            location: element_text(cells[1]),
            date: element_text(cells[3]),
        });
    }
    entries
}

/// Text of every non-empty table row on a results page, in page order.
pub fn parse_result_rows(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&ROWS)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// An event row on the session page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub number: String,
    pub heat_list_href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPage {
    pub meet_name: String,
    pub event_count: usize,
    pub events: Vec<SessionEvent>,
}

/// Session number is whatever follows the last `=` of the session URL.
pub fn session_number(session_url: &str) -> &str {
    session_url.rsplit('=').next().unwrap_or(session_url)
}

pub fn parse_session_page(html: &str) -> Result<SessionPage> {
    let doc = Html::parse_document(html);
    let heading = doc
        .select(&HEADING)
        .next()
        .context("session page has no heading")?;
    let meet_name = element_text(heading)
        .split(' ')
        .skip(2)
        .collect::<Vec<_>>()
        .join(" ");
    let event_count = doc.select(&TABLE_BODY_ROWS).count().saturating_sub(1);

    let mut events = Vec::new();
    for row in doc.select(&ROWS).skip(1) {
        let cells: Vec<_> = row.select(&CELLS).collect();
        let Some(first) = cells.first() else {
            continue;
        };
        let heat_list_href = cells
            .iter()
            .find(|cell| element_text(**cell) == HEAT_LIST_LINK_TEXT)
            .and_then(|cell| first_href(*cell))
            .map(str::to_string);
        events.push(SessionEvent {
            number: element_text(*first),
            heat_list_href,
        });
    }
    Ok(SessionPage {
        meet_name,
        event_count,
        events,
    })
}

/// A competitor on a heat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatEntry {
    pub lane: u32,
    pub swimmer: SwimmerIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heat {
    pub number: u32,
    pub entries: Vec<HeatEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatList {
    /// Tokens 3-5 of the first heat header, e.g. `"100m Frisim Damer"`.
    pub event_name: String,
    /// `"25m"` or `"50m"`; empty when the page doesn't say.
    pub pool: String,
    pub total_heats: u32,
    pub heats: Vec<Heat>,
}

impl HeatList {
    /// Relays and extra heats have no individual personal bests.
    pub fn is_individual_event(&self) -> bool {
        let name = self.event_name.to_lowercase();
        let relay = name.contains('x') && !name.contains("mixed");
        !relay && !name.contains("extralopp")
    }
}

/// `(heat, total)` from a header like `"Gren 3 100m Frisim Damer Heat 2 (5)"`.
/// Headers without a `(n)` suffix are heat 1 of 1.
pub fn parse_heat_header(text: &str) -> (u32, u32) {
    let tokens: Vec<&str> = text.split(' ').collect();
    let has_count = tokens
        .last()
        .and_then(|last| last.chars().nth(1))
        .is_some_and(|c| c.is_ascii_digit());
    if !has_count || tokens.len() < 2 {
        return (1, 1);
    }
    let total = tokens[tokens.len() - 1]
        .trim_matches(|c| c == '(' || c == ')')
        .parse()
        .unwrap_or(1);
    let heat = tokens[tokens.len() - 2].parse().unwrap_or(1);
    (heat, total)
}

/// Title-case club words longer than two characters, capitalizing after any
/// non-letter (`FORTE-SIM` → `Forte-Sim`). Short words (`SK`, `IF`) are kept.
pub fn title_case_club(club: &str) -> String {
    club.split(' ')
        .map(|word| {
            if word.chars().count() <= 2 {
                return word.to_string();
            }
            let mut out = String::with_capacity(word.len());
            let mut after_letter = false;
            for c in word.chars() {
                if after_letter {
                    out.extend(c.to_lowercase());
                } else {
                    out.extend(c.to_uppercase());
                }
                after_letter = c.is_alphabetic();
            }
            out
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_heat_entry(row: scraper::ElementRef<'_>) -> Option<HeatEntry> {
    let text = element_text(row);
    if text.chars().count() <= 2 || !text.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let mut cells: Vec<String> = row
        .select(&CELLS)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    if cells.len() <= 3 {
        return None;
    }
    // Some lists carry a start-order column before the lane.
    if cells[2].starts_with(char::is_alphabetic) {
        cells.remove(0);
        if cells.len() < 4 {
            return None;
        }
    }
    let lane = cells[0].parse().ok()?;
    Some(HeatEntry {
        lane,
        swimmer: SwimmerIdentity::new(
            cells[1].clone(),
            cells[2].clone(),
            title_case_club(&cells[3]),
        ),
    })
}

/// Parse a heat list page. Returns `None` when the page has no heat header.
pub fn parse_heat_list(html: &str) -> Option<HeatList> {
    let doc = Html::parse_document(html);
    let mut event_name = None;
    let mut pool = String::new();
    let mut total_heats = 1;
    let mut heats: Vec<Heat> = Vec::new();

    for row in doc.select(&ROWS).skip(1) {
        let text = element_text(row);
        if text.is_empty() {
            continue;
        }
        if let Some(rest) = text.strip_prefix(POOL_PREFIX) {
            pool = rest.chars().take(3).collect();
        }
        if text.starts_with(HEAT_HEADER_PREFIX) {
            let (heat, total) = parse_heat_header(&text);
            if event_name.is_none() {
                event_name = Some(text.split(' ').skip(2).take(3).collect::<Vec<_>>().join(" "));
                total_heats = total;
            }
            heats.push(Heat {
                number: heat,
                entries: Vec::new(),
            });
            continue;
        }
        if let Some(current) = heats.last_mut() {
            if let Some(entry) = parse_heat_entry(row) {
                current.entries.push(entry);
            }
        }
    }

    let event_name = event_name?;
    debug!(event = %event_name, pool = %pool, total_heats, "parsed heat list");
    Some(HeatList {
        event_name,
        pool,
        total_heats,
        heats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_header_with_and_without_count() {
        assert_eq!(parse_heat_header("Gren 3 100m Frisim Damer Heat 2 (5)"), (2, 5));
        assert_eq!(parse_heat_header("Gren 3 100m Frisim Damer"), (1, 1));
        assert_eq!(parse_heat_header("Gren 7 50m Bröstsim Herrar Heat 11 (12)"), (11, 12));
    }

    #[test]
    fn club_title_case_keeps_short_words() {
        assert_eq!(title_case_club("SK NEPTUN"), "SK Neptun");
        assert_eq!(title_case_club("sundsvalls simsällskap"), "Sundsvalls Simsällskap");
        assert_eq!(title_case_club("IF FORTE-SIM"), "IF Forte-Sim");
    }

    #[test]
    fn relays_and_extra_heats_are_not_individual() {
        let mut list = HeatList {
            event_name: "4x50m Frisim Damer".into(),
            pool: "25m".into(),
            total_heats: 1,
            heats: Vec::new(),
        };
        assert!(!list.is_individual_event());
        list.event_name = "50m Frisim Extralopp".into();
        assert!(!list.is_individual_event());
        list.event_name = "200m Medley Herrar".into();
        assert!(list.is_individual_event());
    }

    #[test]
    fn archive_rows_need_a_link() {
        let html = r#"<table>
            <tr><th>Tävling</th><th>Ort</th><th>Arrangör</th><th>Datum</th></tr>
            <tr><td><a href="index.php?cid=12345">Sum-Sim 2023</a></td><td>Eriksdalsbadet</td><td>SSF</td><td>2023-03-11</td></tr>
            <tr><td>Utan länk</td><td>Borås</td><td>SSF</td><td>2023-03-12</td></tr>
            </table>"#;
        let entries = parse_archive(html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "12345");
        assert_eq!(entries[0].location, "Eriksdalsbadet");
    }

    #[test]
    fn session_number_is_url_tail() {
        assert_eq!(
            session_number("https://www.livetiming.se/program.php?cid=7000&session=3"),
            "3"
        );
    }
}
