use anyhow::{Context, Result};
use reqwest::Url;
use scraper::Html;
use tracing::debug;

use crate::http_client::{Fetched, PageSource};
use crate::model::{Lookup, PersonalBest, SwimmerIdentity};
use crate::text::{CELLS, ROWS, element_text, first_href};

pub const TEMPUS_BASE_URL: &str = "https://www.tempusopen.se";

/// Text of the only row in an empty swimmer search result.
const NO_MATCH_MARKER: &str = "Inget hittades";

/// URLs and lookups against tempusopen.se.
#[derive(Debug, Clone)]
pub struct Tempus {
    base: Url,
}

impl Tempus {
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid Tempus base url {base:?}"))?;
        Ok(Self { base })
    }

    fn root(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn swimmer_search_url(&self, swimmer: &SwimmerIdentity) -> String {
        let mut url = self.base.clone();
        let path = format!("{}/index.php", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("r", "swimmer/index")
            .append_pair("Swimmer[first_name]", swimmer.first_name())
            .append_pair("Swimmer[last_name]", &swimmer.last_name())
            .append_pair("Swimmer[swimmer_club]", &swimmer.club)
            .append_pair("Swimmer[searchChoice]", "1")
            .append_pair("Swimmer[class]", "99")
            .append_pair("Swimmer[is_active]", "1")
            .append_pair("ajax", "swimmer-grid");
        url.into()
    }

    /// Every recorded time of one swimmer in one event, fastest first.
    pub fn personal_best_url(&self, swimmer_id: &str, event_id: &str) -> String {
        format!(
            "{}/index.php?r=swimmer/distance&id={swimmer_id}&event={event_id}",
            self.root()
        )
    }

    pub fn all_events_url(&self, swimmer_id: &str) -> String {
        format!("{}/index.php?r=swimmer/view&id={swimmer_id}", self.root())
    }

    pub fn find_swimmer(&self, source: &dyn PageSource, swimmer: &SwimmerIdentity) -> Lookup<String> {
        match source.get(&self.swimmer_search_url(swimmer)) {
            Fetched::Page(html) => parse_swimmer_search(&html),
            Fetched::Unavailable => Lookup::Unavailable,
        }
    }

    pub fn personal_best(
        &self,
        source: &dyn PageSource,
        swimmer_id: &str,
        event_id: &str,
    ) -> Lookup<PersonalBest> {
        match source.get(&self.personal_best_url(swimmer_id, event_id)) {
            Fetched::Page(html) => parse_personal_best(&html),
            Fetched::Unavailable => Lookup::Unavailable,
        }
    }
}

impl Default for Tempus {
    fn default() -> Self {
        Self {
            base: Url::parse(TEMPUS_BASE_URL).expect("valid Tempus base url"),
        }
    }
}

/// Swimmer id from the first hit of a swimmer search.
pub fn parse_swimmer_search(html: &str) -> Lookup<String> {
    let doc = Html::parse_document(html);
    let Some(first_hit) = doc.select(&ROWS).nth(1) else {
        debug!("swimmer search returned no rows");
        return Lookup::NotFound;
    };
    if element_text(first_hit) == NO_MATCH_MARKER {
        return Lookup::NotFound;
    }
    match first_href(first_hit).and_then(|href| href.rsplit("id=").next()) {
        Some(id) if !id.is_empty() => Lookup::Found(id.to_string()),
        _ => Lookup::NotFound,
    }
}

/// Meet, date and time of the fastest swim on a "distance" page. A page
/// without data rows means the swimmer has never swum the event.
pub fn parse_personal_best(html: &str) -> Lookup<PersonalBest> {
    let doc = Html::parse_document(html);
    let Some(fastest) = doc.select(&ROWS).nth(1) else {
        return Lookup::NotFound;
    };
    let cells: Vec<String> = fastest.select(&CELLS).map(element_text).collect();
    if cells.len() < 3 {
        return Lookup::NotFound;
    }
    let time = &cells[0];
    let time = time.strip_prefix("00:").unwrap_or(time);
    let time = time.strip_prefix('0').unwrap_or(time);
    Lookup::Found(PersonalBest {
        meet_name: cells[cells.len() - 1].clone(),
        meet_date: cells[cells.len() - 2].clone(),
        backup_time: time.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_encodes_form_fields() {
        let tempus = Tempus::default();
        let swimmer = SwimmerIdentity::new("Anna Maria Berg", "2009", "SK Neptun");
        let url = tempus.swimmer_search_url(&swimmer);
        assert!(url.starts_with("https://www.tempusopen.se/index.php?r=swimmer%2Findex"));
        assert!(url.contains("Swimmer%5Blast_name%5D=Maria+Berg"));
        assert!(url.ends_with("&ajax=swimmer-grid"));
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let tempus = Tempus::new("http://localhost:8080/tempus/").unwrap();
        let swimmer = SwimmerIdentity::new("Anna Berg", "2009", "SK Neptun");
        assert!(
            tempus
                .swimmer_search_url(&swimmer)
                .starts_with("http://localhost:8080/tempus/index.php?r=swimmer%2Findex")
        );
        assert_eq!(
            tempus.all_events_url("7"),
            "http://localhost:8080/tempus/index.php?r=swimmer/view&id=7"
        );
    }

    #[test]
    fn search_marker_means_not_found() {
        let html = "<table><tr><th>Namn</th></tr><tr><td>Inget hittades</td></tr></table>";
        assert_eq!(parse_swimmer_search(html), Lookup::NotFound);
    }

    #[test]
    fn search_hit_yields_id() {
        let html = r#"<table><tr><th>Namn</th></tr>
            <tr><td><a href="/index.php?r=swimmer/view&amp;id=4711">Berg, Anna</a></td><td>SK Neptun</td></tr>
            </table>"#;
        assert_eq!(parse_swimmer_search(html), Lookup::Found("4711".into()));
    }

    #[test]
    fn personal_best_strips_zero_padding() {
        let html = r#"<table>
            <tr><th>Tid</th><th>Poäng</th><th>Datum</th><th>Tävling</th></tr>
            <tr><td>00:01:08.02</td><td>512</td><td>2023-03-11</td><td>Sum-Sim 2023</td></tr>
            <tr><td>00:01:09.90</td><td>480</td><td>2022-11-05</td><td>Sundsvall Open</td></tr>
            </table>"#;
        let Lookup::Found(pb) = parse_personal_best(html) else {
            panic!("expected a personal best");
        };
        assert_eq!(pb.backup_time, "1:08.02");
        assert_eq!(pb.meet_date, "2023-03-11");
        assert_eq!(pb.meet_name, "Sum-Sim 2023");
    }

    #[test]
    fn empty_distance_page_is_not_found() {
        assert_eq!(parse_personal_best("<p>Inga tider</p>"), Lookup::NotFound);
    }
}
