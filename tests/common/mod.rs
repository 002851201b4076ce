#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use swim_splits::http_client::{Fetched, PageSource};
use swim_splits::model::SwimmerIdentity;
use swim_splits::pipeline::Sites;

pub const SESSION_URL: &str = "https://www.livetiming.se/program.php?cid=7000&session=2";

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Serves canned pages by exact URL and records every request.
#[derive(Default)]
pub struct FixtureSource {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl FixtureSource {
    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Drop a page so requests for it fail like a timeout would.
    pub fn without(mut self, url: &str) -> Self {
        self.pages.remove(url);
        self
    }

    pub fn requests_for(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl PageSource for FixtureSource {
    fn get(&self, url: &str) -> Fetched {
        self.requests.borrow_mut().push(url.to_string());
        match self.pages.get(url) {
            Some(body) => Fetched::Page(body.clone()),
            None => Fetched::Unavailable,
        }
    }
}

pub fn anna() -> SwimmerIdentity {
    SwimmerIdentity::new("Anna Berg", "2009", "SK Neptun")
}

pub fn eva() -> SwimmerIdentity {
    SwimmerIdentity::new("Eva Ek", "2008", "Tibro SK")
}

pub fn lisa() -> SwimmerIdentity {
    SwimmerIdentity::new("Lisa Holm", "2009", "Väsby SS")
}

pub fn maja() -> SwimmerIdentity {
    SwimmerIdentity::new("Maja Lind", "2010", "SK Neptun")
}

fn search_hit(id: &str, name: &str) -> String {
    format!(
        r#"<table><tr><th>Namn</th><th>Klubb</th></tr>
        <tr><td><a href="/index.php?r=swimmer/view&amp;id={id}">{name}</a></td> <td>Klubb</td></tr></table>"#
    )
}

const SEARCH_MISS: &str =
    "<table><tr><th>Namn</th><th>Klubb</th></tr><tr><td colspan=\"2\">Inget hittades</td></tr></table>";

pub fn distance_page(rows: &[(&str, &str, &str)]) -> String {
    let mut html = String::from(
        "<table><tr><th>Tid</th> <th>Poäng</th> <th>Datum</th> <th>Tävling</th></tr>",
    );
    for (time, date, meet) in rows {
        html.push_str(&format!(
            "<tr><td>{time}</td> <td>500</td> <td>{date}</td> <td>{meet}</td></tr>"
        ));
    }
    html.push_str("</table>");
    html
}

/// Tempus and LiveTiming as seen by the 200m freestyle (25m pool) fixtures:
/// Anna resolves fully, Eva is unknown to Tempus, Lisa has never swum the
/// event and Maja's best meet is missing from the LiveTiming archive.
pub fn fixture_source(sites: &Sites) -> FixtureSource {
    let tempus = &sites.tempus;
    let livetiming = &sites.livetiming;
    FixtureSource::default()
        .with(tempus.swimmer_search_url(&anna()), search_hit("100", "Berg, Anna"))
        .with(tempus.swimmer_search_url(&eva()), SEARCH_MISS)
        .with(tempus.swimmer_search_url(&lisa()), search_hit("300", "Holm, Lisa"))
        .with(tempus.swimmer_search_url(&maja()), search_hit("400", "Lind, Maja"))
        .with(
            tempus.personal_best_url("100", "15"),
            distance_page(&[
                ("00:02:15.00", "2023-03-11", "Sum-Sim Regionfinal 2023"),
                ("00:02:18.40", "2022-11-05", "Sundsvall Open"),
            ]),
        )
        .with(tempus.personal_best_url("300", "15"), distance_page(&[]))
        .with(
            tempus.personal_best_url("400", "15"),
            distance_page(&[("00:02:20.50", "2023-10-01", "Höstsimiaden 2023")]),
        )
        .with(livetiming.archive_url(), read_fixture("archive.html"))
        .with(livetiming.results_url("5000"), read_fixture("results_5000.html"))
        .with(SESSION_URL, read_fixture("session.html"))
        .with(
            livetiming.heat_list_url("heats.php?cid=7000&event=1"),
            read_fixture("heatlist_event1.html"),
        )
        .with(
            livetiming.heat_list_url("heats.php?cid=7000&event=2"),
            read_fixture("heatlist_event2.html"),
        )
}
