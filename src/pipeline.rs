use tracing::debug;

use crate::caches::IdentityCaches;
use crate::event_ids::{canonical_event_name, event_distance, is_medley, tempus_event_id};
use crate::event_matcher::is_correct_event;
use crate::http_client::PageSource;
use crate::livetiming::LiveTiming;
use crate::model::{BestSwim, Lookup, MeetRef, PersonalBest, ResolveError, SwimmerIdentity};
use crate::splits::{SplitRecord, SplitTime, extract_splits, fastest_swim, fifty_result};
use crate::tempus::Tempus;

const EVENT_HEADER_PREFIXES: [&str; 2] = ["Gren ", "Event "];
const ROSTER_HEADER_PREFIXES: [&str; 2] = ["Plac Namn ", "Rank Name "];
const EDITION_END_PREFIXES: [&str; 3] = ["Grenen officiell", "Event official", "Results official"];

/// The two sites a run talks to.
#[derive(Debug, Clone, Default)]
pub struct Sites {
    pub tempus: Tempus,
    pub livetiming: LiveTiming,
}

/// Resolves a heat list entry into the splits of that swimmer's personal
/// best, going Tempus swimmer → Tempus personal best → LiveTiming meet →
/// LiveTiming results.
pub struct Resolver<'a> {
    source: &'a dyn PageSource,
    sites: &'a Sites,
    caches: &'a mut IdentityCaches,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn PageSource, sites: &'a Sites, caches: &'a mut IdentityCaches) -> Self {
        Self {
            source,
            sites,
            caches,
        }
    }

    /// Never fails: a resolution that stops early yields a placeholder with
    /// the error and whatever was resolved before it.
    pub fn best_swim(&mut self, swimmer: &SwimmerIdentity, event_name: &str, pool: &str) -> BestSwim {
        let best = self.resolve(swimmer, event_name, pool);
        if let Some(err) = &best.error {
            debug!(swimmer = %swimmer.name, event = event_name, "{err}");
        }
        best
    }

    fn resolve(&mut self, swimmer: &SwimmerIdentity, event_name: &str, pool: &str) -> BestSwim {
        let sites = self.sites;
        let tempus = &sites.tempus;

        let swimmer_id = match self.swimmer_id(swimmer) {
            Lookup::Found(id) => id,
            Lookup::NotFound => {
                return BestSwim::failed(ResolveError::SwimmerNotFound(swimmer.name.clone()));
            }
            Lookup::Unavailable => {
                return BestSwim::failed(ResolveError::ResultsUnavailable(
                    tempus.swimmer_search_url(swimmer),
                ));
            }
        };

        let event = canonical_event_name(event_name);
        let Some(event_id) = tempus_event_id(&event, pool) else {
            return BestSwim::failed(ResolveError::UnknownEvent {
                event,
                pool: pool.to_string(),
            });
        };

        let all_times_url = tempus.personal_best_url(&swimmer_id, event_id);
        let mut best = BestSwim {
            all_times_url: Some(all_times_url.clone()),
            all_events_url: Some(tempus.all_events_url(&swimmer_id)),
            ..BestSwim::default()
        };

        let personal_best = match tempus.personal_best(self.source, &swimmer_id, event_id) {
            Lookup::Found(pb) => pb,
            Lookup::NotFound => return with_error(best, ResolveError::NeverSwum),
            Lookup::Unavailable => {
                return with_error(best, ResolveError::ResultsUnavailable(all_times_url));
            }
        };
        let PersonalBest {
            meet_name,
            meet_date,
            backup_time,
        } = personal_best;
        best.meet_name = Some(meet_name.clone());
        best.meet_date = Some(meet_date.clone());
        best.final_time = Some(backup_time);

        let meet = match self.meet(&meet_name, &meet_date) {
            Lookup::Found(meet) => meet,
            Lookup::NotFound => return with_error(best, ResolveError::MeetNotFound(meet_name)),
            Lookup::Unavailable => {
                let archive_url = sites.livetiming.archive_url();
                return with_error(best, ResolveError::ResultsUnavailable(archive_url));
            }
        };
        let result_url = sites.livetiming.results_url(&meet.id);
        best.result_url = Some(result_url.clone());
        best.meet_location = Some(meet.location.clone());

        let Some(rows) = self.meet_results(&meet.id) else {
            return with_error(best, ResolveError::ResultsUnavailable(result_url));
        };
        let meet_year = meet_date.get(..4).and_then(|y| y.parse::<i32>().ok());
        let splits = splits_from_meet(rows, &event, swimmer, meet_year);

        let required = event_distance(&event).map_or(50, |d| d.min(50));
        let Some(splits) = splits.filter(|s| s.has_checkpoint(required)) else {
            return with_error(best, ResolveError::NoSplitsFound(meet.id));
        };

        best.final_time = splits.final_time().map(str::to_string);
        best.avg50 = if is_medley(&event) { None } else { splits.avg50() };
        best.splits = Some(splits);
        best
    }

    fn swimmer_id(&mut self, swimmer: &SwimmerIdentity) -> Lookup<String> {
        if let Some(id) = self.caches.swimmer_id(swimmer) {
            return Lookup::Found(id.to_string());
        }
        let found = self.sites.tempus.find_swimmer(self.source, swimmer);
        if let Lookup::Found(id) = &found {
            self.caches.insert_swimmer_id(swimmer, id);
        }
        found
    }

    fn meet(&mut self, meet_name: &str, meet_date: &str) -> Lookup<MeetRef> {
        if let Some(meet) = self.caches.meet(meet_name) {
            return Lookup::Found(meet.clone());
        }
        let found = self.sites.livetiming.find_meet(self.source, meet_name, meet_date);
        if let Lookup::Found(meet) = &found {
            self.caches.insert_meet(meet_name, meet.clone());
        }
        found
    }

    fn meet_results(&mut self, meet_id: &str) -> Option<&[String]> {
        if self.caches.meet_results(meet_id).is_none() {
            match self.sites.livetiming.meet_results(self.source, meet_id) {
                Lookup::Found(rows) => self.caches.insert_meet_results(meet_id, rows),
                Lookup::NotFound | Lookup::Unavailable => return None,
            }
        }
        self.caches.meet_results(meet_id)
    }
}

fn with_error(mut best: BestSwim, error: ResolveError) -> BestSwim {
    best.error = Some(error);
    best
}

fn is_event_header(row: &str) -> bool {
    EVENT_HEADER_PREFIXES.iter().any(|p| row.starts_with(p))
}

/// Roster slices of every edition (heats, final, ...) of `event` in a meet's
/// result rows.
pub fn event_editions<'r>(rows: &'r [String], event: &str) -> Vec<&'r [String]> {
    let mut editions = Vec::new();
    let mut in_event = false;
    let mut roster_start = None;

    for (i, row) in rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        if is_event_header(row) {
            if let Some(start) = roster_start.take() {
                editions.push(&rows[start..i]);
            }
            in_event = is_correct_event(row, event);
            continue;
        }
        if !in_event {
            continue;
        }
        match roster_start {
            None => {
                if ROSTER_HEADER_PREFIXES.iter().any(|p| row.starts_with(p)) {
                    roster_start = Some(i + 1);
                }
            }
            Some(start) => {
                if EDITION_END_PREFIXES.iter().any(|p| row.starts_with(p)) {
                    editions.push(&rows[start..i]);
                    roster_start = None;
                    in_event = false;
                }
            }
        }
    }
    if let Some(start) = roster_start {
        editions.push(&rows[start..]);
    }
    editions
}

/// Swimmer rows read `rank first [middle] last born club ...`. Some meets
/// print age instead of birth year, so `meet_year - age` is accepted too.
fn is_swimmer_row(tokens: &[&str], swimmer: &SwimmerIdentity, meet_year: Option<i32>) -> bool {
    let born: Option<i32> = swimmer.born.parse().ok();
    let year_matches = |token: &str| {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if token == swimmer.born {
            return true;
        }
        match (meet_year, token.parse::<i32>().ok(), born) {
            (Some(year), Some(age), Some(born)) => year - age == born,
            _ => false,
        }
    };
    [2, 3].into_iter().any(|name_len| {
        tokens.len() > name_len + 1
            && tokens[1..=name_len].join(" ") == swimmer.name
            && year_matches(tokens[name_len + 1])
    })
}

fn is_ranked_row(first_token: &str) -> bool {
    first_token.starts_with('=')
        || (!first_token.is_empty() && first_token.bytes().all(|b| b.is_ascii_digit()))
}

/// Splits of `swimmer` within one edition of an event, if they swam it.
pub fn splits_from_edition(
    rows: &[String],
    event: &str,
    swimmer: &SwimmerIdentity,
    meet_year: Option<i32>,
) -> Option<SplitRecord> {
    let sprint_distance = event_distance(event).filter(|d| *d <= 50);
    let mut block: Vec<&str> = Vec::new();
    let mut in_block = false;

    for row in rows {
        if row.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = row.split(' ').collect();
        if is_swimmer_row(&tokens, swimmer, meet_year) {
            if let Some(distance) = sprint_distance {
                let time = fifty_result(row)?;
                let mut record = SplitRecord::new();
                record.insert(distance, SplitTime::new(time));
                return Some(record);
            }
            in_block = true;
            continue;
        }
        if !in_block {
            continue;
        }
        if is_ranked_row(tokens[0]) {
            if !block.is_empty() {
                return Some(extract_splits(&block));
            }
            in_block = false;
            continue;
        }
        block.push(row);
    }
    (!block.is_empty()).then(|| extract_splits(&block))
}

/// Fastest swim of `swimmer` in `event` across all editions in a meet.
pub fn splits_from_meet(
    rows: &[String],
    event: &str,
    swimmer: &SwimmerIdentity,
    meet_year: Option<i32>,
) -> Option<SplitRecord> {
    let records: Vec<SplitRecord> = event_editions(rows, event)
        .into_iter()
        .filter_map(|edition| splits_from_edition(edition, event, swimmer, meet_year))
        .collect();
    fastest_swim(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    fn anna() -> SwimmerIdentity {
        SwimmerIdentity::new("Anna Berg", "2009", "SK Neptun")
    }

    #[test]
    fn editions_end_at_official_marker_or_next_header() {
        let rows = rows(&[
            "Gren 3 100m Frisim Damer",
            "Plac Namn Född Klubb Tid",
            "1 Anna Berg 2009 SK Neptun 1:08.02",
            "Grenen officiell 10:31",
            "Gren 4 100m Ryggsim Damer",
            "Plac Namn Född Klubb Tid",
            "1 Eva Ek 2008 Tibro SK 1:10.00",
            "Gren 9 100m Frisim Damer Final",
            "Plac Namn Född Klubb Tid",
            "1 Anna Berg 2009 SK Neptun 1:07.50",
            "Gren 10 200m Frisim Damer",
            "Plac Namn Född Klubb Tid",
            "1 Eva Ek 2008 Tibro SK 2:30.00",
        ]);
        let editions = event_editions(&rows, "100m Frisim");
        assert_eq!(editions.len(), 2);
        assert_eq!(editions[0], &rows[2..3]);
        assert_eq!(editions[1], &rows[9..10]);
    }

    #[test]
    fn english_results_layout() {
        let rows = rows(&[
            "Event 5 200m Freestyle Women",
            "Rank Name Born Club Time",
            "1 Eva Ek 2008 Tibro SK 2:12.00",
            "50m: 30.00 100m: 1:04.00 (34.00) 150m: 1:38.00 (34.00) 200m: 2:12.00 (34.00)",
            "2 Anna Berg 2009 SK Neptun 2:15.00",
            "50m: 30.00 100m: 1:05.00 (35.00) 150m: 1:40.00 (35.00) 200m: 2:15.00 (35.00)",
            "Results official 12:04",
            "Event 6 100m Backstroke Women",
            "Rank Name Born Club Time",
            "1 Anna Berg 2009 SK Neptun 1:01.00",
            "50m: 29.00 100m: 1:01.00 (32.00)",
        ]);
        let editions = event_editions(&rows, "200m Frisim");
        assert_eq!(editions.len(), 1);
        assert_eq!(editions[0], &rows[2..6]);

        let splits = splits_from_meet(&rows, "200m Frisim", &anna(), Some(2023)).unwrap();
        assert_eq!(splits.final_time(), Some("2:15.00"));
        assert_eq!(splits.len(), 4);
    }

    #[test]
    fn swimmer_block_runs_to_next_ranked_row() {
        let edition = rows(&[
            "1 Eva Ek 2008 Tibro SK 1:05.00",
            "50m: 31.00 100m: 1:05.00 (34.00)",
            "2 Anna Berg 2009 SK Neptun 1:08.02",
            "50m: 32.10 100m: 1:08.02 (35.92)",
            "=3 Lisa Holm 2009 Väsby SS 1:09.00",
        ]);
        let splits = splits_from_edition(&edition, "100m Frisim", &anna(), Some(2023)).unwrap();
        assert_eq!(splits.final_time(), Some("1:08.02"));
        assert_eq!(splits.get(50).unwrap().time, "32.10");
    }

    #[test]
    fn last_swimmer_of_edition_is_flushed() {
        let edition = rows(&[
            "1 Eva Ek 2008 Tibro SK 1:05.00",
            "2 Anna Berg 2009 SK Neptun 1:08.02",
            "50m: 32.10 100m: 1:08.02 (35.92)",
        ]);
        assert!(splits_from_edition(&edition, "100m Frisim", &anna(), Some(2023)).is_some());
    }

    #[test]
    fn age_instead_of_birth_year_is_accepted() {
        let edition = rows(&[
            "2 Anna Maria Berg 14 SK Neptun 1:08.02",
            "50m: 32.10 100m: 1:08.02 (35.92)",
        ]);
        let swimmer = SwimmerIdentity::new("Anna Maria Berg", "2009", "SK Neptun");
        assert!(splits_from_edition(&edition, "100m Frisim", &swimmer, Some(2023)).is_some());
        assert!(splits_from_edition(&edition, "100m Frisim", &swimmer, Some(2024)).is_none());
    }

    #[test]
    fn sprint_events_read_the_swimmer_row() {
        let edition = rows(&["4 Anna Berg 2009 SK Neptun 0.71 410 30.55 +1.20"]);
        let splits = splits_from_edition(&edition, "50m Fjärilsim", &anna(), Some(2023)).unwrap();
        assert_eq!(splits.get(50).unwrap().time, "30.55");

        let edition = rows(&["4 Anna Berg 2009 SK Neptun 0.71 210 15.05"]);
        let splits = splits_from_edition(&edition, "25m Frisim", &anna(), Some(2023)).unwrap();
        assert!(splits.has_checkpoint(25));
    }

    #[test]
    fn fastest_edition_wins() {
        let rows = rows(&[
            "Gren 3 100m Frisim Damer",
            "Plac Namn Född Klubb Tid",
            "1 Anna Berg 2009 SK Neptun 1:09.00",
            "50m: 33.00 100m: 1:09.00 (36.00)",
            "Grenen officiell",
            "Gren 9 100m Frisim Damer Final",
            "Plac Namn Född Klubb Tid",
            "1 Anna Berg 2009 SK Neptun 1:08.02",
            "50m: 32.10 100m: 1:08.02 (35.92)",
            "Grenen officiell",
        ]);
        let splits = splits_from_meet(&rows, "100m Frisim", &anna(), Some(2023)).unwrap();
        assert_eq!(splits.final_time(), Some("1:08.02"));
    }
}
