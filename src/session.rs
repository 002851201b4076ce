use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::http_client::PageSource;
use crate::livetiming::{Heat, parse_heat_list, parse_session_page, session_number};
use crate::model::{EventResults, LaneResult, SessionResults};
use crate::pipeline::{Resolver, Sites};
use crate::progress::Progress;

/// Walks a LiveTiming session: session page → each event's heat list →
/// each swimmer of the last `heats` heats.
pub struct SessionCrawler<'a> {
    source: &'a dyn PageSource,
    sites: &'a Sites,
    heats: u32,
}

impl<'a> SessionCrawler<'a> {
    pub fn new(source: &'a dyn PageSource, sites: &'a Sites, heats: u32) -> Self {
        Self {
            source,
            sites,
            heats: heats.max(1),
        }
    }

    pub fn crawl(
        &self,
        session_url: &str,
        resolver: &mut Resolver<'_>,
        progress: &Progress,
    ) -> Result<SessionResults> {
        let html = self
            .source
            .get(session_url)
            .into_page()
            .with_context(|| format!("session page unavailable: {session_url}"))?;
        let page = parse_session_page(&html).context("failed to parse session page")?;
        info!(meet = %page.meet_name, events = page.event_count, "crawling session");
        progress.set_events(page.event_count);

        let mut events = Vec::new();
        for event in &page.events {
            if let Some(href) = &event.heat_list_href {
                if let Some(results) = self.crawl_event(&event.number, href, resolver, progress) {
                    events.push(results);
                }
            }
            progress.event_done();
        }

        Ok(SessionResults {
            meet_name: page.meet_name,
            session_number: session_number(session_url).to_string(),
            events,
        })
    }

    fn crawl_event(
        &self,
        number: &str,
        href: &str,
        resolver: &mut Resolver<'_>,
        progress: &Progress,
    ) -> Option<EventResults> {
        let url = self.sites.livetiming.heat_list_url(href);
        let Some(html) = self.source.get(&url).into_page() else {
            warn!(event = number, url = %url, "heat list unavailable, skipping event");
            return None;
        };
        let Some(list) = parse_heat_list(&html) else {
            warn!(event = number, url = %url, "heat list has no heats, skipping event");
            return None;
        };
        if !list.is_individual_event() {
            info!(event = number, name = %list.event_name, "skipping relay or extra heat");
            return None;
        }

        let selected = self.last_heats(&list.heats, list.total_heats);
        let mut heats: BTreeMap<u32, Vec<LaneResult>> = BTreeMap::new();
        for (done, heat) in selected.iter().enumerate() {
            progress.heat(number, done as u32, selected.len() as u32);
            let lanes = heats.entry(heat.number).or_default();
            for entry in &heat.entries {
                let best = resolver.best_swim(&entry.swimmer, &list.event_name, &list.pool);
                lanes.push(LaneResult {
                    lane: entry.lane,
                    name: entry.swimmer.name.clone(),
                    best,
                });
            }
        }
        progress.heat(number, selected.len() as u32, selected.len() as u32);

        Some(EventResults {
            number: number.to_string(),
            name: list.event_name,
            heats,
            total_heats: list.total_heats,
        })
    }

    /// Heats numbered above `total - heats`; the last heat on the page is
    /// always included.
    fn last_heats<'h>(&self, heats: &'h [Heat], total: u32) -> Vec<&'h Heat> {
        let cutoff = total.saturating_sub(self.heats);
        let last = heats.len().saturating_sub(1);
        heats
            .iter()
            .enumerate()
            .filter(|(i, heat)| heat.number > cutoff || *i == last)
            .map(|(_, heat)| heat)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::Fetched;

    struct NoPages;

    impl PageSource for NoPages {
        fn get(&self, _url: &str) -> Fetched {
            Fetched::Unavailable
        }
    }

    fn heats(numbers: &[u32]) -> Vec<Heat> {
        numbers
            .iter()
            .map(|n| Heat {
                number: *n,
                entries: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn keeps_only_the_last_heats() {
        let sites = Sites::default();
        let crawler = SessionCrawler::new(&NoPages, &sites, 2);
        let all = heats(&[1, 2, 3, 4, 5]);
        let kept: Vec<u32> = crawler.last_heats(&all, 5).iter().map(|h| h.number).collect();
        assert_eq!(kept, vec![4, 5]);
    }

    #[test]
    fn more_requested_than_available_keeps_all() {
        let sites = Sites::default();
        let crawler = SessionCrawler::new(&NoPages, &sites, 100);
        let all = heats(&[1, 2, 3]);
        assert_eq!(crawler.last_heats(&all, 3).len(), 3);
    }

    #[test]
    fn zero_is_clamped_to_one_heat() {
        let sites = Sites::default();
        let crawler = SessionCrawler::new(&NoPages, &sites, 0);
        let all = heats(&[1, 2, 3]);
        let kept: Vec<u32> = crawler.last_heats(&all, 3).iter().map(|h| h.number).collect();
        assert_eq!(kept, vec![3]);
    }

    #[test]
    fn unavailable_session_page_is_a_run_error() {
        let sites = Sites::default();
        let mut caches = crate::caches::IdentityCaches::default();
        let mut resolver = Resolver::new(&NoPages, &sites, &mut caches);
        let crawler = SessionCrawler::new(&NoPages, &sites, 1);
        let err = crawler
            .crawl("https://www.livetiming.se/program.php?cid=1&session=1", &mut resolver, &Progress::hidden())
            .unwrap_err();
        assert!(err.to_string().contains("session page unavailable"));
    }
}
