use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::splits::SplitRecord;

/// A competitor as listed on a LiveTiming heat list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwimmerIdentity {
    /// "First Last", possibly with a middle name.
    pub name: String,
    /// Four-digit birth year.
    pub born: String,
    pub club: String,
}

impl SwimmerIdentity {
    pub fn new(name: impl Into<String>, born: impl Into<String>, club: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            born: born.into(),
            club: club.into(),
        }
    }

    /// Key used by the swimmer id cache file.
    pub fn cache_key(&self) -> String {
        format!("{}, {}, {}", self.name, self.born, self.club)
    }

    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }

    pub fn last_name(&self) -> String {
        self.name.split(' ').skip(1).collect::<Vec<_>>().join(" ")
    }
}

/// A LiveTiming meet resolved from a Tempus meet name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetRef {
    pub id: String,
    pub location: String,
}

/// The meet where a swimmer set their personal best, as listed by Tempus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalBest {
    pub meet_name: String,
    pub meet_date: String,
    /// Tempus' own time, used when LiveTiming can't provide splits.
    pub backup_time: String,
}

/// Outcome of a lookup against one of the sites.
///
/// `NotFound` means the site answered with a well-formed "nothing here" page;
/// `Unavailable` means the request itself failed and may succeed later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Unavailable,
}

/// Why a (swimmer, event) resolution stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ResolveError {
    #[error("Error getting Tempus swimmer id. Swimmer name: {0}.")]
    SwimmerNotFound(String),
    #[error("Error getting Tempus event id. Event name: {event}, Pool: {pool}.")]
    UnknownEvent { event: String, pool: String },
    #[error("First time swimming the event.")]
    NeverSwum,
    #[error("Error getting LiveTiming meet id and location. Meet name: {0}.")]
    MeetNotFound(String),
    #[error("Page unavailable: {0}")]
    ResultsUnavailable(String),
    #[error("Error getting splits from LiveTiming. Meet id: {0}.")]
    NoSplitsFound(String),
}

/// Best swim for one (swimmer, event) pair.
///
/// Every field is optional so a failed resolution can still carry whatever
/// was resolved before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestSwim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg50: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splits: Option<SplitRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_times_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_events_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResolveError>,
}

impl BestSwim {
    pub fn failed(error: ResolveError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.splits.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneResult {
    pub lane: u32,
    pub name: String,
    pub best: BestSwim,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResults {
    pub number: String,
    pub name: String,
    /// Heat number → swimmers of that heat, in roster order.
    pub heats: BTreeMap<u32, Vec<LaneResult>>,
    pub total_heats: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    pub meet_name: String,
    pub session_number: String,
    pub events: Vec<EventResults>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_name_into_first_and_rest() {
        let s = SwimmerIdentity::new("Anna Maria Berg", "2008", "Spårvägen");
        assert_eq!(s.first_name(), "Anna");
        assert_eq!(s.last_name(), "Maria Berg");
        assert_eq!(s.cache_key(), "Anna Maria Berg, 2008, Spårvägen");
    }

    #[test]
    fn failure_placeholder_round_trips_through_json() {
        let mut best = BestSwim::failed(ResolveError::MeetNotFound("Sum-Sim 2023".into()));
        best.final_time = Some("1:05.12".into());
        let json = serde_json::to_string(&best).unwrap();
        let back: BestSwim = serde_json::from_str(&json).unwrap();
        assert_eq!(back, best);
        assert!(!back.is_complete());
    }
}
