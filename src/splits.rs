use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Time at one checkpoint, plus the lap time since the previous checkpoint
/// when the result table lists one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTime {
    pub time: String,
    pub lap: Option<String>,
}

impl SplitTime {
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            lap: None,
        }
    }

    pub fn with_lap(time: impl Into<String>, lap: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            lap: Some(lap.into()),
        }
    }

    /// Parse the stored form, e.g. `"1:06.02 (34.08)"` or `"31.94"`.
    pub fn parse_raw(raw: &str) -> Self {
        let mut parts = raw.split(' ');
        let time = parts.next().unwrap_or_default().to_string();
        let lap = parts.next().and_then(parse_lap).map(str::to_string);
        Self { time, lap }
    }

    /// Lap time if present, otherwise the checkpoint time (first checkpoint).
    pub fn lap_or_time(&self) -> &str {
        self.lap.as_deref().unwrap_or(&self.time)
    }
}

impl fmt::Display for SplitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lap {
            Some(lap) => write!(f, "{} ({})", self.time, lap),
            None => f.write_str(&self.time),
        }
    }
}

/// Checkpoint distance in metres → split, ordered by distance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitRecord {
    checkpoints: BTreeMap<u32, SplitTime>,
}

impl SplitRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, distance: u32, split: SplitTime) {
        self.checkpoints.insert(distance, split);
    }

    pub fn get(&self, distance: u32) -> Option<&SplitTime> {
        self.checkpoints.get(&distance)
    }

    pub fn has_checkpoint(&self, distance: u32) -> bool {
        self.checkpoints.contains_key(&distance)
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &SplitTime)> {
        self.checkpoints.iter().map(|(d, s)| (*d, s))
    }

    /// The time at the longest checkpoint, without its lap.
    pub fn final_time(&self) -> Option<&str> {
        self.checkpoints
            .last_key_value()
            .map(|(_, split)| split.time.as_str())
    }

    /// The finish time, when it parses.
    pub fn race_time(&self) -> Option<RaceTime> {
        self.final_time().and_then(RaceTime::parse)
    }

    /// Mean lap time over the interior checkpoints (first and last excluded),
    /// in seconds with at most two decimals.
    pub fn avg50(&self) -> Option<String> {
        let n = self.checkpoints.len();
        if n <= 2 {
            return None;
        }
        let mut total = 0.0;
        for split in self.checkpoints.values().skip(1).take(n - 2) {
            total += RaceTime::parse(split.lap_or_time())?.as_seconds();
        }
        Some(format_seconds(total / (n - 2) as f64))
    }
}

impl Serialize for SplitRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.checkpoints.len()))?;
        for (distance, split) in &self.checkpoints {
            map.serialize_entry(&format!("{distance}m"), &split.to_string())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SplitRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut record = SplitRecord::new();
        for (key, value) in raw {
            let distance = key
                .trim_end_matches('m')
                .parse::<u32>()
                .map_err(|_| D::Error::custom(format!("invalid checkpoint key {key:?}")))?;
            record.insert(distance, SplitTime::parse_raw(&value));
        }
        Ok(record)
    }
}

/// A swim time, stored in hundredths of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RaceTime {
    hundredths: u32,
}

impl RaceTime {
    /// Accepts `m:ss.hh` and `ss.hh`; a single fraction digit means tenths.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (minutes, rest) = match raw.split_once(':') {
            Some((m, rest)) => (m.parse::<u32>().ok()?, rest),
            None => (0, raw),
        };
        let (seconds, fraction) = match rest.split_once('.') {
            Some((s, f)) => (s, f),
            None => (rest, "0"),
        };
        let seconds = seconds.parse::<u32>().ok()?;
        if fraction.is_empty() || fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut hundredths = fraction.parse::<u32>().ok()?;
        if fraction.len() == 1 {
            hundredths *= 10;
        }
        let hundredths = minutes
            .checked_mul(6000)?
            .checked_add(seconds.checked_mul(100)?)?
            .checked_add(hundredths)?;
        Some(Self { hundredths })
    }

    pub fn hundredths(&self) -> u32 {
        self.hundredths
    }

    pub fn as_seconds(&self) -> f64 {
        f64::from(self.hundredths) / 100.0
    }
}

/// Pull the checkpoint splits out of the text rows of one swimmer's result
/// block.
///
/// Rows look like `50m: 31.94 100m: 1:06.02 (34.08) 150m: ...`.
pub fn extract_splits<S: AsRef<str>>(rows: &[S]) -> SplitRecord {
    let mut record = SplitRecord::new();
    for row in rows {
        let tokens: Vec<&str> = row.as_ref().split(' ').collect();
        let mut i = 0;
        while i + 1 < tokens.len() {
            let token = tokens[i];
            if token == "50m:" {
                // Stray colons are common; only trust a numeric value here.
                if starts_with_digit(tokens[i + 1]) {
                    record.insert(50, SplitTime::new(tokens[i + 1]));
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }
            let Some(distance) = checkpoint_distance(token) else {
                i += 1;
                continue;
            };
            let time = tokens[i + 1];
            match tokens.get(i + 2).copied().and_then(parse_lap) {
                Some(lap) => {
                    record.insert(distance, SplitTime::with_lap(time, lap));
                    i += 3;
                }
                None => {
                    record.insert(distance, SplitTime::new(time));
                    i += 2;
                }
            }
        }
    }
    record
}

/// Finish time of a 50m (or shorter) swim, read from the swimmer's own row.
///
/// Such rows carry no checkpoint labels, e.g.
/// `61 Joel Täljsten 2007 Sundsvalls Simsällskap 0.64 536 31.94 +4.91`.
/// Reaction times (`0.64`), deltas (`+4.91`) and the number before a
/// trailing `%` are skipped.
pub fn fifty_result(row: &str) -> Option<String> {
    let tokens: Vec<&str> = row.split(' ').collect();
    let percent_at = (tokens.last() == Some(&"%")).then(|| tokens.len().saturating_sub(2));
    for (i, token) in tokens.iter().enumerate() {
        if !token.contains('.') || Some(i) == percent_at || token.contains('+') {
            continue;
        }
        let whole = token.split('.').next().unwrap_or_default();
        if whole.chars().count() > 1 {
            return Some(token.to_string());
        }
    }
    None
}

/// Pick the fastest of several swims of the same event.
///
/// A single candidate is returned without looking at its times; candidates
/// without any parseable time only win when nothing else can be compared.
pub fn fastest_swim(records: Vec<SplitRecord>) -> Option<SplitRecord> {
    if records.len() <= 1 {
        return records.into_iter().next();
    }
    let mut best: Option<(RaceTime, SplitRecord)> = None;
    let mut untimed: Option<SplitRecord> = None;
    for record in records {
        match record.race_time() {
            Some(time) => {
                if best.as_ref().is_none_or(|(fastest, _)| time < *fastest) {
                    best = Some((time, record));
                }
            }
            None => {
                if untimed.is_none() {
                    untimed = Some(record);
                }
            }
        }
    }
    best.map(|(_, record)| record).or(untimed)
}

fn checkpoint_distance(token: &str) -> Option<u32> {
    let label = token.strip_suffix(':')?;
    if !starts_with_digit(label) {
        return None;
    }
    label.trim_end_matches('m').parse().ok()
}

fn parse_lap(token: &str) -> Option<&str> {
    token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .filter(|t| !t.is_empty())
}

fn starts_with_digit(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn format_seconds(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let mut out = format!("{rounded:.2}");
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.push('0');
    }
    out
}
