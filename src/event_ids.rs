/// Tempus event ids keyed by `"<distance>m <stroke> (<pool>)"`, lowercase.
const TEMPUS_EVENT_IDS: &[(&str, &str)] = &[
    ("25m frisim (25m)", "4"),
    ("25m bröstsim (25m)", "5"),
    ("25m ryggsim (25m)", "6"),
    ("25m fjärilsim (25m)", "7"),
    ("50m frisim (25m)", "11"),
    ("50m frisim (50m)", "12"),
    ("100m frisim (25m)", "13"),
    ("100m frisim (50m)", "14"),
    ("200m frisim (25m)", "15"),
    ("200m frisim (50m)", "16"),
    ("400m frisim (25m)", "17"),
    ("400m frisim (50m)", "18"),
    ("800m frisim (25m)", "19"),
    ("800m frisim (50m)", "20"),
    ("1500m frisim (25m)", "21"),
    ("1500m frisim (50m)", "22"),
    ("50m bröstsim (25m)", "31"),
    ("50m bröstsim (50m)", "32"),
    ("100m bröstsim (25m)", "33"),
    ("100m bröstsim (50m)", "34"),
    ("200m bröstsim (25m)", "35"),
    ("200m bröstsim (50m)", "36"),
    ("50m ryggsim (25m)", "41"),
    ("50m ryggsim (50m)", "42"),
    ("100m ryggsim (25m)", "43"),
    ("100m ryggsim (50m)", "44"),
    ("200m ryggsim (25m)", "45"),
    ("200m ryggsim (50m)", "46"),
    ("50m fjärilsim (25m)", "51"),
    ("50m fjärilsim (50m)", "52"),
    ("100m fjärilsim (25m)", "53"),
    ("100m fjärilsim (50m)", "54"),
    ("200m fjärilsim (25m)", "55"),
    ("200m fjärilsim (50m)", "56"),
    ("100m medley (25m)", "61"),
    ("200m medley (25m)", "63"),
    ("200m medley (50m)", "64"),
    ("400m medley (25m)", "65"),
    ("400m medley (50m)", "66"),
];

/// Keep only the `"<distance> <stroke>"` part of a heat list event name,
/// e.g. `"100m Frisim Damer"` → `"100m Frisim"`.
pub fn canonical_event_name(event_name: &str) -> String {
    event_name.split(' ').take(2).collect::<Vec<_>>().join(" ")
}

pub fn tempus_event_id(event_name: &str, pool: &str) -> Option<&'static str> {
    let key = format!("{event_name} ({pool})").to_lowercase();
    TEMPUS_EVENT_IDS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, id)| *id)
}

/// Distance in metres from an event name such as `"50m Bröstsim"`.
pub fn event_distance(event_name: &str) -> Option<u32> {
    event_name
        .split(' ')
        .next()?
        .strip_suffix('m')?
        .parse()
        .ok()
}

pub fn is_medley(event_name: &str) -> bool {
    event_name.to_lowercase().contains("medley")
}
