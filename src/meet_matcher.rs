use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::text::normalize;

/// Tempus names known to differ from their LiveTiming counterpart beyond what
/// the token comparison can bridge. Keys are matched exactly, before
/// lowercasing.
pub const MEET_NAME_ALIASES: &[(&str, &str)] = &[
    (
        "JSM/Sum-Sim äldre & Sum-Sim 16 år 2021",
        "JSM/Sum-Sim äldre & Sum-Sim 16 år (50m)",
    ),
    (
        "Eskilstuna Sprint (25m) 2023",
        "UGP 2 2023 (50m), Eskilstuna & Eskilstuna-Sprint",
    ),
    (
        "Zoggs Zwim Stockholm - Summer Cup 2023",
        "Zoggs Zwim - Summer Cup",
    ),
    ("HEAD Summer Cup 2021", "Polisen Head Summer Cup"),
    ("Eskilstuna Sprint 2022", "UGP 2 2022 med Eskilstuna Sprint"),
    (
        "DM-JDM (50m) 2022 Eskilstuna",
        "DM-JDM (50m) 2022 Mellansvenska",
    ),
];

/// Token groups collapsed into a single token, applied in order.
const ABBREVIATIONS: &[(&[&str], &str)] = &[
    (&["ungdoms", "gp"], "ugp"),
    (&["ungdoms", "grand", "prix"], "ugp"),
    (&["långbana"], "50"),
    (&["kortbana"], "25"),
    (&["bockstendsdoppet"], "bockstensdoppet"),
    (&["eriksdal"], "eriksdalsbadet"),
];

const STOP_WORDS: &[&str] = &[
    "med", "och", "i", "på", "hos", "vid", "till", "för", "av", "en", "ett", "två", "tre",
    "fyra", "bassäng", "bassängen", "simhall", "simhallen", "sim", "simning", "simningen",
    "simtävling", "simtävlingen", "arena", "arenan", "pool", "poolen", "bad", "badet", "badhus",
    "badhuset", "simarena", "simarenan", "simbassäng", "simbassängen", "&",
];

static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+|\D+").expect("digit run regex"));

fn alias(name: &str) -> &str {
    MEET_NAME_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map_or(name, |(_, to)| *to)
}

/// Strip punctuation, drop the `m` from pool lengths and separate digit runs
/// from letters so "UGP2" and "UGP 2" compare equal.
pub fn clean_meet_name(name: &str) -> String {
    let name = name
        .replace(['(', ')'], "")
        .replace([',', '-', '.'], " ")
        .replace("50m", "50")
        .replace("25m", "25");
    let spaced = DIGIT_RUNS
        .find_iter(&name)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&spaced)
}

fn meet_tokens(cleaned: &str, year: &str) -> HashSet<String> {
    let mut tokens: HashSet<String> = cleaned
        .split(' ')
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect();
    for (group, replacement) in ABBREVIATIONS {
        if group.iter().all(|t| tokens.contains(*t)) {
            for t in *group {
                tokens.remove(*t);
            }
            tokens.insert((*replacement).to_string());
        }
    }
    tokens.insert(year.to_string());
    tokens
}

fn year_of(date: &str) -> &str {
    date.get(..4).unwrap_or(date)
}

/// Whether a Tempus meet (name, ISO date) and a LiveTiming archive entry
/// refer to the same meet.
pub fn meet_names_match(name_a: &str, date_a: &str, name_b: &str, date_b: &str) -> bool {
    let (year_a, year_b) = (year_of(date_a), year_of(date_b));
    if year_a != year_b {
        return false;
    }

    let a = alias(name_a).to_lowercase();
    let b = alias(name_b).to_lowercase();
    if a == b {
        return true;
    }

    let a = clean_meet_name(&a);
    let b = clean_meet_name(&b);
    if a == b {
        return true;
    }

    meet_tokens(&a, year_a) == meet_tokens(&b, year_b)
}
