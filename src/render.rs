use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate};

use crate::model::{BestSwim, EventResults, LaneResult, ResolveError, SessionResults};
use crate::splits::SplitRecord;

const MONTHS: [&str; 12] = [
    "januari",
    "februari",
    "mars",
    "april",
    "maj",
    "juni",
    "juli",
    "augusti",
    "september",
    "oktober",
    "november",
    "december",
];

const FIRST_TIME_LABEL: &str = "Första gången";
const ERROR_LABEL: &str = "Error";

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="sv">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Splits</title>
<style>
body { font-family: system-ui, sans-serif; margin: 0; color: #222; }
header { padding: 16px 24px; border-bottom: 1px solid #ddd; }
h1, h2 { margin: 0; }
h2 { font-weight: normal; color: #666; }
.two-columns { display: flex; }
.event-menu { width: 260px; border-right: 1px solid #ddd; }
.event-item { padding: 8px 16px; cursor: pointer; }
.event-item * { pointer-events: none; }
.event-selected { background: #eef3ff; }
.right-column { flex: 1; padding: 0 24px; }
.heat-item, .swimmer-item { cursor: pointer; }
.heat-column-headers, .swimmer-item-text, .split-row { display: flex; gap: 16px; }
.split-row-col { flex: 1; display: flex; gap: 8px; }
.hidden { display: none; }
.pt12-gray3, .pt14-gray3 { color: #888; }
.pt14-gray4 { color: #bbb; }
.inactive-link { color: inherit; text-decoration: none; }
</style>
</head>
<body>
"#;

const PAGE_SCRIPT: &str = r#"<script>
window.addEventListener('click', event => {
    const element = event.target;
    if (element.classList.contains('event-item')) {
        document.querySelectorAll('.event-item').forEach(item => item.classList.remove('event-selected'));
        element.classList.add('event-selected');
        document.querySelectorAll('.right-column').forEach(column => column.classList.add('hidden'));
        const id = element.id.replace('event-item-', '');
        document.querySelector(`#right-column-${id}`).classList.remove('hidden');
        return;
    }
    const toggle = element.closest('.heat-item, .swimmer-item');
    if (toggle && toggle.nextElementSibling) {
        toggle.nextElementSibling.classList.toggle('hidden');
    }
});
</script>
</body>
</html>
"#;

/// `2023-03-11` → `11 mars 2023`. Anything that isn't an ISO date is
/// returned unchanged.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => format!("{} {} {}", d.day(), MONTHS[d.month0() as usize], d.year()),
        Err(_) => date.to_string(),
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The whole static page for one session.
pub fn render_page(session: &SessionResults) -> String {
    let mut html = String::from(PAGE_HEAD);
    let _ = writeln!(
        html,
        "<header>\n<h1>{}</h1>\n<h2>Pass {}</h2>\n</header>",
        escape_html(&session.meet_name),
        escape_html(&session.session_number)
    );
    html.push_str("<div class=\"two-columns\">\n<div class=\"event-menu\">\n");
    for event in &session.events {
        let number = escape_html(&event.number);
        let _ = writeln!(
            html,
            "<div class=\"event-item\" id=\"event-item-{number}\">\n  <div class=\"event-item-text\">\n    <p class=\"event-item-number pt16\">{number}</p>\n    <p class=\"event-item-name pt16\">{}</p>\n  </div>\n</div>",
            escape_html(&event.name)
        );
    }
    html.push_str("</div>\n");
    for event in &session.events {
        render_event(&mut html, event);
    }
    html.push_str("</div>\n");
    html.push_str(PAGE_SCRIPT);
    html
}

fn render_event(html: &mut String, event: &EventResults) {
    let number = escape_html(&event.number);
    let _ = writeln!(
        html,
        "<div class=\"right-column hidden\" id=\"right-column-{number}\">\n<h3>Gren {number}, {}</h3>\n<div class=\"heat-list\">",
        escape_html(&event.name)
    );
    for (heat, lanes) in &event.heats {
        let _ = writeln!(
            html,
            "<div class=\"heat-container\">\n<div class=\"heat-item\"><div class=\"heat-item-text\"><p class=\"pt16\">Heat {heat} ({})</p></div></div>",
            event.total_heats
        );
        html.push_str(
            "<div class=\"heat-content hidden\">\n<div class=\"heat-column-headers\">\n  <p class=\"heat-column-header-lane pt12-gray3\">Bana</p>\n  <p class=\"heat-column-header-name pt12-gray3\">Namn</p>\n  <p class=\"heat-column-header-best pt12-gray3\">Pers</p>\n</div>\n<div class=\"swimmer-list\">\n",
        );
        let mut sorted: Vec<&LaneResult> = lanes.iter().collect();
        sorted.sort_by_key(|lane| lane.lane);
        for lane in sorted {
            render_swimmer(html, lane);
        }
        html.push_str("</div>\n</div>\n</div>\n");
    }
    html.push_str("</div>\n</div>\n");
}

/// Label shown next to the swimmer's name.
pub fn best_label(best: &BestSwim) -> &str {
    if let Some(time) = &best.final_time {
        return time;
    }
    match best.error {
        Some(ResolveError::NeverSwum) => FIRST_TIME_LABEL,
        _ => ERROR_LABEL,
    }
}

fn render_swimmer(html: &mut String, lane: &LaneResult) {
    let best = &lane.best;
    let tone = if best.error.is_some() { "pt14-gray4" } else { "pt14-gray1" };
    let _ = writeln!(
        html,
        "<div class=\"swimmer-container\">\n<div class=\"swimmer-item\">\n  <div class=\"swimmer-item-text\">\n    <p class=\"swimmer-item-lane {tone}\">{}</p>\n    <p class=\"swimmer-item-name {tone}\">{}</p>\n    <p class=\"swimmer-item-best {tone}\">{}</p>\n  </div>\n</div>",
        lane.lane,
        escape_html(&lane.name),
        escape_html(best_label(best))
    );

    html.push_str("<div class=\"swimmer-content hidden\">\n<div class=\"swimmer-content-text\">\n");
    match (&best.meet_name, &best.result_url) {
        (Some(name), Some(url)) => {
            let _ = writeln!(
                html,
                "<a target=\"_blank\" href=\"{}\">{}</a>",
                escape_html(url),
                escape_html(name)
            );
        }
        (Some(name), None) => {
            let _ = writeln!(html, "<a class=\"inactive-link\">{}</a>", escape_html(name));
        }
        (None, Some(url)) => {
            let url = escape_html(url);
            let _ = writeln!(html, "<a target=\"_blank\" href=\"{url}\">{url}</a>");
        }
        (None, None) => {}
    }
    let place = match (&best.meet_location, &best.meet_date) {
        (Some(location), Some(date)) => Some(format!("{location}, {}", format_date(date))),
        (None, Some(date)) => Some(format_date(date)),
        (Some(location), None) => Some(location.clone()),
        (None, None) => None,
    };
    if let Some(place) = place {
        let _ = writeln!(html, "<p class=\"pt12-gray2\">{}</p>", escape_html(&place));
    }
    if best.all_times_url.is_some() || best.all_events_url.is_some() {
        html.push_str("<div class=\"right-links\">");
        if let Some(url) = &best.all_times_url {
            let _ = write!(html, "<a target=\"_blank\" href=\"{}\">Alla tider</a>", escape_html(url));
        }
        if let Some(url) = &best.all_events_url {
            let _ = write!(html, "<a target=\"_blank\" href=\"{}\">Alla grenar</a>", escape_html(url));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n<div class=\"swimmer-content-splits\">\n");
    match &best.splits {
        Some(splits) => render_splits(html, splits),
        None => {
            if let Some(err) = &best.error {
                let _ = writeln!(html, "<p class=\"pt12-gray3\">{}</p>", escape_html(&err.to_string()));
            }
        }
    }
    html.push_str("</div>\n");
    if let Some(avg50) = &best.avg50 {
        let _ = writeln!(
            html,
            "<div class=\"swimmer-content-avg50\">\n  <p class=\"pt12-gray3\">Avg. 50m:</p>\n  <p class=\"avg50-time pt12-gray1\">{}</p>\n</div>",
            escape_html(avg50)
        );
    }
    html.push_str("</div>\n</div>\n");
}

/// Two checkpoints per row. A single checkpoint (a 50m swim) is already the
/// final time, so nothing is drawn.
fn render_splits(html: &mut String, splits: &SplitRecord) {
    if splits.len() <= 1 {
        return;
    }
    let checkpoints: Vec<_> = splits.iter().collect();
    for pair in checkpoints.chunks(2) {
        html.push_str("<div class=\"split-row\">\n");
        for (col, (distance, split)) in pair.iter().enumerate() {
            let _ = write!(
                html,
                "  <div class=\"split-row-col split-row-col{}\">\n    <p class=\"split-row-distance pt14-gray3\">{distance}m:</p>\n    <p class=\"split-row-time pt14-gray1\">{} ",
                col + 1,
                escape_html(&split.time)
            );
            if let Some(lap) = &split.lap {
                let _ = write!(html, "<span class=\"last-50 pt14-gray3\">({})</span>", escape_html(lap));
            }
            html.push_str("</p>\n  </div>\n");
        }
        html.push_str("</div>\n");
    }
}
