use indicatif::{ProgressBar, ProgressStyle};

/// Terminal progress over the events of a session, with the current heat as
/// the bar message.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub fn new(events: usize) -> Self {
        let bar = ProgressBar::new(events as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} events  {msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn set_events(&self, events: usize) {
        self.bar.set_length(events as u64);
    }

    /// `done` counts heats processed so far in the current event.
    pub fn heat(&self, event_number: &str, done: u32, of: u32) {
        self.bar
            .set_message(format!("event {event_number}: heat {done}/{of}"));
    }

    pub fn event_done(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
