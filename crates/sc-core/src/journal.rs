use tracing::{debug, warn};

/// Ordered per-playback diagnostics. Entries are mirrored to `tracing` as
/// they arrive and retained here so hosts and tests can inspect what a
/// playback reported without capturing log output.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<String>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.entries.push(format!("warning: {}", message));
    }

    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("{}", message);
        self.entries.push(message);
    }

    /// Adopts an entry from another journal verbatim, without re-emitting
    /// it through `tracing`.
    pub fn adopt(&mut self, entry: String) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_warning(&self, needle: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.contains("warning: ") && entry.contains(needle))
    }
}
