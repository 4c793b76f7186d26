use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

/// Destination of a run-log entry. Each channel ends up in its own file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogChannel {
    /// Skipped records, unresolved codes and duplicate option codes.
    General,
    /// Attribute field allow-list findings.
    Attributes,
    /// Option file reconciliation and padded-code lookups.
    Options,
}

impl LogChannel {
    fn file_name(self, suffix: &str) -> String {
        match self {
            LogChannel::General => format!("log_{suffix}.txt"),
            LogChannel::Attributes => format!("ATK-log_{suffix}.txt"),
            LogChannel::Options => format!("options-log_{suffix}.txt"),
        }
    }
}

/// Data-quality findings collected during one product-line run.
///
/// Entries are mirrored to `tracing` as they are recorded and written to disk
/// once the run completes.
#[derive(Debug, Default)]
pub struct RunLog {
    general: Vec<String>,
    attributes: Vec<String>,
    options: Vec<String>,
    seen: HashSet<(LogChannel, String)>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line to the given channel.
    pub fn record(&mut self, channel: LogChannel, message: impl Into<String>) {
        let message = message.into();
        warn!(?channel, "{message}");
        self.channel_mut(channel).push(message);
    }

    /// Appends a line unless the same line was already recorded on this
    /// channel during the run. Returns whether the line was appended.
    pub fn record_once(&mut self, channel: LogChannel, message: impl Into<String>) -> bool {
        let message = message.into();
        self.record_once_keyed(channel, message.clone(), message)
    }

    /// Like [`record_once`](Self::record_once), but deduplicates on `key`
    /// instead of the message text, so only the first message recorded for a
    /// key is kept.
    pub fn record_once_keyed(
        &mut self,
        channel: LogChannel,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> bool {
        if !self.seen.insert((channel, key.into())) {
            return false;
        }
        self.record(channel, message);
        true
    }

    /// Appends an informational line without emitting a warning.
    pub fn note(&mut self, channel: LogChannel, message: impl Into<String>) {
        self.channel_mut(channel).push(message.into());
    }

    pub fn entries(&self, channel: LogChannel) -> &[String] {
        match channel {
            LogChannel::General => &self.general,
            LogChannel::Attributes => &self.attributes,
            LogChannel::Options => &self.options,
        }
    }

    fn channel_mut(&mut self, channel: LogChannel) -> &mut Vec<String> {
        match channel {
            LogChannel::General => &mut self.general,
            LogChannel::Attributes => &mut self.attributes,
            LogChannel::Options => &mut self.options,
        }
    }

    /// Writes every channel to `<dir>/<channel file>`, replacing logs of an
    /// earlier run. Returns the written paths.
    pub fn write_to(&self, dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(3);
        for channel in [LogChannel::General, LogChannel::Attributes, LogChannel::Options] {
            let path = dir.join(channel.file_name(suffix));
            let mut body = self.entries(channel).join("\n");
            if !body.is_empty() {
                body.push('\n');
            }
            fs::write(&path, body)?;
            written.push(path);
        }
        Ok(written)
    }
}
