//! Classification of streamed tool output
//!
//! Each line is classified on its own into an [`OutputEvent`]; callers fold
//! the events into whatever state they need and hand them to [`emit`].

use super::process::Stream;
use crate::platform::Platform;
use log::{debug, info, warn};

/// What one line of tool output means to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    /// Summarized progress, e.g. `Building... [ 42%]`
    Progress(String),
    /// A stderr line; always surfaced
    Diagnostic(String),
    /// A dependency profile became available locally
    ProfileDiscovered(String),
    /// An unclassified line, shown only at debug level
    Raw(String),
    /// Nothing to report
    Ignored,
}

/// Classify a line from a build tool.
///
/// In verbose mode every stdout line is surfaced raw instead of summarized.
pub fn classify_build_line(
    line: &str,
    stream: Stream,
    platform: Platform,
    verbose: bool,
) -> OutputEvent {
    if line.is_empty() {
        return OutputEvent::Ignored;
    }
    if stream == Stream::Stderr {
        return OutputEvent::Diagnostic(line.to_string());
    }
    if verbose {
        return OutputEvent::Raw(line.to_string());
    }

    if platform.uses_msbuild_output() {
        if line.contains(".dll") || line.contains(".exe") {
            let built = line
                .rsplit(['\\', '/'])
                .next()
                .unwrap_or(line)
                .trim();
            return OutputEvent::Progress(format!("Finished building {}", built));
        }
    } else if line.contains("%]") {
        if let Some(end) = line.find(']') {
            return OutputEvent::Progress(format!("Building... {}", &line[..=end]));
        }
    }

    OutputEvent::Ignored
}

/// Classify a line from the dependency manager's `config install`
pub fn classify_config_line(line: &str, stream: Stream) -> OutputEvent {
    if line.is_empty() {
        return OutputEvent::Ignored;
    }
    if stream == Stream::Stderr {
        return OutputEvent::Diagnostic(line.to_string());
    }
    if line.contains("profiles") {
        if let Some(name) = line.split_whitespace().nth(2) {
            return OutputEvent::ProfileDiscovered(name.to_string());
        }
    }
    OutputEvent::Raw(line.to_string())
}

/// Classify a line from a phase whose stdout is only interesting when debugging
pub fn classify_plain_line(line: &str, stream: Stream) -> OutputEvent {
    match (line.is_empty(), stream) {
        (true, _) => OutputEvent::Ignored,
        (false, Stream::Stderr) => OutputEvent::Diagnostic(line.to_string()),
        (false, Stream::Stdout) => OutputEvent::Raw(line.to_string()),
    }
}

/// Log an event at the level it deserves
pub fn emit(event: &OutputEvent) {
    match event {
        OutputEvent::Progress(message) => info!("{}", message),
        OutputEvent::Diagnostic(message) => warn!("{}", message),
        OutputEvent::ProfileDiscovered(name) => debug!("Found profile {}", name),
        OutputEvent::Raw(line) => debug!("{}", line),
        OutputEvent::Ignored => {}
    }
}

/// Profile names discovered so far, in discovery order without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSet {
    names: Vec<String>,
}

impl ProfileSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(Self::default(), |set, name| set.with_name(name.into()))
    }

    fn with_name(mut self, name: String) -> Self {
        if !self.names.contains(&name) {
            self.names.push(name);
        }
        self
    }

    /// Fold one event into the set
    pub fn with(self, event: &OutputEvent) -> Self {
        match event {
            OutputEvent::ProfileDiscovered(name) => self.with_name(name.clone()),
            _ => self,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Profiles worth offering for a platform: they mention its token and
    /// have fewer than three `-` separators
    pub fn offered_for(&self, platform_token: &str) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| is_general_profile(name, platform_token))
            .cloned()
            .collect()
    }
}

pub fn is_general_profile(name: &str, platform_token: &str) -> bool {
    name.contains(platform_token) && name.matches('-').count() < 3
}
