mod forward;
mod reverse;

pub use forward::ForwardTranslator;
pub use reverse::ReverseTranslator;

use serde::Serialize;
use strum::Display;
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogMessage {
    pub severity: Severity,
    pub message: String,
}

/// The ordered messages raised during one translation session. Each message is also emitted as
/// a tracing event of the matching level.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Diagnostics {
    messages: Vec<LogMessage>,
}

impl Diagnostics {
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Info => info!("{message}"),
            Severity::Warn => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
        self.messages.push(LogMessage { severity, message });
    }

    pub fn messages(&self) -> &[LogMessage] {
        &self.messages
    }

    pub fn errors(&self) -> Vec<&LogMessage> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<&LogMessage> {
        self.with_severity(Severity::Warn)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    fn with_severity(&self, severity: Severity) -> Vec<&LogMessage> {
        self.messages
            .iter()
            .filter(|message| message.severity == severity)
            .collect()
    }
}
