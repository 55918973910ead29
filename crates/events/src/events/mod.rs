//! Domain-driven event types

use serde::{Deserialize, Serialize};

pub mod general;
pub mod install;
pub mod preset;
pub mod progress;
pub mod volume;

pub use general::GeneralEvent;
pub use install::InstallEvent;
pub use preset::PresetEvent;
pub use progress::ProgressEvent;
pub use volume::VolumeEvent;

/// Top-level event type grouping all domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    General(GeneralEvent),
    Volume(VolumeEvent),
    Install(InstallEvent),
    Preset(PresetEvent),
    Progress(ProgressEvent),
}

impl AppEvent {
    /// Stable message key used for the bounded operation log. Parameters
    /// are carried separately so the presentation layer can re-localize.
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            AppEvent::General(event) => event.message_key(),
            AppEvent::Volume(event) => event.message_key(),
            AppEvent::Install(event) => event.message_key(),
            AppEvent::Preset(event) => event.message_key(),
            AppEvent::Progress(event) => event.message_key(),
        }
    }

    /// Human-relevant parameters accompanying the message key.
    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        match self {
            AppEvent::General(event) => event.parameters(),
            AppEvent::Volume(event) => event.parameters(),
            AppEvent::Install(event) => event.parameters(),
            AppEvent::Preset(event) => event.parameters(),
            AppEvent::Progress(event) => event.parameters(),
        }
    }
}
