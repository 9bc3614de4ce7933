use serde::{Deserialize, Serialize};

use crate::config::RosterConfig;
use crate::entry::UNBOOKED;

/// Display category of a speaker value. Total over all strings: the sentinel
/// and the three configured regulars map to their own categories, everything
/// else falls through to `Guest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerKind {
    Regular1,
    Regular2,
    Regular3,
    Unbooked,
    Guest,
}

impl SpeakerKind {
    pub fn classify(khatib: &str, config: &RosterConfig) -> Self {
        if khatib == UNBOOKED {
            return SpeakerKind::Unbooked;
        }
        match config.regular_index(khatib) {
            Some(0) => SpeakerKind::Regular1,
            Some(1) => SpeakerKind::Regular2,
            Some(2) => SpeakerKind::Regular3,
            _ => SpeakerKind::Guest,
        }
    }

    /// Accent color used by the display surfaces. Pure presentation; kept out
    /// of the reconciliation path.
    pub fn accent(&self) -> &'static str {
        match self {
            SpeakerKind::Regular1 => "#2e7d32",
            SpeakerKind::Regular2 => "#1565c0",
            SpeakerKind::Regular3 => "#6a1b9a",
            SpeakerKind::Unbooked => "#9e9e9e",
            SpeakerKind::Guest => "#ef6c00",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpeakerKind::Regular1 | SpeakerKind::Regular2 | SpeakerKind::Regular3 => "regular",
            SpeakerKind::Unbooked => "unbooked",
            SpeakerKind::Guest => "guest",
        }
    }
}
