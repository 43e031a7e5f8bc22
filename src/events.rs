use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, IntoStaticStr};
use crate::core::Counters;

/// Highlight tag attached to board-bearing events; the rendering layer keys
/// cell colors on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StepStatus {
    Thinking,
    Tentative,
    Backtrack,
    Error,
}

/// One externally visible step of the search. Every `board` and `domains`
/// payload is an independent deep copy taken at emission time, never an
/// alias into the live instance, so stored events can be replayed freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    /// Diagnostic message; no board change.
    Log {
        message: String,
    },
    /// A `thinking` snapshot (variable chosen) or `tentative` snapshot
    /// (value just assigned).
    Step {
        board: Vec<u8>,
        active_cell: usize,
        domains: Vec<Vec<u8>>,
        counters: Counters,
        status: StepStatus,
    },
    /// Forward checking emptied a neighbor's domain. The board is unchanged
    /// from the preceding `tentative` snapshot minus the undone assignment,
    /// so no copy is carried.
    PruneFail {
        active_cell: usize,
        domains: Vec<Vec<u8>>,
        counters: Counters,
    },
    /// An assignment was undone (`backtrack`), or a branch ran out of
    /// candidates (`error`).
    Backtrack {
        board: Vec<u8>,
        active_cell: usize,
        domains: Vec<Vec<u8>>,
        counters: Counters,
        status: StepStatus,
    },
    /// Terminal signal; carries only overall success.
    Done {
        success: bool,
    },
}

impl Event {
    /// The wire tag, e.g. `PRUNE_FAIL`.
    pub fn tag(&self) -> &'static str {
        self.into()
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Event::Done { .. })
    }

    pub fn board(&self) -> Option<&[u8]> {
        match self {
            Event::Step { board, .. } | Event::Backtrack { board, .. } => Some(board),
            _ => None,
        }
    }

    pub fn active_cell(&self) -> Option<usize> {
        match self {
            Event::Step { active_cell, .. }
            | Event::PruneFail { active_cell, .. }
            | Event::Backtrack { active_cell, .. } => Some(*active_cell),
            _ => None,
        }
    }

    pub fn domains(&self) -> Option<&[Vec<u8>]> {
        match self {
            Event::Step { domains, .. }
            | Event::PruneFail { domains, .. }
            | Event::Backtrack { domains, .. } => Some(domains),
            _ => None,
        }
    }

    pub fn counters(&self) -> Option<Counters> {
        match self {
            Event::Step { counters, .. }
            | Event::PruneFail { counters, .. }
            | Event::Backtrack { counters, .. } => Some(*counters),
            _ => None,
        }
    }
}

/// Coarse state for the animated companion and theme layers, derived from
/// event tags alone. Not part of the solving contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mood {
    #[default]
    Idle,
    Thinking,
    Frustrated,
    Won,
    Lost,
}

impl Mood {
    pub fn for_event(event: &Event) -> Mood {
        match event {
            Event::PruneFail { .. } | Event::Backtrack { .. } => Mood::Frustrated,
            Event::Done { success: true } => Mood::Won,
            Event::Done { success: false } => Mood::Lost,
            _ => Mood::Thinking,
        }
    }
}
