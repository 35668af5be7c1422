//! Lifecycle notifications published by a sequencer for status displays.

use serde::{Deserialize, Serialize};

use crate::domain::RunId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SequencerEvent {
    Started {
        run_id: RunId,
        total_steps: usize,
    },
    Step {
        run_id: RunId,
        index: usize,
    },
    Paused {
        run_id: RunId,
    },
    Resumed {
        run_id: RunId,
    },
    Completed {
        run_id: RunId,
    },
    Reset {
        run_id: RunId,
    },
    Failed {
        run_id: RunId,
        index: Option<usize>,
        message: String,
    },
}

impl SequencerEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            Self::Started { run_id, .. }
            | Self::Step { run_id, .. }
            | Self::Paused { run_id }
            | Self::Resumed { run_id }
            | Self::Completed { run_id }
            | Self::Reset { run_id }
            | Self::Failed { run_id, .. } => *run_id,
        }
    }
}
