use std::fmt;

use thiserror::Error;

/// Observer callback that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverHook {
    Step,
    Complete,
    Reset,
}

impl fmt::Display for ObserverHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Step => "on_step",
            Self::Complete => "on_complete",
            Self::Reset => "on_reset",
        };
        f.write_str(name)
    }
}

fn step_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" at step {i}")).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("a sequencer needs at least one step")]
    EmptySequence,
    #[error("observer {hook} failed{}: {source}", step_suffix(.index))]
    Observer {
        hook: ObserverHook,
        index: Option<usize>,
        source: anyhow::Error,
    },
    #[error("sequencer run task ended abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),
}
