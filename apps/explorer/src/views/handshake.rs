use std::io::Write;

use anyhow::Context;
use curriculum::{Direction, HandshakeStep};
use sequencer::StepObserver;

pub(crate) const HANDSHAKE_IDLE_HINT: &str =
    "// The 3-way handshake establishes a reliable TCP connection before any data is sent.";

const ARROW_SHAFT: usize = 24;

/// Client/server ladder diagram: one arrow per exchanged segment.
pub struct HandshakeView<W> {
    out: W,
    messages: Vec<&'static str>,
}

impl<W: Write + Send + 'static> HandshakeView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            messages: Vec::new(),
        }
    }

    /// Labels of the segments drawn since the last reset.
    pub fn messages(&self) -> &[&'static str] {
        &self.messages
    }

    pub fn writer(&self) -> &W {
        &self.out
    }
}

fn arrow(step: &HandshakeStep) -> String {
    let shaft = "-".repeat(ARROW_SHAFT.saturating_sub(step.label.len()));
    match step.direction {
        Direction::ClientToServer => format!("Client |--{} {shaft}>| Server", step.label),
        Direction::ServerToClient => format!("Client |<{shaft} {}--| Server", step.label),
    }
}

impl<W: Write + Send + 'static> StepObserver<HandshakeStep> for HandshakeView<W> {
    fn on_step(&mut self, _index: usize, step: &HandshakeStep) -> anyhow::Result<()> {
        self.messages.push(step.label);
        writeln!(self.out, "{}   {}", arrow(step), step.note)
            .and_then(|()| writeln!(self.out, "  {:<8} {}", step.label, step.description))
            .and_then(|()| self.out.flush())
            .context("failed to draw handshake segment")
    }

    fn on_complete(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "Handshake complete: the connection is carrying data.")
            .and_then(|()| self.out.flush())
            .context("failed to draw handshake completion")
    }

    fn on_reset(&mut self) -> anyhow::Result<()> {
        self.messages.clear();
        writeln!(self.out, "{HANDSHAKE_IDLE_HINT}")
            .and_then(|()| self.out.flush())
            .context("failed to draw handshake reset")
    }
}
