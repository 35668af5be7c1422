use std::{collections::BTreeSet, io::Write};

use anyhow::Context;
use curriculum::{Hop, JourneyStage, JourneyStep, LayerKey};
use sequencer::StepObserver;

pub(crate) const JOURNEY_IDLE_HINT: &str = "// Press \"start\" to send a packet from the client.";

/// Where the packet marker sits in the client/router/server scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Client,
    Router,
    Server,
}

/// Encapsulation stack plus a one-line network scene, redrawn per step.
pub struct JourneyView<W> {
    out: W,
    lit: BTreeSet<LayerKey>,
    marker: Option<Marker>,
}

impl<W: Write + Send + 'static> JourneyView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lit: BTreeSet::new(),
            marker: None,
        }
    }

    pub fn lit_layers(&self) -> Vec<LayerKey> {
        self.lit.iter().copied().collect()
    }

    pub fn marker(&self) -> Option<Marker> {
        self.marker
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn stack_line(&self) -> String {
        LayerKey::ALL
            .iter()
            .map(|layer| {
                if self.lit.contains(layer) {
                    format!("[{}]", layer.short_name())
                } else {
                    format!("[{}]", ".".repeat(layer.short_name().len()))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn scene_line(&self) -> String {
        let spot = |at: Marker| if self.marker == Some(at) { "(#)" } else { "   " };
        format!(
            "Client {} ========== Router {} ---------- Server {}",
            spot(Marker::Client),
            spot(Marker::Router),
            spot(Marker::Server)
        )
    }
}

impl<W: Write + Send + 'static> StepObserver<JourneyStep> for JourneyView<W> {
    fn on_step(&mut self, index: usize, step: &JourneyStep) -> anyhow::Result<()> {
        match step.stage {
            JourneyStage::Encapsulate(layer) => {
                self.lit.insert(layer);
                self.marker = Some(Marker::Client);
            }
            JourneyStage::Transit(Hop::Router) => self.marker = Some(Marker::Router),
            JourneyStage::Transit(Hop::Server) => self.marker = Some(Marker::Server),
            JourneyStage::Decapsulate(layer) => {
                self.lit.remove(&layer);
            }
        }

        let stack = self.stack_line();
        let scene = self.scene_line();
        writeln!(self.out, "[{:>2}] {:<11} {}", index + 1, step.label, step.log)
            .and_then(|()| writeln!(self.out, "     stack  {stack}"))
            .and_then(|()| writeln!(self.out, "     scene  {scene}"))
            .and_then(|()| self.out.flush())
            .context("failed to draw journey step")
    }

    fn on_complete(&mut self) -> anyhow::Result<()> {
        self.lit.clear();
        self.marker = None;
        writeln!(
            self.out,
            "Journey complete: the request reached the server application."
        )
        .and_then(|()| self.out.flush())
        .context("failed to draw journey completion")
    }

    fn on_reset(&mut self) -> anyhow::Result<()> {
        self.lit.clear();
        self.marker = None;
        writeln!(self.out, "{JOURNEY_IDLE_HINT}")
            .and_then(|()| self.out.flush())
            .context("failed to draw journey reset")
    }
}
