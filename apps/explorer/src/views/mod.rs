//! Plain-text renderers for the explainer. Every view writes to a generic
//! `Write` so the binary can target stdout and tests can capture a buffer.

mod handshake;
mod journey;
pub mod layers;
pub mod quiz;

pub use handshake::HandshakeView;
pub use journey::{JourneyView, Marker};
