//! Lesson content for the TCP/IP model explorer: the layer explainer, the
//! step lists played by the journey and handshake simulations, and the quiz.

pub mod handshake;
pub mod journey;
pub mod layers;
pub mod quiz;

pub use handshake::{handshake_steps, Direction, HandshakeStep};
pub use journey::{journey_steps, Hop, JourneyStage, JourneyStep};
pub use layers::{layer, Layer, LayerKey, Protocol, LAYERS};
pub use quiz::{AnswerFeedback, Question, QuizError, QuizSession, Verdict, QUESTIONS};
