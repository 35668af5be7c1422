use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("speed factor must be a positive finite number, got {0}")]
    InvalidSpeedFactor(f64),
}
