//! Sources of the inter-step delay.
//!
//! The sequencer asks its provider for a fresh value at the start of every
//! wait, so a provider backed by live state (see [`SpeedDial`]) lets the view
//! change playback speed mid-run without touching waits already in flight.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::domain::SpeedFactor;

pub trait DelayProvider: Send + Sync + 'static {
    fn delay(&self) -> Duration;
}

impl<F> DelayProvider for F
where
    F: Fn() -> Duration + Send + Sync + 'static,
{
    fn delay(&self) -> Duration {
        self()
    }
}

/// Constant delay, ignoring any speed control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl DelayProvider for FixedDelay {
    fn delay(&self) -> Duration {
        self.0
    }
}

/// Base delay scaled by a shared, live-adjustable speed factor.
///
/// Clones share the factor: hand one clone to the sequencer and keep another
/// in the view that owns the speed control.
#[derive(Debug, Clone)]
pub struct SpeedDial {
    base: Duration,
    factor_bits: Arc<AtomicU64>,
}

impl SpeedDial {
    pub fn new(base: Duration, speed: SpeedFactor) -> Self {
        Self {
            base,
            factor_bits: Arc::new(AtomicU64::new(speed.get().to_bits())),
        }
    }

    pub fn speed(&self) -> SpeedFactor {
        let raw = f64::from_bits(self.factor_bits.load(Ordering::Acquire));
        // Only validated factors are ever stored.
        SpeedFactor::new(raw).unwrap_or_default()
    }

    pub fn set_speed(&self, speed: SpeedFactor) {
        self.factor_bits.store(speed.get().to_bits(), Ordering::Release);
    }

    /// Same scale as `self` but a different base, sharing the speed factor.
    pub fn with_base(&self, base: Duration) -> Self {
        Self {
            base,
            factor_bits: Arc::clone(&self.factor_bits),
        }
    }
}

impl DelayProvider for SpeedDial {
    fn delay(&self) -> Duration {
        let millis = self.base.as_nanos() as f64 / 1_000_000.0 / self.speed().get();
        Duration::from_millis(millis.round() as u64)
    }
}
