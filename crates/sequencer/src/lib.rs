//! Pausable, speed-controlled step sequencer.
//!
//! A [`Sequencer`] walks an observer through a fixed, ordered list of steps.
//! Between steps it performs a two-phase wait:
//!
//! 1. a timed delay read from its [`DelayProvider`], which only `reset` can cut short;
//! 2. if playback was paused by the time the delay fires, an open-ended
//!    suspension released by `resume` (continue) or `reset` (cancel).
//!
//! Each run executes on its own tokio task; the control surface (`start`,
//! `pause`, `resume`, `toggle_pause`, `reset`) is synchronous and never waits
//! on the run.

use std::sync::{Arc, Mutex, MutexGuard};

use shared::{
    domain::{RunId, SequencerState},
    event::SequencerEvent,
};
use tokio::{
    sync::{broadcast, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

mod delay;
pub mod error;
mod observer;

pub use delay::{DelayProvider, FixedDelay, SpeedDial};
pub use error::{ObserverHook, SequencerError};
pub use observer::StepObserver;

const EVENT_CHANNEL_CAPACITY: usize = 64;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitOutcome {
    Proceed,
    Cancelled,
}

enum Park {
    Proceed,
    Cancelled,
    Suspended(oneshot::Receiver<()>),
}

#[derive(Debug, Clone, Copy)]
enum PauseRequest {
    Pause,
    Resume,
    Toggle,
}

#[derive(Default)]
struct Control {
    state: SequencerState,
    cursor: usize,
    run: RunId,
    /// Dropped to cancel the active run's waits.
    cancel: Option<oneshot::Sender<()>>,
    /// Present only while the run is suspended in the pause phase of a wait.
    resume: Option<oneshot::Sender<()>>,
}

struct Inner<S, O> {
    label: String,
    steps: Vec<S>,
    delay: Box<dyn DelayProvider>,
    observer: Mutex<O>,
    control: Mutex<Control>,
    events: broadcast::Sender<SequencerEvent>,
}

pub struct Sequencer<S, O> {
    inner: Arc<Inner<S, O>>,
}

impl<S, O> Clone for Sequencer<S, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, O> Sequencer<S, O>
where
    S: Send + Sync + 'static,
    O: StepObserver<S>,
{
    pub fn new(
        label: impl Into<String>,
        steps: Vec<S>,
        delay: impl DelayProvider,
        observer: O,
    ) -> Result<Self, SequencerError> {
        if steps.is_empty() {
            return Err(SequencerError::EmptySequence);
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            inner: Arc::new(Inner {
                label: label.into(),
                steps,
                delay: Box::new(delay),
                observer: Mutex::new(observer),
                control: Mutex::new(Control::default()),
                events,
            }),
        })
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn steps(&self) -> &[S] {
        &self.inner.steps
    }

    pub fn len(&self) -> usize {
        self.inner.steps.len()
    }

    /// Always `false`; construction rejects empty sequences.
    pub fn is_empty(&self) -> bool {
        self.inner.steps.is_empty()
    }

    pub fn state(&self) -> SequencerState {
        lock(&self.inner.control).state
    }

    /// Number of steps delivered to the observer in the current run.
    pub fn position(&self) -> usize {
        lock(&self.inner.control).cursor
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SequencerEvent> {
        self.inner.events.subscribe()
    }

    /// Read the observer's current state. Blocks while a callback is running.
    pub fn inspect_observer<R>(&self, f: impl FnOnce(&O) -> R) -> R {
        f(&lock(&self.inner.observer))
    }

    /// Begin a new run from the first step.
    ///
    /// Returns `None` without side effects when a run is already in progress.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Option<RunHandle> {
        let (run, cancel) = {
            let mut control = lock(&self.inner.control);
            if control.state.is_active() {
                debug!(
                    sequencer = %self.inner.label,
                    run = %control.run,
                    state = %control.state,
                    "start ignored; run already in progress"
                );
                return None;
            }

            let run = control.run.next();
            let (cancel_tx, cancel_rx) = oneshot::channel();
            control.run = run;
            control.state = SequencerState::Running;
            control.cursor = 0;
            control.cancel = Some(cancel_tx);
            control.resume = None;
            (run, cancel_rx)
        };

        info!(
            sequencer = %self.inner.label,
            run = %run,
            steps = self.inner.steps.len(),
            "run started"
        );
        self.inner.emit(SequencerEvent::Started {
            run_id: run,
            total_steps: self.inner.steps.len(),
        });

        let task = tokio::spawn(drive(Arc::clone(&self.inner), run, cancel));
        Some(RunHandle { run, task })
    }

    pub fn pause(&self) -> SequencerState {
        self.inner.set_paused(PauseRequest::Pause)
    }

    pub fn resume(&self) -> SequencerState {
        self.inner.set_paused(PauseRequest::Resume)
    }

    pub fn toggle_pause(&self) -> SequencerState {
        self.inner.set_paused(PauseRequest::Toggle)
    }

    /// Abandon any run, return to `Idle` and notify the observer.
    ///
    /// The sequencer is reset even when `on_reset` fails; the observer error
    /// is returned to the caller.
    pub fn reset(&self) -> Result<(), SequencerError> {
        let (run, previous) = {
            let mut control = lock(&self.inner.control);
            let previous = control.state;
            control.run = control.run.next();
            control.state = SequencerState::Idle;
            control.cursor = 0;
            // Dropping the senders wakes a run parked in either wait phase.
            control.cancel = None;
            control.resume = None;
            (control.run, previous)
        };

        info!(
            sequencer = %self.inner.label,
            run = %run,
            previous = %previous,
            "sequencer reset"
        );
        self.inner.emit(SequencerEvent::Reset { run_id: run });

        let mut observer = lock(&self.inner.observer);
        observer.on_reset().map_err(|source| {
            warn!(
                sequencer = %self.inner.label,
                error = %source,
                "observer failed during reset"
            );
            SequencerError::Observer {
                hook: ObserverHook::Reset,
                index: None,
                source,
            }
        })
    }
}

impl<S, O> Inner<S, O>
where
    S: Send + Sync + 'static,
    O: StepObserver<S>,
{
    fn emit(&self, event: SequencerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn set_paused(&self, request: PauseRequest) -> SequencerState {
        let mut control = lock(&self.control);
        let pause = match request {
            PauseRequest::Pause => true,
            PauseRequest::Resume => false,
            PauseRequest::Toggle => control.state != SequencerState::Paused,
        };

        let event = match (control.state, pause) {
            (SequencerState::Running, true) => {
                control.state = SequencerState::Paused;
                SequencerEvent::Paused {
                    run_id: control.run,
                }
            }
            (SequencerState::Paused, false) => {
                control.state = SequencerState::Running;
                if let Some(resume) = control.resume.take() {
                    let _ = resume.send(());
                }
                SequencerEvent::Resumed {
                    run_id: control.run,
                }
            }
            (state, _) => {
                debug!(
                    sequencer = %self.label,
                    state = %state,
                    ?request,
                    "pause request ignored"
                );
                return state;
            }
        };

        let state = control.state;
        drop(control);

        info!(sequencer = %self.label, run = %event.run_id(), state = %state, "playback toggled");
        self.emit(event);
        state
    }

    async fn wait(
        &self,
        run: RunId,
        index: usize,
        cancel: &mut oneshot::Receiver<()>,
    ) -> WaitOutcome {
        let delay = self.delay.delay();
        debug!(
            sequencer = %self.label,
            run = %run,
            index,
            delay_ms = delay.as_millis() as u64,
            "waiting before step"
        );

        tokio::select! {
            biased;
            _ = &mut *cancel => return WaitOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => {}
        }

        let resume = match self.park(run) {
            Park::Proceed => return WaitOutcome::Proceed,
            Park::Cancelled => return WaitOutcome::Cancelled,
            Park::Suspended(resume) => resume,
        };

        debug!(sequencer = %self.label, run = %run, index, "suspended until resumed");
        tokio::select! {
            biased;
            _ = &mut *cancel => WaitOutcome::Cancelled,
            released = resume => match released {
                Ok(()) => WaitOutcome::Proceed,
                Err(_) => WaitOutcome::Cancelled,
            },
        }
    }

    /// Decide what follows an elapsed delay. Registers the resume slot under
    /// the same lock that `resume` takes, so a resume cannot slip in between.
    fn park(&self, run: RunId) -> Park {
        let mut control = lock(&self.control);
        if control.run != run {
            return Park::Cancelled;
        }
        if control.state != SequencerState::Paused {
            return Park::Proceed;
        }

        let (resume_tx, resume_rx) = oneshot::channel();
        control.resume = Some(resume_tx);
        Park::Suspended(resume_rx)
    }

    /// Hand step `index` to the observer. `Ok(false)` means the run was reset.
    fn deliver(&self, run: RunId, index: usize) -> Result<bool, SequencerError> {
        // Observer lock first: a reset that lands after the run check below
        // still has its `on_reset` ordered after this step.
        let mut observer = lock(&self.observer);
        {
            let mut control = lock(&self.control);
            if control.run != run {
                return Ok(false);
            }
            control.cursor = index + 1;
        }

        debug!(sequencer = %self.label, run = %run, index, "delivering step");
        if let Err(source) = observer.on_step(index, &self.steps[index]) {
            drop(observer);
            self.abandon(run, Some(index), &source);
            return Err(SequencerError::Observer {
                hook: ObserverHook::Step,
                index: Some(index),
                source,
            });
        }

        self.emit(SequencerEvent::Step { run_id: run, index });
        Ok(true)
    }

    fn complete(&self, run: RunId) -> Result<bool, SequencerError> {
        let mut observer = lock(&self.observer);
        {
            let mut control = lock(&self.control);
            if control.run != run {
                return Ok(false);
            }
            control.state = SequencerState::Completed;
            control.cancel = None;
            control.resume = None;
        }

        if let Err(source) = observer.on_complete() {
            drop(observer);
            warn!(sequencer = %self.label, run = %run, error = %source, "observer failed on completion");
            self.emit(SequencerEvent::Failed {
                run_id: run,
                index: None,
                message: format!("{source:#}"),
            });
            return Err(SequencerError::Observer {
                hook: ObserverHook::Complete,
                index: None,
                source,
            });
        }

        info!(sequencer = %self.label, run = %run, "run completed");
        self.emit(SequencerEvent::Completed { run_id: run });
        Ok(true)
    }

    fn abandon(&self, run: RunId, index: Option<usize>, source: &anyhow::Error) {
        {
            let mut control = lock(&self.control);
            if control.run == run {
                control.state = SequencerState::Idle;
                control.cursor = 0;
                control.cancel = None;
                control.resume = None;
            }
        }

        warn!(
            sequencer = %self.label,
            run = %run,
            index = ?index,
            error = %source,
            "observer failed; run abandoned"
        );
        self.emit(SequencerEvent::Failed {
            run_id: run,
            index,
            message: format!("{source:#}"),
        });
    }
}

async fn drive<S, O>(
    inner: Arc<Inner<S, O>>,
    run: RunId,
    mut cancel: oneshot::Receiver<()>,
) -> Result<RunOutcome, SequencerError>
where
    S: Send + Sync + 'static,
    O: StepObserver<S>,
{
    for index in 0..inner.steps.len() {
        if inner.wait(run, index, &mut cancel).await == WaitOutcome::Cancelled
            || !inner.deliver(run, index)?
        {
            debug!(sequencer = %inner.label, run = %run, index, "run cancelled");
            return Ok(RunOutcome::Cancelled);
        }
    }

    if inner.complete(run)? {
        Ok(RunOutcome::Completed)
    } else {
        debug!(sequencer = %inner.label, run = %run, "run cancelled before completion");
        Ok(RunOutcome::Cancelled)
    }
}

/// Handle to one spawned run. Dropping it detaches the run.
#[derive(Debug)]
pub struct RunHandle {
    run: RunId,
    task: JoinHandle<Result<RunOutcome, SequencerError>>,
}

impl RunHandle {
    pub fn run_id(&self) -> RunId {
        self.run
    }

    /// Wait for the run to end; observer failures surface here.
    pub async fn join(self) -> Result<RunOutcome, SequencerError> {
        self.task.await?
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
