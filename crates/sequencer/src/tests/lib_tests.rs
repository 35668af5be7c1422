use super::*;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use anyhow::anyhow;
use tokio::time::{sleep, Instant};

const STEP_NAMES: [&str; 6] = ["syn", "syn-ack", "ack", "data", "fin", "fin-ack"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Step(usize, &'static str),
    Complete,
    Reset,
}

struct Recorder {
    origin: Instant,
    calls: Vec<(u64, Call)>,
    fail_at_step: Option<usize>,
    fail_on_complete: bool,
    fail_on_reset: bool,
}

impl Recorder {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            calls: Vec::new(),
            fail_at_step: None,
            fail_on_complete: false,
            fail_on_reset: false,
        }
    }

    fn record(&mut self, call: Call) {
        let elapsed = self.origin.elapsed().as_millis() as u64;
        self.calls.push((elapsed, call));
    }
}

impl StepObserver<&'static str> for Recorder {
    fn on_step(&mut self, index: usize, step: &&'static str) -> anyhow::Result<()> {
        if self.fail_at_step == Some(index) {
            return Err(anyhow!("view refused step {index}"));
        }
        self.record(Call::Step(index, *step));
        Ok(())
    }

    fn on_complete(&mut self) -> anyhow::Result<()> {
        self.record(Call::Complete);
        if self.fail_on_complete {
            return Err(anyhow!("view could not finish"));
        }
        Ok(())
    }

    fn on_reset(&mut self) -> anyhow::Result<()> {
        self.record(Call::Reset);
        if self.fail_on_reset {
            return Err(anyhow!("view could not clear"));
        }
        Ok(())
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn sequencer_with(
    steps: usize,
    delay: impl DelayProvider,
    recorder: Recorder,
) -> Sequencer<&'static str, Recorder> {
    Sequencer::new("test", STEP_NAMES[..steps].to_vec(), delay, recorder)
        .expect("non-empty steps")
}

fn sequencer(steps: usize, delay_ms: u64) -> Sequencer<&'static str, Recorder> {
    sequencer_with(steps, FixedDelay(ms(delay_ms)), Recorder::new())
}

fn calls(sequencer: &Sequencer<&'static str, Recorder>) -> Vec<(u64, Call)> {
    sequencer.inspect_observer(|recorder| recorder.calls.clone())
}

fn step_indices(sequencer: &Sequencer<&'static str, Recorder>) -> Vec<usize> {
    calls(sequencer)
        .into_iter()
        .filter_map(|(_, call)| match call {
            Call::Step(index, _) => Some(index),
            _ => None,
        })
        .collect()
}

#[test]
fn empty_step_list_is_rejected() {
    let result = Sequencer::new(
        "empty",
        Vec::<&'static str>::new(),
        FixedDelay(ms(1)),
        Recorder::new(),
    );
    assert!(matches!(result, Err(SequencerError::EmptySequence)));
}

#[tokio::test(start_paused = true)]
async fn four_steps_fire_one_delay_apart_then_complete() {
    let sequencer = sequencer(4, 10);

    let handle = sequencer.start().expect("idle sequencer starts");
    assert_eq!(sequencer.state(), SequencerState::Running);
    let outcome = handle.join().await.expect("run succeeds");

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(
        calls(&sequencer),
        vec![
            (10, Call::Step(0, "syn")),
            (20, Call::Step(1, "syn-ack")),
            (30, Call::Step(2, "ack")),
            (40, Call::Step(3, "data")),
            (40, Call::Complete),
        ]
    );
    assert_eq!(sequencer.state(), SequencerState::Completed);
    assert_eq!(sequencer.position(), 4);
}

#[tokio::test(start_paused = true)]
async fn every_length_delivers_each_index_exactly_once() {
    for len in 1..=STEP_NAMES.len() {
        let sequencer = sequencer(len, 5);
        let outcome = sequencer
            .start()
            .expect("starts")
            .join()
            .await
            .expect("run succeeds");

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(step_indices(&sequencer), (0..len).collect::<Vec<_>>());
        let completions = calls(&sequencer)
            .iter()
            .filter(|(_, call)| *call == Call::Complete)
            .count();
        assert_eq!(completions, 1, "len {len}");
    }
}

#[tokio::test(start_paused = true)]
async fn start_while_running_is_ignored() {
    let sequencer = sequencer(3, 10);

    let handle = sequencer.start().expect("first start");
    sleep(ms(15)).await;
    assert!(sequencer.start().is_none());
    sequencer.pause();
    assert!(sequencer.start().is_none(), "paused runs also block start");
    sequencer.resume();

    handle.join().await.expect("run succeeds");
    assert_eq!(step_indices(&sequencer), vec![0, 1, 2]);
    assert_eq!(
        calls(&sequencer)
            .iter()
            .filter(|(_, call)| *call == Call::Complete)
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn completed_sequencer_can_run_again() {
    let sequencer = sequencer(2, 10);

    let first = sequencer.start().expect("first run");
    let first_id = first.run_id();
    first.join().await.expect("first run succeeds");

    let second = sequencer.start().expect("completed sequencer restarts");
    assert!(second.run_id() > first_id);
    assert_eq!(sequencer.position(), 0);
    second.join().await.expect("second run succeeds");

    assert_eq!(step_indices(&sequencer), vec![0, 1, 0, 1]);
}

#[tokio::test(start_paused = true)]
async fn reset_mid_run_stops_further_callbacks() {
    let sequencer = sequencer(4, 10);

    let handle = sequencer.start().expect("starts");
    sleep(ms(25)).await;
    assert_eq!(sequencer.position(), 2);

    sequencer.reset().expect("reset succeeds");
    assert_eq!(sequencer.state(), SequencerState::Idle);
    assert_eq!(sequencer.position(), 0);
    assert_eq!(handle.join().await.expect("join"), RunOutcome::Cancelled);

    sleep(ms(100)).await;
    assert_eq!(
        calls(&sequencer),
        vec![
            (10, Call::Step(0, "syn")),
            (20, Call::Step(1, "syn-ack")),
            (25, Call::Reset),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn reset_from_idle_still_notifies_observer() {
    let sequencer = sequencer(2, 10);

    sequencer.reset().expect("reset succeeds");

    assert_eq!(calls(&sequencer), vec![(0, Call::Reset)]);
    assert_eq!(sequencer.state(), SequencerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn pause_requests_outside_a_run_are_ignored() {
    let sequencer = sequencer(1, 10);

    assert_eq!(sequencer.toggle_pause(), SequencerState::Idle);
    assert_eq!(sequencer.resume(), SequencerState::Idle);

    sequencer
        .start()
        .expect("starts")
        .join()
        .await
        .expect("run succeeds");
    assert_eq!(sequencer.pause(), SequencerState::Completed);
    assert_eq!(sequencer.toggle_pause(), SequencerState::Completed);
}

#[tokio::test(start_paused = true)]
async fn pausing_before_the_delay_elapses_does_not_shorten_it() {
    let sequencer = sequencer(2, 10);

    let handle = sequencer.start().expect("starts");
    assert_eq!(sequencer.toggle_pause(), SequencerState::Paused);

    sleep(ms(30)).await;
    assert!(step_indices(&sequencer).is_empty(), "paused run must not advance");
    assert_eq!(sequencer.state(), SequencerState::Paused);

    assert_eq!(sequencer.toggle_pause(), SequencerState::Running);
    handle.join().await.expect("run succeeds");

    let calls = calls(&sequencer);
    assert_eq!(
        calls,
        vec![
            (30, Call::Step(0, "syn")),
            (40, Call::Step(1, "syn-ack")),
            (40, Call::Complete),
        ]
    );
    assert!(calls[0].0 >= 10, "first step never precedes a full delay");
}

#[tokio::test(start_paused = true)]
async fn pause_and_resume_within_a_delay_changes_nothing() {
    let sequencer = sequencer(2, 10);

    let handle = sequencer.start().expect("starts");
    sleep(ms(2)).await;
    sequencer.toggle_pause();
    sleep(ms(3)).await;
    sequencer.toggle_pause();
    handle.join().await.expect("run succeeds");

    assert_eq!(
        calls(&sequencer),
        vec![
            (10, Call::Step(0, "syn")),
            (20, Call::Step(1, "syn-ack")),
            (20, Call::Complete),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn even_toggles_while_suspended_keep_the_step_sequence() {
    let sequencer = sequencer(3, 10);

    let handle = sequencer.start().expect("starts");
    sleep(ms(5)).await;
    sequencer.toggle_pause();
    sleep(ms(10)).await;
    sequencer.toggle_pause();
    sleep(ms(2)).await;
    sequencer.toggle_pause();
    sequencer.toggle_pause();
    handle.join().await.expect("run succeeds");

    assert_eq!(step_indices(&sequencer), vec![0, 1, 2]);
    assert_eq!(
        calls(&sequencer),
        vec![
            (15, Call::Step(0, "syn")),
            (25, Call::Step(1, "syn-ack")),
            (35, Call::Step(2, "ack")),
            (35, Call::Complete),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn reset_releases_a_run_parked_on_pause() {
    let sequencer = sequencer(3, 10);

    let handle = sequencer.start().expect("starts");
    sequencer.pause();
    sleep(ms(50)).await;
    assert_eq!(sequencer.state(), SequencerState::Paused);

    sequencer.reset().expect("reset succeeds");
    assert_eq!(sequencer.state(), SequencerState::Idle);
    assert_eq!(handle.join().await.expect("join"), RunOutcome::Cancelled);

    sleep(ms(100)).await;
    assert_eq!(calls(&sequencer), vec![(50, Call::Reset)]);
    assert_eq!(sequencer.resume(), SequencerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn delay_changes_apply_to_the_next_wait_only() {
    let delay_ms = Arc::new(AtomicU64::new(10));
    let provider = {
        let delay_ms = Arc::clone(&delay_ms);
        move || ms(delay_ms.load(Ordering::SeqCst))
    };
    let sequencer = sequencer_with(3, provider, Recorder::new());

    let handle = sequencer.start().expect("starts");
    sleep(ms(15)).await;
    delay_ms.store(50, Ordering::SeqCst);
    handle.join().await.expect("run succeeds");

    assert_eq!(
        calls(&sequencer),
        vec![
            (10, Call::Step(0, "syn")),
            (20, Call::Step(1, "syn-ack")),
            (70, Call::Step(2, "ack")),
            (70, Call::Complete),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn speed_dial_changes_reach_a_running_sequencer() {
    let dial = SpeedDial::new(ms(100), shared::domain::SpeedFactor::NORMAL);
    let sequencer = sequencer_with(2, dial.clone(), Recorder::new());

    let handle = sequencer.start().expect("starts");
    sleep(ms(50)).await;
    dial.set_speed(shared::domain::SpeedFactor::new(4.0).expect("valid speed"));
    handle.join().await.expect("run succeeds");

    assert_eq!(
        calls(&sequencer),
        vec![
            (100, Call::Step(0, "syn")),
            (125, Call::Step(1, "syn-ack")),
            (125, Call::Complete),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn failing_step_observer_surfaces_through_the_run_handle() {
    let mut recorder = Recorder::new();
    recorder.fail_at_step = Some(1);
    let sequencer = sequencer_with(3, FixedDelay(ms(10)), recorder);
    let mut events = sequencer.subscribe();

    let err = sequencer
        .start()
        .expect("starts")
        .join()
        .await
        .expect_err("observer failure propagates");

    match err {
        SequencerError::Observer { hook, index, .. } => {
            assert_eq!(hook, ObserverHook::Step);
            assert_eq!(index, Some(1));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(sequencer.state(), SequencerState::Idle);
    assert_eq!(sequencer.position(), 0);
    assert_eq!(step_indices(&sequencer), vec![0]);

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if let SequencerEvent::Failed { index, .. } = event {
            assert_eq!(index, Some(1));
            saw_failure = true;
        }
    }
    assert!(saw_failure);

    sequencer.inspect_observer(|recorder| assert_eq!(recorder.fail_at_step, Some(1)));
    assert!(sequencer.start().is_some(), "sequencer is usable after a failure");
}

#[tokio::test(start_paused = true)]
async fn failing_completion_observer_leaves_the_run_completed() {
    let mut recorder = Recorder::new();
    recorder.fail_on_complete = true;
    let sequencer = sequencer_with(2, FixedDelay(ms(10)), recorder);
    let mut events = sequencer.subscribe();

    let handle = sequencer.start().expect("starts");
    let run_id = handle.run_id();
    let err = handle.join().await.expect_err("observer failure propagates");

    match &err {
        SequencerError::Observer { hook, index, .. } => {
            assert_eq!(*hook, ObserverHook::Complete);
            assert_eq!(*index, None);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("on_complete failed"), "{err}");
    assert_eq!(sequencer.state(), SequencerState::Completed);
    assert_eq!(sequencer.position(), 2);
    assert_eq!(step_indices(&sequencer), vec![0, 1]);

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert!(received.iter().any(|event| matches!(
        event,
        SequencerEvent::Failed { run_id: failed, index: None, .. } if *failed == run_id
    )));
    assert!(!received
        .iter()
        .any(|event| matches!(event, SequencerEvent::Completed { .. })));
}

#[tokio::test(start_paused = true)]
async fn failing_reset_observer_is_reported_after_resetting() {
    let mut recorder = Recorder::new();
    recorder.fail_on_reset = true;
    let sequencer = sequencer_with(2, FixedDelay(ms(10)), recorder);

    let handle = sequencer.start().expect("starts");
    sleep(ms(12)).await;
    let err = sequencer.reset().expect_err("observer failure propagates");

    assert!(matches!(
        err,
        SequencerError::Observer {
            hook: ObserverHook::Reset,
            index: None,
            ..
        }
    ));
    assert_eq!(sequencer.state(), SequencerState::Idle);
    assert_eq!(handle.join().await.expect("join"), RunOutcome::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn events_follow_the_run_lifecycle() {
    let sequencer = sequencer(2, 10);
    let mut events = sequencer.subscribe();

    let handle = sequencer.start().expect("starts");
    let run_id = handle.run_id();
    sleep(ms(12)).await;
    sequencer.pause();
    sequencer.resume();
    handle.join().await.expect("run succeeds");
    sequencer.reset().expect("reset succeeds");

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    assert_eq!(
        received,
        vec![
            SequencerEvent::Started {
                run_id,
                total_steps: 2
            },
            SequencerEvent::Step { run_id, index: 0 },
            SequencerEvent::Paused { run_id },
            SequencerEvent::Resumed { run_id },
            SequencerEvent::Step { run_id, index: 1 },
            SequencerEvent::Completed { run_id },
            SequencerEvent::Reset {
                run_id: run_id.next()
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn clones_control_the_same_sequencer() {
    let sequencer = sequencer(2, 10);
    let remote = sequencer.clone();

    let handle = sequencer.start().expect("starts");
    assert!(remote.start().is_none());
    remote.pause();
    assert_eq!(sequencer.state(), SequencerState::Paused);
    remote.reset().expect("reset succeeds");

    assert_eq!(handle.join().await.expect("join"), RunOutcome::Cancelled);
    assert_eq!(sequencer.label(), "test");
    assert_eq!(sequencer.len(), 2);
    assert!(!sequencer.is_empty());
    assert_eq!(sequencer.steps(), &["syn", "syn-ack"]);
}
