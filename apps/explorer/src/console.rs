//! Line-oriented control surface for the simulations and the quiz.

use std::{io::Write, str::FromStr};

use anyhow::Context;
use curriculum::QuizSession;
use sequencer::{RunHandle, RunOutcome, Sequencer, SpeedDial, StepObserver};
use shared::{
    domain::{RunId, SequencerState, SpeedFactor},
    error::DomainError,
    event::SequencerEvent,
};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use tracing::{debug, warn};

use crate::views::quiz as quiz_view;

const HELP: &str = "\
commands:
  start, s        play from the first step
  pause, p        pause or resume playback
  reset, r        stop and clear the view
  speed <x>       playback speed, e.g. 'speed 2' or 'speed 0.5x'
  status          show state, progress and speed
  help            show this list
  quit, q         leave";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Start,
    TogglePause,
    Reset,
    Speed(SpeedFactor),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'; type 'help' for a list")]
    Unknown(String),
    #[error("'speed' needs a value, e.g. 'speed 2'")]
    MissingSpeed,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error(transparent)]
    InvalidSpeed(#[from] DomainError),
}

impl FromStr for ConsoleCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        match verb.as_str() {
            "start" | "s" => Ok(Self::Start),
            "pause" | "p" | "resume" => Ok(Self::TogglePause),
            "reset" | "r" => Ok(Self::Reset),
            "speed" => {
                let value = words.next().ok_or(CommandError::MissingSpeed)?;
                parse_speed(value).map(Self::Speed)
            }
            "status" => Ok(Self::Status),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(line.trim().to_string())),
        }
    }
}

/// Accepts `2`, `2x` and `2×`.
pub fn parse_speed(value: &str) -> Result<SpeedFactor, CommandError> {
    let value = value.trim();
    let number = value
        .strip_suffix(|c| matches!(c, 'x' | 'X' | '×'))
        .unwrap_or(value)
        .trim();
    let factor: f64 = number
        .parse()
        .map_err(|_| CommandError::NotANumber(value.to_string()))?;
    Ok(SpeedFactor::new(factor)?)
}

/// Interactive loop: commands from `input` race the sequencer's event
/// stream until `quit` or end of input. An active run is reset on exit.
pub async fn run_simulation<S, O, R, W>(
    sequencer: &Sequencer<S, O>,
    dial: &SpeedDial,
    input: R,
    mut out: W,
) -> anyhow::Result<()>
where
    S: Send + Sync + 'static,
    O: StepObserver<S>,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut events = BroadcastStream::new(sequencer.subscribe());
    let mut run: Option<RunHandle> = None;

    sequencer.reset()?;
    writeln!(
        out,
        "{} simulation ready at {}; type 'start' to play or 'help' for commands.",
        sequencer.label(),
        dial.speed()
    )?;
    out.flush()?;

    loop {
        tokio::select! {
            biased;
            Some(event) = events.next() => {
                match event {
                    Ok(event) => {
                        if let Some(finished) = report(sequencer, &event, &mut out)? {
                            if run.as_ref().map(RunHandle::run_id) == Some(finished) {
                                if let Some(handle) = run.take() {
                                    handle.join().await?;
                                }
                            }
                        }
                    }
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(
                            sequencer = %sequencer.label(),
                            skipped,
                            "console fell behind the event stream"
                        );
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read command")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => execute(sequencer, dial, command, &mut run, &mut out)?,
                    Err(err) => writeln!(out, "{err}")?,
                }
                out.flush()?;
            }
        }
    }

    if sequencer.state().is_active() {
        sequencer.reset()?;
    }
    Ok(())
}

fn execute<S, O, W>(
    sequencer: &Sequencer<S, O>,
    dial: &SpeedDial,
    command: ConsoleCommand,
    run: &mut Option<RunHandle>,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: Send + Sync + 'static,
    O: StepObserver<S>,
    W: Write,
{
    debug!(sequencer = %sequencer.label(), ?command, "console command");
    match command {
        ConsoleCommand::Start => {
            if sequencer.state().is_active() {
                writeln!(out, "already playing; 'reset' first to start over")?;
                return Ok(());
            }
            // Clear the previous run's drawing before playing again.
            sequencer.reset()?;
            *run = sequencer.start();
        }
        ConsoleCommand::TogglePause => match sequencer.toggle_pause() {
            SequencerState::Running | SequencerState::Paused => {}
            SequencerState::Idle | SequencerState::Completed => {
                writeln!(out, "nothing is playing")?;
            }
        },
        ConsoleCommand::Reset => {
            sequencer.reset()?;
            *run = None;
        }
        ConsoleCommand::Speed(factor) => {
            dial.set_speed(factor);
            writeln!(out, "speed set to {factor}")?;
        }
        ConsoleCommand::Status => writeln!(
            out,
            "{}: {}, step {}/{}, speed {}",
            sequencer.label(),
            sequencer.state(),
            sequencer.position(),
            sequencer.len(),
            dial.speed()
        )?,
        ConsoleCommand::Help => writeln!(out, "{HELP}")?,
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

/// Print status changes. Returns the run id once that run has ended.
fn report<S, O, W>(
    sequencer: &Sequencer<S, O>,
    event: &SequencerEvent,
    out: &mut W,
) -> anyhow::Result<Option<RunId>>
where
    S: Send + Sync + 'static,
    O: StepObserver<S>,
    W: Write,
{
    let finished = match event {
        SequencerEvent::Paused { .. } => {
            writeln!(
                out,
                "paused at step {}/{}; 'p' to resume",
                sequencer.position(),
                sequencer.len()
            )?;
            None
        }
        SequencerEvent::Resumed { .. } => {
            writeln!(out, "resumed")?;
            None
        }
        SequencerEvent::Completed { run_id } => Some(*run_id),
        SequencerEvent::Failed { run_id, message, .. } => {
            warn!(sequencer = %sequencer.label(), run = %run_id, %message, "simulation failed");
            Some(*run_id)
        }
        SequencerEvent::Started { .. }
        | SequencerEvent::Step { .. }
        | SequencerEvent::Reset { .. } => None,
    };
    out.flush()?;
    Ok(finished)
}

/// Play one run to the end without reading commands.
pub async fn play_once<S, O>(sequencer: &Sequencer<S, O>) -> anyhow::Result<RunOutcome>
where
    S: Send + Sync + 'static,
    O: StepObserver<S>,
{
    let handle = sequencer.start().context("sequencer is already playing")?;
    Ok(handle.join().await?)
}

/// Ask every question in turn. Answers are option numbers; after the last
/// question `restart` plays again.
pub async fn run_quiz<R, W>(input: R, mut out: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut quiz = QuizSession::new();
    let mut lines = input.lines();
    let mut redraw = true;

    loop {
        if redraw {
            match quiz.current() {
                Some(question) => quiz_view::write_question(&mut out, &quiz, question)?,
                None => {
                    quiz_view::write_score(&mut out, &quiz)?;
                    writeln!(out, "Type 'restart' to try again or 'quit' to leave.")?;
                }
            }
            out.flush()?;
            redraw = false;
        }

        let Some(line) = lines.next_line().await.context("failed to read answer")? else {
            break;
        };
        let line = line.trim();
        if matches!(line, "q" | "quit") {
            break;
        }

        match quiz.current() {
            None => {
                if line.eq_ignore_ascii_case("restart") {
                    quiz.restart();
                    redraw = true;
                }
            }
            Some(_) if quiz.is_answered() => {
                quiz.advance();
                redraw = true;
            }
            Some(question) => {
                let choice = line
                    .parse::<usize>()
                    .ok()
                    .and_then(|number| number.checked_sub(1));
                match choice.map(|choice| (choice, quiz.answer(choice))) {
                    Some((choice, Ok(Some(feedback)))) => {
                        quiz_view::write_feedback(&mut out, question, choice, &feedback)?;
                        writeln!(out, "Press enter for the next question.")?;
                    }
                    Some((_, Ok(None))) => {}
                    Some((_, Err(err))) => {
                        debug!(%err, "quiz answer rejected");
                        write_choice_hint(&mut out, question.options.len())?;
                    }
                    None => write_choice_hint(&mut out, question.options.len())?,
                }
                out.flush()?;
            }
        }
    }
    Ok(())
}

fn write_choice_hint(out: &mut impl Write, options: usize) -> std::io::Result<()> {
    writeln!(out, "Answer with a number from 1 to {options}.")
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
