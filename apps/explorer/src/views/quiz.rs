use std::io::{self, Write};

use curriculum::{AnswerFeedback, Question, QuizSession};

pub fn write_question(
    out: &mut impl Write,
    quiz: &QuizSession,
    question: &Question,
) -> io::Result<()> {
    writeln!(out, "{}", quiz.progress())?;
    writeln!(out, "{}", question.prompt)?;
    for (choice, option) in question.options.iter().enumerate() {
        writeln!(out, "  {}) {option}", choice + 1)?;
    }
    Ok(())
}

/// Marks the correct option and, on a miss, the chosen one.
pub fn write_feedback(
    out: &mut impl Write,
    question: &Question,
    chosen: usize,
    feedback: &AnswerFeedback,
) -> io::Result<()> {
    for (choice, option) in question.options.iter().enumerate() {
        let mark = if choice == feedback.correct_choice {
            "+"
        } else if choice == chosen {
            "x"
        } else {
            " "
        };
        writeln!(out, "  {mark} {}) {option}", choice + 1)?;
    }
    let verdict = if feedback.correct { "Correct." } else { "Not quite." };
    writeln!(out, "{verdict} {}", feedback.explanation)
}

pub fn write_score(out: &mut impl Write, quiz: &QuizSession) -> io::Result<()> {
    writeln!(out, "Final score: {}/{}", quiz.score(), quiz.total())?;
    writeln!(out, "{}", quiz.verdict().message())
}
