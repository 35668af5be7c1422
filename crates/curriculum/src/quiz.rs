//! Multiple-choice quiz over the layer and handshake material.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub answer: usize,
    pub explanation: &'static str,
}

pub static QUESTIONS: [Question; 6] = [
    Question {
        prompt: "Which layer of the TCP/IP model is responsible for assigning IP addresses to \
                 packets?",
        options: &["Application", "Transport", "Internet", "Link"],
        answer: 2,
        explanation: "The Internet Layer adds source and destination IP addresses, enabling \
                      routing across networks.",
    },
    Question {
        prompt: "What is the PDU (Protocol Data Unit) at the Transport Layer called?",
        options: &["Frame", "Packet", "Segment", "Bit"],
        answer: 2,
        explanation: "At the Transport Layer, TCP wraps data into Segments (with port numbers). \
                      Frames are Link layer, Packets are Internet layer.",
    },
    Question {
        prompt: "Which protocol provides RELIABLE, ordered data delivery?",
        options: &["UDP", "IP", "TCP", "HTTP"],
        answer: 2,
        explanation: "TCP (Transmission Control Protocol) includes acknowledgments, \
                      sequencing, and retransmission to guarantee reliable delivery.",
    },
    Question {
        prompt: "What does the \"SYN-ACK\" message in a TCP handshake mean?",
        options: &[
            "Data was corrupted",
            "Server acknowledges client and synchronizes",
            "Connection is terminated",
            "Routing failed",
        ],
        answer: 1,
        explanation: "SYN-ACK is the server's response: it acknowledges the client's SYN with \
                      an ACK and sends its own SYN to synchronize sequence numbers.",
    },
    Question {
        prompt: "Which layer deals with MAC addresses and physical transmission?",
        options: &["Application", "Internet", "Transport", "Link"],
        answer: 3,
        explanation: "The Link Layer (Network Access Layer) operates with MAC addresses for \
                      local network delivery and handles physical medium specifics like \
                      Ethernet and Wi-Fi.",
    },
    Question {
        prompt: "Which protocol would you use for fast video streaming where occasional packet \
                 loss is acceptable?",
        options: &["TCP", "UDP", "FTP", "HTTPS"],
        answer: 1,
        explanation: "UDP is connectionless and fast, with no retransmission overhead. For live \
                      video/audio, a slightly dropped packet is better than the delay caused \
                      by TCP's retransmission.",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("choice {choice} is out of range; question has {options} options")]
    ChoiceOutOfRange { choice: usize, options: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_choice: usize,
    pub explanation: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Excellent,
    Good,
    KeepStudying,
}

impl Verdict {
    pub fn for_score(score: usize) -> Self {
        if score >= 5 {
            Self::Excellent
        } else if score >= 3 {
            Self::Good
        } else {
            Self::KeepStudying
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent! You understand TCP/IP well.",
            Self::Good => "Good effort! Review the layers for improvement.",
            Self::KeepStudying => "Keep studying: revisit the layers and journey simulations.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: &'static [Question],
    index: usize,
    score: usize,
    answered: bool,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            questions: &QUESTIONS,
            index: 0,
            score: 0,
            answered: false,
        }
    }

    pub fn current(&self) -> Option<&'static Question> {
        self.questions.get(self.index)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Score the current question.
    ///
    /// A second answer to the same question, or any answer once the quiz is
    /// over, is ignored and yields `Ok(None)`.
    pub fn answer(&mut self, choice: usize) -> Result<Option<AnswerFeedback>, QuizError> {
        let Some(question) = self.current() else {
            return Ok(None);
        };
        if self.answered {
            return Ok(None);
        }
        if choice >= question.options.len() {
            return Err(QuizError::ChoiceOutOfRange {
                choice,
                options: question.options.len(),
            });
        }

        self.answered = true;
        let correct = choice == question.answer;
        if correct {
            self.score += 1;
        }

        Ok(Some(AnswerFeedback {
            correct,
            correct_choice: question.answer,
            explanation: question.explanation,
        }))
    }

    /// Move past an answered question. Returns `false` if there was nothing to
    /// advance past.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() || !self.answered {
            return false;
        }
        self.index += 1;
        self.answered = false;
        true
    }

    pub fn restart(&mut self) {
        self.index = 0;
        self.score = 0;
        self.answered = false;
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::for_score(self.score)
    }

    pub fn progress(&self) -> String {
        format!(
            "Question {} of {} · Score: {}",
            (self.index + 1).min(self.total()),
            self.total(),
            self.score
        )
    }
}

#[cfg(test)]
#[path = "tests/quiz_tests.rs"]
mod tests;
