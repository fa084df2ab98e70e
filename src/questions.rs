//! Question bank loading and selection
//!
//! Questions are preloaded from a JSON array and drawn at random with a
//! seeded RNG so demo runs stay reproducible.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// How a question is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TextInput,
}

/// A single quiz question. Immutable once drawn from the bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Prompt shown to the player
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Ordered options (multiple choice only)
    #[serde(default)]
    pub options: Vec<String>,
    /// Canonical answer: the correct option's text, or the expected free text
    pub correct: String,
    /// Per-question time budget; falls back to the 10-second default
    #[serde(default, rename = "duration_in_seconds")]
    pub duration_secs: Option<u32>,
}

impl Question {
    /// Effective time budget in milliseconds
    pub fn time_limit_ms(&self) -> f64 {
        match self.duration_secs {
            Some(secs) => f64::from(secs) * 1000.0,
            None => crate::consts::QUIZ_TIME_LIMIT_MS,
        }
    }
}

/// Source of questions for the run. `None` means the bank is exhausted or
/// empty; the simulation degrades per its fallback policy instead of failing.
pub trait QuestionBank {
    fn next_question(&mut self) -> Option<Question>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Error raised while loading a question bank
#[derive(Debug)]
pub enum QuestionBankError {
    Parse(serde_json::Error),
}

impl std::fmt::Display for QuestionBankError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionBankError::Parse(e) => write!(f, "malformed question bank: {e}"),
        }
    }
}

impl std::error::Error for QuestionBankError {}

impl From<serde_json::Error> for QuestionBankError {
    fn from(e: serde_json::Error) -> Self {
        QuestionBankError::Parse(e)
    }
}

/// Preloaded question set with seeded random draw
pub struct InMemoryBank {
    questions: Vec<Question>,
    rng: Pcg32,
}

impl InMemoryBank {
    pub fn new(questions: Vec<Question>, seed: u64) -> Self {
        Self {
            questions,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Parse a JSON array of questions
    pub fn from_json(json: &str, seed: u64) -> Result<Self, QuestionBankError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        log::info!("Loaded {} questions", questions.len());
        Ok(Self::new(questions, seed))
    }
}

impl QuestionBank for InMemoryBank {
    fn next_question(&mut self) -> Option<Question> {
        if self.questions.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..self.questions.len());
        Some(self.questions[idx].clone())
    }

    fn len(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK_JSON: &str = r#"[
        {
            "question": "Ai là tác giả bản Tuyên ngôn Độc lập?",
            "type": "multiple_choice",
            "options": ["Hồ Chí Minh", "Võ Nguyên Giáp", "Phạm Văn Đồng", "Trường Chinh"],
            "correct": "Hồ Chí Minh",
            "duration_in_seconds": 10
        },
        {
            "question": "Điền từ còn thiếu: Không có gì quý hơn ___ tự do",
            "type": "text_input",
            "correct": "Độc lập"
        }
    ]"#;

    #[test]
    fn test_parse_bank() {
        let bank = InMemoryBank::from_json(BANK_JSON, 7).unwrap();
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn test_question_fields() {
        let questions: Vec<Question> = serde_json::from_str(BANK_JSON).unwrap();
        assert_eq!(questions[0].kind, QuestionKind::MultipleChoice);
        assert_eq!(questions[0].options.len(), 4);
        assert_eq!(questions[0].time_limit_ms(), 10_000.0);
        // No duration falls back to the default budget
        assert_eq!(questions[1].kind, QuestionKind::TextInput);
        assert_eq!(questions[1].time_limit_ms(), 10_000.0);
        assert!(questions[1].options.is_empty());
    }

    #[test]
    fn test_empty_bank_yields_none() {
        let mut bank = InMemoryBank::new(Vec::new(), 1);
        assert!(bank.is_empty());
        assert!(bank.next_question().is_none());
    }

    #[test]
    fn test_seeded_draw_is_reproducible() {
        let questions: Vec<Question> = serde_json::from_str(BANK_JSON).unwrap();
        let mut a = InMemoryBank::new(questions.clone(), 42);
        let mut b = InMemoryBank::new(questions, 42);
        for _ in 0..16 {
            assert_eq!(
                a.next_question().unwrap().prompt,
                b.next_question().unwrap().prompt
            );
        }
    }
}
