//! The question-by-question test flow.
//!
//! A session walks one item at a time, refuses to advance past an
//! unanswered item, and grades everything once at submission. Quiz mode
//! runs through the same flow with multiple-choice items.

use crate::error::SessionError;
use crate::grader::{grade, GradingResult};
use crate::model::{GradedItem, QuizQuestion, UserAnswer};

/// What `next()` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the item at this index.
    Moved(usize),
    /// The last item was answered and the session was graded.
    Submitted(GradingResult),
}

#[derive(Debug, Clone)]
pub struct TestSession {
    items: Vec<GradedItem>,
    answers: Vec<UserAnswer>,
    current: usize,
    result: Option<GradingResult>,
}

impl TestSession {
    pub fn new(items: Vec<GradedItem>) -> Result<Self, SessionError> {
        if items.is_empty() {
            return Err(SessionError::Empty);
        }
        let answers = vec![UserAnswer::Unanswered; items.len()];
        Ok(Self {
            items,
            answers,
            current: 0,
            result: None,
        })
    }

    pub fn from_quiz(questions: Vec<QuizQuestion>) -> Result<Self, SessionError> {
        Self::new(questions.into_iter().map(GradedItem::from).collect())
    }

    pub fn items(&self) -> &[GradedItem] {
        &self.items
    }

    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_item(&self) -> &GradedItem {
        &self.items[self.current]
    }

    pub fn current_answer(&self) -> &UserAnswer {
        &self.answers[self.current]
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.items.len()
    }

    pub fn result(&self) -> Option<&GradingResult> {
        self.result.as_ref()
    }

    /// Share of items already passed, before the current one.
    pub fn progress_percent(&self) -> f64 {
        self.current as f64 / self.items.len() as f64 * 100.0
    }

    /// Record an answer for the current item.
    pub fn answer(&mut self, answer: UserAnswer) -> Result<(), SessionError> {
        if self.result.is_some() {
            return Err(SessionError::AlreadySubmitted);
        }
        self.answers[self.current] = answer;
        Ok(())
    }

    /// Advance to the next item, or submit when on the last one.
    pub fn next(&mut self) -> Result<Advance, SessionError> {
        if self.result.is_some() {
            return Err(SessionError::AlreadySubmitted);
        }
        if !self.current_answer().is_answered() {
            return Err(SessionError::Unanswered(self.current));
        }
        if self.is_last() {
            return self.submit().map(Advance::Submitted);
        }
        self.current += 1;
        tracing::debug!(index = self.current, "advanced to next item");
        Ok(Advance::Moved(self.current))
    }

    /// Step back one item. Returns false at the first item.
    pub fn previous(&mut self) -> bool {
        if self.result.is_some() || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Grade every answer and freeze the session.
    pub fn submit(&mut self) -> Result<GradingResult, SessionError> {
        if self.result.is_some() {
            return Err(SessionError::AlreadySubmitted);
        }
        let result = grade(&self.items, &self.answers)?;
        tracing::debug!(
            correct = result.correct_count,
            total = result.total_count,
            "test submitted"
        );
        self.result = Some(result.clone());
        Ok(result)
    }

    /// Start over with every answer cleared.
    pub fn reset(&mut self) {
        self.current = 0;
        self.answers = vec![UserAnswer::Unanswered; self.items.len()];
        self.result = None;
    }
}
