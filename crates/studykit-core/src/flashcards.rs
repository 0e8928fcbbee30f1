//! Flashcard review scoring.
//!
//! The session only knows `mark_known` / `mark_unknown`; how the user
//! signals either (swipe, key press) is up to the caller.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::SessionError;
use crate::grader::percentage;
use crate::model::Flashcard;

/// What happened after marking a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkOutcome {
    /// Moved on to the card at this index. `progress` is the reviewed share, 0–100.
    Next { index: usize, progress: f64 },
    /// The last card was marked.
    Finished { score: u8, progress: f64 },
}

#[derive(Debug, Clone)]
pub struct FlashcardSession {
    cards: Vec<Flashcard>,
    current: usize,
    flipped: bool,
    reviewed: BTreeSet<usize>,
    /// Latest verdict per card index; re-marking a card replaces it.
    verdicts: BTreeMap<usize, bool>,
    finished: bool,
}

impl FlashcardSession {
    pub fn new(cards: Vec<Flashcard>) -> Result<Self, SessionError> {
        if cards.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            cards,
            current: 0,
            flipped: false,
            reviewed: BTreeSet::new(),
            verdicts: BTreeMap::new(),
            finished: false,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_card(&self) -> &Flashcard {
        &self.cards[self.current]
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn known(&self) -> usize {
        self.verdicts.values().filter(|known| **known).count()
    }

    pub fn unknown(&self) -> usize {
        self.verdicts.values().filter(|known| !**known).count()
    }

    pub fn reviewed_count(&self) -> usize {
        self.reviewed.len()
    }

    /// Share of cards reviewed so far, 0–100.
    pub fn progress_percent(&self) -> f64 {
        self.reviewed.len() as f64 / self.cards.len() as f64 * 100.0
    }

    /// Percentage of all cards marked known.
    pub fn score(&self) -> u8 {
        percentage(self.known(), self.cards.len())
    }

    /// Turn the current card over. Seeing the back counts as reviewing it.
    pub fn flip(&mut self) -> Result<bool, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        self.flipped = !self.flipped;
        self.reviewed.insert(self.current);
        Ok(self.flipped)
    }

    pub fn mark_known(&mut self) -> Result<MarkOutcome, SessionError> {
        self.mark(true)
    }

    pub fn mark_unknown(&mut self) -> Result<MarkOutcome, SessionError> {
        self.mark(false)
    }

    fn mark(&mut self, known: bool) -> Result<MarkOutcome, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        self.verdicts.insert(self.current, known);
        self.reviewed.insert(self.current);
        let progress = self.progress_percent();

        if self.current + 1 == self.cards.len() {
            self.finished = true;
            let score = self.score();
            tracing::debug!(
                known = self.known(),
                unknown = self.unknown(),
                score,
                "flashcards finished"
            );
            return Ok(MarkOutcome::Finished { score, progress });
        }

        self.current += 1;
        self.flipped = false;
        Ok(MarkOutcome::Next {
            index: self.current,
            progress,
        })
    }

    /// Step back one card. Returns false at the first card.
    pub fn previous(&mut self) -> bool {
        if self.finished || self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.flipped = false;
        true
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.flipped = false;
        self.reviewed.clear();
        self.verdicts.clear();
        self.finished = false;
    }
}
