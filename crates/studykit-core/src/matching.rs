//! The matching-pairs game engine.
//!
//! Every pair contributes a left and a right card. The player picks two
//! cards at a time; a pick of both sides of the same pair locks them as
//! matched. The session's raw score is the elapsed seconds at completion.

use std::collections::HashSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MatchingError;
use crate::model::MatchingSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// One side of a pair, as laid out on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCard {
    /// `"{side}-{pair_index}"`, unique within a session.
    pub id: String,
    pub content: String,
    pub side: Side,
    pub pair_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingState {
    Idle,
    Shuffled,
    AwaitingSecondPick,
    Completed,
}

/// Result of selecting a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// First pick recorded; waiting for the second.
    Pending,
    /// Both sides of a pair were picked in sequence.
    MatchFound,
    /// The two picks do not belong together. Nothing is kept.
    NoMatch,
    /// The card was already matched; nothing changed.
    AlreadyMatched,
}

#[derive(Debug, Clone)]
pub struct MatchingSession {
    set: MatchingSet,
    cards: Vec<MatchCard>,
    matched: HashSet<String>,
    pending: Option<usize>,
    elapsed_secs: u64,
    state: MatchingState,
}

impl MatchingSession {
    pub fn new(set: MatchingSet) -> Self {
        Self {
            set,
            cards: Vec::new(),
            matched: HashSet::new(),
            pending: None,
            elapsed_secs: 0,
            state: MatchingState::Idle,
        }
    }

    /// Lay out a freshly shuffled board and start the clock at zero.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let pairs = self.set.pairs();
        let mut cards: Vec<MatchCard> = pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| card(Side::Left, i, &pair.left))
            .chain(
                pairs
                    .iter()
                    .enumerate()
                    .map(|(i, pair)| card(Side::Right, i, &pair.right)),
            )
            .collect();
        cards.shuffle(rng);

        self.cards = cards;
        self.matched.clear();
        self.pending = None;
        self.elapsed_secs = 0;
        self.state = MatchingState::Shuffled;
        tracing::debug!(pairs = self.set.len(), "matching board shuffled");
    }

    /// Same as [`start`](Self::start); named for the mid-session action.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.start(rng);
    }

    pub fn state(&self) -> MatchingState {
        self.state
    }

    pub fn cards(&self) -> &[MatchCard] {
        &self.cards
    }

    pub fn pair_count(&self) -> usize {
        self.set.len()
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched.len() / 2
    }

    pub fn is_matched(&self, card_id: &str) -> bool {
        self.matched.contains(card_id)
    }

    pub fn pending(&self) -> Option<&MatchCard> {
        self.pending.map(|i| &self.cards[i])
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_completed(&self) -> bool {
        self.state == MatchingState::Completed
    }

    /// The raw score (elapsed seconds) once every pair is matched.
    pub fn completion(&self) -> Option<u64> {
        self.is_completed().then_some(self.elapsed_secs)
    }

    /// Advance the clock by one second. Stops counting once completed.
    pub fn tick(&mut self) {
        if matches!(self.state, MatchingState::Idle | MatchingState::Completed) {
            return;
        }
        self.elapsed_secs += 1;
    }

    pub fn select_card(&mut self, card_id: &str) -> Result<SelectOutcome, MatchingError> {
        if self.state == MatchingState::Idle {
            return Err(MatchingError::NotStarted);
        }
        let index = self
            .cards
            .iter()
            .position(|c| c.id == card_id)
            .ok_or_else(|| MatchingError::UnknownCard(card_id.to_string()))?;

        if self.matched.contains(card_id) {
            return Ok(SelectOutcome::AlreadyMatched);
        }

        let Some(first) = self.pending.take() else {
            self.pending = Some(index);
            self.state = MatchingState::AwaitingSecondPick;
            return Ok(SelectOutcome::Pending);
        };

        let (a, b) = (&self.cards[first], &self.cards[index]);
        let outcome = if a.pair_index == b.pair_index && a.side != b.side {
            let (a_id, b_id) = (a.id.clone(), b.id.clone());
            self.matched.insert(a_id);
            self.matched.insert(b_id);
            SelectOutcome::MatchFound
        } else {
            SelectOutcome::NoMatch
        };

        self.state = if self.matched.len() == 2 * self.set.len() {
            tracing::debug!(elapsed_secs = self.elapsed_secs, "matching completed");
            MatchingState::Completed
        } else {
            MatchingState::Shuffled
        };
        Ok(outcome)
    }
}

fn card(side: Side, pair_index: usize, content: &str) -> MatchCard {
    MatchCard {
        id: format!("{side}-{pair_index}"),
        content: content.to_string(),
        side,
        pair_index,
    }
}

/// Format seconds as `m:ss`.
pub fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
