//! Core data model types for studykit.
//!
//! These are the normalized shapes every study session consumes once the
//! generated content has passed validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four learning activities. Its string form is the key used in
/// the progress store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningMode {
    Quiz,
    Flashcards,
    Matching,
    Test,
}

impl LearningMode {
    pub const ALL: [LearningMode; 4] = [
        LearningMode::Quiz,
        LearningMode::Flashcards,
        LearningMode::Matching,
        LearningMode::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningMode::Quiz => "quiz",
            LearningMode::Flashcards => "flashcards",
            LearningMode::Matching => "matching",
            LearningMode::Test => "test",
        }
    }

    /// Whether the last score of this mode is elapsed seconds rather than a percentage.
    pub fn scores_time(&self) -> bool {
        matches!(self, LearningMode::Matching)
    }
}

impl fmt::Display for LearningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quiz" => Ok(LearningMode::Quiz),
            "flashcards" | "flashcard" => Ok(LearningMode::Flashcards),
            "matching" => Ok(LearningMode::Matching),
            "test" => Ok(LearningMode::Test),
            other => Err(format!("unknown learning mode: {other}")),
        }
    }
}

/// Which question types a generated test should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestSubtype {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Mixed,
}

impl TestSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestSubtype::MultipleChoice => "multiple_choice",
            TestSubtype::TrueFalse => "true_false",
            TestSubtype::ShortAnswer => "short_answer",
            TestSubtype::Mixed => "mixed",
        }
    }
}

impl fmt::Display for TestSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestSubtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "multiple_choice" | "mc" => Ok(TestSubtype::MultipleChoice),
            "true_false" | "tf" => Ok(TestSubtype::TrueFalse),
            "short_answer" | "short" => Ok(TestSubtype::ShortAnswer),
            "mixed" => Ok(TestSubtype::Mixed),
            other => Err(format!("unknown test type: {other}")),
        }
    }
}

/// The shape a generated payload is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Quiz,
    Flashcards,
    Matching,
    Test,
    /// A test whose items must all be of one question type.
    TestByType(TestSubtype),
}

impl ContentKind {
    /// Resolve the kind for a mode and optional test subtype. `mixed` and a
    /// missing subtype both mean a plain test.
    pub fn for_mode(mode: LearningMode, subtype: Option<TestSubtype>) -> Self {
        match (mode, subtype) {
            (LearningMode::Quiz, _) => ContentKind::Quiz,
            (LearningMode::Flashcards, _) => ContentKind::Flashcards,
            (LearningMode::Matching, _) => ContentKind::Matching,
            (LearningMode::Test, None | Some(TestSubtype::Mixed)) => ContentKind::Test,
            (LearningMode::Test, Some(subtype)) => ContentKind::TestByType(subtype),
        }
    }

    pub fn mode(&self) -> LearningMode {
        match self {
            ContentKind::Quiz => LearningMode::Quiz,
            ContentKind::Flashcards => LearningMode::Flashcards,
            ContentKind::Matching => LearningMode::Matching,
            ContentKind::Test | ContentKind::TestByType(_) => LearningMode::Test,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::TestByType(subtype) => write!(f, "test ({subtype})"),
            other => f.write_str(other.mode().as_str()),
        }
    }
}

/// A multiple-choice answer letter. `A` is the first option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
    ];

    pub fn index(&self) -> usize {
        match self {
            OptionLetter::A => 0,
            OptionLetter::B => 1,
            OptionLetter::C => 2,
            OptionLetter::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
            OptionLetter::D => "D",
        };
        f.write_str(letter)
    }
}

impl FromStr for OptionLetter {
    type Err = String;

    /// Exact, case-sensitive: only `A`..`D` are letters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(OptionLetter::A),
            "B" => Ok(OptionLetter::B),
            "C" => Ok(OptionLetter::C),
            "D" => Ok(OptionLetter::D),
            other => Err(format!("not an option letter: {other:?}")),
        }
    }
}

/// A quiz question: four options, one correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: [String; 4],
    pub answer: OptionLetter,
}

impl From<QuizQuestion> for GradedItem {
    fn from(q: QuizQuestion) -> Self {
        GradedItem::MultipleChoice {
            question: q.question,
            options: q.options,
            correct_option: q.answer,
        }
    }
}

/// A term and its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub term: String,
    pub definition: String,
}

/// A left/right concept association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptPair {
    pub left: String,
    pub right: String,
}

/// The pairs of one matching game. Only the validator constructs it, so it
/// always holds at least [`MatchingSet::MIN_PAIRS`] pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchingSet {
    pairs: Vec<ConceptPair>,
}

impl MatchingSet {
    pub const MIN_PAIRS: usize = 4;

    pub(crate) fn new_unchecked(pairs: Vec<ConceptPair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[ConceptPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// One question with a known correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradedItem {
    MultipleChoice {
        question: String,
        options: [String; 4],
        #[serde(rename = "answer")]
        correct_option: OptionLetter,
    },
    TrueFalse {
        question: String,
        #[serde(rename = "answer")]
        correct_value: bool,
    },
    ShortAnswer {
        question: String,
        #[serde(rename = "answer")]
        correct_text: String,
        #[serde(rename = "acceptableAnswers", default)]
        acceptable_alternates: Vec<String>,
    },
}

impl GradedItem {
    pub fn question(&self) -> &str {
        match self {
            GradedItem::MultipleChoice { question, .. }
            | GradedItem::TrueFalse { question, .. }
            | GradedItem::ShortAnswer { question, .. } => question,
        }
    }

    pub fn subtype(&self) -> TestSubtype {
        match self {
            GradedItem::MultipleChoice { .. } => TestSubtype::MultipleChoice,
            GradedItem::TrueFalse { .. } => TestSubtype::TrueFalse,
            GradedItem::ShortAnswer { .. } => TestSubtype::ShortAnswer,
        }
    }
}

/// A submitted answer, or the absence of one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UserAnswer {
    #[default]
    Unanswered,
    Choice(OptionLetter),
    Boolean(bool),
    Text(String),
}

impl UserAnswer {
    pub fn is_answered(&self) -> bool {
        !matches!(self, UserAnswer::Unanswered)
    }
}

/// Content that passed validation, ready to drive a session.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedContent {
    Quiz(Vec<QuizQuestion>),
    Flashcards(Vec<Flashcard>),
    Matching(MatchingSet),
    Test(Vec<GradedItem>),
}

impl NormalizedContent {
    pub fn mode(&self) -> LearningMode {
        match self {
            NormalizedContent::Quiz(_) => LearningMode::Quiz,
            NormalizedContent::Flashcards(_) => LearningMode::Flashcards,
            NormalizedContent::Matching(_) => LearningMode::Matching,
            NormalizedContent::Test(_) => LearningMode::Test,
        }
    }

    /// Serialize back into the wire shape the validator accepts.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            NormalizedContent::Quiz(questions) => serde_json::json!(questions),
            NormalizedContent::Flashcards(cards) => serde_json::json!(cards),
            NormalizedContent::Matching(set) => serde_json::json!(set),
            NormalizedContent::Test(items) => serde_json::json!(items),
        }
    }
}
