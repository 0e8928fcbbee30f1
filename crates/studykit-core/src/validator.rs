//! Validation of generated content.
//!
//! Externally generated content is unreliable. Every payload is checked
//! against the fixed shape of its kind and rejected wholesale on the first
//! violation, so a session never renders partial content.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{
    ConceptPair, ContentKind, Flashcard, GradedItem, MatchingSet, NormalizedContent, OptionLetter,
    QuizQuestion, TestSubtype,
};
use crate::traits::extract_json_from_markdown;

/// Count policies for the validator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Exact number of questions in a quiz.
    pub quiz_questions: usize,
    /// Minimum number of flashcards.
    pub min_flashcards: usize,
    /// Minimum number of matching pairs.
    pub min_matching_pairs: usize,
    /// Minimum number of test items.
    pub min_test_items: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            quiz_questions: 4,
            min_flashcards: 10,
            min_matching_pairs: MatchingSet::MIN_PAIRS,
            min_test_items: 4,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
}

#[derive(Debug, Deserialize)]
struct RawFlashcard {
    term: String,
    definition: String,
}

#[derive(Debug, Deserialize)]
struct RawMatching {
    pairs: Vec<RawPair>,
}

#[derive(Debug, Deserialize)]
struct RawPair {
    left: String,
    right: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawTestItem {
    MultipleChoice {
        question: String,
        options: Vec<String>,
        answer: String,
    },
    TrueFalse {
        question: String,
        answer: bool,
    },
    ShortAnswer {
        question: String,
        answer: String,
        #[serde(default, rename = "acceptableAnswers")]
        acceptable_answers: Option<Vec<String>>,
    },
}

/// Checks generated payloads against the shape of their kind.
#[derive(Debug, Clone, Default)]
pub struct ContentValidator {
    config: ValidatorConfig,
}

impl ContentValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Parse raw model output (optionally fenced in markdown) and validate it.
    pub fn validate_text(
        &self,
        kind: ContentKind,
        text: &str,
    ) -> Result<NormalizedContent, ValidationError> {
        let json = extract_json_from_markdown(text);
        let payload: Value = serde_json::from_str(&json)
            .map_err(|e| ValidationError::shape(kind, "$", format!("not valid JSON: {e}")))?;
        self.validate(kind, &payload)
    }

    /// Validate an untyped payload for `kind`.
    pub fn validate(
        &self,
        kind: ContentKind,
        payload: &Value,
    ) -> Result<NormalizedContent, ValidationError> {
        let payload = unwrap_envelope(kind, payload)?;
        let content = match kind {
            ContentKind::Quiz => NormalizedContent::Quiz(self.validate_quiz(payload)?),
            ContentKind::Flashcards => {
                NormalizedContent::Flashcards(self.validate_flashcards(payload)?)
            }
            ContentKind::Matching => NormalizedContent::Matching(self.validate_matching(payload)?),
            ContentKind::Test => NormalizedContent::Test(self.validate_test(kind, payload, None)?),
            ContentKind::TestByType(subtype) => {
                NormalizedContent::Test(self.validate_test(kind, payload, Some(subtype))?)
            }
        };
        tracing::debug!(%kind, "content passed validation");
        Ok(content)
    }

    fn validate_quiz(&self, payload: &Value) -> Result<Vec<QuizQuestion>, ValidationError> {
        let kind = ContentKind::Quiz;
        let items = as_array(kind, payload)?;
        if items.len() != self.config.quiz_questions {
            return Err(ValidationError::shape(
                kind,
                "$",
                format!(
                    "expected exactly {} questions, got {}",
                    self.config.quiz_questions,
                    items.len()
                ),
            ));
        }

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let path = format!("$[{i}]");
                let raw: RawQuestion = parse_item(kind, &path, item)?;
                let question = non_empty(kind, format!("{path}.question"), raw.question)?;
                let options = four_options(kind, &path, raw.options)?;
                let answer = letter(kind, &path, &raw.answer)?;
                Ok(QuizQuestion {
                    question,
                    options,
                    answer,
                })
            })
            .collect()
    }

    fn validate_flashcards(&self, payload: &Value) -> Result<Vec<Flashcard>, ValidationError> {
        let kind = ContentKind::Flashcards;
        let items = as_array(kind, payload)?;
        if items.len() < self.config.min_flashcards {
            return Err(ValidationError::shape(
                kind,
                "$",
                format!(
                    "expected at least {} cards, got {}",
                    self.config.min_flashcards,
                    items.len()
                ),
            ));
        }

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let path = format!("$[{i}]");
                let raw: RawFlashcard = parse_item(kind, &path, item)?;
                Ok(Flashcard {
                    term: non_empty(kind, format!("{path}.term"), raw.term)?,
                    definition: non_empty(kind, format!("{path}.definition"), raw.definition)?,
                })
            })
            .collect()
    }

    fn validate_matching(&self, payload: &Value) -> Result<MatchingSet, ValidationError> {
        let kind = ContentKind::Matching;
        if !payload.is_object() {
            return Err(ValidationError::shape(kind, "$", "expected an object with `pairs`"));
        }
        let raw: RawMatching = parse_item(kind, "$", payload)?;
        if raw.pairs.len() < self.config.min_matching_pairs {
            return Err(ValidationError::shape(
                kind,
                "$.pairs",
                format!(
                    "expected at least {} pairs, got {}",
                    self.config.min_matching_pairs,
                    raw.pairs.len()
                ),
            ));
        }

        let pairs = raw
            .pairs
            .into_iter()
            .enumerate()
            .map(|(i, pair)| {
                Ok(ConceptPair {
                    left: non_empty(kind, format!("$.pairs[{i}].left"), pair.left)?,
                    right: non_empty(kind, format!("$.pairs[{i}].right"), pair.right)?,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(MatchingSet::new_unchecked(pairs))
    }

    fn validate_test(
        &self,
        kind: ContentKind,
        payload: &Value,
        required: Option<TestSubtype>,
    ) -> Result<Vec<GradedItem>, ValidationError> {
        let items = as_array(kind, payload)?;
        if items.len() < self.config.min_test_items {
            return Err(ValidationError::shape(
                kind,
                "$",
                format!(
                    "expected at least {} questions, got {}",
                    self.config.min_test_items,
                    items.len()
                ),
            ));
        }

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let path = format!("$[{i}]");
                let raw: RawTestItem = parse_item(kind, &path, item)?;
                let graded = match raw {
                    RawTestItem::MultipleChoice {
                        question,
                        options,
                        answer,
                    } => GradedItem::MultipleChoice {
                        question: non_empty(kind, format!("{path}.question"), question)?,
                        options: four_options(kind, &path, options)?,
                        correct_option: letter(kind, &path, &answer)?,
                    },
                    RawTestItem::TrueFalse { question, answer } => GradedItem::TrueFalse {
                        question: non_empty(kind, format!("{path}.question"), question)?,
                        correct_value: answer,
                    },
                    RawTestItem::ShortAnswer {
                        question,
                        answer,
                        acceptable_answers,
                    } => GradedItem::ShortAnswer {
                        question: non_empty(kind, format!("{path}.question"), question)?,
                        correct_text: non_empty(kind, format!("{path}.answer"), answer)?,
                        acceptable_alternates: acceptable_answers.unwrap_or_default(),
                    },
                };

                if let Some(subtype) = required.filter(|s| *s != TestSubtype::Mixed) {
                    if graded.subtype() != subtype {
                        return Err(ValidationError::shape(
                            kind,
                            format!("{path}.type"),
                            format!("expected {subtype}, got {}", graded.subtype()),
                        ));
                    }
                }
                Ok(graded)
            })
            .collect()
    }
}

/// Strip the `{"type": ..., <field>: ...}` envelope when present.
fn unwrap_envelope(kind: ContentKind, payload: &Value) -> Result<&Value, ValidationError> {
    let Some(obj) = payload.as_object() else {
        return Ok(payload);
    };
    let Some(tag) = obj.get("type").and_then(Value::as_str) else {
        return Ok(payload);
    };

    let expected = kind.mode().as_str();
    if tag != expected {
        return Err(ValidationError::shape(
            kind,
            "$.type",
            format!("envelope holds {tag} content, expected {expected}"),
        ));
    }

    let field = match kind {
        ContentKind::Quiz | ContentKind::Test | ContentKind::TestByType(_) => "questions",
        ContentKind::Flashcards => "cards",
        ContentKind::Matching => "sets",
    };
    let inner = obj.get(field).ok_or_else(|| {
        ValidationError::shape(kind, format!("$.{field}"), "missing from envelope")
    })?;

    if kind == ContentKind::Matching {
        return inner
            .as_array()
            .and_then(|sets| sets.first())
            .ok_or_else(|| ValidationError::shape(kind, "$.sets", "expected at least one set"));
    }
    Ok(inner)
}

fn as_array(kind: ContentKind, payload: &Value) -> Result<&Vec<Value>, ValidationError> {
    payload
        .as_array()
        .ok_or_else(|| ValidationError::shape(kind, "$", "expected an array"))
}

fn parse_item<T: DeserializeOwned>(
    kind: ContentKind,
    path: &str,
    item: &Value,
) -> Result<T, ValidationError> {
    T::deserialize(item).map_err(|e| ValidationError::shape(kind, path, e.to_string()))
}

fn non_empty(kind: ContentKind, path: String, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::shape(kind, path, "must not be empty"));
    }
    Ok(value)
}

fn four_options(
    kind: ContentKind,
    path: &str,
    options: Vec<String>,
) -> Result<[String; 4], ValidationError> {
    let count = options.len();
    options.try_into().map_err(|_| {
        ValidationError::shape(
            kind,
            format!("{path}.options"),
            format!("expected exactly 4 options, got {count}"),
        )
    })
}

fn letter(kind: ContentKind, path: &str, answer: &str) -> Result<OptionLetter, ValidationError> {
    answer
        .parse()
        .map_err(|e: String| ValidationError::shape(kind, format!("{path}.answer"), e))
}
