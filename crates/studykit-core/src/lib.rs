//! studykit-core: content validation, grading, study sessions and the score store.
//!
//! Content flows one way: a provider's raw answer goes through
//! [`validator::ContentValidator`] into [`model::NormalizedContent`], which
//! then drives one of the session types. Finished sessions report their score
//! to [`store::ScoreStore`].

pub mod document;
pub mod error;
pub mod flashcards;
pub mod generation;
pub mod grader;
pub mod matching;
pub mod model;
pub mod prompts;
pub mod store;
pub mod test_session;
pub mod traits;
pub mod validator;
