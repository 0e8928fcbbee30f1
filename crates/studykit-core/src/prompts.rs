//! Instructions sent alongside the document for each content kind.

use crate::model::{ContentKind, TestSubtype};

const JSON_ONLY: &str =
    "Respond with JSON only, no prose and no markdown. Base everything on the attached document.";

/// System prompt for `kind`.
pub fn system_prompt(kind: ContentKind, flashcard_count: usize) -> String {
    let body = match kind {
        ContentKind::Quiz => "You are a teacher. Create a multiple choice test with exactly 4 questions \
             based on the content of the document. Each question has exactly 4 options of roughly \
             equal length and only one of them is correct.\n\
             Shape: [{\"question\": string, \"options\": [string, string, string, string], \
             \"answer\": \"A\" | \"B\" | \"C\" | \"D\"}] where A is the first option."
            .to_string(),
        ContentKind::Flashcards => format!(
            "Create at least {flashcard_count} flashcards with the key terms of the document and \
             their definitions. Keep definitions short and self-contained.\n\
             Shape: [{{\"term\": string, \"definition\": string}}]"
        ),
        ContentKind::Matching => "Create matching pairs of related concepts from the document, at \
             least 4 pairs. Each left item has exactly one right item it belongs with.\n\
             Shape: {\"pairs\": [{\"left\": string, \"right\": string}]}"
            .to_string(),
        ContentKind::Test => test_prompt(TestSubtype::Mixed),
        ContentKind::TestByType(subtype) => test_prompt(subtype),
    };
    format!("{body}\n{JSON_ONLY}")
}

fn test_prompt(subtype: TestSubtype) -> String {
    let mix = match subtype {
        TestSubtype::MultipleChoice => "multiple_choice questions only",
        TestSubtype::TrueFalse => "true_false questions only",
        TestSubtype::ShortAnswer => {
            "short_answer questions only; list other accepted phrasings in acceptableAnswers"
        }
        TestSubtype::Mixed => "a mix of multiple_choice, true_false and short_answer questions",
    };
    format!(
        "Create a test with at least 4 questions based on the document, using {mix}.\n\
         Shape: an array of items tagged by \"type\":\n\
         {{\"type\": \"multiple_choice\", \"question\": string, \"options\": [4 strings], \"answer\": \"A\"-\"D\"}}\n\
         {{\"type\": \"true_false\", \"question\": string, \"answer\": boolean}}\n\
         {{\"type\": \"short_answer\", \"question\": string, \"answer\": string, \"acceptableAnswers\": [string]}}"
    )
}

/// The user turn that accompanies the document.
pub fn user_prompt(kind: ContentKind) -> String {
    format!("Create a {} based on this document.", kind.mode())
}
