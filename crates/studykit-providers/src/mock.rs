//! Mock provider for testing and offline use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use studykit_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

const SAMPLE_QUIZ: &str = r#"[
  {"question": "What does the mitochondrion produce?", "options": ["ATP", "DNA", "Lipids", "Starch"], "answer": "A"},
  {"question": "Where is DNA stored?", "options": ["Ribosome", "Nucleus", "Membrane", "Vacuole"], "answer": "B"},
  {"question": "What builds proteins?", "options": ["Lysosome", "Golgi body", "Ribosome", "Nucleus"], "answer": "C"},
  {"question": "What controls what enters the cell?", "options": ["Nucleus", "Cytoplasm", "Ribosome", "Membrane"], "answer": "D"}
]"#;

const SAMPLE_FLASHCARDS: &str = r#"{"type": "flashcards", "cards": [
  {"term": "Cell", "definition": "The smallest unit of life"},
  {"term": "Nucleus", "definition": "Holds the genetic material"},
  {"term": "Mitochondrion", "definition": "Produces ATP"},
  {"term": "Ribosome", "definition": "Assembles proteins"},
  {"term": "Membrane", "definition": "Controls what enters and leaves"},
  {"term": "Cytoplasm", "definition": "Fluid that fills the cell"},
  {"term": "Chloroplast", "definition": "Site of photosynthesis"},
  {"term": "Vacuole", "definition": "Stores water and nutrients"},
  {"term": "Lysosome", "definition": "Breaks down waste"},
  {"term": "Golgi body", "definition": "Packages proteins for transport"}
]}"#;

const SAMPLE_MATCHING: &str = r#"```json
{"pairs": [
  {"left": "Mitochondrion", "right": "Produces ATP"},
  {"left": "Nucleus", "right": "Holds DNA"},
  {"left": "Ribosome", "right": "Assembles proteins"},
  {"left": "Membrane", "right": "Controls what enters"}
]}
```"#;

const SAMPLE_TEST: &str = r#"[
  {"type": "multiple_choice", "question": "What does the mitochondrion produce?", "options": ["ATP", "DNA", "Lipids", "Starch"], "answer": "A"},
  {"type": "true_false", "question": "Ribosomes assemble proteins.", "answer": true},
  {"type": "short_answer", "question": "Which organelle holds DNA?", "answer": "nucleus", "acceptableAnswers": ["the nucleus"]},
  {"type": "true_false", "question": "Plant cells have no membrane.", "answer": false}
]"#;

const SAMPLE_MULTIPLE_CHOICE: &str = r#"[
  {"type": "multiple_choice", "question": "What does the mitochondrion produce?", "options": ["ATP", "DNA", "Lipids", "Starch"], "answer": "A"},
  {"type": "multiple_choice", "question": "Where is DNA stored?", "options": ["Ribosome", "Nucleus", "Membrane", "Vacuole"], "answer": "B"},
  {"type": "multiple_choice", "question": "What builds proteins?", "options": ["Lysosome", "Golgi body", "Ribosome", "Nucleus"], "answer": "C"},
  {"type": "multiple_choice", "question": "What controls what enters the cell?", "options": ["Nucleus", "Cytoplasm", "Ribosome", "Membrane"], "answer": "D"}
]"#;

const SAMPLE_TRUE_FALSE: &str = r#"[
  {"type": "true_false", "question": "Ribosomes assemble proteins.", "answer": true},
  {"type": "true_false", "question": "Plant cells have no membrane.", "answer": false},
  {"type": "true_false", "question": "The nucleus holds DNA.", "answer": true},
  {"type": "true_false", "question": "Lysosomes produce ATP.", "answer": false}
]"#;

const SAMPLE_SHORT_ANSWER: &str = r#"[
  {"type": "short_answer", "question": "Which organelle holds DNA?", "answer": "nucleus"},
  {"type": "short_answer", "question": "Which organelle produces ATP?", "answer": "mitochondrion", "acceptableAnswers": ["mitochondria"]},
  {"type": "short_answer", "question": "Where does photosynthesis happen?", "answer": "chloroplast"},
  {"type": "short_answer", "question": "What assembles proteins?", "answer": "ribosome", "acceptableAnswers": ["ribosomes"]}
]"#;

/// A mock LLM provider that answers without network access.
///
/// Responses are picked by substring match against the system prompt
/// followed by the user prompt.
pub struct MockProvider {
    /// Map of prompt substring → response.
    responses: HashMap<String, String>,
    /// Default response if no prompt matches.
    default_response: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the given prompt→response mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: "[]".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            ..Self::new(HashMap::new())
        }
    }

    /// A mock that returns well-formed content for every content kind.
    pub fn with_sample_content() -> Self {
        let responses = [
            ("multiple choice test with exactly 4", SAMPLE_QUIZ),
            ("flashcards with the key terms", SAMPLE_FLASHCARDS),
            ("matching pairs of related concepts", SAMPLE_MATCHING),
            ("a mix of multiple_choice", SAMPLE_TEST),
            ("multiple_choice questions only", SAMPLE_MULTIPLE_CHOICE),
            ("true_false questions only", SAMPLE_TRUE_FALSE),
            ("short_answer questions only", SAMPLE_SHORT_ANSWER),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self::new(responses)
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        let haystack = format!(
            "{}\n{}",
            request.system_prompt.as_deref().unwrap_or_default(),
            request.prompt
        );
        let content = self
            .responses
            .iter()
            .find(|(key, _)| haystack.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        let prompt_tokens = (haystack.len() / 4) as u32; // Rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
                estimated_cost_usd: 0.0,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
            accepts_pdf: true,
        }]
    }
}
