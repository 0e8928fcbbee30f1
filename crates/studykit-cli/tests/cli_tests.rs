//! CLI integration tests using assert_cmd.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use studykit_core::matching::MatchingSession;
use studykit_core::model::{ContentKind, NormalizedContent};
use studykit_core::validator::ContentValidator;
use tempfile::TempDir;

const TINY_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n";

const QUIZ: &str = r#"[
  {"question": "2 + 2?", "options": ["4", "5", "6", "7"], "answer": "A"},
  {"question": "Capital of Italy?", "options": ["Paris", "Rome", "Oslo", "Bern"], "answer": "B"},
  {"question": "Largest ocean?", "options": ["Arctic", "Indian", "Pacific", "Atlantic"], "answer": "C"},
  {"question": "H2O is?", "options": ["Salt", "Air", "Gold", "Water"], "answer": "D"}
]"#;

/// A command isolated from the user's config and state.
fn studykit(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("studykit").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("RUST_LOG")
        .env_remove("STUDYKIT_GEMINI_KEY")
        .env_remove("STUDYKIT_ANTHROPIC_KEY")
        .env_remove("STUDYKIT_OPENAI_KEY");
    cmd
}

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn upload(dir: &TempDir) {
    let pdf = write_file(dir, "notes.pdf", TINY_PDF);
    studykit(dir)
        .arg("upload")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded notes.pdf"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    studykit(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("flashcards"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    studykit(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("studykit"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    studykit(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created studykit.toml"));

    assert!(dir.path().join("studykit.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    studykit(&dir).arg("init").assert().success();

    studykit(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn upload_rejects_non_pdf() {
    let dir = TempDir::new().unwrap();
    let txt = write_file(&dir, "notes.txt", b"plain text");

    studykit(&dir)
        .arg("upload")
        .arg(&txt)
        .assert()
        .failure()
        .stderr(predicate::str::contains("only PDF files"));
}

#[test]
fn upload_rejects_large_pdf() {
    let dir = TempDir::new().unwrap();
    let mut big = TINY_PDF.to_vec();
    big.resize(5 * 1024 * 1024 + 1, b' ');
    let pdf = write_file(&dir, "big.pdf", &big);

    studykit(&dir)
        .arg("upload")
        .arg(&pdf)
        .assert()
        .failure()
        .stderr(predicate::str::contains("under 5MB"));
}

#[test]
fn upload_persists_document_in_state_file() {
    let dir = TempDir::new().unwrap();
    upload(&dir);

    let state =
        std::fs::read_to_string(dir.path().join(".studykit/learning-storage.json")).unwrap();
    let state: serde_json::Value = serde_json::from_str(&state).unwrap();
    assert_eq!(state["fileName"], "notes.pdf");
    assert!(state["pdfContent"].is_string());

    studykit(&dir)
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Document: notes.pdf"))
        .stdout(predicate::str::contains("not attempted"));
}

#[test]
fn generate_without_document_fails() {
    let dir = TempDir::new().unwrap();

    studykit(&dir)
        .args(["generate", "--mode", "quiz", "--provider", "mock"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no document uploaded"));
}

#[test]
fn generate_with_mock_then_validate() {
    let dir = TempDir::new().unwrap();
    upload(&dir);

    studykit(&dir)
        .args(["generate", "--mode", "matching", "--provider", "mock"])
        .args(["--output", "matching.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("matching.json"));

    studykit(&dir)
        .args(["validate", "--mode", "matching", "matching.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid matching content: 4 pairs"));
}

#[test]
fn generate_default_output_lands_in_state_dir() {
    let dir = TempDir::new().unwrap();
    upload(&dir);

    studykit(&dir)
        .args(["generate", "--mode", "test", "--test-type", "true_false"])
        .args(["--provider", "mock"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".studykit"))
        .stdout(predicate::str::contains("test-"));
}

#[test]
fn test_type_requires_test_mode() {
    let dir = TempDir::new().unwrap();
    upload(&dir);

    studykit(&dir)
        .args(["generate", "--mode", "quiz", "--test-type", "mixed", "--provider", "mock"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--test-type only applies"));
}

#[test]
fn validate_reports_shape_path() {
    let dir = TempDir::new().unwrap();
    let broken = QUIZ.replacen(r#"["4", "5", "6", "7"]"#, r#"["4", "5", "6"]"#, 1);
    write_file(&dir, "quiz.json", broken.as_bytes());

    studykit(&dir)
        .args(["validate", "--mode", "quiz", "quiz.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("$[0].options"));
}

#[test]
fn study_quiz_records_score() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "quiz.json", QUIZ.as_bytes());

    studykit(&dir)
        .args(["study", "--mode", "quiz", "--content", "quiz.json"])
        .write_stdin("a\nb\nc\nd\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 4/4 (100%)"))
        .stdout(predicate::str::contains("Perfect score!"));

    studykit(&dir)
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("100%"));
}

#[test]
fn study_with_broken_content_fails_to_load() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "quiz.json", b"{\"not\": \"a quiz\"}");

    studykit(&dir)
        .args(["study", "--mode", "quiz", "--content", "quiz.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to load content. Try another document.",
        ));
}

const MATCHING: &str = r#"{"pairs": [
  {"left": "H2O", "right": "water"},
  {"left": "NaCl", "right": "salt"},
  {"left": "CO2", "right": "carbon dioxide"},
  {"left": "O2", "right": "oxygen"}
]}"#;

/// Stdin that solves the `MATCHING` board as shuffled by `--seed 3`.
fn solve_matching() -> String {
    let content = ContentValidator::default()
        .validate_text(ContentKind::Matching, MATCHING)
        .unwrap();
    let NormalizedContent::Matching(set) = content else {
        unreachable!()
    };
    let mut session = MatchingSession::new(set);
    session.start(&mut StdRng::seed_from_u64(3));
    let position = |id: String| {
        let index = session.cards().iter().position(|c| c.id == id).unwrap();
        format!("{}\n", index + 1)
    };
    (0..4)
        .flat_map(|i| [format!("left-{i}"), format!("right-{i}")])
        .map(position)
        .collect()
}

#[test]
fn study_matching_records_time() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "matching.json", MATCHING.as_bytes());

    studykit(&dir)
        .args(["study", "--mode", "matching", "--content", "matching.json", "--seed", "3"])
        .write_stdin(solve_matching())
        .assert()
        .success()
        .stdout(predicate::str::contains("Match found! (4/4)"))
        .stdout(predicate::str::contains("Completed in"))
        .stdout(predicate::str::contains("left-0").not());

    studykit(&dir)
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("0:0"));
}

#[test]
fn study_matching_generated_by_mock() {
    let dir = TempDir::new().unwrap();
    upload(&dir);

    studykit(&dir)
        .args(["study", "--mode", "matching", "--provider", "mock"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Match the 4 pairs."))
        .stdout(predicate::str::contains("right-").not());
}

#[test]
fn study_without_document_suggests_upload() {
    let dir = TempDir::new().unwrap();

    studykit(&dir)
        .args(["study", "--mode", "quiz", "--provider", "mock"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("studykit upload <pdf>"))
        .stderr(predicate::str::contains("--pdf"));
}

#[test]
fn study_generates_from_pdf_flag() {
    let dir = TempDir::new().unwrap();
    let pdf = write_file(&dir, "notes.pdf", TINY_PDF);

    studykit(&dir)
        .args(["study", "--mode", "quiz", "--provider", "mock", "--pdf"])
        .arg(&pdf)
        .write_stdin(":q\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Generating quiz from notes.pdf"));
}

#[test]
fn clear_document_and_mode() {
    let dir = TempDir::new().unwrap();
    upload(&dir);

    studykit(&dir)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed notes.pdf."));

    studykit(&dir)
        .args(["clear", "--mode", "quiz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No quiz progress to clear."));

    studykit(&dir)
        .args(["clear", "--progress", "--mode", "quiz"])
        .assert()
        .failure();
}

#[test]
fn list_models_from_config() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "studykit.toml",
        b"default_provider = \"mock\"\n\n[providers.mock]\ntype = \"mock\"\n",
    );

    studykit(&dir)
        .arg("list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider: mock (default)"))
        .stdout(predicate::str::contains("mock-model"));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();

    studykit(&dir)
        .args(["--config", "nope.toml", "progress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
