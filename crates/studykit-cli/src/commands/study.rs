//! The `studykit study` command: interactive sessions on stdin/stdout.
//!
//! Every session reads one line per action. EOF abandons the session
//! without touching the store. Scores are written only when a session
//! completes, flashcard progress after every marked card.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use studykit_core::error::LOAD_FAILED_USER_MESSAGE;
use studykit_core::flashcards::{FlashcardSession, MarkOutcome};
use studykit_core::grader::{score_message, GradingResult};
use studykit_core::matching::{format_elapsed, MatchingSession, SelectOutcome};
use studykit_core::model::{
    ContentKind, Flashcard, GradedItem, LearningMode, MatchingSet, NormalizedContent,
    OptionLetter, TestSubtype, UserAnswer,
};
use studykit_core::store::ScoreStore;
use studykit_core::test_session::{Advance, TestSession};
use studykit_core::validator::ContentValidator;

use super::{build_generator, resolve_document, Context};

/// Where the session's content comes from.
pub struct Source {
    /// A saved content file, validated before use.
    pub content: Option<PathBuf>,
    /// A PDF to generate from instead of the uploaded document.
    pub pdf: Option<PathBuf>,
}

pub async fn execute(
    ctx: &Context,
    mode: LearningMode,
    test_type: Option<TestSubtype>,
    source: Source,
    provider: Option<String>,
    model: Option<String>,
    seed: Option<u64>,
) -> Result<()> {
    let config = ctx.config()?;
    let mut store = ctx.store(&config)?;
    let kind = ContentKind::for_mode(mode, test_type);

    let content = match source.content {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read content: {}", path.display()))?;
            match ContentValidator::new(config.validator()).validate_text(kind, &text) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("{e}");
                    anyhow::bail!(LOAD_FAILED_USER_MESSAGE);
                }
            }
        }
        None => {
            let document = resolve_document(&store, source.pdf.as_deref())?;
            let generator = build_generator(&config, provider.as_deref(), model.as_deref())?;
            eprintln!("Generating {kind} from {}...", document.file_name);
            match generator.generate(&document, kind).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("{e:#}");
                    eprintln!("{}", e.user_message());
                    anyhow::bail!(LOAD_FAILED_USER_MESSAGE);
                }
            }
        }
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = std::io::stdout();

    run_session(content, &mut lines, &mut out, &mut store, &mut rng).await
}

/// Drive the session matching `content` until it is finished or abandoned.
pub async fn run_session<R, W>(
    content: NormalizedContent,
    lines: &mut Lines<R>,
    out: &mut W,
    store: &mut ScoreStore,
    rng: &mut StdRng,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mode = content.mode();
    match content {
        NormalizedContent::Quiz(questions) => {
            run_test(TestSession::from_quiz(questions)?, mode, lines, out, store).await
        }
        NormalizedContent::Test(items) => {
            run_test(TestSession::new(items)?, mode, lines, out, store).await
        }
        NormalizedContent::Flashcards(cards) => run_flashcards(cards, lines, out, store).await,
        NormalizedContent::Matching(set) => run_matching(set, lines, out, store, rng).await,
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<Option<String>> {
    let line = lines.next_line().await.context("failed to read input")?;
    Ok(line.map(|l| l.trim().to_string()))
}

/// Ask whether to go again. EOF counts as no.
async fn play_again<R, W>(lines: &mut Lines<R>, out: &mut W) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "Enter r to try again, anything else to finish.")?;
    out.flush()?;
    Ok(read_line(lines)
        .await?
        .is_some_and(|l| l.eq_ignore_ascii_case("r")))
}

// ---------------------------------------------------------------------------
// Quiz and test
// ---------------------------------------------------------------------------

async fn run_test<R, W>(
    mut session: TestSession,
    mode: LearningMode,
    lines: &mut Lines<R>,
    out: &mut W,
    store: &mut ScoreStore,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        out,
        "{} questions. Type :prev to go back, :quit to stop.",
        session.items().len()
    )?;

    loop {
        print_item(out, &session)?;
        let Some(input) = read_line(lines).await? else {
            return Ok(());
        };

        match input.as_str() {
            ":q" | ":quit" => return Ok(()),
            ":p" | ":prev" => {
                if !session.previous() {
                    writeln!(out, "Already at the first question.")?;
                }
                continue;
            }
            _ => {}
        }

        let Some(answer) = parse_answer(session.current_item(), &input) else {
            writeln!(out, "{}", answer_hint(session.current_item()))?;
            continue;
        };
        session.answer(answer)?;

        if let Advance::Submitted(result) = session.next()? {
            print_result(out, session.items(), &result)?;
            store.set_score(mode.as_str(), f64::from(result.percentage))?;
            store.set_progress(mode.as_str(), 100.0)?;

            if !play_again(lines, out).await? {
                return Ok(());
            }
            session.reset();
        }
    }
}

fn print_item<W: Write>(out: &mut W, session: &TestSession) -> Result<()> {
    let item = session.current_item();
    writeln!(
        out,
        "\nQuestion {}/{}: {}",
        session.current_index() + 1,
        session.items().len(),
        item.question()
    )?;
    if let GradedItem::MultipleChoice { options, .. } = item {
        for (letter, option) in OptionLetter::ALL.iter().zip(options) {
            writeln!(out, "  {letter}. {option}")?;
        }
    }
    if let Some(current) = describe_answer(session.current_answer()) {
        writeln!(out, "  (current answer: {current})")?;
    }
    write!(out, "{} ", answer_hint(item))?;
    out.flush()?;
    Ok(())
}

fn answer_hint(item: &GradedItem) -> &'static str {
    match item {
        GradedItem::MultipleChoice { .. } => "Answer with A, B, C or D:",
        GradedItem::TrueFalse { .. } => "Answer true or false:",
        GradedItem::ShortAnswer { .. } => "Type your answer:",
    }
}

fn parse_answer(item: &GradedItem, input: &str) -> Option<UserAnswer> {
    match item {
        GradedItem::MultipleChoice { .. } => input
            .to_uppercase()
            .parse::<OptionLetter>()
            .ok()
            .map(UserAnswer::Choice),
        GradedItem::TrueFalse { .. } => match input.to_lowercase().as_str() {
            "t" | "true" | "y" | "yes" => Some(UserAnswer::Boolean(true)),
            "f" | "false" | "n" | "no" => Some(UserAnswer::Boolean(false)),
            _ => None,
        },
        GradedItem::ShortAnswer { .. } => {
            (!input.is_empty()).then(|| UserAnswer::Text(input.to_string()))
        }
    }
}

fn describe_answer(answer: &UserAnswer) -> Option<String> {
    match answer {
        UserAnswer::Unanswered => None,
        UserAnswer::Choice(letter) => Some(letter.to_string()),
        UserAnswer::Boolean(value) => Some(value.to_string()),
        UserAnswer::Text(text) => Some(text.clone()),
    }
}

fn correct_answer(item: &GradedItem) -> String {
    match item {
        GradedItem::MultipleChoice {
            options,
            correct_option,
            ..
        } => format!("{correct_option}. {}", options[correct_option.index()]),
        GradedItem::TrueFalse { correct_value, .. } => correct_value.to_string(),
        GradedItem::ShortAnswer { correct_text, .. } => correct_text.clone(),
    }
}

fn print_result<W: Write>(out: &mut W, items: &[GradedItem], result: &GradingResult) -> Result<()> {
    writeln!(
        out,
        "\nScore: {}/{} ({}%)",
        result.correct_count, result.total_count, result.percentage
    )?;
    writeln!(out, "{}", score_message(result.percentage))?;
    for (i, (item, correct)) in items.iter().zip(&result.verdicts).enumerate() {
        if *correct {
            writeln!(out, "  {}. correct", i + 1)?;
        } else {
            writeln!(out, "  {}. wrong, answer: {}", i + 1, correct_answer(item))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Flashcards
// ---------------------------------------------------------------------------

async fn run_flashcards<R, W>(
    cards: Vec<Flashcard>,
    lines: &mut Lines<R>,
    out: &mut W,
    store: &mut ScoreStore,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mode = LearningMode::Flashcards.as_str();
    let mut session = FlashcardSession::new(cards)?;
    writeln!(
        out,
        "{} cards. Enter flips, k = knew it, u = didn't, p = previous, q = quit.",
        session.len()
    )?;

    loop {
        let card = session.current_card();
        writeln!(
            out,
            "\nCard {}/{}: {}",
            session.current_index() + 1,
            session.len(),
            card.term
        )?;
        out.flush()?;

        let Some(input) = read_line(lines).await? else {
            return Ok(());
        };
        let outcome = match input.to_lowercase().as_str() {
            "" | "f" | "flip" => {
                if session.flip()? {
                    writeln!(out, "  {}", session.current_card().definition)?;
                }
                continue;
            }
            "k" | "known" => session.mark_known()?,
            "u" | "unknown" => session.mark_unknown()?,
            "p" | "prev" => {
                if !session.previous() {
                    writeln!(out, "Already at the first card.")?;
                }
                continue;
            }
            "q" | "quit" => return Ok(()),
            other => {
                writeln!(out, "Unknown command: {other}")?;
                continue;
            }
        };

        match outcome {
            MarkOutcome::Next { progress, .. } => store.set_progress(mode, progress)?,
            MarkOutcome::Finished { score, progress } => {
                store.set_progress(mode, progress)?;
                store.set_score(mode, f64::from(score))?;
                writeln!(
                    out,
                    "\nYou knew {} of {} cards ({score}%).",
                    session.known(),
                    session.len()
                )?;
                writeln!(out, "{}", score_message(score))?;

                if !play_again(lines, out).await? {
                    return Ok(());
                }
                session.reset();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

async fn run_matching<R, W, G>(
    set: MatchingSet,
    lines: &mut Lines<R>,
    out: &mut W,
    store: &mut ScoreStore,
    rng: &mut G,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    G: Rng + ?Sized,
{
    let mut session = MatchingSession::new(set);
    session.start(rng);
    writeln!(
        out,
        "Match the {} pairs. Pick cards by number, b = board, r = reshuffle, q = quit.",
        session.pair_count()
    )?;
    print_board(out, &session)?;

    let mut clock = tokio::time::interval(Duration::from_secs(1));
    clock.tick().await;

    loop {
        let input = tokio::select! {
            _ = clock.tick() => {
                session.tick();
                continue;
            }
            line = read_line(lines) => line?,
        };
        let Some(input) = input else {
            return Ok(());
        };

        let card_id = match input.to_lowercase().as_str() {
            "q" | "quit" => return Ok(()),
            "b" | "board" => {
                print_board(out, &session)?;
                continue;
            }
            "r" | "reshuffle" => {
                session.reset(rng);
                clock.reset();
                print_board(out, &session)?;
                continue;
            }
            other => match other.parse::<usize>() {
                Ok(n) if (1..=session.cards().len()).contains(&n) => {
                    session.cards()[n - 1].id.clone()
                }
                _ => {
                    writeln!(
                        out,
                        "Pick a card number between 1 and {}.",
                        session.cards().len()
                    )?;
                    continue;
                }
            },
        };

        let outcome = match session.select_card(&card_id) {
            Ok(outcome) => outcome,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        match outcome {
            SelectOutcome::Pending => {
                if let Some(card) = session.pending() {
                    writeln!(out, "Selected: {}", card.content)?;
                }
            }
            SelectOutcome::MatchFound => writeln!(
                out,
                "Match found! ({}/{})",
                session.matched_pairs(),
                session.pair_count()
            )?,
            SelectOutcome::NoMatch => writeln!(out, "Not a match. Try again!")?,
            SelectOutcome::AlreadyMatched => writeln!(out, "Already matched.")?,
        }
        out.flush()?;

        if let Some(secs) = session.completion() {
            store.set_score(LearningMode::Matching.as_str(), secs as f64)?;
            writeln!(out, "\nCompleted in {}!", format_elapsed(secs))?;

            if !play_again(lines, out).await? {
                return Ok(());
            }
            session.reset(rng);
            clock.reset();
            print_board(out, &session)?;
        }
    }
}

fn print_board<W: Write>(out: &mut W, session: &MatchingSession) -> Result<()> {
    writeln!(out, "\nTime: {}", format_elapsed(session.elapsed_secs()))?;
    for (i, card) in session.cards().iter().enumerate() {
        let mark = if session.is_matched(&card.id) { "x" } else { " " };
        writeln!(out, "  [{mark}] {:>2}. {}", i + 1, card.content)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use studykit_core::store::MemoryStorage;

    fn validate(kind: ContentKind, json: serde_json::Value) -> NormalizedContent {
        ContentValidator::default().validate(kind, &json).unwrap()
    }

    fn store() -> ScoreStore {
        ScoreStore::open(Box::new(MemoryStorage::new())).unwrap()
    }

    async fn run(content: NormalizedContent, input: &str, store: &mut ScoreStore) -> String {
        let mut lines = BufReader::new(input.as_bytes()).lines();
        let mut out = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        run_session(content, &mut lines, &mut out, store, &mut rng)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn test_content() -> NormalizedContent {
        validate(
            ContentKind::Test,
            serde_json::json!([
                {"type": "multiple_choice", "question": "Capital of France?", "options": ["Paris", "Rome", "Oslo", "Bern"], "answer": "A"},
                {"type": "true_false", "question": "Water boils at 100C at sea level.", "answer": true},
                {"type": "short_answer", "question": "Largest planet?", "answer": "Jupiter", "acceptableAnswers": ["planet jupiter"]},
                {"type": "true_false", "question": "The sun orbits the earth.", "answer": false}
            ]),
        )
    }

    #[test]
    fn answers_parse_per_item_type() {
        let NormalizedContent::Test(items) = test_content() else {
            unreachable!()
        };
        assert_eq!(
            parse_answer(&items[0], "b"),
            Some(UserAnswer::Choice(OptionLetter::B))
        );
        assert_eq!(parse_answer(&items[0], "E"), None);
        assert_eq!(parse_answer(&items[1], "Yes"), Some(UserAnswer::Boolean(true)));
        assert_eq!(parse_answer(&items[1], "maybe"), None);
        assert_eq!(
            parse_answer(&items[2], "jupiter"),
            Some(UserAnswer::Text("jupiter".into()))
        );
        assert_eq!(parse_answer(&items[2], ""), None);
    }

    #[tokio::test]
    async fn test_session_records_score_and_progress() {
        let mut store = store();
        let output = run(
            test_content(),
            "a\nmaybe\ntrue\n  JUPITER \ntrue\nq\n",
            &mut store,
        )
        .await;

        assert!(output.contains("Answer true or false:"));
        assert!(output.contains("Score: 3/4 (75%)"));
        assert!(output.contains("4. wrong, answer: false"));
        let record = store.get_progress("test").unwrap();
        assert_eq!(record.last_score, Some(75.0));
        assert_eq!(record.progress, Some(100.0));
    }

    #[tokio::test]
    async fn quiz_can_go_back_and_change_an_answer() {
        let quiz = validate(
            ContentKind::Quiz,
            serde_json::json!([
                {"question": "q1", "options": ["a", "b", "c", "d"], "answer": "A"},
                {"question": "q2", "options": ["a", "b", "c", "d"], "answer": "B"},
                {"question": "q3", "options": ["a", "b", "c", "d"], "answer": "C"},
                {"question": "q4", "options": ["a", "b", "c", "d"], "answer": "D"}
            ]),
        );
        let mut store = store();
        let output = run(quiz, ":prev\nb\n:p\na\nb\nc\nd\n", &mut store).await;

        assert!(output.contains("Already at the first question."));
        assert!(output.contains("(current answer: B)"));
        assert!(output.contains("Score: 4/4 (100%)"));
        assert_eq!(store.get_progress("quiz").unwrap().last_score, Some(100.0));
    }

    #[tokio::test]
    async fn abandoned_session_leaves_store_untouched() {
        let mut store = store();
        run(test_content(), "a\ntrue\n", &mut store).await;
        assert!(store.get_progress("test").is_none());
    }

    fn deck(n: usize) -> NormalizedContent {
        let cards: Vec<serde_json::Value> = (0..n)
            .map(|i| {
                serde_json::json!({"term": format!("term {i}"), "definition": format!("def {i}")})
            })
            .collect();
        validate(ContentKind::Flashcards, serde_json::Value::Array(cards))
    }

    #[tokio::test]
    async fn flashcards_track_progress_and_score() {
        let mut store = store();
        let input = "\nk\nu\nk\nk\nk\nk\nk\nk\nu\nk\n";
        let output = run(deck(10), input, &mut store).await;

        assert!(output.contains("  def 0"));
        assert!(output.contains("You knew 8 of 10 cards (80%)."));
        assert!(output.contains("Great job!"));
        let record = store.get_progress("flashcards").unwrap();
        assert_eq!(record.progress, Some(100.0));
        assert_eq!(record.last_score, Some(80.0));
    }

    #[tokio::test]
    async fn flashcard_progress_is_saved_before_finishing() {
        let mut store = store();
        run(deck(10), "k\nu\nk\nq\n", &mut store).await;
        let record = store.get_progress("flashcards").unwrap();
        assert_eq!(record.progress, Some(30.0));
        assert_eq!(record.last_score, None);
    }

    fn matching_set() -> NormalizedContent {
        validate(
            ContentKind::Matching,
            serde_json::json!({"pairs": [
                {"left": "H2O", "right": "water"},
                {"left": "NaCl", "right": "salt"},
                {"left": "CO2", "right": "carbon dioxide"},
                {"left": "O2", "right": "oxygen"}
            ]}),
        )
    }

    /// Board positions of `card_ids` once the session shuffles with seed 1.
    fn positions(content: &NormalizedContent, card_ids: &[&str]) -> String {
        let NormalizedContent::Matching(set) = content else {
            unreachable!()
        };
        let mut session = MatchingSession::new(set.clone());
        session.start(&mut StdRng::seed_from_u64(1));
        card_ids
            .iter()
            .map(|id| {
                let index = session.cards().iter().position(|c| c.id == *id).unwrap();
                format!("{}\n", index + 1)
            })
            .collect()
    }

    #[tokio::test]
    async fn matching_by_position_records_time() {
        let content = matching_set();
        let input = positions(
            &content,
            &[
                "left-0", "right-1", "left-0", "right-0", "right-0", "left-1", "right-1", "left-2",
                "right-2", "right-3", "left-3",
            ],
        );
        let mut store = store();
        let output = run(content, &input, &mut store).await;

        assert!(output.contains("Not a match. Try again!"));
        assert!(output.contains("Already matched."));
        assert!(output.contains("Match found! (4/4)"));
        assert!(output.contains("Completed in"));
        assert!(store.get_progress("matching").unwrap().last_score.is_some());
    }

    #[tokio::test]
    async fn board_hides_pairing() {
        let mut store = store();
        let output = run(matching_set(), "q\n", &mut store).await;
        assert!(output.contains("H2O"));
        assert!(output.contains("carbon dioxide"));
        assert!(!output.contains("left-"));
        assert!(!output.contains("right-"));
    }

    #[tokio::test]
    async fn out_of_range_pick_is_reported() {
        let mut store = store();
        let output = run(matching_set(), "9\nleft-0\nq\n", &mut store).await;
        assert_eq!(output.matches("Pick a card number between 1 and 8.").count(), 2);
        assert!(store.get_progress("matching").is_none());
    }
}
