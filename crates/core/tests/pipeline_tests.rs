//! End-to-end pipeline tests with scripted collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use articlebite_core::*;
use async_trait::async_trait;

/// Completion stub that replays queued replies and counts calls.
struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn new<I>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletion for ScriptedLlm {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _max_tokens: u32,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies.lock().unwrap().pop_front().ok_or_else(|| {
            ArticleBiteError::Completion {
                provider: "scripted".to_string(),
                message: "script exhausted".to_string(),
            }
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

fn pipeline_with(llm: Arc<ScriptedLlm>) -> NotecardPipeline {
    NotecardPipeline::with_completion(PipelineConfig::default(), llm)
}

/// A well-formed plain-grammar document for `count` items plus the sentinel.
fn essay_doc(count: usize) -> String {
    let mut text = String::new();
    for n in 1..=count {
        text.push_str(&format!("objective{n}={{Question {n}?}}\n"));
        text.push_str(&format!("answer{n}={{Answer {n}.}}\n"));
    }
    let sentinel = count + 1;
    text.push_str(&format!("objective{sentinel}=empty\nanswer{sentinel}=empty\n"));
    text
}

/// Source text long enough to need several chunks at the default length.
fn algebra_text() -> String {
    let sentences = [
        "Algebra is the study of symbols and the rules for manipulating them.",
        "An equation states that two expressions are equal.",
        "Solving an equation means finding the values that make it true!",
        "Did the quadratic formula change how equations are solved?",
    ];

    let mut text = String::new();
    while text.len() < 9_500 {
        for sentence in sentences {
            text.push_str(sentence);
            text.push(' ');
        }
    }
    text
}

#[tokio::test]
async fn test_essay_scenario_over_long_text() {
    let text = algebra_text();
    let chunks = chunk_text(&text, DEFAULT_CHUNK_LEN);
    assert!(chunks.len() >= 2, "scenario needs a multi-chunk source");

    let mut replies: Vec<String> =
        (1..=chunks.len()).map(|n| format!("Key points from part {n}.")).collect();
    replies.push(essay_doc(3));

    let llm = ScriptedLlm::new(replies);
    let pipeline = pipeline_with(llm.clone());
    let request = GenerationRequest::new(3, Difficulty::Medium, QuestionType::Essay).unwrap();

    let deck = pipeline.deck_from_text(&text, &request).await.unwrap();

    // One summarization call per chunk, then a single generation call.
    assert_eq!(llm.calls(), chunks.len() + 1);
    assert_eq!(deck.len(), 3);
    for card in &deck.cards {
        assert!(!card.objective.is_empty());
        assert!(!card.explanation.is_empty());
        assert!(card.choices.is_none());
        assert!(card.correct_answer.is_none());
    }
}

#[tokio::test]
async fn test_generation_retry_succeeds_on_third_call() {
    let underproduced = essay_doc(1);
    let llm = ScriptedLlm::new([
        "summary".to_string(),
        underproduced.clone(),
        underproduced,
        essay_doc(2),
    ]);
    let pipeline = pipeline_with(llm.clone());
    let request = GenerationRequest::new(2, Difficulty::Easy, QuestionType::ShortAnswer).unwrap();

    let deck = pipeline.deck_from_text("One sentence of source.", &request).await.unwrap();

    // 1 summarization + 3 generation attempts.
    assert_eq!(llm.calls(), 4);
    assert_eq!(deck.len(), 2);
}

#[tokio::test]
async fn test_generation_retry_exhaustion_surfaces_counts() {
    let underproduced = essay_doc(1);
    let llm = ScriptedLlm::new([
        "summary".to_string(),
        underproduced.clone(),
        underproduced.clone(),
        underproduced,
    ]);
    let pipeline = pipeline_with(llm.clone());
    let request = GenerationRequest::new(3, Difficulty::Hard, QuestionType::Essay).unwrap();

    let err = pipeline.deck_from_text("Some source.", &request).await.unwrap_err();

    assert_eq!(llm.calls(), 4);
    assert!(matches!(
        err,
        ArticleBiteError::Generation { produced: 2, expected: 4, attempts: 3 }
    ));
    assert!(!err.is_no_cards());
}

#[tokio::test]
async fn test_multiple_choice_deck_end_to_end() {
    let document = "objective1={Which organelle produces ATP?}\n\
                    choices1={Nucleus|Mitochondrion|Ribosome|Golgi apparatus}\n\
                    correctAnswer1={Mitochondrion}\n\
                    answer1={The mitochondrion carries out cellular respiration.}\n\
                    objective2=empty\nanswer2=empty\n";
    let llm = ScriptedLlm::new(["summary".to_string(), document.to_string()]);
    let pipeline = pipeline_with(llm);
    let request =
        GenerationRequest::new(1, Difficulty::Medium, QuestionType::MultipleChoice).unwrap();

    let deck = pipeline.deck_from_text("Mitochondria produce ATP.", &request).await.unwrap();

    assert_eq!(deck.len(), 1);
    let card = &deck.cards[0];
    let choices = card.choices.as_ref().unwrap();
    assert_eq!(choices.len(), 4);
    assert_eq!(card.correct_answer.as_deref(), Some("Mitochondrion"));
    assert!(choices.contains(&"Mitochondrion".to_string()));
}

#[tokio::test]
async fn test_run_returns_the_card_sequence() {
    let llm = ScriptedLlm::new(["summary".to_string(), essay_doc(2)]);
    let pipeline = pipeline_with(llm);
    let request = GenerationRequest::new(2, Difficulty::Medium, QuestionType::Essay).unwrap();

    let descriptor = SourceDescriptor::UploadedFile {
        bytes: b"Notes worth studying.".to_vec(),
        mime_hint: Some("text/plain".to_string()),
    };
    let cards = pipeline.run(descriptor, &request).await.unwrap();

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].objective, "Question 1?");
    assert_eq!(cards[1].objective, "Question 2?");
}

struct FixedCaptions(Vec<&'static str>);

#[async_trait]
impl CaptionProvider for FixedCaptions {
    async fn fetch_captions(&self, _video_id: &str) -> Result<Vec<String>> {
        Ok(self.0.iter().map(|fragment| fragment.to_string()).collect())
    }
}

fn pipeline_with_captions(
    llm: Arc<ScriptedLlm>,
    captions: FixedCaptions,
) -> NotecardPipeline {
    let config = PipelineConfig::default();
    let recognizer = Arc::new(HostedRecognizer::new(RecognitionConfig::default()));
    NotecardPipeline::with_collaborators(config, llm, recognizer, Arc::new(captions))
}

#[tokio::test]
async fn test_transcript_source_end_to_end() {
    let llm = ScriptedLlm::new(["summary".to_string(), essay_doc(1)]);
    let captions =
        FixedCaptions(vec!["Today we look at algebra.", "Equations state equality."]);
    let pipeline = pipeline_with_captions(llm, captions);
    let request = GenerationRequest::new(1, Difficulty::Easy, QuestionType::Essay).unwrap();

    let deck = pipeline
        .generate_deck(
            SourceDescriptor::YouTubeUrl("https://youtu.be/dQw4w9WgXcQ".to_string()),
            &request,
        )
        .await
        .unwrap();

    assert_eq!(deck.len(), 1);
    assert_eq!(deck.source, "https://youtu.be/dQw4w9WgXcQ");
}

#[tokio::test]
async fn test_invalid_video_url_fails_without_llm_calls() {
    let llm = ScriptedLlm::new(Vec::<String>::new());
    let captions = FixedCaptions(vec!["never used"]);
    let pipeline = pipeline_with_captions(llm.clone(), captions);
    let request = GenerationRequest::new(1, Difficulty::Easy, QuestionType::Essay).unwrap();

    let err = pipeline
        .generate_deck(
            SourceDescriptor::YouTubeUrl("https://example.com/notavideo".to_string()),
            &request,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ArticleBiteError::InvalidSource(_)));
    assert_eq!(llm.calls(), 0);
}

struct CountingRecognizer {
    shutdowns: Arc<AtomicUsize>,
}

struct CountingEngine {
    shutdowns: Arc<AtomicUsize>,
}

#[async_trait]
impl RecognizerFactory for CountingRecognizer {
    async fn create(&self) -> Result<Box<dyn RecognitionEngine>> {
        Ok(Box::new(CountingEngine { shutdowns: self.shutdowns.clone() }))
    }
}

#[async_trait]
impl RecognitionEngine for CountingEngine {
    async fn recognize(&self, _image: &[u8]) -> Result<String> {
        Ok("Text pulled from the uploaded image.".to_string())
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_image_upload_end_to_end_releases_the_engine() {
    let shutdowns = Arc::new(AtomicUsize::new(0));
    let llm = ScriptedLlm::new(["summary".to_string(), essay_doc(1)]);
    let pipeline = NotecardPipeline::with_collaborators(
        PipelineConfig::default(),
        llm,
        Arc::new(CountingRecognizer { shutdowns: shutdowns.clone() }),
        Arc::new(FixedCaptions(vec![])),
    );
    let request = GenerationRequest::new(1, Difficulty::Medium, QuestionType::Essay).unwrap();

    let deck = pipeline
        .generate_deck(
            SourceDescriptor::UploadedFile {
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
                mime_hint: Some("image/png".to_string()),
            },
            &request,
        )
        .await
        .unwrap();

    assert_eq!(deck.len(), 1);
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_usable_cards_is_distinguishable_from_faults() {
    // The generator's count check passes, but the choice lines are broken,
    // so the parser drops every item.
    let document = "objective1={Q?}\nchoices1={only|two}\ncorrectAnswer1={only}\n\
                    answer1={A.}\nobjective2=empty\nanswer2=empty\n";
    let llm = ScriptedLlm::new(["summary".to_string(), document.to_string()]);
    let pipeline = pipeline_with(llm);
    let request =
        GenerationRequest::new(1, Difficulty::Easy, QuestionType::MultipleChoice).unwrap();

    let err = pipeline.deck_from_text("Thin material.", &request).await.unwrap_err();
    assert!(err.is_no_cards());
}

#[tokio::test]
async fn test_deck_renders_to_json_and_text() {
    let llm = ScriptedLlm::new(["summary".to_string(), essay_doc(2)]);
    let pipeline = pipeline_with(llm);
    let request = GenerationRequest::new(2, Difficulty::Hard, QuestionType::Essay).unwrap();

    let deck = pipeline.deck_from_text("Source material.", &request).await.unwrap();

    let json = deck.to_json().unwrap();
    let reparsed: Deck = serde_json::from_str(&json).unwrap();
    assert_eq!(reparsed, deck);

    let text = deck.to_text();
    assert!(text.contains("1. Question 1?"));
    assert!(text.contains("2 essay cards (hard)"));
}
