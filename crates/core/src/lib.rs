pub mod acquire;
pub mod chunk;
pub mod error;
pub mod generate;
pub mod llm;
pub mod notecard;
pub mod parser;
pub mod pipeline;
pub mod request;
pub mod source;
pub mod summarize;

pub use acquire::AcquireConfig;
pub use acquire::page::fetch_page_text;
pub use acquire::recognize::{
    HostedRecognizer, RecognitionConfig, RecognitionEngine, RecognizerFactory, recognize_upload,
};
pub use acquire::transcript::{
    CaptionProvider, TimedTextCaptions, extract_video_id, fetch_transcript,
};
pub use chunk::{DEFAULT_CHUNK_LEN, chunk_text};
pub use error::{ArticleBiteError, Result};
pub use generate::{GeneratedDocument, MAX_ATTEMPTS, generate_document};
pub use llm::{ChatCompletion, CompletionConfig, OpenAiCompletion};
pub use notecard::{CHOICE_COUNT, Deck, Notecard};
pub use parser::{parse_document, render_document};
pub use pipeline::{NotecardPipeline, PipelineConfig, PipelineConfigBuilder, run_text, run_url};
pub use request::{Difficulty, GenerationRequest, QuestionType};
pub use source::{RawText, SourceDescriptor, SourceKind};
pub use summarize::summarize_chunks;
