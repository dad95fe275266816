use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use articlebite_core::{
    Deck, Difficulty, GenerationRequest, NotecardPipeline, PipelineConfig, QuestionType,
    SourceDescriptor, parse_document,
};
use clap::Parser;
use owo_colors::OwoColorize;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for generated decks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
    Raw,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            "raw" => Ok(Self::Raw),
            _ => Err(format!("Invalid format: {}. Valid options: json, text, raw", s)),
        }
    }
}

/// Generate study notecards from web pages, documents, and video transcripts
#[derive(Parser, Debug)]
#[command(name = "articlebite")]
#[command(author = "ArticleBite Contributors")]
#[command(version)]
#[command(about = "Generate study notecards from articles, uploads, and videos", long_about = None)]
struct Args {
    /// URL, YouTube link, local file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Number of notecards to generate
    #[arg(short = 'n', long, default_value = "5", value_name = "NUM")]
    count: usize,

    /// Question difficulty (easy, medium, hard)
    #[arg(long, default_value = "medium", value_name = "LEVEL")]
    difficulty: Difficulty,

    /// Question format (multiple-choice, essay, short-answer, true-false)
    #[arg(short = 'q', long, default_value = "multiple-choice", value_name = "TYPE")]
    question_type: QuestionType,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (json, text, raw)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Timeout in seconds for every outbound request
    #[arg(long, default_value = "60", value_name = "SECS")]
    timeout: u64,

    /// Completion model identifier
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Completion endpoint base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Completion API key (default: ARTICLEBITE_API_KEY)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Maximum characters per summarization chunk
    #[arg(long, default_value = "4000", value_name = "NUM")]
    chunk_size: usize,

    /// Caption language for YouTube sources
    #[arg(long, default_value = "en", value_name = "LANG")]
    language: String,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable step-by-step progress output
    #[arg(short, long)]
    verbose: bool,
}

/// Whether the URL points at a YouTube property with fetchable captions
fn is_youtube_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com")
    })
}

/// Best-effort MIME hint from a file extension. Text files bypass the
/// recognition service; images are sent to it.
fn mime_hint_for(path: &str) -> Option<String> {
    let extension = std::path::Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "txt" | "md" | "markdown" | "text" => "text/plain",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => return None,
    };
    Some(mime.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        echo::print_banner();
        echo::print_info("Progress output enabled");
        eprintln!();
    }

    let request = GenerationRequest::new(args.count, args.difficulty, args.question_type)?;

    let descriptor = if args.input == "-" {
        if args.verbose {
            echo::print_step(1, 4, "Reading from stdin");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;

        if args.verbose {
            eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(buffer.len()).bright_white());
            eprintln!();
        }

        SourceDescriptor::UploadedFile {
            bytes: buffer.into_bytes(),
            mime_hint: Some("text/plain".to_string()),
        }
    } else if args.input.starts_with("http://") || args.input.starts_with("https://") {
        let url = Url::parse(&args.input).with_context(|| format!("Invalid URL: {}", args.input))?;

        if is_youtube_host(&url) {
            if args.verbose {
                echo::print_step(
                    1,
                    4,
                    &format!("Fetching captions from {}", args.input.bright_white().underline()),
                );
                eprintln!();
            }
            SourceDescriptor::YouTubeUrl(args.input.clone())
        } else {
            if args.verbose {
                echo::print_step(
                    1,
                    4,
                    &format!("Fetching page {}", args.input.bright_white().underline()),
                );
                eprintln!();
            }
            SourceDescriptor::Url(args.input.clone())
        }
    } else {
        if args.verbose {
            echo::print_step(1, 4, &format!("Reading from file {}", args.input.bright_white()));
        }
        let bytes =
            fs::read(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?;

        if args.verbose {
            eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(bytes.len()).bright_white());
            eprintln!();
        }

        SourceDescriptor::UploadedFile { bytes, mime_hint: mime_hint_for(&args.input) }
    };

    let api_key = args
        .api_key
        .or_else(|| env::var("ARTICLEBITE_API_KEY").ok())
        .unwrap_or_default();

    let mut builder = PipelineConfig::builder()
        .api_key(api_key)
        .timeout(args.timeout)
        .chunk_len(args.chunk_size)
        .caption_language(args.language.as_str());

    if let Some(model) = args.model {
        builder = builder.model(model);
    }
    if let Some(base_url) = args.base_url {
        builder = builder.base_url(base_url);
    }
    if let Some(user_agent) = args.user_agent {
        builder = builder.user_agent(user_agent);
    }

    let pipeline =
        NotecardPipeline::new(builder.build()).context("Failed to initialize the pipeline")?;
    let source_label = descriptor.label();

    if args.verbose {
        echo::print_step(2, 4, "Summarizing source text");
    }

    let summary = pipeline
        .summarize_source(&descriptor)
        .await
        .context("Failed to summarize source")?;

    if args.verbose {
        eprintln!("  {} {}", "Summary:".dimmed(), echo::format_size(summary.len()).bright_white());
        eprintln!();
        echo::print_step(
            3,
            4,
            &format!("Generating {} {} questions", request.count, request.question_type),
        );
    }

    let document = pipeline
        .generate_document(&summary, &request)
        .await
        .context("Failed to generate questions")?;

    let output = if args.format == OutputFormat::Raw {
        document.into_string()
    } else {
        let cards = parse_document(&document, request.question_type);
        if cards.is_empty() {
            echo::print_warning("No notecards could be generated from this content");
            std::process::exit(2);
        }

        if args.verbose {
            eprintln!("  {} {}", "Cards:".dimmed(), cards.len().to_string().bright_white());
            eprintln!();
        }

        let deck = Deck::new(source_label, request.difficulty, request.question_type, cards);
        match args.format {
            OutputFormat::Json => deck.to_json().context("Failed to serialize deck")?,
            _ => deck.to_text(),
        }
    };

    if args.verbose {
        echo::print_step(4, 4, "Writing output");
        eprintln!("  {} {}", "Format:".dimmed(), format!("{:?}", args.format).bright_white());
        eprintln!();
    }

    match args.output {
        Some(path) => {
            fs::write(&path, output)
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}
