use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("articlebite")
        .version("1.0.0")
        .author("ArticleBite Contributors")
        .about("Generate study notecards from articles, uploads, and videos")
        .arg(clap::arg!(<INPUT> "URL, YouTube link, local file, or '-' for stdin"))
        .arg(clap::arg!(-n --count <NUM> "Number of notecards to generate").default_value("5"))
        .arg(
            clap::arg!(--difficulty <LEVEL> "Question difficulty (easy, medium, hard)")
                .default_value("medium")
                .value_parser(["easy", "medium", "hard"]),
        )
        .arg(
            clap::arg!(-q --"question-type" <TYPE> "Question format")
                .default_value("multiple-choice")
                .value_parser(["multiple-choice", "essay", "short-answer", "true-false"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, text, raw)")
                .default_value("json")
                .value_parser(["json", "text", "raw"]),
        )
        .arg(clap::arg!(--timeout <SECS> "Timeout in seconds for every outbound request").default_value("60"))
        .arg(clap::arg!(--model <MODEL> "Completion model identifier"))
        .arg(clap::arg!(--"base-url" <URL> "Completion endpoint base URL"))
        .arg(clap::arg!(--"api-key" <KEY> "Completion API key"))
        .arg(
            clap::arg!(--"chunk-size" <NUM> "Maximum characters per summarization chunk")
                .default_value("4000"),
        )
        .arg(clap::arg!(--language <LANG> "Caption language for YouTube sources").default_value("en"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(-v --verbose "Enable step-by-step progress output"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "articlebite", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "articlebite", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "articlebite", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "articlebite", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
