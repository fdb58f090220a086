//! Loci Moderation Checker
//!
//! Run a note text through the moderation gate from a shell.
//!
//! Usage:
//!   cargo run --bin modcheck -- "Lovely sunset view here"
//!   cargo run --bin modcheck -- --strategy heuristic "check out https://spam.example"
//!   echo "Great coffee shop" | cargo run --bin modcheck
//!
//! Exit codes: 0 = allowed, 1 = rejected, 2 = usage error.

use std::env;
use std::io::Read;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loci_moderation::{
    build_validator, validator_from_env, ModerationStage, ModerationStrategy, Verdict,
};

#[derive(Debug, Default)]
struct Args {
    strategy: Option<ModerationStrategy>,
    text: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut result = Args::default();
    let mut free: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--strategy" | "-s" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Missing value for --strategy");
                    std::process::exit(2);
                }
                result.strategy = match ModerationStrategy::parse(&args[i]) {
                    Some(s) => Some(s),
                    None => {
                        eprintln!(
                            "Unknown strategy: {}. Expected heuristic or classified.",
                            args[i]
                        );
                        std::process::exit(2);
                    }
                };
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => {
                eprintln!("Unknown option: {}", flag);
                std::process::exit(2);
            }
            _ => {
                free.push(args[i].clone());
            }
        }
        i += 1;
    }

    if !free.is_empty() {
        result.text = Some(free.join(" "));
    }

    result
}

fn print_help() {
    println!(
        r#"
Loci Moderation Checker

Usage: cargo run --bin modcheck -- [OPTIONS] [TEXT]

Reads the note text from the arguments, or from stdin when no text
is given. Prints the verdict and exits 0 (allowed) or 1 (rejected).

Options:
  -s, --strategy <NAME>   Moderation strategy: heuristic, classified
                          (default: LOCI_MODERATION_STRATEGY or classified)
  -h, --help              Print help

Environment:
  LOCI_CLASSIFIER_BASE_URL   Classifier endpoint (default: http://localhost:11434)
  LOCI_CLASSIFIER_MODEL      Classifier model (default: llama3.2)
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries only the verdict line.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "loci_moderation=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read note text from stdin")?;
            buf
        }
    };

    let validator = match args.strategy {
        Some(strategy) => build_validator(strategy),
        None => validator_from_env(),
    };

    match validator.validate(&text).await {
        Verdict::Allowed => {
            println!("allowed");
            Ok(())
        }
        Verdict::Rejected(rejection) => {
            let stage = match rejection.stage {
                ModerationStage::Heuristic => "heuristic",
                ModerationStage::Classifier => "classifier",
            };
            println!("rejected ({}): {}", stage, rejection.reason);
            std::process::exit(1);
        }
    }
}
