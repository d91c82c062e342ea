//! Binary dictionary generator and query driver.
//!
//! External collaborator, not core: parses plain-text unigram/n-gram source
//! files, hands them to the library's builder trie and encoder, and writes
//! the resulting image. `query` loads an existing image
//! and exercises one of the four reader operations; `demo` reproduces the
//! worked example from the design notes end to end without touching disk
//! unless `--output` is given.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ngramdict::builder::Trie;
use ngramdict::encoder::Encoder;
use ngramdict::reader::{Corrections, Reader};
use ngramdict::timing::Stopwatch;

#[derive(Parser)]
#[command(name = "dictgen", about = "Build and query binary n-gram dictionaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode plain-text unigram/n-gram source files into a dictionary image.
    Build {
        #[arg(short, long)]
        unigrams: Option<PathBuf>,
        #[arg(short, long)]
        ngrams: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Run one lookup against an existing dictionary image.
    Query {
        #[arg(short, long)]
        dict: PathBuf,
        #[command(subcommand)]
        op: QueryOp,
    },
    /// Build the worked example from the design notes in-process and print
    /// its four query results.
    Demo {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum QueryOp {
    Exists { word: String },
    Predictions { words: Vec<String> },
    Corrections { word: String },
    Completions { prefix: String, depth: u32 },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build {
            unigrams,
            ngrams,
            output,
        } => build(unigrams, ngrams, output),
        Command::Query { dict, op } => query(dict, op),
        Command::Demo { output } => demo(output),
    }
}

fn build(unigrams_path: Option<PathBuf>, ngrams_path: Option<PathBuf>, output: PathBuf) -> Result<()> {
    if unigrams_path.is_none() && ngrams_path.is_none() {
        anyhow::bail!("must specify at least one of --unigrams or --ngrams");
    }

    let timer = Stopwatch::start("creating tries");
    let unigrams = match &unigrams_path {
        Some(path) => read_unigrams(path)?,
        None => Trie::new(),
    };
    let ngrams = match &ngrams_path {
        Some(path) => read_ngrams(path)?,
        None => Trie::new(),
    };
    timer.stop();

    let timer = Stopwatch::start("encoding dictionary");
    let mut encoder = Encoder::new();
    encoder.encode_unigrams(unigrams.root())?;
    encoder.encode_ngrams(ngrams.root())?;
    let image = encoder.finish();
    timer.stop();

    fs::write(&output, &image).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(bytes = image.len(), path = %output.display(), "wrote dictionary image");
    Ok(())
}

/// One `<word> <weight>` pair per line; blank lines and `#` comments ignored.
fn read_unigrams(path: &PathBuf) -> Result<Trie<char>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut trie = Trie::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let word = parts
            .next()
            .with_context(|| format!("{}:{}: missing word", path.display(), lineno + 1))?;
        let weight: f64 = parts
            .next()
            .with_context(|| format!("{}:{}: missing weight", path.display(), lineno + 1))?
            .parse()
            .with_context(|| format!("{}:{}: invalid weight", path.display(), lineno + 1))?;
        trie.insert(word.chars(), weight);
    }
    Ok(trie)
}

/// One n-gram per line: whitespace-separated words followed by the weight,
/// e.g. `how are you 80`.
fn read_ngrams(path: &PathBuf) -> Result<Trie<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut trie = Trie::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        let weight_str = tokens
            .pop()
            .with_context(|| format!("{}:{}: missing weight", path.display(), lineno + 1))?;
        let weight: f64 = weight_str
            .parse()
            .with_context(|| format!("{}:{}: invalid weight", path.display(), lineno + 1))?;
        if tokens.len() < 2 {
            anyhow::bail!(
                "{}:{}: n-gram needs at least two words",
                path.display(),
                lineno + 1
            );
        }
        trie.insert(tokens.into_iter().map(str::to_string), weight);
    }
    Ok(trie)
}

fn query(dict: PathBuf, op: QueryOp) -> Result<()> {
    let reader = Reader::open(&dict).with_context(|| format!("opening {}", dict.display()))?;
    match op {
        QueryOp::Exists { word } => println!("{}", reader.exists(&word)),
        QueryOp::Predictions { words } => {
            let phrase: Vec<&str> = words.iter().map(String::as_str).collect();
            for (word, weight) in reader.predictions(&phrase) {
                println!("{word}\t{weight}");
            }
        }
        QueryOp::Corrections { word } => match reader.corrections(&word) {
            Corrections::Known(map) => {
                for (word, weight) in map {
                    println!("{word}\t{weight}");
                }
            }
            Corrections::Unknown(word) => println!("(no correction for {word})"),
        },
        QueryOp::Completions { prefix, depth } => {
            for word in reader.completions(&prefix, depth) {
                println!("{word}");
            }
        }
    }
    Ok(())
}

/// The same reference unigram/n-gram weights exercised by the reader's own
/// unit tests, built here for a quick end-to-end sanity check.
fn demo(output: Option<PathBuf>) -> Result<()> {
    let mut unigrams: Trie<char> = Trie::new();
    for (word, weight) in [
        ("a", 200.0),
        ("hi", 130.0),
        ("hello", 120.0),
        ("there", 140.0),
        ("how", 150.0),
        ("are", 80.0),
        ("you", 200.0),
        ("your", 100.0),
    ] {
        unigrams.insert(word.chars(), weight);
    }

    let mut ngrams: Trie<String> = Trie::new();
    let phrases: [(&[&str], f64); 5] = [
        (&["hello", "there"], 20.0),
        (&["hello", "you"], 25.0),
        (&["how", "are", "you"], 80.0),
        (&["you", "are", "there"], 30.0),
        (&["are", "you", "there"], 60.0),
    ];
    for (phrase, weight) in phrases {
        ngrams.insert(phrase.iter().map(|w| w.to_string()), weight);
    }

    let mut encoder = Encoder::new();
    encoder.encode_unigrams(unigrams.root())?;
    encoder.encode_ngrams(ngrams.root())?;
    let image = encoder.finish();

    if let Some(path) = &output {
        fs::write(path, &image).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote demo dictionary image");
    }

    let reader = Reader::from_bytes(image);
    println!("exists(\"hello\")  = {}", reader.exists("hello"));
    println!("exists(\"hellos\") = {}", reader.exists("hellos"));
    println!(
        "predictions([\"hello\"])     = {:?}",
        reader.predictions(&["hello"])
    );
    println!(
        "predictions([\"how\",\"are\"]) = {:?}",
        reader.predictions(&["how", "are"])
    );
    println!("corrections(\"yuu\")  = {:?}", reader.corrections("yuu"));
    println!("corrections(\"yuur\") = {:?}", reader.corrections("yuur"));
    println!(
        "completions(\"yo\", 1) = {:?}",
        reader.completions("yo", 1)
    );
    println!(
        "completions(\"yo\", 2) = {:?}",
        reader.completions("yo", 2)
    );
    Ok(())
}
