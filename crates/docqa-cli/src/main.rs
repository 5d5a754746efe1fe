//! docqa CLI - Ask questions against a pre-parsed document corpus.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use docqa_core::{Chunk, QaConfig, Result};
use docqa_index::Corpus;
use docqa_pipeline::{PipelineServices, RetrievalPipeline};
use docqa_services::{HttpEmbedder, HttpRelevanceScorer, HttpTextGenerator, HttpVectorIndex};

/// docqa - Hybrid retrieval over a document corpus
#[derive(Parser)]
#[command(name = "docqa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (default: user config or ./docqa.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve context passages for a question
    Ask {
        /// The question to answer
        question: String,

        /// Path to the corpus JSON file
        #[arg(short = 'd', long)]
        corpus: PathBuf,

        /// Number of passages to return
        #[arg(short = 'k', long)]
        final_k: Option<usize>,
    },

    /// Lexical-only search, for debugging the index
    Search {
        /// Search query
        query: String,

        /// Path to the corpus JSON file
        #[arg(short = 'd', long)]
        corpus: PathBuf,

        /// Maximum number of results
        #[arg(short = 'k', long, default_value = "10")]
        top_k: usize,
    },
}

/// One parsed section in the corpus file, as produced by the ingestion step.
#[derive(Deserialize)]
struct SectionRecord {
    document_name: String,
    page_number: u32,
    section_title: String,
    #[serde(default)]
    hierarchy_path: Vec<String>,
    content: String,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(path: Option<PathBuf>) -> Result<QaConfig> {
    match path {
        Some(path) => QaConfig::load(&path),
        None => QaConfig::load_default(),
    }
}

fn load_corpus(path: &PathBuf, config: &QaConfig) -> Result<Corpus> {
    let content = std::fs::read_to_string(path)?;
    let records: Vec<SectionRecord> = serde_json::from_str(&content)?;

    let chunks: Vec<Chunk> = records
        .into_iter()
        .map(|r| {
            let hierarchy_path = if r.hierarchy_path.is_empty() {
                vec![r.section_title.clone()]
            } else {
                r.hierarchy_path
            };
            Chunk::from_section(
                &r.document_name,
                r.page_number,
                &r.section_title,
                hierarchy_path,
                &r.content,
            )
        })
        .collect();

    Corpus::build(chunks, config.bm25.clone())
}

fn build_services(config: &QaConfig) -> Result<PipelineServices> {
    let timeout = config.services.timeout();
    Ok(PipelineServices {
        generator: Arc::new(HttpTextGenerator::new(&config.services.generation, timeout)?),
        embedder: Arc::new(HttpEmbedder::new(&config.services.embedding, timeout)?),
        vector_index: Arc::new(HttpVectorIndex::new(&config.services.vector_index, timeout)?),
        scorer: Arc::new(HttpRelevanceScorer::new(&config.services.rerank, timeout)?),
    })
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Ask {
            question,
            corpus,
            final_k,
        } => {
            let mut config = config;
            if let Some(final_k) = final_k {
                config.search.final_k = final_k;
            }

            let corpus = load_corpus(&corpus, &config)?;
            let services = build_services(&config)?;
            let pipeline = RetrievalPipeline::new(corpus, services, &config);

            match pipeline.retrieve_context(&question).await {
                Ok(context) => {
                    println!("Question: {}", context.question);
                    println!("Search query: {}", context.search_query);
                    println!("Ranking: {}\n", context.mode);
                    for (i, passage) in context.passages.iter().enumerate() {
                        println!("[{}] {}\n", i + 1, passage);
                    }
                }
                Err(err) => {
                    eprintln!("Error [{}]: {}", err.error_code(), err);
                    std::process::exit(1);
                }
            }
        }
        Commands::Search {
            query,
            corpus,
            top_k,
        } => {
            let corpus = load_corpus(&corpus, &config)?;
            let hits = corpus.lexical_search(&query, top_k);

            if hits.is_empty() {
                println!("No matches.");
            } else {
                for hit in hits {
                    println!(
                        "{:>2}. [{:.4}] {} (p.{}) {}",
                        hit.rank + 1,
                        hit.raw_score,
                        hit.chunk.document_name,
                        hit.chunk.page_number,
                        hit.chunk.section_title
                    );
                }
            }
        }
    }

    Ok(())
}
