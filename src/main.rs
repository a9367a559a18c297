//! filingqa - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filingqa::{
    cli::{Args, Commands, Config, Verbosity},
    embedding::{CandleEmbedder, Embedder},
    generation::OllamaGenerator,
    index::VectorIndex,
    ingest::TextPageSource,
    rag::{
        read_questions, write_records, ContextAssembler, CrossEncoderScorer, QaEngine, QaRecord,
        RagPipeline, Reranker,
    },
    segment::{prepare_chunks, Segmenter},
    tokens::{load_counter, TokenCounter},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.filter())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;

    match &args.command {
        Commands::Index { data_dir } => {
            run_index(&config, data_dir.clone(), verbosity)?;
        }
        Commands::Ask { questions, output } => {
            run_ask(&config, questions.clone(), output.clone(), verbosity).await?;
        }
        Commands::Query { question } => {
            run_query(&config, question).await?;
        }
        Commands::Config => {
            show_config(&config, &args)?;
        }
    }

    Ok(())
}

fn load_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let embedding = &config.embedding;
    let embedder = CandleEmbedder::new(&embedding.model_id, &embedding.revision, embedding.pooling)
        .with_context(|| format!("Failed to load embedding model {}", embedding.model_id))?;

    if embedder.dimension() != embedding.dimension {
        anyhow::bail!(
            "embedding model {} produces {}-dimensional vectors, config expects {}",
            embedding.model_id,
            embedder.dimension(),
            embedding.dimension
        );
    }

    Ok(Arc::new(embedder))
}

fn load_tokens(config: &Config) -> Result<Arc<dyn TokenCounter>> {
    load_counter(&config.tokens.tokenizer)
        .with_context(|| format!("Failed to load tokenizer {}", config.tokens.tokenizer))
}

fn progress_bar(total: u64, verbosity: Verbosity, label: &str) -> ProgressBar {
    if !verbosity.show_progress() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.cyan} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.set_message(label.to_string());
    pb
}

fn run_index(config: &Config, data_dir: Option<PathBuf>, verbosity: Verbosity) -> Result<()> {
    let data_dir = data_dir.unwrap_or_else(|| config.data_dir());
    let counter = load_tokens(config)?;
    let segmenter = Segmenter::new(config.segment.clone(), counter)?;

    let chunks = prepare_chunks(
        &data_dir,
        &config.paths.document_extension,
        &TextPageSource::new(),
        &segmenter,
    )
    .with_context(|| format!("Failed to prepare chunks from {}", data_dir.display()))?;

    println!(
        "{} {} chunks from {}",
        "✓".green(),
        chunks.len(),
        data_dir.display()
    );

    let embedder = load_embedder(config)?;
    let pb = progress_bar(chunks.len() as u64, verbosity, "Embedding");
    let index = VectorIndex::build_with_progress(
        &chunks,
        embedder,
        config.embedding.index_options(),
        |n| pb.inc(n as u64),
    )?;
    pb.finish_and_clear();

    let index_path = config.index_path();
    let meta_path = config.metadata_path();
    index.save(&index_path, &meta_path)?;

    println!(
        "{} Indexed {} chunks -> {}, {}",
        "✓".green(),
        index.len(),
        index_path.display(),
        meta_path.display()
    );

    Ok(())
}

fn build_pipeline(config: &Config) -> Result<RagPipeline> {
    let counter = load_tokens(config)?;
    let embedder = load_embedder(config)?;

    let index = VectorIndex::load(
        &config.index_path(),
        &config.metadata_path(),
        embedder,
        config.embedding.index_options(),
    )
    .context("Failed to load index; run `filingqa index` first")?;

    let generator = OllamaGenerator::new(&config.generation)?;
    let qa = QaEngine::new(
        ContextAssembler::new(counter),
        Arc::new(generator),
        config.generation.max_context_tokens,
        config.generation.max_new_tokens,
    );

    let mut pipeline = RagPipeline::new(index, qa, config.retrieval.clone());

    if config.rerank.enabled {
        let scorer = CrossEncoderScorer::new(&config.rerank.model_id, "main")
            .with_context(|| format!("Failed to load reranker {}", config.rerank.model_id))?;
        pipeline = pipeline.with_reranker(Reranker::new(Arc::new(scorer)), config.rerank.clone());
    }

    Ok(pipeline)
}

async fn run_ask(
    config: &Config,
    questions: Option<PathBuf>,
    output: Option<PathBuf>,
    verbosity: Verbosity,
) -> Result<()> {
    let questions_path = questions.unwrap_or_else(|| config.questions_path());
    let output_path = output.unwrap_or_else(|| config.output_path());

    let questions = read_questions(&questions_path)
        .with_context(|| format!("Failed to read questions from {}", questions_path.display()))?;

    let pipeline = build_pipeline(config)?;

    let pb = progress_bar(questions.len() as u64, verbosity, "Answering");
    let records = pipeline
        .answer_batch_with_progress(&questions, |n| pb.set_position(n as u64))
        .await?;
    pb.finish_and_clear();

    write_records(&output_path, &records)?;

    println!(
        "{} All answers generated and saved to {}",
        "✓".green(),
        output_path.display()
    );

    Ok(())
}

async fn run_query(config: &Config, question: &str) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let record = pipeline.answer(question).await?;
    print_record(&record);
    Ok(())
}

fn print_record(record: &QaRecord) {
    println!("\n{} {}", "Question:".bold(), record.question);
    println!("{} {}", "Answer:".bold().green(), record.answer);

    if record.sources.is_empty() {
        println!("{}", "No sources".dimmed());
    } else {
        println!("{}", "Sources:".bold());
        for (idx, source) in record.sources.iter().enumerate() {
            println!("  [{}] {}", idx + 1, source.to_string().cyan());
        }
    }
    println!();
}

fn show_config(config: &Config, args: &Args) -> Result<()> {
    match &args.config {
        Some(path) => println!("{} {}", "# Config file:".dimmed(), path.display()),
        None => match Config::default_path() {
            Some(path) if path.exists() => {
                println!("{} {}", "# Config file:".dimmed(), path.display())
            }
            _ => println!("{}", "# Built-in defaults".dimmed()),
        },
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
