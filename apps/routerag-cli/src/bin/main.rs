use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use routerag_core::config::{resolve_with_base, Config, Settings};
use routerag_core::corpus::load_documents;
use routerag_embed::HashingEmbedder;
use routerag_hybrid::{RetrievalEngine, ScoredDocument};

const DEFAULT_LIMIT: usize = 5;

struct SearchArgs {
    path: PathBuf,
    query: String,
    limit: usize,
    json: bool,
}

#[derive(Serialize)]
struct JsonHit<'a> {
    rank: usize,
    id: &'a str,
    score: f64,
    sparse_rank: Option<usize>,
    dense_rank: Option<usize>,
    text: &'a str,
}

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {} search <path> <query> [--limit N] [--json]", prog);
    std::process::exit(1);
}

fn parse_search_args(args: &[String]) -> Result<SearchArgs> {
    let mut positional = Vec::new();
    let mut limit = DEFAULT_LIMIT;
    let mut json = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => json = true,
            "--limit" | "-n" => {
                let Some(value) = args.get(i + 1) else { bail!("--limit requires a number") };
                limit = value.parse().with_context(|| format!("--limit requires a number, got '{}'", value))?;
                i += 1;
            }
            other if other.starts_with("--") => bail!("unknown flag: {}", other),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }
    let [path, query] = <[String; 2]>::try_from(positional)
        .map_err(|got| anyhow::anyhow!("expected <path> <query>, got {} arguments", got.len()))?;
    let path = resolve_with_base(&env::current_dir()?, path);
    Ok(SearchArgs { path, query, limit, json })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}

async fn search(args: SearchArgs, settings: &Settings) -> Result<()> {
    let documents = load_documents(&args.path)?;
    let embedder = Arc::new(HashingEmbedder::new(settings.embedding.dimension)?);
    let engine = RetrievalEngine::new(embedder, settings.retrieval.clone())?
        .with_embedding_timeout(settings.executors.embedding_timeout());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("indexing {} documents from {}", documents.len(), args.path.display()));
    let count = documents.len();
    engine.ingest(documents).await?;
    pb.finish_with_message(format!("indexed {} documents", count));
    info!(documents = count, generation = engine.generation(), "corpus ready");

    let hits = engine.search_scored(&args.query, args.limit).await?;
    if args.json {
        print_json(&hits)?;
    } else {
        print_hits(&args.query, &hits);
    }
    Ok(())
}

fn print_json(hits: &[ScoredDocument]) -> Result<()> {
    let rows: Vec<JsonHit<'_>> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| JsonHit {
            rank: i + 1,
            id: &hit.document.id,
            score: hit.score,
            sparse_rank: hit.sparse_rank,
            dense_rank: hit.dense_rank,
            text: &hit.document.text,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_hits(query: &str, hits: &[ScoredDocument]) {
    println!("\n🔍 Found {} results for: \"{}\"", hits.len(), query);
    let rank = |r: Option<usize>| r.map_or_else(|| "-".to_string(), |r| format!("#{}", r));
    for (i, hit) in hits.iter().enumerate() {
        println!(
            "\n  {}. score={:.6}  id={}  sparse={}  dense={}",
            i + 1,
            hit.score,
            hit.document.id,
            rank(hit.sparse_rank),
            rank(hit.dense_rank)
        );
        println!("     📝 {}", hit.document.text);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() { usage(&prog); }
    let cmd = args.remove(0);
    match cmd.as_str() {
        "search" => {
            let search_args = parse_search_args(&args).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                usage(&prog)
            });
            search(search_args, &settings).await
        }
        _ => { eprintln!("Unknown command: {}", cmd); usage(&prog) }
    }
}
