use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ppdb_db::{LoadMode, Vocabulary};
use ppdb_rules::RuleSet;
use ppdb_types::Expression;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use ppdb_filter::{AppState, ParaphraseStore, TransformationTrie, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const MAX_PAGE_SIZE: usize = 500;

#[derive(Parser)]
#[command(name = "ppdb-filter")]
#[command(about = "Filter trivial PPDB paraphrases and index the rest by target tokens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a PPDB file against a vocabulary and write the trie as JSON.
    Build {
        #[arg(long, env = "VOCAB_PATH")]
        vocab: PathBuf,
        #[arg(long, env = "PPDB_PATH")]
        ppdb: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = Mode::Mmap)]
        mode: Mode,
    },
    /// Print the paraphrases stored for an expression.
    Query {
        #[arg(long, env = "TRIE_PATH")]
        trie: PathBuf,
        #[arg(required = true)]
        expression: Vec<String>,
    },
    /// Serve lookups over HTTP.
    Serve {
        #[arg(long, env = "TRIE_PATH")]
        trie: PathBuf,
        #[arg(long, env = "VOCAB_PATH")]
        vocab: Option<PathBuf>,
        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long)]
        no_cache: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Mmap,
    Owned,
}

impl From<Mode> for LoadMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mmap => LoadMode::Mmap,
            Mode::Owned => LoadMode::Owned,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        Commands::Build {
            vocab,
            ppdb,
            output,
            mode,
        } => build(vocab, ppdb, output, mode.into()),
        Commands::Query { trie, expression } => query(trie, &expression),
        Commands::Serve {
            trie,
            vocab,
            host,
            port,
            no_cache,
        } => serve(trie, vocab, host, port, no_cache).await,
    }
}

fn build(vocab: PathBuf, ppdb: PathBuf, output: PathBuf, mode: LoadMode) -> Result<()> {
    info!("using vocabulary at {}", vocab.display());
    info!("using ppdb at {} (mode: {:?})", ppdb.display(), mode);

    let start = Instant::now();
    let vocabulary = Vocabulary::load_with_mode(&vocab, mode)?;
    if vocabulary.is_empty() {
        warn!("vocabulary is empty; every pair will be rejected");
    }

    let mut store = ParaphraseStore::new();
    let trie = store.load_ppdb(&ppdb, &vocabulary, mode, false)?;
    trie.save(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("finished in {} ms", start.elapsed().as_millis());
    Ok(())
}

fn query(trie_path: PathBuf, words: &[String]) -> Result<()> {
    let trie = TransformationTrie::load(&trie_path)
        .with_context(|| format!("loading {}", trie_path.display()))?;
    let expression = RuleSet::PORTUGUESE.normalize(&Expression::from_phrase(&words.join(" ")));

    match trie.get(expression.tokens()) {
        Some(sources) => {
            for source in sources {
                println!("{source}");
            }
        }
        None => eprintln!("no paraphrases for '{expression}'"),
    }
    Ok(())
}

async fn serve(
    trie_path: PathBuf,
    vocab: Option<PathBuf>,
    host: String,
    port: u16,
    disable_cache: bool,
) -> Result<()> {
    info!("binding to {}:{}", host, port);
    if disable_cache {
        info!("cache headers disabled");
    }

    let start = Instant::now();
    let trie = TransformationTrie::load(&trie_path)
        .with_context(|| format!("loading {}", trie_path.display()))?;
    let vocabulary = vocab.map(Vocabulary::load).transpose()?.map(Arc::new);
    info!("data loaded in {} ms", start.elapsed().as_millis());

    let state = AppState {
        trie: Arc::new(trie),
        vocabulary,
        rules: RuleSet::PORTUGUESE,
        max_page_size: MAX_PAGE_SIZE,
        disable_cache,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let listener = TcpListener::bind((host.as_str(), port)).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
