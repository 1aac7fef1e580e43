use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "medichain", version, about = "Medical question answering assistant")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the chat HTTP API.
    Serve(ServeArgs),
    /// Interactive chat in the terminal.
    Chat(RuntimeArgs),
    /// Answer one question and exit.
    Ask {
        question: String,
        #[command(flatten)]
        runtime: RuntimeArgs,
    },
    /// Load, split and embed documents into the local vector index.
    Ingest(IngestArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LlmProvider {
    Google,
    Ollama,
    Openai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// Offline hashed bag of words.
    Hash,
    Ollama,
}

#[derive(Debug, Clone, Args)]
pub struct EmbedderArgs {
    #[arg(long, env = "MEDICHAIN_EMBEDDER", value_enum, default_value = "hash")]
    pub embedder: EmbedderKind,

    #[arg(long, env = "MEDICHAIN_EMBEDDING_MODEL", default_value = "nomic-embed-text")]
    pub embedding_model: String,

    #[arg(long, env = "MEDICHAIN_EMBEDDING_DIM", default_value_t = 768)]
    pub embedding_dim: usize,

    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// JSON snapshot of the vector index.
    #[arg(long, env = "MEDICHAIN_INDEX", default_value = "./medical_db/index.json")]
    pub index: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, env = "MEDICHAIN_LLM_PROVIDER", value_enum, default_value = "google")]
    pub provider: LlmProvider,

    /// Model name; each provider has its own default.
    #[arg(long, env = "MEDICHAIN_MODEL")]
    pub model: Option<String>,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub tavily_api_key: Option<String>,

    #[arg(long, env = "MEDICHAIN_WIKIPEDIA_LANG", default_value = "vi")]
    pub wikipedia_lang: String,

    #[arg(long)]
    pub no_wikipedia: bool,

    /// JSON file overriding planner keywords, weights or threshold.
    #[arg(long, env = "MEDICHAIN_PLANNER_CONFIG")]
    pub planner_config: Option<PathBuf>,

    /// Label recorded as the source of answers built from the local index.
    #[arg(long, env = "MEDICHAIN_RAG_SOURCE")]
    pub rag_source: Option<String>,

    #[command(flatten)]
    pub embedder: EmbedderArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, env = "MEDICHAIN_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    #[arg(long, env = "MEDICHAIN_TURN_TIMEOUT_SECS", default_value_t = 20)]
    pub turn_timeout_secs: u64,

    #[arg(long)]
    pub max_concurrent_requests: Option<usize>,

    /// `sqlite:`, `postgres://` or `memory:`. Without it transcripts are not stored.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

#[derive(Debug, Clone, Args)]
pub struct IngestArgs {
    /// PDF, JSON or text files.
    #[arg(default_values = ["./data/medical_book.pdf", "./data/medical-data.json"])]
    pub paths: Vec<PathBuf>,

    #[arg(long, default_value_t = 512)]
    pub chunk_size: usize,

    #[arg(long, default_value_t = 128)]
    pub chunk_overlap: usize,

    /// Add to an existing index instead of replacing it.
    #[arg(long)]
    pub append: bool,

    #[command(flatten)]
    pub embedder: EmbedderArgs,
}
