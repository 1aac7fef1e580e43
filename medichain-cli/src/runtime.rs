//! Wires providers, the local index and knowledge sources into a workflow.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use medichain_agents::{MedicalWorkflow, PlannerConfig};
use medichain_core::Embedding;
use medichain_embeddings::OllamaEmbedding;
use medichain_llm::{GoogleClient, Llm, OllamaClient, OpenAiCompatibleClient, DEFAULT_GEMINI_MODEL};
use medichain_retrieval::{DocumentRetriever, HashEmbedder, InMemoryVectorStore, Retriever};
use medichain_tools::{KnowledgeSource, TavilySource, WikipediaSource};

use crate::cli::{EmbedderArgs, EmbedderKind, LlmProvider, RuntimeArgs};

const DEFAULT_OLLAMA_CHAT_MODEL: &str = "llama3.1";

pub fn build_llm(args: &RuntimeArgs) -> Result<Arc<dyn Llm>> {
    let model = args.model.clone();
    let llm: Arc<dyn Llm> = match args.provider {
        LlmProvider::Google => {
            let Some(key) = args.google_api_key.as_deref().filter(|key| !key.is_empty()) else {
                bail!("GOOGLE_API_KEY is not set (or pass --google-api-key)");
            };
            let model = model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
            Arc::new(GoogleClient::new(key, model)?.with_temperature(0.0))
        }
        LlmProvider::Ollama => {
            let model = model.unwrap_or_else(|| DEFAULT_OLLAMA_CHAT_MODEL.to_string());
            Arc::new(OllamaClient::new(args.embedder.ollama_url.clone(), model)?)
        }
        LlmProvider::Openai => {
            let Some(base_url) = args.openai_base_url.as_deref() else {
                bail!("OPENAI_BASE_URL is not set (or pass --openai-base-url)");
            };
            let mut builder = OpenAiCompatibleClient::builder().base_url(base_url)?;
            if let Some(key) = &args.openai_api_key {
                builder = builder.api_key(key.clone());
            }
            if let Some(model) = model {
                builder = builder.default_model(model);
            }
            Arc::new(builder.build()?)
        }
    };
    tracing::info!(provider = ?args.provider, "language model configured");
    Ok(llm)
}

pub fn build_embedder(args: &EmbedderArgs) -> Arc<dyn Embedding> {
    match args.embedder {
        EmbedderKind::Hash => Arc::new(HashEmbedder::new(args.embedding_dim)),
        EmbedderKind::Ollama => Arc::new(OllamaEmbedding::new(
            args.ollama_url.clone(),
            args.embedding_model.clone(),
            args.embedding_dim,
        )),
    }
}

/// Retriever over the saved index, or `None` when no usable index exists.
/// Running without one is allowed: retrieval then always fails over.
pub async fn load_retriever(args: &EmbedderArgs) -> Option<Arc<dyn DocumentRetriever>> {
    if !args.index.exists() {
        tracing::warn!(index = %args.index.display(), "no vector index found, run `medichain ingest` to enable retrieval");
        return None;
    }
    let store = match InMemoryVectorStore::load(&args.index).await {
        Ok(store) => store,
        Err(err) => {
            tracing::warn!(index = %args.index.display(), error = %err, "failed to load vector index");
            return None;
        }
    };
    let count = medichain_core::VectorStore::len(&store).await;
    if count == 0 {
        tracing::warn!(index = %args.index.display(), "vector index is empty");
        return None;
    }
    tracing::info!(documents = count, "vector index loaded");
    Some(Arc::new(Retriever::new(build_embedder(args), store)))
}

fn knowledge_sources(
    args: &RuntimeArgs,
) -> Result<(Option<Arc<dyn KnowledgeSource>>, Option<Arc<dyn KnowledgeSource>>)> {
    let encyclopedia: Option<Arc<dyn KnowledgeSource>> = if args.no_wikipedia {
        None
    } else {
        Some(Arc::new(WikipediaSource::new(&args.wikipedia_lang)?))
    };
    let web: Option<Arc<dyn KnowledgeSource>> = match args.tavily_api_key.as_deref() {
        Some(key) if !key.is_empty() => Some(Arc::new(TavilySource::new(key)?)),
        _ => {
            tracing::info!("TAVILY_API_KEY not set, web search disabled");
            None
        }
    };
    Ok((encyclopedia, web))
}

pub async fn build_workflow(args: &RuntimeArgs) -> Result<MedicalWorkflow> {
    let llm = build_llm(args)?;
    let planner = match &args.planner_config {
        Some(path) => PlannerConfig::from_json_file(path)
            .with_context(|| format!("reading planner config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    let (encyclopedia, web) = knowledge_sources(args)?;

    let mut builder = MedicalWorkflow::builder(llm).planner_config(planner);
    if let Some(retriever) = load_retriever(&args.embedder).await {
        builder = builder.retriever(retriever);
    }
    if let Some(source) = encyclopedia {
        builder = builder.encyclopedia(source);
    }
    if let Some(source) = web {
        builder = builder.web_search(source);
    }
    if let Some(label) = &args.rag_source {
        builder = builder.rag_source(label.clone());
    }
    Ok(builder.build()?)
}
