
use anyhow::{Context, Result};
use medichain_core::VectorStore;
use medichain_retrieval::{load_and_split, Indexer, InMemoryVectorStore, RecursiveCharacterTextSplitter};

use crate::cli::IngestArgs;
use crate::runtime::build_embedder;

pub async fn run(args: IngestArgs) -> Result<()> {
    let splitter = RecursiveCharacterTextSplitter::builder()
        .chunk_size(args.chunk_size)
        .chunk_overlap(args.chunk_overlap)
        .separators(["\n\n", ". ", "\n", " "])
        .build()?;

    let paths: Vec<_> = args
        .paths
        .iter()
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                tracing::warn!(path = %path.display(), "skipping missing input");
            }
            exists
        })
        .cloned()
        .collect();
    let chunks = load_and_split(paths, &splitter).await?;
    if chunks.is_empty() {
        println!("No documents to index.");
        return Ok(());
    }

    let index = &args.embedder.index;
    let store = if args.append && index.exists() {
        InMemoryVectorStore::load(index)
            .await
            .with_context(|| format!("loading {}", index.display()))?
    } else {
        InMemoryVectorStore::new()
    };

    let indexer = Indexer::new(build_embedder(&args.embedder), store.clone());
    let added = indexer.index(chunks).await?;

    if let Some(parent) = index.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    store
        .save(index)
        .await
        .with_context(|| format!("writing {}", index.display()))?;

    println!(
        "Indexed {added} chunks ({} total) into {}",
        store.len().await,
        index.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{EmbedderArgs, EmbedderKind};

    fn args(dir: &std::path::Path, paths: Vec<std::path::PathBuf>, append: bool) -> IngestArgs {
        IngestArgs {
            paths,
            chunk_size: 64,
            chunk_overlap: 8,
            append,
            embedder: EmbedderArgs {
                embedder: EmbedderKind::Hash,
                embedding_model: "unused".to_string(),
                embedding_dim: 64,
                ollama_url: "http://localhost:11434".to_string(),
                index: dir.join("db").join("index.json"),
            },
        }
    }

    #[tokio::test]
    async fn ingest_writes_a_loadable_index_and_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("sot.txt");
        std::fs::write(
            &text,
            "Sốt là khi thân nhiệt tăng cao hơn bình thường.\n\nĐau đầu thường đi kèm với sốt.",
        )
        .unwrap();
        let missing = dir.path().join("missing.pdf");

        run(args(dir.path(), vec![text.clone(), missing], false))
            .await
            .unwrap();
        let index = dir.path().join("db").join("index.json");
        let first = InMemoryVectorStore::load(&index).await.unwrap().len().await;
        assert!(first >= 2);

        run(args(dir.path(), vec![text], true)).await.unwrap();
        let store = InMemoryVectorStore::load(&index).await.unwrap();
        assert!(store.len().await >= first);
    }
}
