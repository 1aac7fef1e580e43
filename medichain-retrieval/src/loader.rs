use std::path::{Path, PathBuf};

use medichain_core::{Document, Value};
use serde_json::Map;

use crate::IngestionError;

const JSON_DEFAULT_SOURCE: &str = "Medical JSON Database";
const JSON_DEFAULT_TITLE: &str = "Unknown Disease";
const JSON_TITLE_FIELD: &str = "ten_benh";
const JSON_SOURCE_FIELD: &str = "url_nguon";

async fn read_to_string(path: &Path) -> Result<String, IngestionError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IngestionError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn path_label(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Whole file as a single document; `source` is the path.
pub struct TextLoader {
    path: PathBuf,
}

impl TextLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Vec<Document>, IngestionError> {
        let content = read_to_string(&self.path).await?;
        let label = path_label(&self.path);
        Ok(vec![
            Document::new(label.clone(), content).with_metadata("source", label)
        ])
    }
}

/// A JSON array of disease records. Each record becomes one document whose
/// content starts with a `Bệnh: <ten_benh>` header followed by every other
/// string field as `key: value`, separated by blank lines. `url_nguon` is kept
/// out of the content and becomes the `source` metadata.
pub struct MedicalJsonLoader {
    path: PathBuf,
}

impl MedicalJsonLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Vec<Document>, IngestionError> {
        let raw = read_to_string(&self.path).await?;
        let entries: Vec<Map<String, Value>> =
            serde_json::from_str(&raw).map_err(|source| IngestionError::Json {
                path: self.path.clone(),
                source,
            })?;

        let stem = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "json".to_string());
        let docs: Vec<Document> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| record_to_document(&format!("{stem}:{index}"), entry))
            .collect();
        tracing::info!(path = %self.path.display(), entries = docs.len(), "loaded medical JSON");
        Ok(docs)
    }
}

fn record_to_document(id: &str, entry: &Map<String, Value>) -> Document {
    let title = entry.get(JSON_TITLE_FIELD).and_then(Value::as_str);
    let mut parts = Vec::new();
    if let Some(title) = title {
        parts.push(format!("Bệnh: {title}"));
    }
    for (key, value) in entry {
        if key == JSON_TITLE_FIELD || key == JSON_SOURCE_FIELD {
            continue;
        }
        if let Some(text) = value.as_str() {
            parts.push(format!("{key}: {text}"));
        }
    }

    let source = entry
        .get(JSON_SOURCE_FIELD)
        .and_then(Value::as_str)
        .unwrap_or(JSON_DEFAULT_SOURCE);
    Document::new(id, parts.join("\n\n"))
        .with_metadata("source", source)
        .with_metadata("title", title.unwrap_or(JSON_DEFAULT_TITLE))
}

pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(feature = "pdf")]
    pub async fn load(&self) -> Result<Vec<Document>, IngestionError> {
        let path = self.path.clone();
        let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
            .await
            .map_err(|err| IngestionError::Pdf {
                path: self.path.clone(),
                message: err.to_string(),
            })?
            .map_err(|err| IngestionError::Pdf {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
        let label = path_label(&self.path);
        Ok(vec![
            Document::new(label.clone(), extracted).with_metadata("source", label)
        ])
    }

    #[cfg(not(feature = "pdf"))]
    pub async fn load(&self) -> Result<Vec<Document>, IngestionError> {
        tracing::warn!(path = %self.path.display(), "pdf feature disabled, cannot load");
        Err(IngestionError::FeatureDisabled { feature: "pdf" })
    }
}

/// Pick a loader from the file extension: `.json`, `.pdf`, or `.txt`/`.md`.
pub async fn load_file_async(path: PathBuf) -> Result<Vec<Document>, IngestionError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    match extension.as_deref() {
        Some("json") => MedicalJsonLoader::new(path).load().await,
        Some("pdf") => PdfLoader::new(path).load().await,
        Some("txt") | Some("md") => TextLoader::new(path).load().await,
        _ => Err(IngestionError::UnsupportedExtension { path }),
    }
}

pub async fn load_files_async(paths: Vec<PathBuf>) -> Result<Vec<Document>, IngestionError> {
    let mut documents = Vec::new();
    for path in paths {
        documents.extend(load_file_async(path).await?);
    }
    Ok(documents)
}
