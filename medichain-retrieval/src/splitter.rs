use medichain_core::{Document, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitterConfigError {
    #[error("chunk_size must be greater than zero")]
    ChunkSizeMustBeGreaterThanZero,
    #[error("chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})")]
    OverlapTooLarge {
        chunk_size: usize,
        chunk_overlap: usize,
    },
}

/// Splits text on the first separator that occurs, recursing into the
/// remaining separators for pieces that are still too long, then packs the
/// pieces into chunks of at most `chunk_size` characters. Consecutive chunks
/// share up to `chunk_overlap` trailing characters.
#[derive(Clone, Debug)]
pub struct RecursiveCharacterTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

pub struct SplitterBuilder {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for SplitterBuilder {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 128,
            separators: ["\n\n", ". ", "\n", " "]
                .iter()
                .map(|sep| sep.to_string())
                .collect(),
        }
    }
}

impl SplitterBuilder {
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn separators<I, T>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<RecursiveCharacterTextSplitter, SplitterConfigError> {
        if self.chunk_size == 0 {
            return Err(SplitterConfigError::ChunkSizeMustBeGreaterThanZero);
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(SplitterConfigError::OverlapTooLarge {
                chunk_size: self.chunk_size,
                chunk_overlap: self.chunk_overlap,
            });
        }
        Ok(RecursiveCharacterTextSplitter {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            separators: self
                .separators
                .into_iter()
                .filter(|sep| !sep.is_empty())
                .collect(),
        })
    }
}

impl Default for RecursiveCharacterTextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 128,
            separators: SplitterBuilder::default().separators,
        }
    }
}

impl RecursiveCharacterTextSplitter {
    pub fn builder() -> SplitterBuilder {
        SplitterBuilder::default()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let pieces = self.split_pieces(text, &self.separators);
        self.merge(pieces)
    }

    /// Split every document; chunk ids are `<id>#<n>` and metadata gains `chunk`.
    pub fn split_documents(&self, docs: &[Document]) -> Vec<Document> {
        let mut out = Vec::new();
        for doc in docs {
            for (index, chunk) in self.split_text(&doc.content).into_iter().enumerate() {
                let mut metadata = doc.metadata.clone();
                metadata.insert("chunk".to_string(), Value::from(index));
                out.push(Document {
                    id: format!("{}#{}", doc.id, index),
                    content: chunk,
                    metadata,
                    embedding: None,
                });
            }
        }
        tracing::debug!(documents = docs.len(), chunks = out.len(), "split documents");
        out
    }

    fn split_pieces(&self, text: &str, separators: &[String]) -> Vec<String> {
        if text.chars().count() <= self.chunk_size {
            return vec![text.to_string()];
        }
        match separators.split_first() {
            Some((separator, rest)) if text.contains(separator.as_str()) => text
                .split_inclusive(separator.as_str())
                .flat_map(|part| self.split_pieces(part, rest))
                .collect(),
            Some((_, rest)) => self.split_pieces(text, rest),
            None => text.chars().map(String::from).collect(),
        }
    }

    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;
        let mut has_new_content = false;

        for piece in pieces {
            let piece_len = piece.chars().count();
            if has_new_content && current_len + piece_len > self.chunk_size {
                let tail = tail_chars(&current, self.chunk_overlap);
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
                let tail_len = tail.chars().count();
                if tail_len + piece_len <= self.chunk_size {
                    current = tail;
                    current_len = tail_len;
                }
                has_new_content = false;
            }
            current.push_str(&piece);
            current_len += piece_len;
            has_new_content = true;
        }
        if has_new_content {
            chunks.push(current);
        }
        chunks
    }
}

fn tail_chars(text: &str, count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let total = text.chars().count();
    text.chars().skip(total.saturating_sub(count)).collect()
}
