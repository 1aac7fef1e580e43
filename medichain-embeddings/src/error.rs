use medichain_core::EmbeddingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingProviderError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<EmbeddingProviderError> for EmbeddingError {
    fn from(error: EmbeddingProviderError) -> Self {
        match error {
            EmbeddingProviderError::InvalidResponse(message) => {
                EmbeddingError::InvalidResponse(message)
            }
            EmbeddingProviderError::Request(message) => EmbeddingError::Provider(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_map_onto_core_variants() {
        let err: EmbeddingError = EmbeddingProviderError::Request("refused".into()).into();
        assert!(matches!(err, EmbeddingError::Provider(ref m) if m == "refused"));

        let err: EmbeddingError = EmbeddingProviderError::InvalidResponse("short".into()).into();
        assert!(matches!(err, EmbeddingError::InvalidResponse(ref m) if m == "short"));
    }
}
