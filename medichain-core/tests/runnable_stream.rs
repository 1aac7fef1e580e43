use futures::StreamExt;
use medichain_core::{MedichainError, Runnable, StreamEvent};

struct Echo;

#[async_trait::async_trait]
impl Runnable<String, String> for Echo {
    async fn invoke(&self, input: String) -> Result<String, MedichainError> {
        Ok(format!("{input}!"))
    }
}

struct Chunked;

#[async_trait::async_trait]
impl Runnable<String, String> for Chunked {
    async fn invoke(&self, input: String) -> Result<String, MedichainError> {
        Ok(input)
    }

    fn stream(
        &self,
        input: String,
    ) -> futures::stream::BoxStream<'_, Result<StreamEvent, MedichainError>> {
        let events = input
            .split_whitespace()
            .map(|word| Ok(StreamEvent::ContentChunk(word.to_string())))
            .chain(std::iter::once(Ok(StreamEvent::FinalAnswer(input.clone()))))
            .collect::<Vec<_>>();
        futures::stream::iter(events).boxed()
    }
}

#[tokio::test]
async fn default_stream_is_empty() {
    let events: Vec<_> = Echo.stream("hi".to_string()).collect().await;
    assert!(events.is_empty());
    assert_eq!(Echo.invoke("hi".to_string()).await.unwrap(), "hi!");
}

#[tokio::test]
async fn overridden_stream_emits_chunks_then_final() {
    let events: Vec<_> = Chunked.stream("sot cao".to_string()).collect().await;
    let events = events.into_iter().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(
        events,
        vec![
            StreamEvent::ContentChunk("sot".to_string()),
            StreamEvent::ContentChunk("cao".to_string()),
            StreamEvent::FinalAnswer("sot cao".to_string()),
        ]
    );
}
