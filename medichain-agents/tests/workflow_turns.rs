use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use medichain_agents::prompts::{DISCLAIMER, FALLBACK_RESPONSE};
use medichain_agents::{AgentState, MedicalWorkflow, Route, StrategyOutcome, WorkflowError};
use medichain_core::{Document, EmbeddingError, LlmRequest, LlmResponse, MedichainError, Runnable};
use medichain_graph::Observer;
use medichain_retrieval::{DocumentRetriever, RetrievalError};
use medichain_tools::{KnowledgeSource, ToolError};
use tokio::sync::Mutex;

const FEVER: &str = "sốt cao, đau đầu, mệt mỏi";
const WEATHER: &str = "hôm nay thời tiết thế nào";

/// Replies from a fixed script; an exhausted script fails the call.
#[derive(Default)]
struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        let replies = replies
            .into_iter()
            .map(|reply| reply.map(str::to_string).map_err(str::to_string))
            .collect();
        Arc::new(Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        })
    }

    async fn calls(&self) -> usize {
        self.prompts.lock().await.len()
    }

    async fn prompt(&self, index: usize) -> String {
        self.prompts.lock().await[index].clone()
    }
}

#[async_trait]
impl Runnable<LlmRequest, LlmResponse> for ScriptedLlm {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, MedichainError> {
        let prompt = request
            .messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().await.push(prompt);
        match self.replies.lock().await.pop_front() {
            Some(Ok(content)) => Ok(LlmResponse { content }),
            Some(Err(reason)) => Err(MedichainError::LlmProvider(reason)),
            None => Err(MedichainError::LlmProvider("script exhausted".to_string())),
        }
    }
}

enum FakeRetriever {
    Found(Vec<Document>),
    Broken,
}

#[async_trait]
impl DocumentRetriever for FakeRetriever {
    async fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<Document>, RetrievalError> {
        match self {
            FakeRetriever::Found(docs) => Ok(docs.iter().take(k).cloned().collect()),
            FakeRetriever::Broken => Err(RetrievalError::Embedding(EmbeddingError::Provider(
                "embedding service down".to_string(),
            ))),
        }
    }
}

struct FakeSource {
    name: &'static str,
    passages: Vec<Document>,
}

#[async_trait]
impl KnowledgeSource for FakeSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn lookup(&self, _query: &str, _k: usize) -> Result<Vec<Document>, ToolError> {
        if self.passages.is_empty() {
            return Err(ToolError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.passages.clone())
    }
}

#[derive(Default)]
struct NodeTrail {
    started: Mutex<Vec<String>>,
}

#[async_trait]
impl Observer for NodeTrail {
    async fn on_node_start(&self, node_id: &str, _input: &serde_json::Value) {
        self.started.lock().await.push(node_id.to_string());
    }
}

fn fever_documents() -> Vec<Document> {
    vec![
        Document::new("sot:0", "Sốt xuất huyết gây sốt cao đột ngột, đau đầu và mệt mỏi.")
            .with_metadata("source", "Medical Database"),
        Document::new("sot:1", "Cần uống đủ nước và theo dõi dấu hiệu xuất huyết."),
    ]
}

fn turn(question: &str) -> AgentState {
    let mut state = AgentState::new();
    state.begin_turn(question);
    state
}

#[tokio::test]
async fn exhausted_strategies_fall_back_within_five_hops() {
    let llm = ScriptedLlm::new(vec![]);
    let workflow = MedicalWorkflow::builder(llm.clone()).build().unwrap();
    let trail = Arc::new(NodeTrail::default());

    let state = workflow
        .invoke_with_observer(turn(WEATHER), trail.clone())
        .await
        .unwrap();

    assert_eq!(state.source, "System Message");
    assert_eq!(state.generation.as_deref(), Some(FALLBACK_RESPONSE));
    assert!(state.generation.as_deref().unwrap_or_default().contains(DISCLAIMER));
    assert_eq!(state.llm, StrategyOutcome::Failed);
    assert_eq!(state.rag, StrategyOutcome::Failed);
    assert_eq!(state.wiki, StrategyOutcome::Failed);
    assert_eq!(state.web, StrategyOutcome::Failed);

    let started = trail.started.lock().await.clone();
    assert_eq!(
        started,
        vec!["memory", "planner", "llm_agent", "retriever", "wikipedia", "web_search", "executor"]
    );
    let after_planner = started.iter().skip_while(|node| *node != "planner").skip(1).count();
    assert!(after_planner <= 5);
    assert_eq!(llm.calls().await, 1);
}

#[tokio::test]
async fn direct_answer_is_returned_verbatim() {
    let answer = "Bạn nên nghỉ ngơi, uống đủ nước và theo dõi nhiệt độ.";
    let llm = ScriptedLlm::new(vec![Ok(answer)]);
    let workflow = MedicalWorkflow::builder(llm.clone()).build().unwrap();

    let state = workflow.invoke(turn(WEATHER)).await.unwrap();

    assert_eq!(state.current_tool, Some(Route::LlmAgent));
    assert_eq!(state.generation.as_deref(), Some(answer));
    assert_eq!(state.source, "AI Medical Knowledge");
    assert_eq!(llm.calls().await, 1);
    assert!(!state.rag_attempted());
}

#[tokio::test]
async fn short_answers_count_as_failures() {
    let llm = ScriptedLlm::new(vec![Ok("  ổn cả  ")]);
    let workflow = MedicalWorkflow::builder(llm).build().unwrap();

    let state = workflow.invoke(turn(WEATHER)).await.unwrap();

    assert_eq!(state.llm, StrategyOutcome::Failed);
    assert_eq!(state.source, "System Message");
}

#[tokio::test]
async fn retrieval_route_regenerates_answer_from_documents() {
    let llm = ScriptedLlm::new(vec![
        Ok("Câu trả lời từ tài liệu y khoa về sốt."),
        Ok("Câu trả lời được tổng hợp lại từ tài liệu."),
    ]);
    let workflow = MedicalWorkflow::builder(llm.clone())
        .retriever(Arc::new(FakeRetriever::Found(fever_documents())))
        .build()
        .unwrap();

    let state = workflow.invoke(turn(FEVER)).await.unwrap();

    assert_eq!(state.current_tool, Some(Route::Retriever));
    assert!(state.rag_success());
    assert!(!state.llm_attempted());
    assert_eq!(
        state.generation.as_deref(),
        Some("Câu trả lời được tổng hợp lại từ tài liệu.")
    );
    assert_eq!(state.source, "Medical Database");
    assert_eq!(state.documents.as_ref().map(Vec::len), Some(2));
    assert_eq!(llm.calls().await, 2);
    assert!(llm.prompt(1).await.contains("Thông tin y tế tham khảo:\nSốt xuất huyết"));
}

#[tokio::test]
async fn failed_regeneration_falls_back_to_fixed_answer() {
    let llm = ScriptedLlm::new(vec![Ok("Câu trả lời từ tài liệu y khoa về sốt.")]);
    let workflow = MedicalWorkflow::builder(llm)
        .retriever(Arc::new(FakeRetriever::Found(fever_documents())))
        .build()
        .unwrap();

    let state = workflow.invoke(turn(FEVER)).await.unwrap();

    assert!(state.rag_success());
    assert_eq!(state.source, "System Message");
    assert_eq!(state.generation.as_deref(), Some(FALLBACK_RESPONSE));
}

#[tokio::test]
async fn custom_rag_label_is_recorded() {
    let llm = ScriptedLlm::new(vec![
        Ok("Câu trả lời từ tài liệu y khoa về sốt."),
        Ok("Câu trả lời được tổng hợp lại từ tài liệu."),
    ]);
    let workflow = MedicalWorkflow::builder(llm)
        .retriever(Arc::new(FakeRetriever::Found(fever_documents())))
        .rag_source("Sách Y khoa")
        .build()
        .unwrap();

    let state = workflow.invoke(turn(FEVER)).await.unwrap();

    assert_eq!(state.source, "Sách Y khoa");
}

#[tokio::test]
async fn broken_retriever_hands_over_to_the_model() {
    let answer = "Sốt cao kèm đau đầu có thể do nhiễm virus, hãy đi khám.";
    let llm = ScriptedLlm::new(vec![Ok(answer)]);
    let workflow = MedicalWorkflow::builder(llm.clone())
        .retriever(Arc::new(FakeRetriever::Broken))
        .build()
        .unwrap();

    let state = workflow.invoke(turn(FEVER)).await.unwrap();

    assert_eq!(state.rag, StrategyOutcome::Failed);
    assert!(state.llm_success());
    assert_eq!(state.generation.as_deref(), Some(answer));
    assert_eq!(llm.calls().await, 1);
}

#[tokio::test]
async fn weather_question_reaches_encyclopedia_after_both_strategies_fail() {
    let llm = ScriptedLlm::new(vec![
        Err("quota exceeded"),
        Ok("Theo Wikipedia, thời tiết được dự báo bởi cơ quan khí tượng."),
    ]);
    let encyclopedia = FakeSource {
        name: "wikipedia",
        passages: vec![Document::new("w:1", "Thời tiết là trạng thái của khí quyển.")],
    };
    let workflow = MedicalWorkflow::builder(llm.clone())
        .retriever(Arc::new(FakeRetriever::Found(Vec::new())))
        .encyclopedia(Arc::new(encyclopedia))
        .build()
        .unwrap();
    let trail = Arc::new(NodeTrail::default());

    let state = workflow
        .invoke_with_observer(turn(WEATHER), trail.clone())
        .await
        .unwrap();

    assert_eq!(
        trail.started.lock().await.clone(),
        vec!["memory", "planner", "llm_agent", "retriever", "wikipedia", "executor"]
    );
    assert_eq!(state.source, "Wikipedia");
    assert_eq!(
        state.generation.as_deref(),
        Some("Theo Wikipedia, thời tiết được dự báo bởi cơ quan khí tượng.")
    );
    assert!(!state.web_attempted());
    assert_eq!(llm.calls().await, 2);
}

#[tokio::test]
async fn web_search_answers_when_encyclopedia_fails() {
    let llm = ScriptedLlm::new(vec![
        Err("quota exceeded"),
        Ok("Kết quả tìm kiếm cho thấy nên theo dõi tại nhà."),
    ]);
    let web = FakeSource {
        name: "tavily",
        passages: vec![Document::new("https://example.org", "Theo dõi triệu chứng tại nhà.")],
    };
    let workflow = MedicalWorkflow::builder(llm)
        .encyclopedia(Arc::new(FakeSource {
            name: "wikipedia",
            passages: Vec::new(),
        }))
        .web_search(Arc::new(web))
        .build()
        .unwrap();

    let state = workflow.invoke(turn(WEATHER)).await.unwrap();

    assert_eq!(state.wiki, StrategyOutcome::Failed);
    assert!(state.web_success());
    assert_eq!(state.source, "Web Search");
    assert_eq!(
        state.generation.as_deref(),
        Some("Kết quả tìm kiếm cho thấy nên theo dõi tại nhà.")
    );
}

#[tokio::test]
async fn history_grows_by_one_exchange_per_turn() {
    let llm = ScriptedLlm::new(vec![
        Ok("Câu trả lời đầu tiên đủ dài."),
        Ok("Câu trả lời thứ hai cũng đủ dài."),
    ]);
    let workflow = MedicalWorkflow::builder(llm.clone()).build().unwrap();

    let first = workflow.run_turn(AgentState::new(), WEATHER).await.unwrap();
    assert_eq!(first.conversation_history.len(), 2);
    assert_eq!(first.retry_count, Some(0));

    let second = workflow.run_turn(first, "còn ngày mai?").await.unwrap();
    assert_eq!(second.conversation_history.len(), 4);
    assert_eq!(second.conversation_history[2].content, "còn ngày mai?");
    assert_eq!(second.conversation_history[3].source.as_deref(), Some("AI Medical Knowledge"));
    assert!(llm.prompt(1).await.contains("Người dùng: hôm nay thời tiết thế nào\nMedicalBot: Câu trả lời đầu tiên đủ dài."));
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let workflow = MedicalWorkflow::builder(ScriptedLlm::new(vec![])).build().unwrap();

    let err = workflow.invoke(turn("   ")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::MissingQuestion));
}

#[tokio::test]
async fn graph_declares_every_node() {
    let workflow = MedicalWorkflow::builder(ScriptedLlm::new(vec![])).build().unwrap();
    let nodes = workflow.graph().program().node_names();
    assert_eq!(
        nodes,
        vec!["executor", "llm_agent", "memory", "planner", "retriever", "web_search", "wikipedia"]
    );
}
