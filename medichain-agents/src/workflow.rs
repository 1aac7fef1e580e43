use std::sync::Arc;

use medichain_core::GraphState;
use medichain_graph::{
    ExecutableGraph, ExecutionConfig, ExecutionOptions, GraphBuilder, Observer,
};
use medichain_llm::Llm;
use medichain_retrieval::DocumentRetriever;
use medichain_tools::KnowledgeSource;

use crate::agents::{
    ExecutorNode, KnowledgeAgent, LlmAgent, MemoryNode, PlannerNode, RetrieverAgent,
};
use crate::router::{self, Step};
use crate::{AgentState, Planner, PlannerConfig, WorkflowError};

/// Source label for answers grounded in the local corpus.
pub const DEFAULT_RAG_SOURCE: &str = "Medical Database";

pub struct MedicalWorkflowBuilder {
    llm: Arc<dyn Llm>,
    retriever: Option<Arc<dyn DocumentRetriever>>,
    encyclopedia: Option<Arc<dyn KnowledgeSource>>,
    web_search: Option<Arc<dyn KnowledgeSource>>,
    planner: PlannerConfig,
    rag_source: String,
    config: ExecutionConfig,
}

impl MedicalWorkflowBuilder {
    pub fn retriever(mut self, retriever: Arc<dyn DocumentRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn encyclopedia(mut self, source: Arc<dyn KnowledgeSource>) -> Self {
        self.encyclopedia = Some(source);
        self
    }

    pub fn web_search(mut self, source: Arc<dyn KnowledgeSource>) -> Self {
        self.web_search = Some(source);
        self
    }

    pub fn planner_config(mut self, config: PlannerConfig) -> Self {
        self.planner = config;
        self
    }

    /// Label recorded as the source of retrieval answers.
    pub fn rag_source(mut self, label: impl Into<String>) -> Self {
        self.rag_source = label.into();
        self
    }

    pub fn execution_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<MedicalWorkflow, WorkflowError> {
        let llm = self.llm;
        let graph = GraphBuilder::new()
            .add_node(Step::Memory.name(), MemoryNode)
            .add_node(Step::Planner.name(), PlannerNode::new(Planner::new(self.planner)))
            .add_node(Step::LlmAgent.name(), LlmAgent::new(llm.clone()))
            .add_node(
                Step::Retriever.name(),
                RetrieverAgent::new(llm.clone(), self.retriever, self.rag_source),
            )
            .add_node(
                Step::Wikipedia.name(),
                KnowledgeAgent::encyclopedia(llm.clone(), self.encyclopedia),
            )
            .add_node(
                Step::WebSearch.name(),
                KnowledgeAgent::web_search(llm.clone(), self.web_search),
            )
            .add_node(Step::Executor.name(), ExecutorNode::new(llm));

        let graph = Step::NODES
            .iter()
            .fold(graph, |graph, step| route_from(graph, *step))
            .set_entry(Step::Memory.name())
            .with_config(self.config)
            .build()
            .map_err(WorkflowError::Build)?;

        Ok(MedicalWorkflow { graph })
    }
}

fn route_from(graph: GraphBuilder<AgentState>, step: Step) -> GraphBuilder<AgentState> {
    let targets: Vec<&str> = step.successors().iter().map(Step::name).collect();
    if let [only] = targets.as_slice() {
        return graph.add_edge(step.name(), only);
    }
    graph.add_conditional_edge(step.name(), &targets, move |state: &GraphState<AgentState>| {
        router::next(step, &state.data).name().to_string()
    })
}

/// One conversation turn: memory, planner, strategies, executor.
pub struct MedicalWorkflow {
    graph: ExecutableGraph<AgentState>,
}

impl MedicalWorkflow {
    pub fn builder(llm: Arc<dyn Llm>) -> MedicalWorkflowBuilder {
        MedicalWorkflowBuilder {
            llm,
            retriever: None,
            encyclopedia: None,
            web_search: None,
            planner: PlannerConfig::default(),
            rag_source: DEFAULT_RAG_SOURCE.to_string(),
            config: ExecutionConfig::default(),
        }
    }

    pub fn graph(&self) -> &ExecutableGraph<AgentState> {
        &self.graph
    }

    /// Run one turn on a state whose per-turn fields were already reset with
    /// [`AgentState::begin_turn`].
    pub async fn invoke(&self, state: AgentState) -> Result<AgentState, WorkflowError> {
        self.invoke_with_options(state, ExecutionOptions::default())
            .await
    }

    /// Reset the per-turn fields, set `question`, and run the turn.
    pub async fn run_turn(
        &self,
        mut state: AgentState,
        question: impl Into<String>,
    ) -> Result<AgentState, WorkflowError> {
        state.begin_turn(question);
        self.invoke(state).await
    }

    pub async fn invoke_with_observer(
        &self,
        state: AgentState,
        observer: Arc<dyn Observer>,
    ) -> Result<AgentState, WorkflowError> {
        let options = ExecutionOptions {
            observer: Some(observer),
            ..ExecutionOptions::default()
        };
        self.invoke_with_options(state, options).await
    }

    async fn invoke_with_options(
        &self,
        state: AgentState,
        options: ExecutionOptions,
    ) -> Result<AgentState, WorkflowError> {
        if state.question.trim().is_empty() {
            return Err(WorkflowError::MissingQuestion);
        }
        let result = self
            .graph
            .invoke_with_options(GraphState::new(state), options)
            .await?;
        Ok(result.into_inner())
    }
}
