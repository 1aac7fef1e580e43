use std::sync::Arc;

use medichain_core::{MedichainError, Runnable};
use medichain_graph::{
    ExecutionOptions, GraphBuilder, GraphError, GraphState, Observer, StateSchema, StateUpdate,
    END,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq)]
struct Counter {
    count: i32,
    visited: Vec<String>,
}

impl StateSchema for Counter {
    type Update = Counter;

    fn apply(_current: &Self, update: Counter) -> Self {
        update
    }
}

struct Step(&'static str);

#[async_trait::async_trait]
impl Runnable<GraphState<Counter>, StateUpdate<Counter>> for Step {
    async fn invoke(
        &self,
        input: GraphState<Counter>,
    ) -> Result<StateUpdate<Counter>, MedichainError> {
        let mut next = input.data;
        next.count += 1;
        next.visited.push(self.0.to_string());
        Ok(StateUpdate::new(next))
    }
}

struct Broken;

#[async_trait::async_trait]
impl Runnable<GraphState<Counter>, StateUpdate<Counter>> for Broken {
    async fn invoke(
        &self,
        _input: GraphState<Counter>,
    ) -> Result<StateUpdate<Counter>, MedichainError> {
        Err(MedichainError::Custom("boom".to_string()))
    }
}

#[tokio::test]
async fn direct_edges_run_in_order() {
    let graph = GraphBuilder::new()
        .add_node("a", Step("a"))
        .add_node("b", Step("b"))
        .add_edge("a", "b")
        .add_edge("b", END)
        .set_entry("a")
        .build()
        .unwrap();

    let out = graph.invoke(GraphState::new(Counter::default())).await.unwrap();
    assert_eq!(out.data.count, 2);
    assert_eq!(out.data.visited, vec!["a", "b"]);
}

#[tokio::test]
async fn conditional_edge_follows_router() {
    let graph = GraphBuilder::new()
        .add_node("start", Step("start"))
        .add_node("low", Step("low"))
        .add_node("high", Step("high"))
        .add_conditional_edge("start", &["low", "high"], |state: &GraphState<Counter>| {
            if state.data.count > 5 {
                "high".to_string()
            } else {
                "low".to_string()
            }
        })
        .add_edge("low", END)
        .add_edge("high", END)
        .set_entry("start")
        .build()
        .unwrap();

    let low = graph.invoke(GraphState::new(Counter::default())).await.unwrap();
    assert_eq!(low.data.visited, vec!["start", "low"]);

    let seeded = Counter {
        count: 10,
        visited: Vec::new(),
    };
    let high = graph.invoke(GraphState::new(seeded)).await.unwrap();
    assert_eq!(high.data.visited, vec!["start", "high"]);
}

#[tokio::test]
async fn undeclared_route_is_rejected() {
    let graph = GraphBuilder::new()
        .add_node("start", Step("start"))
        .add_node("next", Step("next"))
        .add_conditional_edge("start", &["next"], |_: &GraphState<Counter>| {
            "elsewhere".to_string()
        })
        .set_entry("start")
        .build()
        .unwrap();

    let err = graph
        .invoke(GraphState::new(Counter::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::UndeclaredRoute { ref to, .. } if to == "elsewhere"));
}

#[test]
fn build_rejects_unknown_targets_and_missing_entry() {
    let missing_entry = GraphBuilder::<Counter>::new()
        .add_node("a", Step("a"))
        .build();
    assert!(matches!(missing_entry, Err(GraphError::MissingEntry)));

    let bad_edge = GraphBuilder::new()
        .add_node("a", Step("a"))
        .add_edge("a", "ghost")
        .set_entry("a")
        .build();
    assert!(matches!(bad_edge, Err(GraphError::InvalidEdge { ref node }) if node == "ghost"));
}

#[test]
fn program_lists_nodes_and_edges() {
    let graph = GraphBuilder::<Counter>::new()
        .add_node("a", Step("a"))
        .add_node("b", Step("b"))
        .add_node("orphan", Step("orphan"))
        .add_edge("a", "b")
        .add_edge("b", END)
        .set_entry("a")
        .build()
        .unwrap();

    let program = graph.program();
    assert_eq!(
        program.edge_names(),
        vec![
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), END.to_string())
        ]
    );
    assert_eq!(program.unreachable_from("a"), vec!["orphan".to_string()]);
}

#[tokio::test]
async fn loop_hits_step_limit_without_cycle_detection() {
    let graph = GraphBuilder::new()
        .add_node("spin", Step("spin"))
        .add_edge("spin", "spin")
        .set_entry("spin")
        .build()
        .unwrap();

    let options = ExecutionOptions {
        max_steps: Some(3),
        cycle_detection: Some(false),
        ..Default::default()
    };
    let err = graph
        .invoke_with_options(GraphState::new(Counter::default()), options)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::MaxStepsExceeded { max: 3, reached: 3 }));
}

#[tokio::test]
async fn revisiting_a_node_is_reported_as_cycle() {
    let graph = GraphBuilder::new()
        .add_node("a", Step("a"))
        .add_node("b", Step("b"))
        .add_edge("a", "b")
        .add_edge("b", "a")
        .set_entry("a")
        .build()
        .unwrap();

    let err = graph
        .invoke(GraphState::new(Counter::default()))
        .await
        .unwrap_err();
    match err {
        GraphError::CycleDetected { node, recent } => {
            assert_eq!(node, "a");
            assert_eq!(recent, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl Observer for Recorder {
    async fn on_node_start(&self, node_id: &str, _input: &serde_json::Value) {
        self.events.lock().await.push(format!("start:{node_id}"));
    }

    async fn on_node_end(&self, node_id: &str, _output: &serde_json::Value, _duration_ms: u128) {
        self.events.lock().await.push(format!("end:{node_id}"));
    }

    async fn on_error(&self, node_id: &str, _error: &GraphError) {
        self.events.lock().await.push(format!("error:{node_id}"));
    }
}

#[tokio::test]
async fn observer_sees_node_lifecycle_and_failures() {
    let graph = GraphBuilder::new()
        .add_node("ok", Step("ok"))
        .add_node("broken", Broken)
        .add_edge("ok", "broken")
        .set_entry("ok")
        .build()
        .unwrap();

    let recorder = Arc::new(Recorder::default());
    let options = ExecutionOptions {
        observer: Some(recorder.clone()),
        ..Default::default()
    };
    let err = graph
        .invoke_with_options(GraphState::new(Counter::default()), options)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::NodeFailed { ref node, .. } if node == "broken"));

    let events = recorder.events.lock().await.clone();
    assert_eq!(events, vec!["start:ok", "end:ok", "start:broken", "error:broken"]);
}
