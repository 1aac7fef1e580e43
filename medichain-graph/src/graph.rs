use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use medichain_core::{GraphState, Runnable, StateSchema, StateUpdate};

use crate::program::{EdgeKind, GraphProgram};
use crate::{ExecutionConfig, ExecutionOptions, GraphError, Observer};

/// Terminal pseudo-node: an edge to `END` stops execution.
pub const END: &str = "__end__";

type BoxedNode<S> = Box<dyn Runnable<GraphState<S>, StateUpdate<S>> + Send + Sync>;
type RouteFn<S> = Arc<dyn Fn(&GraphState<S>) -> String + Send + Sync>;

enum Edge<S: StateSchema> {
    Direct(String),
    Conditional {
        targets: Vec<String>,
        route: RouteFn<S>,
    },
}

impl<S: StateSchema> Edge<S> {
    fn targets(&self) -> Vec<&str> {
        match self {
            Edge::Direct(target) => vec![target.as_str()],
            Edge::Conditional { targets, .. } => targets.iter().map(String::as_str).collect(),
        }
    }

    fn kind(&self) -> EdgeKind {
        match self {
            Edge::Direct(_) => EdgeKind::Direct,
            Edge::Conditional { .. } => EdgeKind::Conditional,
        }
    }
}

pub struct GraphBuilder<S: StateSchema> {
    nodes: HashMap<String, BoxedNode<S>>,
    edges: HashMap<String, Edge<S>>,
    entry: Option<String>,
    config: ExecutionConfig,
}

impl<S: StateSchema> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateSchema> GraphBuilder<S> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
            config: ExecutionConfig::default(),
        }
    }

    pub fn add_node<R>(mut self, name: &str, node: R) -> Self
    where
        R: Runnable<GraphState<S>, StateUpdate<S>> + Send + Sync + 'static,
    {
        self.nodes.insert(name.to_string(), Box::new(node));
        self
    }

    pub fn set_entry(mut self, name: &str) -> Self {
        self.entry = Some(name.to_string());
        self
    }

    pub fn add_edge(mut self, from: &str, to: &str) -> Self {
        self.edges
            .insert(from.to_string(), Edge::Direct(to.to_string()));
        self
    }

    /// Route out of `from` by calling `route` on the state the node produced.
    /// The router must return one of `targets`; anything else fails the run.
    pub fn add_conditional_edge<F>(mut self, from: &str, targets: &[&str], route: F) -> Self
    where
        F: Fn(&GraphState<S>) -> String + Send + Sync + 'static,
    {
        self.edges.insert(
            from.to_string(),
            Edge::Conditional {
                targets: targets.iter().map(|target| target.to_string()).collect(),
                route: Arc::new(route),
            },
        );
        self
    }

    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ExecutableGraph<S>, GraphError> {
        let entry = self.entry.ok_or(GraphError::MissingEntry)?;
        if !self.nodes.contains_key(&entry) {
            return Err(GraphError::MissingNode { node: entry });
        }
        for (from, edge) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(GraphError::MissingNode { node: from.clone() });
            }
            for target in edge.targets() {
                if target != END && !self.nodes.contains_key(target) {
                    return Err(GraphError::InvalidEdge {
                        node: target.to_string(),
                    });
                }
            }
        }

        let program = GraphProgram::new(
            self.nodes.keys().map(String::as_str),
            self.edges.iter().flat_map(|(from, edge)| {
                let kind = edge.kind();
                edge.targets()
                    .into_iter()
                    .map(move |target| (from.as_str(), target, kind))
            }),
        );
        for node in program.unreachable_from(&entry) {
            if node != END {
                tracing::warn!(node = %node, "graph node is unreachable from entry");
            }
        }

        Ok(ExecutableGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
            config: self.config,
            program,
        })
    }
}

pub struct ExecutableGraph<S: StateSchema> {
    nodes: HashMap<String, BoxedNode<S>>,
    edges: HashMap<String, Edge<S>>,
    entry: String,
    config: ExecutionConfig,
    program: GraphProgram,
}

impl<S: StateSchema> ExecutableGraph<S> {
    pub fn program(&self) -> &GraphProgram {
        &self.program
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub async fn invoke(&self, state: GraphState<S>) -> Result<GraphState<S>, GraphError> {
        self.invoke_with_options(state, ExecutionOptions::default())
            .await
    }

    pub async fn invoke_with_options(
        &self,
        state: GraphState<S>,
        options: ExecutionOptions,
    ) -> Result<GraphState<S>, GraphError> {
        let config = self.config.merge(&options);
        let observer = options.observer.as_deref();
        match config.max_duration {
            Some(limit) => tokio::time::timeout(limit, self.run(state, &config, observer))
                .await
                .map_err(|_| GraphError::Timeout { limit })?,
            None => self.run(state, &config, observer).await,
        }
    }

    async fn run(
        &self,
        mut state: GraphState<S>,
        config: &ExecutionConfig,
        observer: Option<&dyn Observer>,
    ) -> Result<GraphState<S>, GraphError> {
        let mut current = self.entry.clone();
        let mut recent: VecDeque<String> = VecDeque::new();
        let mut steps = 0usize;

        loop {
            if let Some(max) = config.max_steps {
                if steps >= max {
                    return Err(GraphError::MaxStepsExceeded {
                        max,
                        reached: steps,
                    });
                }
            }
            if config.cycle_detection && recent.contains(&current) {
                return Err(GraphError::CycleDetected {
                    node: current,
                    recent: recent.into_iter().collect(),
                });
            }

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::MissingNode {
                    node: current.clone(),
                })?;
            steps += 1;
            tracing::debug!(node = %current, step = steps, "entering graph node");

            if let Some(observer) = observer {
                observer
                    .on_node_start(&current, &snapshot(&state))
                    .await;
            }
            let started = Instant::now();
            let update = match node.invoke(state.clone()).await {
                Ok(update) => update,
                Err(err) => {
                    let err = GraphError::NodeFailed {
                        node: current.clone(),
                        source: Box::new(err),
                    };
                    if let Some(observer) = observer {
                        observer.on_error(&current, &err).await;
                    }
                    return Err(err);
                }
            };
            state = state.apply(update);
            if let Some(observer) = observer {
                observer
                    .on_node_end(&current, &snapshot(&state), started.elapsed().as_millis())
                    .await;
            }

            recent.push_back(current.clone());
            if recent.len() > config.cycle_window {
                recent.pop_front();
            }

            let next = match self.edges.get(&current) {
                None => break,
                Some(Edge::Direct(target)) => target.clone(),
                Some(Edge::Conditional { targets, route }) => {
                    let target = route(&state);
                    if !targets.contains(&target) {
                        return Err(GraphError::UndeclaredRoute {
                            from: current,
                            to: target,
                        });
                    }
                    target
                }
            };
            if next == END {
                break;
            }
            current = next;
        }

        tracing::debug!(steps, "graph run finished");
        Ok(state)
    }
}

fn snapshot<S: StateSchema>(state: &GraphState<S>) -> serde_json::Value {
    serde_json::to_value(&state.data).unwrap_or(serde_json::Value::Null)
}
