use std::collections::HashMap;

use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    Direct,
    Conditional,
}

/// Static view of a built graph: every declared node and every edge a router may take.
pub struct GraphProgram {
    graph: Graph<String, EdgeKind>,
    name_to_index: HashMap<String, NodeIndex>,
}

impl GraphProgram {
    pub(crate) fn new<'a>(
        node_names: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, &'a str, EdgeKind)>,
    ) -> Self {
        let mut graph = Graph::new();
        let mut name_to_index = HashMap::new();
        for name in node_names {
            let index = graph.add_node(name.to_string());
            name_to_index.insert(name.to_string(), index);
        }
        for (from, to, kind) in edges {
            let from = *name_to_index
                .entry(from.to_string())
                .or_insert_with(|| graph.add_node(from.to_string()));
            let to = *name_to_index
                .entry(to.to_string())
                .or_insert_with(|| graph.add_node(to.to_string()));
            graph.add_edge(from, to, kind);
        }
        Self {
            graph,
            name_to_index,
        }
    }

    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name_to_index.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn edge_names(&self) -> Vec<(String, String)> {
        let mut edges: Vec<(String, String)> = self
            .graph
            .edge_references()
            .filter_map(|edge| {
                let from = self.graph.node_weight(edge.source())?;
                let to = self.graph.node_weight(edge.target())?;
                Some((from.clone(), to.clone()))
            })
            .collect();
        edges.sort();
        edges
    }

    /// Nodes no path from `entry` can reach.
    pub fn unreachable_from(&self, entry: &str) -> Vec<String> {
        let Some(&start) = self.name_to_index.get(entry) else {
            return self.node_names();
        };
        let mut seen = vec![false; self.graph.node_count()];
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(index) = dfs.next(&self.graph) {
            seen[index.index()] = true;
        }
        let mut unreachable: Vec<String> = self
            .name_to_index
            .iter()
            .filter(|(_, index)| !seen[index.index()])
            .map(|(name, _)| name.clone())
            .collect();
        unreachable.sort();
        unreachable
    }
}
