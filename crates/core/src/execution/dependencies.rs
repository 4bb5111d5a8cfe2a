//! Task dependency management
//!
//! This module resolves the dependency closure of requested tasks, rejects unknown
//! references and cycles, and produces a deterministic topological order.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;
use tracing::debug;

use crate::task::TaskGraph;
use crate::types::GraphError;

/// Resolve the requested tasks and all of their transitive dependencies into
/// an execution order where every task follows its dependencies.
///
/// Requested tasks are walked in request order and dependencies in declaration
/// order, so the result is stable for a given graph and request.
pub fn resolve_execution_order<S: AsRef<str>>(
    graph: &TaskGraph,
    requested: &[S],
) -> Result<Vec<String>, GraphError> {
    if requested.is_empty() {
        return Err(GraphError::NoTasksRequested);
    }

    for name in requested {
        if !graph.contains(name.as_ref()) {
            return Err(GraphError::UnknownTask {
                name: name.as_ref().to_string(),
                referenced_by: None,
            });
        }
    }

    let closure = collect_closure(graph, requested)?;
    debug!(tasks = closure.len(), "resolved dependency closure");

    let cycles = find_cycles(graph, &closure);
    if !cycles.is_empty() {
        return Err(GraphError::Cycle { cycles });
    }

    Ok(topological_order(graph, requested))
}

/// Breadth-first walk collecting every task reachable from the request.
/// Fails on the first dependency that names a missing task.
fn collect_closure<'g, S: AsRef<str>>(
    graph: &'g TaskGraph,
    requested: &[S],
) -> Result<Vec<&'g str>, GraphError> {
    let mut seen = HashSet::new();
    let mut closure = Vec::new();
    let mut queue: VecDeque<&str> = requested.iter().map(AsRef::as_ref).collect();

    while let Some(name) = queue.pop_front() {
        let Some(task) = graph.get(name) else {
            continue;
        };
        if !seen.insert(task.name()) {
            continue;
        }
        closure.push(task.name());

        for dep in task.dependencies() {
            if !graph.contains(dep) {
                return Err(GraphError::UnknownTask {
                    name: dep.clone(),
                    referenced_by: Some(task.name().to_string()),
                });
            }
            queue.push_back(dep);
        }
    }

    Ok(closure)
}

/// Build a petgraph digraph over `names` with an edge from each task to each
/// of its dependencies. References to tasks outside `names` are skipped.
pub fn build_petgraph<'a, I>(graph: &TaskGraph, names: I) -> DiGraph<String, ()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut digraph = DiGraph::<String, ()>::new();
    let mut node_indices = HashMap::new();

    let names: Vec<&str> = names.into_iter().collect();
    for name in &names {
        let node_index = digraph.add_node(name.to_string());
        node_indices.insert(*name, node_index);
    }

    for name in &names {
        let Some(task) = graph.get(name) else {
            continue;
        };
        let from_node = node_indices[name];
        for dep in task.dependencies() {
            if let Some(&to_node) = node_indices.get(dep.as_str()) {
                digraph.add_edge(from_node, to_node, ());
            }
        }
    }

    digraph
}

/// Find every cycle among `names` using strongly connected components.
///
/// Each cycle lists its members sorted by name, and the cycles themselves are
/// sorted, so the output is stable.
pub fn find_cycles(graph: &TaskGraph, names: &[&str]) -> Vec<Vec<String>> {
    let digraph = build_petgraph(graph, names.iter().copied());
    cycles_in(&digraph)
}

pub(crate) fn cycles_in(digraph: &DiGraph<String, ()>) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = kosaraju_scc(digraph)
        .into_iter()
        .filter_map(|component| {
            if component.len() > 1 {
                let mut cycle = component
                    .iter()
                    .map(|node| digraph[*node].clone())
                    .collect::<Vec<_>>();
                cycle.sort();
                Some(cycle)
            } else {
                let node = component[0];
                if digraph.contains_edge(node, node) {
                    Some(vec![digraph[node].clone()])
                } else {
                    None
                }
            }
        })
        .collect();

    cycles.sort();
    cycles
}

/// Depth-first post-order over the (already validated, acyclic) closure
fn topological_order<S: AsRef<str>>(graph: &TaskGraph, requested: &[S]) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();

    for root in requested {
        if visited.contains(root.as_ref()) {
            continue;
        }

        // Each frame is a task plus the index of the next dependency to visit
        let mut stack: Vec<(&str, usize)> = vec![(root.as_ref(), 0)];
        visited.insert(root.as_ref().to_string());

        while let Some((name, next)) = stack.pop() {
            let deps = graph.get(name).map(|t| t.dependencies()).unwrap_or_default();

            if let Some(dep) = deps.get(next) {
                stack.push((name, next + 1));
                if visited.insert(dep.clone()) {
                    stack.push((dep.as_str(), 0));
                }
            } else {
                order.push(name.to_string());
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn graph_of(spec: &[(&str, &[&str])]) -> TaskGraph {
        let mut graph = TaskGraph::new();
        for (name, deps) in spec {
            graph
                .register(Task::new(*name).depends_on(deps.iter().copied()))
                .unwrap();
        }
        graph
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_diamond_orders_dependencies_first() {
        let graph = graph_of(&[("A", &[]), ("B", &["A"]), ("C", &["A"]), ("D", &["B", "C"])]);

        let order = resolve_execution_order(&graph, &["D"]).unwrap();

        assert_eq!(order.len(), 4);
        assert_eq!(order.first().map(String::as_str), Some("A"));
        assert_eq!(order.last().map(String::as_str), Some("D"));
        assert!(position(&order, "B") < position(&order, "D"));
        assert!(position(&order, "C") < position(&order, "D"));
    }

    #[test]
    fn test_order_follows_declared_dependency_order() {
        let graph = graph_of(&[("A", &[]), ("B", &["A"]), ("C", &["A"]), ("D", &["B", "C"])]);

        let first = resolve_execution_order(&graph, &["D"]).unwrap();
        let second = resolve_execution_order(&graph, &["D"]).unwrap();

        assert_eq!(first, vec!["A", "B", "C", "D"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_requesting_dependency_explicitly_does_not_change_order() {
        let graph = graph_of(&[("X", &[]), ("Y", &["X"])]);

        let both = resolve_execution_order(&graph, &["X", "Y"]).unwrap();
        let only_y = resolve_execution_order(&graph, &["Y"]).unwrap();

        assert_eq!(both, only_y);
        assert_eq!(both, vec!["X", "Y"]);
    }

    #[test]
    fn test_closure_excludes_unrelated_tasks() {
        let graph = graph_of(&[("a", &[]), ("b", &["a"]), ("unrelated", &[])]);

        let order = resolve_execution_order(&graph, &["b"]).unwrap();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_requested_task() {
        let graph = graph_of(&[("a", &[])]);

        let err = resolve_execution_order(&graph, &["missing"]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnknownTask { ref name, referenced_by: None } if name == "missing"
        ));
    }

    #[test]
    fn test_unknown_dependency_names_referencing_task() {
        let graph = graph_of(&[("createZipJars", &["shadowJar"]), ("dist", &["createZipJars"])]);

        let err = resolve_execution_order(&graph, &["dist"]).unwrap_err();
        match err {
            GraphError::UnknownTask { name, referenced_by } => {
                assert_eq!(name, "shadowJar");
                assert_eq!(referenced_by.as_deref(), Some("createZipJars"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_is_reported_with_members() {
        let graph = graph_of(&[("root", &["a"]), ("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);

        let err = resolve_execution_order(&graph, &["root"]).unwrap_err();
        match &err {
            GraphError::Cycle { cycles } => {
                assert_eq!(cycles, &vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("a -> b -> c -> a"));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let graph = graph_of(&[("loop", &["loop"])]);

        let err = resolve_execution_order(&graph, &["loop"]).unwrap_err();
        assert!(matches!(err, GraphError::Cycle { ref cycles } if cycles == &vec![vec!["loop".to_string()]]));
    }

    #[test]
    fn test_unreachable_cycle_does_not_block_request() {
        let graph = graph_of(&[("ok", &[]), ("x", &["y"]), ("y", &["x"])]);

        let order = resolve_execution_order(&graph, &["ok"]).unwrap();
        assert_eq!(order, vec!["ok"]);
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let graph = graph_of(&[("a", &[])]);
        let requested: [&str; 0] = [];

        let err = resolve_execution_order(&graph, &requested).unwrap_err();
        assert!(matches!(err, GraphError::NoTasksRequested));
    }

    #[test]
    fn test_find_cycles_over_whole_graph() {
        let graph = graph_of(&[("a", &["b"]), ("b", &["a"]), ("c", &["c"]), ("d", &[])]);
        let names: Vec<&str> = graph.tasks().map(Task::name).collect();

        let cycles = find_cycles(&graph, &names);
        assert_eq!(
            cycles,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()],
            ]
        );
    }
}
