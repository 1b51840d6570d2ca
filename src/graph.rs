//! Generic directed graph
//!
//! Tracks reference relationships between planning entities (e.g. "view A
//! references view B") so cyclic references can be detected before an
//! unbounded expansion is attempted. Vertices are unique; edges are built by
//! an injected factory and kept in insertion order for deterministic
//! successor/predecessor iteration.

use std::collections::HashSet;
use std::hash::Hash;

use crate::error::{Error, Result};

/// An edge with exactly one ordered source/target vertex pair
pub trait DirectedEdge<V> {
    fn source(&self) -> &V;
    fn target(&self) -> &V;
}

/// Builds edges for a graph; injected at graph construction
pub trait EdgeFactory<V, E> {
    fn create_edge(&self, source: &V, target: &V) -> E;
}

/// Plain edge carrying only its endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultEdge<V> {
    pub source: V,
    pub target: V,
}

impl<V> DirectedEdge<V> for DefaultEdge<V> {
    fn source(&self) -> &V {
        &self.source
    }

    fn target(&self) -> &V {
        &self.target
    }
}

/// Factory for [`DefaultEdge`]
pub struct DefaultEdgeFactory;

impl<V: Clone> EdgeFactory<V, DefaultEdge<V>> for DefaultEdgeFactory {
    fn create_edge(&self, source: &V, target: &V) -> DefaultEdge<V> {
        DefaultEdge {
            source: source.clone(),
            target: target.clone(),
        }
    }
}

/// Directed graph over arbitrary vertex and edge types.
///
/// Invariant: every edge's endpoints are members of the vertex set; no
/// mutation may leave a dangling edge.
pub struct DirectedGraph<V, E, F> {
    vertices: Vec<V>,
    edges: Vec<E>,
    factory: F,
}

impl<V, E, F> DirectedGraph<V, E, F>
where
    V: Eq + Hash + Clone,
    E: DirectedEdge<V>,
    F: EdgeFactory<V, E>,
{
    pub fn new(factory: F) -> Self {
        DirectedGraph {
            vertices: Vec::new(),
            edges: Vec::new(),
            factory,
        }
    }

    /// Adds a vertex; no effect if already present. Returns whether the
    /// vertex was newly added.
    pub fn add_vertex(&mut self, vertex: V) -> bool {
        if self.vertices.contains(&vertex) {
            return false;
        }
        self.vertices.push(vertex);
        true
    }

    pub fn contains_vertex(&self, vertex: &V) -> bool {
        self.vertices.contains(vertex)
    }

    /// Creates an edge via the factory and adds it. Both endpoints must
    /// already be vertices (a dangling edge is a structural error). Adding
    /// an edge for an existing ordered pair is rejected: the existing edge
    /// is returned and no second edge is created.
    pub fn add_edge(&mut self, source: &V, target: &V) -> Result<&E> {
        if !self.contains_vertex(source) || !self.contains_vertex(target) {
            return Err(Error::Internal(
                "edge endpoint is not a vertex of the graph".to_string(),
            ));
        }
        if let Some(i) = self.edge_index(source, target) {
            return Ok(&self.edges[i]);
        }
        let edge = self.factory.create_edge(source, target);
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }

    /// Returns the edge for the ordered pair, if any
    pub fn get_edge(&self, source: &V, target: &V) -> Option<&E> {
        self.edge_index(source, target).map(|i| &self.edges[i])
    }

    /// Removes the edge for the ordered pair; reports whether a removal
    /// occurred
    pub fn remove_edge(&mut self, source: &V, target: &V) -> bool {
        match self.edge_index(source, target) {
            Some(i) => {
                self.edges.remove(i);
                true
            }
            None => false,
        }
    }

    /// All vertices, in insertion order
    pub fn vertex_set(&self) -> &[V] {
        &self.vertices
    }

    /// All edges, in insertion order
    pub fn edge_set(&self) -> &[E] {
        &self.edges
    }

    /// Removes the given vertices and every edge incident to any of them
    pub fn remove_all_vertices(&mut self, vertices: &[V]) {
        let doomed: HashSet<&V> = vertices.iter().collect();
        self.edges
            .retain(|e| !doomed.contains(e.source()) && !doomed.contains(e.target()));
        self.vertices.retain(|v| !doomed.contains(v));
    }

    /// Edges leaving `vertex`, in insertion order
    pub fn outward_edges(&self, vertex: &V) -> Vec<&E> {
        self.edges.iter().filter(|e| e.source() == vertex).collect()
    }

    /// Edges entering `vertex`, in insertion order
    pub fn inward_edges(&self, vertex: &V) -> Vec<&E> {
        self.edges.iter().filter(|e| e.target() == vertex).collect()
    }

    /// Whether `to` can be reached from `from` through one or more edges.
    /// With `from == to` this answers "does a cycle pass through this
    /// vertex".
    pub fn is_reachable(&self, from: &V, to: &V) -> bool {
        let mut visited: HashSet<&V> = HashSet::new();
        let mut stack: Vec<&V> = self
            .outward_edges(from)
            .iter()
            .map(|e| e.target())
            .collect();
        while let Some(vertex) = stack.pop() {
            if vertex == to {
                return true;
            }
            if visited.insert(vertex) {
                for edge in self.outward_edges(vertex) {
                    stack.push(edge.target());
                }
            }
        }
        false
    }

    fn edge_index(&self, source: &V, target: &V) -> Option<usize> {
        self.edges
            .iter()
            .position(|e| e.source() == source && e.target() == target)
    }
}
