use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;

use crate::{
  scalar::Real,
  tensor::Tensor,
  ops::BaseOps,
};


#[derive(Debug, Clone, Copy, PartialEq)]
struct NodeWeight<T> {
  outbound: T,
}


/// Directed graph with weighted edges, ranked by PageRank.
///
/// Node ids are arbitrary `u64` values. Iteration order is always
/// ascending by node id, so results are reproducible.

#[derive(Debug, Clone, Default)]
pub struct Graph<T: Real> {
  nodes: BTreeMap<u64, NodeWeight<T>>,
  edges: BTreeMap<u64, BTreeMap<u64, T>>,
}

impl<T: Real> Graph<T> {
  pub fn new() -> Self {
    Self { nodes: BTreeMap::new(), edges: BTreeMap::new() }
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Add `weight` to the edge from `source` to `target`, creating
  /// both nodes if necessary.

  pub fn link(&mut self, source: u64, target: u64, weight: T) {
    self.nodes.entry(source).or_insert(NodeWeight { outbound: T::zero() }).outbound += weight;
    self.nodes.entry(target).or_insert(NodeWeight { outbound: T::zero() });
    *self.edges.entry(source).or_default().entry(target).or_insert(T::zero()) += weight;
  }

  /// Run PageRank with the given `damping` factor until the summed absolute
  /// change of all ranks drops to `tolerance`, then report every node's rank.
  ///
  /// Rank held by nodes without outbound weight gets spread evenly
  /// across the whole graph.

  pub fn rank(&self, damping: T, tolerance: T, mut callback: impl FnMut(u64, T)) {
    if self.nodes.is_empty() { return }

    let ids: Vec<u64> = self.nodes.keys().copied().collect();
    let index: BTreeMap<u64, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i) ).collect();
    let inverse = T::one() / T::from(ids.len()).unwrap();

    // Edge weights normalized to sum to one per source
    let edges: Vec<Vec<(usize, T)>> = ids.iter().map(|id| {
      let outbound = self.nodes[id].outbound;
      self.edges.get(id)
        .map(|targets| targets.iter()
          .map(|(target, &weight)| {
            let weight = if outbound > T::zero() { weight / outbound } else { weight };
            (index[target], weight)
          })
          .collect::<Vec<_>>())
        .unwrap_or_default()
    }).collect();
    let dangling: Vec<bool> = ids.iter().map(|id| self.nodes[id].outbound == T::zero() ).collect();

    let mut ranks = vec![inverse; ids.len()];
    let mut delta = T::one();
    let mut iterations = 0;
    while delta > tolerance {
      let previous = std::mem::replace(&mut ranks, vec![T::zero(); ids.len()]);

      let leak = previous.iter()
        .zip(&dangling)
        .filter_map(|(&rank, &dangling)| dangling.then_some(rank) )
        .fold(T::zero(), |acc, rank| acc + rank ) * damping;

      for (source, targets) in edges.iter().enumerate() {
        for &(target, weight) in targets {
          ranks[target] += damping * previous[source] * weight;
        }
        ranks[source] += (T::one() - damping + leak) * inverse;
      }

      delta = ranks.iter()
        .zip(&previous)
        .fold(T::zero(), |acc, (&a, &b)| acc + (a - b).abs() );
      iterations += 1;
    }
    debug!("pagerank converged after {iterations} iterations over {} nodes", ids.len());

    for (id, rank) in ids.into_iter().zip(ranks) {
      callback(id, rank);
    }
  }
}


/// Interpret a square weight matrix as a directed graph over its features.
///
/// Entry `(i, j)` links `i` to `j` with its weight. Negative entries
/// link the other way round, with the weight's magnitude.

pub fn feature_graph<T: Real>(weights: &Tensor<T>) -> Graph<T> {
  let shape = weights.shape();
  assert!(shape.rank() == 2 && shape[0] == shape[1],
    "Feature graphs need a square weight matrix, got {}", shape);
  let width = shape[0];
  let data = weights.raw();
  let mut graph = Graph::new();
  for i in 0..width {
    for j in 0..width {
      let weight = data[i * width + j];
      if weight < T::zero() {
        graph.link(j as u64, i as u64, -weight);
      } else {
        graph.link(i as u64, j as u64, weight);
      }
    }
  }
  graph
}


/// PageRank of a single feature.

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRank<T> {
  pub node: u64,
  pub header: String,
  pub rank: T,
}

/// Rank the features of a trained weight matrix, least important first.

pub fn rank_features<T: Real>(weights: &Tensor<T>, headers: &[String], damping: T, tolerance: T) -> Vec<FeatureRank<T>> {
  let mut ranks = vec![];
  feature_graph(weights).rank(damping, tolerance, |node, rank| {
    ranks.push(FeatureRank {
      node,
      header: headers.get(node as usize).cloned().unwrap_or_default(),
      rank,
    });
  });
  ranks.into_iter()
    .sorted_by(|a, b| a.rank.partial_cmp(&b.rank).unwrap_or(std::cmp::Ordering::Equal) )
    .collect()
}


#[cfg(test)]
mod tests {
  use super::*;

  fn ranks(graph: &Graph<f64>) -> Vec<(u64, f64)> {
    let mut out = vec![];
    graph.rank(0.85, 1e-9, |node, rank| out.push((node, rank)) );
    out
  }

  #[test]
  fn empty_graph() {
    assert!(ranks(&Graph::new()).is_empty());
  }

  #[test]
  fn cycle_is_uniform() {
    let mut graph = Graph::new();
    graph.link(0, 1, 1.0);
    graph.link(1, 2, 1.0);
    graph.link(2, 0, 1.0);
    for (_, rank) in ranks(&graph) {
      assert!((rank - 1.0 / 3.0).abs() < 1e-9);
    }
  }

  #[test]
  fn sink_collects_rank() {
    let mut graph = Graph::new();
    graph.link(1, 0, 1.0);
    graph.link(2, 0, 1.0);
    graph.link(3, 0, 1.0);
    let ranks = ranks(&graph);
    assert_eq!(ranks.iter().map(|(node, _)| *node ).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert!(ranks[0].1 > ranks[1].1);
    assert!((ranks[1].1 - ranks[2].1).abs() < 1e-12);
    let sum: f64 = ranks.iter().map(|(_, rank)| rank ).sum();
    assert!((sum - 1.0).abs() < 1e-6);
  }

  #[test]
  fn repeated_links_accumulate() {
    let mut a = Graph::new();
    a.link(0, 1, 1.0);
    a.link(0, 1, 1.0);
    a.link(0, 2, 2.0);
    a.link(1, 0, 1.0);
    a.link(2, 0, 1.0);
    let mut b = Graph::new();
    b.link(0, 1, 1.0);
    b.link(0, 2, 1.0);
    b.link(1, 0, 1.0);
    b.link(2, 0, 1.0);
    for ((_, x), (_, y)) in ranks(&a).into_iter().zip(ranks(&b)) {
      assert!((x - y).abs() < 1e-9);
    }
  }

  #[test]
  fn negative_weights_flip_edges() {
    let weights = Tensor::new(&[2, 2], vec![0.0, -2.0, 0.0, 0.0]);
    let graph = feature_graph(&weights);
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.edges[&1][&0], 2.0);
    assert_eq!(graph.nodes[&1].outbound, 2.0);
    assert_eq!(graph.nodes[&0].outbound, 0.0);
  }

  #[test]
  fn features_sorted_ascending() {
    let weights = Tensor::new(&[3, 3], vec![
      0.0, 1.0, 0.0,
      0.0, 0.0, 0.0,
      0.0, 1.0, 0.0,
    ]);
    let headers = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let ranked = rank_features(&weights, &headers, 0.85, 1e-6);
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[2].node, 1);
    assert_eq!(ranked[2].header, "b");
    assert!(ranked.windows(2).all(|pair| pair[0].rank <= pair[1].rank ));
    let sum: f64 = ranked.iter().map(|f| f.rank ).sum();
    assert!((sum - 1.0).abs() < 1e-4);
  }
}
