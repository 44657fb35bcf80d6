use std::collections::VecDeque;
use std::iter::Cloned;
use std::slice::Iter;
use ::sprs::CsMat;
use sprs::TriMat;

/// Struct that represents the contiguity relation between areas
pub struct Graph{
    /// The CsMat (from sprs) is used to store the adjacency as a sparse matrix in CSR format
    pub graph_csr: CsMat<f64>
}

impl Graph {

    /// Create a new empty contiguity graph
    pub fn new() -> Self {
        Self {
            graph_csr: CsMat::empty(sprs::CSR, 0)
        }
    }

    /// Build the contiguity graph for `num_areas` areas from an undirected
    /// edge list. Each pair is inserted in both directions.
    pub fn from_edge_list(num_areas: usize, edges: &[(usize, usize)]) -> Self {
        let mut triplet_matrix = TriMat::with_capacity((num_areas, num_areas), 2 * edges.len());
        for &(area1, area2) in edges {
            triplet_matrix.add_triplet(area1, area2, 1.0);
            triplet_matrix.add_triplet(area2, area1, 1.0);
        }
        Self {
            graph_csr: triplet_matrix.to_csr(),
        }
    }

    /// The number of areas in the graph.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.graph_csr.rows(), self.graph_csr.cols());
        self.graph_csr.rows()
    }

    /// Whether the graph has no areas.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An iterator over the neighbors of the given area.
    pub fn neighbors(&self, area: usize) -> Cloned<Iter<'_, usize>> {
        let (indices, _weights) = self.graph_csr.outer_view(area).unwrap().into_raw_storage();
        indices.iter().cloned()
    }

    /// The number of neighbors of the given area.
    pub fn degree(&self, area: usize) -> usize {
        let (indices, _weights) = self.graph_csr.outer_view(area).unwrap().into_raw_storage();
        indices.len()
    }

    /// Insert a contiguity edge between two areas (both directions).
    pub fn insert(&mut self, area1: usize, area2: usize) {
        self.graph_csr.insert(area1, area2, 1.0);
        self.graph_csr.insert(area2, area1, 1.0);
    }

    /// Check whether the given set of areas forms a single connected component.
    pub fn is_component(&self, ids: &[usize]) -> bool {
        let mut components = 0;
        let mut marks: Vec<Option<usize>> = vec![None; self.len()];
        let mut in_set = vec![false; self.len()];
        for &id in ids {
            in_set[id] = true;
        }

        let mut queue = VecDeque::new();
        for &id in ids {
            if marks[id].is_none() {
                components += 1;
                if components > 1 {
                    return false;
                }
                queue.push_back(id);
                while let Some(node) = queue.pop_back() {
                    marks[node] = Some(components);
                    for nbr in self.neighbors(node) {
                        if in_set[nbr] && marks[nbr].is_none() && !queue.contains(&nbr) {
                            queue.push_back(nbr);
                        }
                    }
                }
            }
        }
        true
    }

    /// Check whether the areas in `ids` stay connected once `leaver` is
    /// removed. Breadth-first traversal from the first remaining member;
    /// an empty remainder does not count as connected.
    pub fn is_connected_excluding(&self, ids: &[usize], leaver: usize) -> bool {
        let mut reached = vec![false; self.len()];
        let mut remaining = vec![false; self.len()];
        let mut queue = VecDeque::new();
        for &id in ids {
            if id != leaver {
                remaining[id] = true;
                if queue.is_empty() {
                    queue.push_back(id);
                    reached[id] = true;
                }
            }
        }
        if queue.is_empty() {
            return false;
        }

        while let Some(node) = queue.pop_front() {
            for nbr in self.neighbors(node) {
                if remaining[nbr] && !reached[nbr] {
                    reached[nbr] = true;
                    queue.push_back(nbr);
                }
            }
        }
        ids.iter().all(|&id| id == leaver || reached[id])
    }
}
