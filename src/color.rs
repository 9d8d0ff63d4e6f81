use std::fmt;

use bit_set::BitSet;

use crate::dimacs::read_from_file;

/** Vertex Id */
pub type VertexId = usize;

/** Color (slot) Id */
pub type ColorId = usize;

/** Coloring of a conflict graph: coloring[v] is the color assigned to vertex v.
Always total (one color per vertex). */
pub type Coloring = Vec<ColorId>;

/** caller input rejected before a search starts. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// the graph has no vertices
    EmptyGraph,
    /// row `row` of the weight matrix does not have length n
    NotSquare {
        /// offending row
        row: usize
    },
    /// a diagonal entry is non-zero (a vertex conflicting with itself)
    SelfLoop {
        /// offending vertex
        vertex: VertexId
    },
    /// entries (u,v) and (v,u) disagree
    Asymmetric {
        /// first endpoint
        u: VertexId,
        /// second endpoint
        v: VertexId
    },
    /// an adjacency list references a vertex out of [0,n)
    VertexOutOfRange {
        /// offending vertex
        vertex: VertexId
    },
    /// zero colors requested
    ZeroColors,
    /// zero candidate attempts per iteration requested
    ZeroReps,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::EmptyGraph =>
                write!(f, "the conflict graph has no vertices"),
            InputError::NotSquare { row } =>
                write!(f, "row {} of the weight matrix does not have length n", row),
            InputError::SelfLoop { vertex } =>
                write!(f, "vertex {} conflicts with itself", vertex),
            InputError::Asymmetric { u, v } =>
                write!(f, "entries ({},{}) and ({},{}) disagree", u, v, v, u),
            InputError::VertexOutOfRange { vertex } =>
                write!(f, "vertex {} is out of range", vertex),
            InputError::ZeroColors =>
                write!(f, "at least one color is required"),
            InputError::ZeroReps =>
                write!(f, "at least one candidate attempt per iteration is required"),
        }
    }
}

impl std::error::Error for InputError {}

/** models a conflict graph. Vertices are entities (e.g. courses), an edge
means its endpoints cannot share a slot (color). Symmetric and loop-free,
checked at construction; immutable for the duration of a search. */
#[derive(Debug, Clone)]
pub struct ConflictGraph {
    /// nb vertices
    n: usize,
    /// nb edges
    m: usize,
    /// edges of the graph (each stored once, u < v)
    edges: Vec<(VertexId, VertexId)>,
    /// adj_list[i]: list of vertices adjacent to i
    adj_list: Vec<Vec<VertexId>>,
    /// adj_matrix[i]: bitset of the neighbors of i
    adj_matrix: Vec<BitSet>,
}

impl ConflictGraph {

    /// number of vertices
    pub fn nb_vertices(&self) -> usize { self.n }

    /// number of edges
    pub fn nb_edges(&self) -> usize { self.m }

    /// edge list (each unordered pair appears once, with u < v)
    pub fn edges(&self) -> &[(VertexId, VertexId)] { &self.edges }

    /// list of vertices adjacent to vertex u
    pub fn neighbors(&self, u: VertexId) -> &[VertexId] { &self.adj_list[u] }

    /// degree of vertex u
    pub fn degree(&self, u: VertexId) -> usize { self.adj_list[u].len() }

    /// returns true if u and v are joined by a conflict edge (O(1))
    pub fn are_adjacent(&self, u: VertexId, v: VertexId) -> bool {
        self.adj_matrix[u].contains(v)
    }

    /** constructor using an adjacency list. Rejects self-loops, out of range
    vertices and one-sided adjacencies. Duplicate entries in a list are
    tolerated (the edge is stored once). */
    pub fn from_adj_list(adj_list: Vec<Vec<VertexId>>) -> Result<Self, InputError> {
        let n = adj_list.len();
        if n == 0 { return Err(InputError::EmptyGraph); }
        let mut adj_matrix = vec![BitSet::with_capacity(n); n];
        for (u, neighbors) in adj_list.iter().enumerate() {
            for &v in neighbors {
                if v >= n { return Err(InputError::VertexOutOfRange { vertex: v }); }
                if v == u { return Err(InputError::SelfLoop { vertex: u }); }
                adj_matrix[u].insert(v);
            }
        }
        for u in 0..n {
            for v in adj_matrix[u].iter() {
                if !adj_matrix[v].contains(u) {
                    return Err(InputError::Asymmetric { u, v });
                }
            }
        }
        let edges = Self::build_edges(&adj_matrix);
        let m = edges.len();
        // normalize the lists from the deduplicated matrix
        let lists: Vec<Vec<VertexId>> = adj_matrix.iter()
            .map(|s| s.iter().collect())
            .collect();
        Ok(Self { n, m, edges, adj_list: lists, adj_matrix })
    }

    /** constructor using a dense symmetric weight matrix (entry > 0 means a
    conflict edge, the diagonal must be zero). */
    pub fn from_matrix(weights: &[Vec<u32>]) -> Result<Self, InputError> {
        let n = weights.len();
        if n == 0 { return Err(InputError::EmptyGraph); }
        for (u, row) in weights.iter().enumerate() {
            if row.len() != n { return Err(InputError::NotSquare { row: u }); }
            if row[u] != 0 { return Err(InputError::SelfLoop { vertex: u }); }
        }
        let mut adj_list = vec![Vec::new(); n];
        for u in 0..n {
            for v in (u + 1)..n {
                if weights[u][v] != weights[v][u] {
                    return Err(InputError::Asymmetric { u, v });
                }
                if weights[u][v] > 0 {
                    adj_list[u].push(v);
                    adj_list[v].push(u);
                }
            }
        }
        Self::from_adj_list(adj_list)
    }

    /// creates a conflict graph from a DIMACS (.col) file
    pub fn from_file(filename: &str) -> Result<Self, InputError> {
        let (_, _, adj_list) = read_from_file(filename);
        Self::from_adj_list(adj_list)
    }

    /// builds the edge list (u < v) from the adjacency bitsets
    fn build_edges(adj_matrix: &[BitSet]) -> Vec<(VertexId, VertexId)> {
        let mut res = Vec::new();
        for (u, neighbors) in adj_matrix.iter().enumerate() {
            for v in neighbors.iter() {
                if u < v {
                    res.push((u, v));
                }
            }
        }
        res
    }

    /** number of conflict edges whose endpoints share a color under the
    given coloring. */
    pub fn conflict_count(&self, coloring: &Coloring) -> usize {
        self.edges.iter()
            .filter(|(u, v)| coloring[*u] == coloring[*v])
            .count()
    }

    /// print statistics of the instance
    pub fn display_statistics(&self) {
        println!("\t{} \t vertices", self.nb_vertices());
        println!("\t{} \t edges", self.nb_edges());
        let degrees: Vec<usize> = (0..self.n).map(|i| self.degree(i)).collect();
        println!("\t{} \t min degree", degrees.iter().min().unwrap());
        println!("\t{} \t max degree", degrees.iter().max().unwrap());
    }

    /** writes a string encoding a coloring, one line per color class
    (use this to export a solution). */
    pub fn coloring_to_string(&self, nb_colors: usize, coloring: &Coloring) -> String {
        let mut classes: Vec<Vec<VertexId>> = vec![Vec::new(); nb_colors];
        for (v, &c) in coloring.iter().enumerate() {
            classes[c].push(v);
        }
        let mut res = String::default();
        for class in classes.iter().filter(|c| !c.is_empty()) {
            for v in class {
                res += format!("{} ", v).as_str();
            }
            res += "\n";
        }
        res
    }
}

/** result of the coloring checker */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckerResult {
    /// feasible coloring; payload is the number of distinct colors used
    Ok(usize),
    /// the coloring does not assign a color to every vertex exactly once
    WrongLength {
        /// nb vertices of the instance
        expected: usize,
        /// length of the coloring
        found: usize
    },
    /// some vertex uses a color outside [0,nb_colors)
    ColorOutOfRange {
        /// offending vertex
        vertex: VertexId,
        /// its color
        color: ColorId
    },
    /// the endpoints of edge (u,v) share a color
    Conflict {
        /// first endpoint
        u: VertexId,
        /// second endpoint
        v: VertexId
    },
}

/**
checks a coloring against an instance (brute-force edge scan).
Returns the number of distinct colors used if feasible.
*/
pub fn checker(inst: &ConflictGraph, nb_colors: usize, coloring: &Coloring) -> CheckerResult {
    if coloring.len() != inst.nb_vertices() {
        return CheckerResult::WrongLength {
            expected: inst.nb_vertices(), found: coloring.len()
        };
    }
    for (vertex, &color) in coloring.iter().enumerate() {
        if color >= nb_colors {
            return CheckerResult::ColorOutOfRange { vertex, color };
        }
    }
    for &(u, v) in inst.edges() {
        if coloring[u] == coloring[v] {
            return CheckerResult::Conflict { u, v };
        }
    }
    let mut used = BitSet::with_capacity(nb_colors);
    for &c in coloring {
        used.insert(c);
    }
    CheckerResult::Ok(used.len())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> ConflictGraph {
        ConflictGraph::from_adj_list(vec![vec![1,2], vec![0,2], vec![0,1]]).unwrap()
    }

    #[test]
    fn test_from_adj_list() {
        let inst = triangle();
        assert_eq!(inst.nb_vertices(), 3);
        assert_eq!(inst.nb_edges(), 3);
        assert_eq!(inst.edges(), &[(0,1),(0,2),(1,2)]);
        assert!(inst.are_adjacent(0,2));
        assert_eq!(inst.neighbors(1), &[0,2]);
        assert_eq!(inst.degree(2), 2);
    }

    #[test]
    fn test_from_matrix() {
        let weights = vec![
            vec![0, 1, 0],
            vec![1, 0, 2],
            vec![0, 2, 0],
        ];
        let inst = ConflictGraph::from_matrix(&weights).unwrap();
        assert_eq!(inst.nb_vertices(), 3);
        assert_eq!(inst.nb_edges(), 2);
        assert!(inst.are_adjacent(1,2));
        assert!(!inst.are_adjacent(0,2));
    }

    #[test]
    fn test_empty_graph_rejected() {
        assert_eq!(ConflictGraph::from_adj_list(vec![]).unwrap_err(), InputError::EmptyGraph);
        assert_eq!(ConflictGraph::from_matrix(&[]).unwrap_err(), InputError::EmptyGraph);
    }

    #[test]
    fn test_self_loop_rejected() {
        assert_eq!(
            ConflictGraph::from_matrix(&[vec![1]]).unwrap_err(),
            InputError::SelfLoop { vertex: 0 }
        );
        assert_eq!(
            ConflictGraph::from_adj_list(vec![vec![0]]).unwrap_err(),
            InputError::SelfLoop { vertex: 0 }
        );
    }

    #[test]
    fn test_asymmetric_rejected() {
        let weights = vec![
            vec![0, 1],
            vec![0, 0],
        ];
        assert_eq!(
            ConflictGraph::from_matrix(&weights).unwrap_err(),
            InputError::Asymmetric { u: 0, v: 1 }
        );
        assert_eq!(
            ConflictGraph::from_adj_list(vec![vec![1], vec![]]).unwrap_err(),
            InputError::Asymmetric { u: 0, v: 1 }
        );
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let weights = vec![
            vec![0, 1],
            vec![1],
        ];
        assert_eq!(
            ConflictGraph::from_matrix(&weights).unwrap_err(),
            InputError::NotSquare { row: 1 }
        );
    }

    #[test]
    fn test_duplicate_adjacency_tolerated() {
        let inst = ConflictGraph::from_adj_list(vec![vec![1,1], vec![0]]).unwrap();
        assert_eq!(inst.nb_edges(), 1);
    }

    #[test]
    fn test_conflict_count() {
        let inst = triangle();
        assert_eq!(inst.conflict_count(&vec![0,0,0]), 3);
        assert_eq!(inst.conflict_count(&vec![0,0,1]), 1);
        assert_eq!(inst.conflict_count(&vec![0,1,2]), 0);
    }

    #[test]
    fn test_checker() {
        let inst = triangle();
        assert_eq!(checker(&inst, 3, &vec![0,1,2]), CheckerResult::Ok(3));
        assert_eq!(checker(&inst, 3, &vec![0,1,1]), CheckerResult::Conflict { u: 1, v: 2 });
        assert_eq!(
            checker(&inst, 2, &vec![0,1,2]),
            CheckerResult::ColorOutOfRange { vertex: 2, color: 2 }
        );
        assert_eq!(
            checker(&inst, 3, &vec![0,1]),
            CheckerResult::WrongLength { expected: 3, found: 2 }
        );
    }

    #[test]
    fn test_coloring_to_string() {
        let inst = triangle();
        let s = inst.coloring_to_string(3, &vec![0,1,2]);
        assert_eq!(s, "0 \n1 \n2 \n");
    }
}
