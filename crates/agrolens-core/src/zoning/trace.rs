//! Pixel-edge boundary tracing of labeled components into rings.
//!
//! Vertices live on the pixel-corner grid: vertex (row, col) is the
//! north-west corner of pixel (row, col). Every boundary edge is oriented
//! with its component on the left (geographic sense, north up), so exterior
//! rings come out counter-clockwise and holes clockwise.

use std::collections::HashMap;

use ndarray::Array2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vertex {
    pub row: usize,
    pub col: usize,
}

impl Vertex {
    fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Clone, Copy, Debug)]
struct Edge {
    from: Vertex,
    to: Vertex,
}

impl Edge {
    /// Unit step as (drow, dcol).
    fn dir(&self) -> (isize, isize) {
        (
            self.to.row as isize - self.from.row as isize,
            self.to.col as isize - self.from.col as isize,
        )
    }
}

/// Turn preference at a vertex: right, straight, left. At a diagonal pinch
/// the right turn keeps each ring around a single neighbouring region, so
/// rings touch at the pinch but never pass through it twice.
fn preferred_dirs((dr, dc): (isize, isize)) -> [(isize, isize); 3] {
    [(dc, -dr), (dr, dc), (-dc, dr)]
}

/// Collect oriented boundary edges of every labeled component.
fn boundary_edges(labels: &Array2<u32>) -> HashMap<u32, Vec<Edge>> {
    let (h, w) = labels.dim();
    let mut edges: HashMap<u32, Vec<Edge>> = HashMap::new();
    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let list = edges.entry(lbl).or_default();
            if row == 0 || labels[[row - 1, col]] != lbl {
                list.push(Edge {
                    from: Vertex::new(row, col + 1),
                    to: Vertex::new(row, col),
                });
            }
            if row + 1 == h || labels[[row + 1, col]] != lbl {
                list.push(Edge {
                    from: Vertex::new(row + 1, col),
                    to: Vertex::new(row + 1, col + 1),
                });
            }
            if col == 0 || labels[[row, col - 1]] != lbl {
                list.push(Edge {
                    from: Vertex::new(row, col),
                    to: Vertex::new(row + 1, col),
                });
            }
            if col + 1 == w || labels[[row, col + 1]] != lbl {
                list.push(Edge {
                    from: Vertex::new(row + 1, col + 1),
                    to: Vertex::new(row, col + 1),
                });
            }
        }
    }
    edges
}

/// Link one component's edges into closed rings.
fn link_rings(edges: &[Edge]) -> Vec<Vec<Vertex>> {
    let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        outgoing.entry(e.from).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();

    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        let mut ring = Vec::new();
        let mut current = start;
        loop {
            used[current] = true;
            ring.push(edges[current].from);
            let edge = edges[current];
            let Some(candidates) = outgoing.get(&edge.to) else {
                break;
            };
            let next = preferred_dirs(edge.dir()).iter().find_map(|&want| {
                candidates
                    .iter()
                    .copied()
                    .find(|&c| (c == start || !used[c]) && edges[c].dir() == want)
            });
            match next {
                Some(n) if n == start => break,
                Some(n) => current = n,
                None => break,
            }
        }
        rings.push(simplify(ring));
    }
    rings
}

/// Drop vertices lying on a straight run between their neighbours.
fn simplify(ring: Vec<Vertex>) -> Vec<Vertex> {
    let n = ring.len();
    if n < 4 {
        return ring;
    }
    let step = |a: Vertex, b: Vertex| {
        (
            (b.row as isize - a.row as isize).signum(),
            (b.col as isize - a.col as isize).signum(),
        )
    };
    (0..n)
        .filter(|&i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            step(prev, ring[i]) != step(ring[i], next)
        })
        .map(|i| ring[i])
        .collect()
}

/// Trace every labeled component. Returns the rings of each label (label
/// order), each ring open (first vertex not repeated).
pub fn trace_components(labels: &Array2<u32>) -> HashMap<u32, Vec<Vec<Vertex>>> {
    boundary_edges(labels)
        .into_iter()
        .map(|(lbl, edges)| (lbl, link_rings(&edges)))
        .collect()
}
