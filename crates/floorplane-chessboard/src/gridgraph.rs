use crate::geom::axis_misalignment;
use crate::params::GridGraphParams;
use floorplane_core::Corner;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Vector2;
use std::collections::{HashMap, VecDeque};

/// Edge direction in the grid frame.
///
/// `Right`/`Left` follow the dominant grid axis `u`, `Down`/`Up` follow `u`
/// rotated a quarter turn toward image +y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NeighborDirection {
    Right,
    Left,
    Up,
    Down,
}

impl NeighborDirection {
    pub fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Grid step `(di, dj)` taken along an edge in this direction.
    pub fn step(self) -> (i32, i32) {
        match self {
            Self::Right => (1, 0),
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Right => 0,
            Self::Left => 1,
            Self::Up => 2,
            Self::Down => 3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NodeNeighbor {
    pub direction: NeighborDirection,
    pub index: usize,
    pub distance: f32,
}

fn direction_in_frame(v: &Vector2<f32>, axis_u: f32) -> NeighborDirection {
    let (sin, cos) = axis_u.sin_cos();
    let along_u = v.x * cos + v.y * sin;
    let along_v = -v.x * sin + v.y * cos;
    if along_u.abs() > along_v.abs() {
        if along_u >= 0.0 {
            NeighborDirection::Right
        } else {
            NeighborDirection::Left
        }
    } else if along_v >= 0.0 {
        NeighborDirection::Down
    } else {
        NeighborDirection::Up
    }
}

fn is_good_neighbor(
    corner: &Corner,
    neighbor: &Corner,
    neighbor_index: usize,
    params: &GridGraphParams,
    axis_u: f32,
) -> Option<NodeNeighbor> {
    let vec_to_neighbor = neighbor.position - corner.position;
    let distance = vec_to_neighbor.norm();
    if distance < params.min_spacing_pix || distance > params.max_spacing_pix {
        return None;
    }

    // A grid edge runs along one of the local axes at both of its ends.
    let edge_angle = vec_to_neighbor.y.atan2(vec_to_neighbor.x);
    let tol = params.orientation_tolerance_deg.to_radians();
    if axis_misalignment(corner, edge_angle) > tol || axis_misalignment(neighbor, edge_angle) > tol {
        return None;
    }

    Some(NodeNeighbor {
        direction: direction_in_frame(&vec_to_neighbor, axis_u),
        index: neighbor_index,
        distance,
    })
}

/// Keep at most one neighbor per direction, the closest one.
fn select_neighbors(candidates: Vec<NodeNeighbor>) -> Vec<NodeNeighbor> {
    let mut best: [Option<NodeNeighbor>; 4] = [None, None, None, None];

    for candidate in candidates {
        let slot = &mut best[candidate.direction.slot()];
        let replace = match slot {
            None => true,
            Some(current) => candidate.distance < current.distance,
        };
        if replace {
            *slot = Some(candidate);
        }
    }

    best.into_iter().flatten().collect()
}

/// 4-connected graph over chessboard corners.
pub struct GridGraph {
    /// For each node, its accepted neighbors. Every edge is present from
    /// both ends with opposite directions.
    pub neighbors: Vec<Vec<NodeNeighbor>>,
}

impl GridGraph {
    /// Link every corner to its closest axis-aligned neighbor in each grid
    /// direction; `axis_u` fixes the frame used to name the directions.
    pub fn new(corners: &[Corner], params: &GridGraphParams, axis_u: f32) -> Self {
        if corners.is_empty() {
            return Self {
                neighbors: Vec::new(),
            };
        }

        let coords = corners
            .iter()
            .map(|c| [c.position.x, c.position.y])
            .collect::<Vec<_>>();
        let tree: KdTree<f32, 2> = (&coords).into();
        let mut one_sided = Vec::with_capacity(corners.len());

        for (i, corner) in corners.iter().enumerate() {
            let query_point = [corner.position.x, corner.position.y];
            let results = tree.nearest_n::<SquaredEuclidean>(&query_point, params.k_neighbors);

            let candidates = results
                .into_iter()
                .filter_map(|nn| {
                    let neighbor_index = nn.item as usize;
                    if neighbor_index == i {
                        return None;
                    }
                    is_good_neighbor(corner, &corners[neighbor_index], neighbor_index, params, axis_u)
                })
                .collect();
            one_sided.push(select_neighbors(candidates));
        }

        let neighbors = one_sided
            .iter()
            .enumerate()
            .map(|(i, list)| {
                list.iter()
                    .filter(|n| {
                        one_sided[n.index]
                            .iter()
                            .any(|back| back.index == i && back.direction == n.direction.opposite())
                    })
                    .cloned()
                    .collect()
            })
            .collect();

        Self { neighbors }
    }
}

pub fn connected_components(graph: &GridGraph) -> Vec<Vec<usize>> {
    let mut visited = vec![false; graph.neighbors.len()];
    let mut components = Vec::new();

    for start in 0..graph.neighbors.len() {
        if visited[start] {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            component.push(node);

            for neighbor in &graph.neighbors[node] {
                if !visited[neighbor.index] {
                    stack.push(neighbor.index);
                }
            }
        }

        components.push(component);
    }

    components
}

/// Integer grid coordinates `(node, i, j)` for every node of `component`,
/// relative to its first node.
///
/// Returns `None` when the edges disagree: a node reached at two different
/// coordinates, or two nodes landing on the same cell.
pub fn assign_grid_coordinates(
    graph: &GridGraph,
    component: &[usize],
) -> Option<Vec<(usize, i32, i32)>> {
    let start = *component.first()?;
    let mut coord_of: HashMap<usize, (i32, i32)> = HashMap::new();
    let mut node_at: HashMap<(i32, i32), usize> = HashMap::new();
    let mut queue = VecDeque::from([(start, 0, 0)]);

    while let Some((node, i, j)) = queue.pop_front() {
        match coord_of.get(&node) {
            Some(&seen) if seen == (i, j) => continue,
            Some(_) => return None,
            None => {}
        }
        if node_at.insert((i, j), node).is_some() {
            return None;
        }
        coord_of.insert(node, (i, j));

        for neighbor in &graph.neighbors[node] {
            let (di, dj) = neighbor.direction.step();
            queue.push_back((neighbor.index, i + di, j + dj));
        }
    }

    let mut coords: Vec<(usize, i32, i32)> = coord_of
        .into_iter()
        .map(|(node, (i, j))| (node, i, j))
        .collect();
    coords.sort_by_key(|&(_, i, j)| (j, i));
    Some(coords)
}
