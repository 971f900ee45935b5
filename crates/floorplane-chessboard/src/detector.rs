use crate::geom::dominant_grid_axis;
use crate::gridgraph::{assign_grid_coordinates, connected_components, GridGraph};
use crate::params::ChessboardParams;
use floorplane_core::{Corner, GridSize};
use log::debug;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Chessboard detector: links corners into a 4-connected grid graph and
/// accepts a connected component that is exactly a `rows x cols` lattice.
pub struct ChessboardDetector {
    pub params: ChessboardParams,
}

impl ChessboardDetector {
    pub fn new(params: ChessboardParams) -> Self {
        Self { params }
    }

    /// Find a complete `size` board in a cloud of corners.
    ///
    /// The returned positions are in the detector's own scan order: runs of
    /// `size.cols()` points along the dominant grid axis, one run after the
    /// other. Which image direction that is depends on how the board lies,
    /// so callers recover the physical layout with [`crate::organize_grid`].
    /// Returns `None` unless every inner corner of the board was linked.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, corners),
            fields(corners = corners.len(), rows = size.rows(), cols = size.cols())
        )
    )]
    pub fn detect_from_corners(&self, corners: &[Corner], size: GridSize) -> Option<Vec<Point2<f32>>> {
        let strong: Vec<Corner> = corners
            .iter()
            .copied()
            .filter(|c| c.strength >= self.params.min_strength)
            .collect();

        debug!(
            "{} corners after strength filter, board needs {}",
            strong.len(),
            size.len()
        );
        if strong.len() < size.len() {
            return None;
        }

        let Some(axis_u) = dominant_grid_axis(&strong) else {
            debug!("no dominant grid direction among corners");
            return None;
        };

        let graph = GridGraph::new(&strong, &self.params.graph, axis_u);
        let components = connected_components(&graph);
        debug!(
            "grid axis {:.1} deg, {} components, largest {}",
            axis_u.to_degrees(),
            components.len(),
            components.iter().map(Vec::len).max().unwrap_or(0)
        );

        let order = components
            .iter()
            .filter(|component| component.len() == size.len())
            .find_map(|component| complete_board(&graph, component, size))?;
        Some(order.into_iter().map(|k| strong[k].position).collect())
    }
}

/// Node indices of `component` in scan order, if it is a full `size` board.
fn complete_board(graph: &GridGraph, component: &[usize], size: GridSize) -> Option<Vec<usize>> {
    let coords = assign_grid_coordinates(graph, component)?;
    let min_i = coords.iter().map(|&(_, i, _)| i).min()?;
    let max_i = coords.iter().map(|&(_, i, _)| i).max()?;
    let min_j = coords.iter().map(|&(_, _, j)| j).min()?;
    let max_j = coords.iter().map(|&(_, _, j)| j).max()?;
    let span_i = (max_i - min_i + 1) as usize;
    let span_j = (max_j - min_j + 1) as usize;

    // Runs of `cols` points go along whichever grid axis has that many.
    let runs_along_i = if (span_i, span_j) == (size.cols(), size.rows()) {
        true
    } else if (span_i, span_j) == (size.rows(), size.cols()) {
        false
    } else {
        return None;
    };

    let mut slots = vec![None; span_i * span_j];
    for (node, i, j) in coords {
        let i = (i - min_i) as usize;
        let j = (j - min_j) as usize;
        let k = if runs_along_i { j * span_i + i } else { i * span_j + j };
        slots[k] = Some(node);
    }
    slots.into_iter().collect()
}
