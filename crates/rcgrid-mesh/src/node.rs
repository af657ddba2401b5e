//! Node classification and stencil neighbourhoods.
//!
//! Classification is a pure function of `(row, col, rows, cols)`. The test
//! order is fixed: corners first, then the left column, the right column,
//! the top row, and the bottom row. On degenerate meshes (a single row or
//! column) the first matching class wins.

use smallvec::SmallVec;

/// Which boundary a non-corner edge node lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    /// Column `0`.
    Left,
    /// Column `cols - 1`.
    Right,
    /// Row `0`.
    Top,
    /// Row `rows - 1`.
    Bottom,
}

/// Structural role of a mesh node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeClass {
    /// One of the four corners; clamped to the boundary source.
    Corner,
    /// On the boundary but not a corner; three-neighbour stencil.
    Edge(EdgeSide),
    /// Everything else; four-neighbour stencil.
    Interior,
}

/// Classify node `(row, col)` of a `rows × cols` mesh.
///
/// The caller must pass an in-range node on a non-empty mesh.
pub fn classify(row: usize, col: usize, rows: usize, cols: usize) -> NodeClass {
    debug_assert!(row < rows && col < cols, "node ({row}, {col}) outside {rows}x{cols}");
    let last_row = rows - 1;
    let last_col = cols - 1;
    if (row == 0 || row == last_row) && (col == 0 || col == last_col) {
        NodeClass::Corner
    } else if col == 0 {
        NodeClass::Edge(EdgeSide::Left)
    } else if col == last_col {
        NodeClass::Edge(EdgeSide::Right)
    } else if row == 0 {
        NodeClass::Edge(EdgeSide::Top)
    } else if row == last_row {
        NodeClass::Edge(EdgeSide::Bottom)
    } else {
        NodeClass::Interior
    }
}

impl NodeClass {
    /// Stencil neighbours of `(row, col)` for this class, in summation order.
    ///
    /// Corners have none. Neighbours that would fall outside the mesh
    /// (only possible on single-row or single-column meshes) are dropped.
    pub fn neighbours(
        self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> SmallVec<[(usize, usize); 4]> {
        let up = row.checked_sub(1).map(|r| (r, col));
        let down = (row + 1 < rows).then_some((row + 1, col));
        let left = col.checked_sub(1).map(|c| (row, c));
        let right = (col + 1 < cols).then_some((row, col + 1));

        let ordered: [Option<(usize, usize)>; 4] = match self {
            Self::Corner => [None; 4],
            Self::Edge(EdgeSide::Left) => [up, right, down, None],
            Self::Edge(EdgeSide::Right) => [left, up, down, None],
            Self::Edge(EdgeSide::Top) => [left, right, down, None],
            Self::Edge(EdgeSide::Bottom) => [left, up, right, None],
            Self::Interior => [left, up, right, down],
        };
        ordered.into_iter().flatten().collect()
    }

    /// Whether this node is clamped to the boundary source.
    pub fn is_corner(self) -> bool {
        matches!(self, Self::Corner)
    }
}
