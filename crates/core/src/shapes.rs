//! Shapes module - tetromino layouts, rotation and the kick list
//!
//! Each shape is four cells plus a rotation pivot. Pivots can sit on a cell
//! centre (T, S, Z, J, L) or on a cell corner (I, O), so they are stored in
//! doubled coordinates: a pivot at (1.5, 1.5) is `(3, 3)`. Rotating a cell
//! about a pivot in doubled space always lands back on whole cells.
//!
//! Rotation is a 90° counter-clockwise turn on screen. When the turned cells
//! collide, [`ROTATION_KICKS`] is tried in order and the first free
//! displacement wins. The order is a priority list, not a nearest-first search.

use crate::types::{CellPos, PieceKind, SPAWN_POSITION};

/// Four cell offsets from the shape origin
pub type PieceShape = [CellPos; 4];

/// Corrective displacements tried after a rotation, in priority order:
/// identity, up 1, up 2, right 1, left 1, right 2, left 2, right 3, left 3.
pub const ROTATION_KICKS: [(i8, i8); 9] = [
    (0, 0),
    (0, -1),
    (0, -2),
    (1, 0),
    (-1, 0),
    (2, 0),
    (-2, 0),
    (3, 0),
    (-3, 0),
];

/// Spawn-orientation cell offsets for a shape
pub fn get_shape(kind: PieceKind) -> PieceShape {
    match kind {
        PieceKind::I => [(0, 1), (1, 1), (2, 1), (3, 1)],
        PieceKind::O => [(1, 0), (2, 0), (1, 1), (2, 1)],
        PieceKind::T => [(1, 0), (0, 1), (1, 1), (2, 1)],
        PieceKind::S => [(1, 0), (2, 0), (0, 1), (1, 1)],
        PieceKind::Z => [(0, 0), (1, 0), (1, 1), (2, 1)],
        PieceKind::J => [(0, 0), (0, 1), (1, 1), (2, 1)],
        PieceKind::L => [(2, 0), (0, 1), (1, 1), (2, 1)],
    }
}

/// Rotation pivot relative to the shape origin, in doubled coordinates
pub fn get_pivot(kind: PieceKind) -> (i16, i16) {
    match kind {
        PieceKind::I => (3, 3),
        PieceKind::O => (3, 1),
        _ => (2, 2),
    }
}

/// Absolute cells and doubled pivot of a freshly spawned shape
pub fn spawn_layout(kind: PieceKind) -> (PieceShape, (i16, i16)) {
    let (ox, oy) = SPAWN_POSITION;
    let mut cells = get_shape(kind);
    for cell in &mut cells {
        cell.0 += ox;
        cell.1 += oy;
    }
    let (px, py) = get_pivot(kind);
    (cells, (px + 2 * ox as i16, py + 2 * oy as i16))
}

/// Turn `cells` 90° counter-clockwise on screen about a doubled pivot.
pub fn rotate_ccw(cells: &PieceShape, pivot: (i16, i16)) -> PieceShape {
    let mut out = *cells;
    for cell in &mut out {
        let dx = 2 * cell.0 as i16 - pivot.0;
        let dy = 2 * cell.1 as i16 - pivot.1;
        // y grows downwards: (dx, dy) -> (dy, -dx)
        cell.0 = ((pivot.0 + dy) / 2) as i8;
        cell.1 = ((pivot.1 - dx) / 2) as i8;
    }
    out
}

/// Shift cells by a displacement
pub fn translate(cells: &PieceShape, (dx, dy): (i8, i8)) -> PieceShape {
    let mut out = *cells;
    for cell in &mut out {
        cell.0 += dx;
        cell.1 += dy;
    }
    out
}

/// Try to rotate with the kick list.
///
/// Returns the rotated cells and the kick that made them fit, or `None` when
/// every candidate collides.
pub fn try_rotate(
    cells: &PieceShape,
    pivot: (i16, i16),
    is_free: impl Fn(CellPos) -> bool,
) -> Option<(PieceShape, (i8, i8))> {
    let turned = rotate_ccw(cells, pivot);
    ROTATION_KICKS.iter().find_map(|&kick| {
        let candidate = translate(&turned, kick);
        candidate
            .iter()
            .all(|&pos| is_free(pos))
            .then_some((candidate, kick))
    })
}
