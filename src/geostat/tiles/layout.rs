//! Tile layout: how a logical `rows × cols` matrix is cut into square tiles
//! and which tiles a symmetric or general matrix must hold.
use crate::geostat::errors::{GeoStatError, GeoStatResult};
use serde::{Deserialize, Serialize};

/// Which tiles a matrix stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixPart {
    /// Tiles `(m, n)` with `m >= n` (symmetric, lower triangle stored).
    Lower,
    /// Tiles `(m, n)` with `m <= n`.
    Upper,
    /// Every tile.
    Full,
}

impl MatrixPart {
    pub fn contains(&self, m: usize, n: usize) -> bool {
        match self {
            MatrixPart::Lower => m >= n,
            MatrixPart::Upper => m <= n,
            MatrixPart::Full => true,
        }
    }

    pub fn is_triangular(&self) -> bool {
        !matches!(self, MatrixPart::Full)
    }
}

/// Tile geometry of a logical matrix.
///
/// Invariants
/// ----------
/// - `rows, cols, tile_size > 0`.
/// - `mt = ⌈rows / tile_size⌉`, `nt = ⌈cols / tile_size⌉`; only the last
///   tile row/column may be smaller than `tile_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayout {
    rows: usize,
    cols: usize,
    tile_size: usize,
    mt: usize,
    nt: usize,
}

impl TileLayout {
    /// Errors
    /// ------
    /// - `InvalidTileSize` when `tile_size == 0`.
    /// - `InvalidLayout` when `rows == 0` or `cols == 0`.
    pub fn new(rows: usize, cols: usize, tile_size: usize) -> GeoStatResult<Self> {
        if tile_size == 0 {
            return Err(GeoStatError::InvalidTileSize { tile_size });
        }
        if rows == 0 || cols == 0 {
            return Err(GeoStatError::InvalidLayout { rows, cols, reason: "empty matrix" });
        }
        Ok(TileLayout {
            rows,
            cols,
            tile_size,
            mt: rows.div_ceil(tile_size),
            nt: cols.div_ceil(tile_size),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of tile rows.
    pub fn mt(&self) -> usize {
        self.mt
    }

    /// Number of tile columns.
    pub fn nt(&self) -> usize {
        self.nt
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// First logical row covered by tile row `m`.
    pub fn row_offset(&self, m: usize) -> usize {
        m * self.tile_size
    }

    /// First logical column covered by tile column `n`.
    pub fn col_offset(&self, n: usize) -> usize {
        n * self.tile_size
    }

    /// `(height, width)` of tile `(m, n)`.
    pub fn tile_shape(&self, m: usize, n: usize) -> (usize, usize) {
        let h = (self.rows - self.row_offset(m)).min(self.tile_size);
        let w = (self.cols - self.col_offset(n)).min(self.tile_size);
        (h, w)
    }

    /// Tile coordinates in the visit set of `part`, row-major.
    ///
    /// Errors
    /// ------
    /// - `InvalidLayout` when a triangular part is requested on a
    ///   non-square layout.
    pub fn visit(&self, part: MatrixPart) -> GeoStatResult<Vec<(usize, usize)>> {
        if part.is_triangular() && !self.is_square() {
            return Err(GeoStatError::InvalidLayout {
                rows: self.rows,
                cols: self.cols,
                reason: "triangular storage needs a square matrix",
            });
        }
        Ok((0..self.mt)
            .flat_map(|m| (0..self.nt).map(move |n| (m, n)))
            .filter(|&(m, n)| part.contains(m, n))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Ragged last tile and the three visit sets on a 5×5 / tile 2 layout.
    fn visit_sets_and_ragged_tiles() {
        let layout = TileLayout::new(5, 5, 2).expect("layout");
        assert_eq!((layout.mt(), layout.nt()), (3, 3));
        assert_eq!(layout.tile_shape(2, 2), (1, 1));
        assert_eq!(layout.tile_shape(0, 2), (2, 1));

        let lower = layout.visit(MatrixPart::Lower).expect("lower");
        assert_eq!(lower, vec![(0, 0), (1, 0), (1, 1), (2, 0), (2, 1), (2, 2)]);
        let upper = layout.visit(MatrixPart::Upper).expect("upper");
        assert_eq!(upper.len(), 6);
        assert!(upper.iter().all(|&(m, n)| m <= n));
        assert_eq!(layout.visit(MatrixPart::Full).expect("full").len(), 9);
    }

    #[test]
    fn invalid_layouts_are_rejected() {
        assert_eq!(TileLayout::new(4, 4, 0), Err(GeoStatError::InvalidTileSize { tile_size: 0 }));
        assert!(matches!(TileLayout::new(0, 4, 2), Err(GeoStatError::InvalidLayout { .. })));
        let rect = TileLayout::new(4, 6, 2).expect("rect");
        assert!(matches!(rect.visit(MatrixPart::Lower), Err(GeoStatError::InvalidLayout { .. })));
        assert!(rect.visit(MatrixPart::Full).is_ok());
    }
}
