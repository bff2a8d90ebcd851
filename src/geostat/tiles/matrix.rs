//! Tiled matrices.
//!
//! Purpose
//! -------
//! Represent a logical `rows × cols` matrix as independently stored tiles so
//! that the covariance builder, the Cholesky factorization and the triangular
//! solves can run one task per tile on a [`TaskRuntime`].
//!
//! Key behaviors
//! -------------
//! - Only tiles in the visit set of the matrix's [`MatrixPart`] are
//!   allocated; a symmetric matrix stores its lower triangle of tiles.
//! - [`TiledMatrix::par_update_tiles`] runs a closure on every stored tile
//!   matching a predicate, in parallel, each task holding the only `&mut` to
//!   its tile. The first error stops the remaining tasks.
//! - [`TiledMatrix::to_dense`] materializes the logical matrix, mirroring the
//!   stored triangle for symmetric parts.
//!
//! Invariants & assumptions
//! ------------------------
//! - Tile `(m, n)` has shape [`TileLayout::tile_shape`]`(m, n)`.
//! - For `MatrixPart::Lower`, diagonal tiles are full square blocks; only
//!   their lower triangle is meaningful after a factorization.
use crate::geostat::{
    errors::{GeoStatError, GeoStatResult},
    tiles::{
        layout::{MatrixPart, TileLayout},
        runtime::TaskRuntime,
        storage::{SpillDir, StorageMode, TileSlot},
    },
};
use ndarray::{Array2, s};
use rayon::prelude::*;
use std::borrow::Cow;

/// Matrix stored as tiles.
#[derive(Debug)]
pub struct TiledMatrix {
    layout: TileLayout,
    part: MatrixPart,
    slots: Vec<TileSlot>,
    coords: Vec<(usize, usize)>,
    index: Vec<Option<usize>>,
    spill: Option<SpillDir>,
}

impl TiledMatrix {
    /// Zero-initialized matrix holding the visit set of `part`.
    ///
    /// Errors
    /// ------
    /// - `InvalidLayout` for a triangular part on a non-square layout.
    /// - `StorageIo` when out-of-core tiles cannot be created.
    pub fn new(layout: TileLayout, part: MatrixPart, storage: &StorageMode) -> GeoStatResult<Self> {
        let coords = layout.visit(part)?;
        let spill = match storage {
            StorageMode::InMemory => None,
            StorageMode::OutOfCore { dir } => Some(SpillDir::create(dir)?),
        };
        let mut index = vec![None; layout.mt() * layout.nt()];
        let mut slots = Vec::with_capacity(coords.len());
        for (slot, &(m, n)) in coords.iter().enumerate() {
            let (h, w) = layout.tile_shape(m, n);
            slots.push(TileSlot::zeros(h, w, spill.as_ref(), m, n)?);
            index[m * layout.nt() + n] = Some(slot);
        }
        Ok(TiledMatrix { layout, part, slots, coords, index, spill })
    }

    /// Tile a dense matrix. For triangular parts only the stored triangle of
    /// tiles is copied.
    pub fn from_dense(
        dense: &Array2<f64>, tile_size: usize, part: MatrixPart, storage: &StorageMode,
    ) -> GeoStatResult<Self> {
        let (rows, cols) = dense.dim();
        let layout = TileLayout::new(rows, cols, tile_size)?;
        let mut out = TiledMatrix::new(layout, part, storage)?;
        for slot in 0..out.slots.len() {
            let (m, n) = out.coords[slot];
            let (r0, c0) = (layout.row_offset(m), layout.col_offset(n));
            let (h, w) = layout.tile_shape(m, n);
            let block = dense.slice(s![r0..r0 + h, c0..c0 + w]);
            out.slots[slot].update(|t| {
                t.assign(&block);
                Ok(())
            })?;
        }
        Ok(out)
    }

    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    pub fn part(&self) -> MatrixPart {
        self.part
    }

    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    pub fn is_out_of_core(&self) -> bool {
        self.spill.is_some()
    }

    /// Stored tile coordinates, row-major.
    pub fn tile_coords(&self) -> &[(usize, usize)] {
        &self.coords
    }

    fn slot_of(&self, m: usize, n: usize) -> GeoStatResult<usize> {
        if m >= self.layout.mt() || n >= self.layout.nt() {
            return Err(self.missing_tile());
        }
        self.index[m * self.layout.nt() + n].ok_or_else(|| self.missing_tile())
    }

    fn missing_tile(&self) -> GeoStatError {
        GeoStatError::InvalidLayout {
            rows: self.rows(),
            cols: self.cols(),
            reason: "tile is not stored by this matrix",
        }
    }

    /// Read tile `(m, n)`.
    pub fn tile(&self, m: usize, n: usize) -> GeoStatResult<Cow<'_, Array2<f64>>> {
        self.slots[self.slot_of(m, n)?].read()
    }

    /// Update tile `(m, n)` in place.
    pub fn update_tile<F>(&mut self, m: usize, n: usize, f: F) -> GeoStatResult<()>
    where
        F: FnOnce(&mut Array2<f64>) -> GeoStatResult<()>,
    {
        let slot = self.slot_of(m, n)?;
        self.slots[slot].update(f)
    }

    /// Run `f(m, n, tile)` on every stored tile with `select(m, n)`, in
    /// parallel on `rt`. Stops at the first error.
    pub fn par_update_tiles<P, F>(&mut self, rt: &TaskRuntime, select: P, f: F) -> GeoStatResult<()>
    where
        P: Fn(usize, usize) -> bool + Sync,
        F: Fn(usize, usize, &mut Array2<f64>) -> GeoStatResult<()> + Sync,
    {
        let slots = &mut self.slots;
        let coords = &self.coords;
        rt.install(|| {
            slots
                .par_iter_mut()
                .zip(coords.par_iter())
                .filter(|item| select(item.1.0, item.1.1))
                .try_for_each(|(slot, &(m, n))| slot.update(|t| f(m, n, t)))
        })
    }

    /// Logical entry `(i, j)`; symmetric parts answer from the mirrored tile.
    pub fn get(&self, i: usize, j: usize) -> GeoStatResult<f64> {
        let ts = self.layout.tile_size();
        let (i, j) = match self.part {
            MatrixPart::Lower if i < j => (j, i),
            MatrixPart::Upper if i > j => (j, i),
            _ => (i, j),
        };
        let tile = self.tile(i / ts, j / ts)?;
        Ok(tile[[i % ts, j % ts]])
    }

    /// Logical diagonal (square layouts).
    pub fn diagonal(&self) -> GeoStatResult<Vec<f64>> {
        let mut diag = Vec::with_capacity(self.rows());
        for k in 0..self.layout.mt().min(self.layout.nt()) {
            let tile = self.tile(k, k)?;
            let (h, w) = tile.dim();
            diag.extend((0..h.min(w)).map(|d| tile[[d, d]]));
        }
        Ok(diag)
    }

    /// Dense copy of the logical matrix.
    ///
    /// `Lower`/`Upper` parts are mirrored into a full symmetric matrix, with
    /// the stored triangle of each diagonal tile taking precedence.
    pub fn to_dense(&self) -> GeoStatResult<Array2<f64>> {
        let mut dense = Array2::zeros((self.rows(), self.cols()));
        for (slot, &(m, n)) in self.coords.iter().enumerate() {
            let tile = self.slots[slot].read()?;
            let (r0, c0) = (self.layout.row_offset(m), self.layout.col_offset(n));
            let (h, w) = tile.dim();
            for a in 0..h {
                for b in 0..w {
                    let (i, j) = (r0 + a, c0 + b);
                    let stored = match self.part {
                        MatrixPart::Lower => i >= j,
                        MatrixPart::Upper => i <= j,
                        MatrixPart::Full => true,
                    };
                    if !stored {
                        continue;
                    }
                    dense[[i, j]] = tile[[a, b]];
                    if self.part.is_triangular() {
                        dense[[j, i]] = tile[[a, b]];
                    }
                }
            }
        }
        Ok(dense)
    }

    /// Dense lower-triangular factor (entries above the diagonal zeroed).
    pub fn to_dense_lower(&self) -> GeoStatResult<Array2<f64>> {
        let mut dense = self.to_dense()?;
        for i in 0..dense.nrows() {
            for j in (i + 1)..dense.ncols() {
                dense[[i, j]] = 0.0;
            }
        }
        Ok(dense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sym5() -> Array2<f64> {
        Array2::from_shape_fn((5, 5), |(i, j)| 1.0 + (i + j) as f64 + (i * j) as f64 * 0.1)
    }

    #[test]
    // Purpose
    // -------
    // Tiling then densifying a symmetric matrix round-trips, for in-memory
    // and out-of-core storage alike.
    fn dense_round_trip_for_both_storage_modes() {
        let a = sym5();
        let mem = TiledMatrix::from_dense(&a, 2, MatrixPart::Lower, &StorageMode::InMemory)
            .expect("in-memory");
        let ooc = TiledMatrix::from_dense(&a, 2, MatrixPart::Lower, &StorageMode::OutOfCore {
            dir: std::env::temp_dir(),
        })
        .expect("out-of-core");
        assert!(ooc.is_out_of_core());
        assert_eq!(mem.to_dense().expect("dense"), a);
        assert_eq!(ooc.to_dense().expect("dense"), a);
        assert_eq!(mem.get(0, 4).expect("mirror"), a[[0, 4]]);
        assert_eq!(mem.diagonal().expect("diag"), (0..5).map(|i| a[[i, i]]).collect::<Vec<_>>());
    }

    #[test]
    // Purpose
    // -------
    // Parallel updates touch exactly the selected tiles and errors surface.
    fn par_update_respects_selection_and_errors() {
        let rt = TaskRuntime::new(2).expect("runtime");
        let layout = TileLayout::new(4, 4, 2).expect("layout");
        let mut m = TiledMatrix::new(layout, MatrixPart::Full, &StorageMode::InMemory).expect("m");
        m.par_update_tiles(&rt, |i, j| i == j, |i, _, t| {
            t.fill(i as f64 + 1.0);
            Ok(())
        })
        .expect("update");
        assert_eq!(
            m.to_dense().expect("dense"),
            array![
                [1.0, 1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 2.0, 2.0],
                [0.0, 0.0, 2.0, 2.0]
            ]
        );
        let err = m.par_update_tiles(&rt, |_, _| true, |_, _, _| Err(GeoStatError::UnknownError));
        assert_eq!(err, Err(GeoStatError::UnknownError));
    }

    #[test]
    fn missing_tiles_are_reported() {
        let layout = TileLayout::new(4, 4, 2).expect("layout");
        let m = TiledMatrix::new(layout, MatrixPart::Lower, &StorageMode::InMemory).expect("m");
        assert!(matches!(m.tile(0, 1), Err(GeoStatError::InvalidLayout { .. })));
        assert!(m.tile(1, 0).is_ok());
    }
}
