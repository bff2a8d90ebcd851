//! Tile storage: resident `Array2` tiles or one file per tile.
//!
//! Purpose
//! -------
//! Give every tile its own allocation (or file) so that parallel tasks
//! writing distinct tiles never alias and need no locks. Out-of-core mode
//! trades memory for disk traffic; it never changes stored values.
//!
//! Conventions
//! -----------
//! - Tile files hold the tile's `f64` entries in row-major order as
//!   little-endian bytes, with no header. Shapes live in memory.
//! - Each out-of-core matrix owns a fresh subdirectory of the configured
//!   directory; the subdirectory is removed when the owning [`SpillDir`] is
//!   dropped.
use crate::geostat::errors::{GeoStatError, GeoStatResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

static SPILL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Where tiles live.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StorageMode {
    #[default]
    InMemory,
    /// One file per tile under a private subdirectory of `dir`.
    OutOfCore { dir: PathBuf },
}

/// Private directory for one matrix's tile files.
#[derive(Debug)]
pub struct SpillDir {
    path: PathBuf,
}

impl SpillDir {
    pub fn create(parent: &Path) -> GeoStatResult<Self> {
        let id = SPILL_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = parent.join(format!("geostat-tiles-{}-{id}", std::process::id()));
        fs::create_dir_all(&path).map_err(|e| io_error(&path, e))?;
        Ok(SpillDir { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SpillDir {
    fn drop(&mut self) {
        // Best effort; a failed cleanup must not turn into a panic.
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// One stored tile.
#[derive(Debug)]
pub enum TileSlot {
    Resident(Array2<f64>),
    Spilled { path: PathBuf, rows: usize, cols: usize },
}

impl TileSlot {
    /// Zero tile of the given shape, written to `path` when spilled.
    pub fn zeros(
        rows: usize, cols: usize, spill: Option<&SpillDir>, m: usize, n: usize,
    ) -> GeoStatResult<Self> {
        let tile = Array2::zeros((rows, cols));
        match spill {
            None => Ok(TileSlot::Resident(tile)),
            Some(dir) => {
                let path = dir.path().join(format!("tile-{m}-{n}.bin"));
                write_tile(&path, &tile)?;
                Ok(TileSlot::Spilled { path, rows, cols })
            }
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            TileSlot::Resident(t) => t.dim(),
            TileSlot::Spilled { rows, cols, .. } => (*rows, *cols),
        }
    }

    /// Borrow (resident) or load (spilled) the tile.
    pub fn read(&self) -> GeoStatResult<Cow<'_, Array2<f64>>> {
        match self {
            TileSlot::Resident(t) => Ok(Cow::Borrowed(t)),
            TileSlot::Spilled { path, rows, cols } => {
                Ok(Cow::Owned(read_tile(path, *rows, *cols)?))
            }
        }
    }

    /// Apply `f` to the tile in place; spilled tiles are loaded, updated and
    /// written back.
    pub fn update<F>(&mut self, f: F) -> GeoStatResult<()>
    where
        F: FnOnce(&mut Array2<f64>) -> GeoStatResult<()>,
    {
        match self {
            TileSlot::Resident(t) => f(t),
            TileSlot::Spilled { path, rows, cols } => {
                let mut tile = read_tile(path, *rows, *cols)?;
                f(&mut tile)?;
                write_tile(path, &tile)
            }
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> GeoStatError {
    GeoStatError::StorageIo { path: path.display().to_string(), reason: err.to_string() }
}

fn write_tile(path: &Path, tile: &Array2<f64>) -> GeoStatResult<()> {
    let mut bytes = Vec::with_capacity(tile.len() * 8);
    for v in tile.iter() {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    fs::write(path, bytes).map_err(|e| io_error(path, e))
}

fn read_tile(path: &Path, rows: usize, cols: usize) -> GeoStatResult<Array2<f64>> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    if bytes.len() != rows * cols * 8 {
        return Err(GeoStatError::StorageIo {
            path: path.display().to_string(),
            reason: format!("expected {} bytes, found {}", rows * cols * 8, bytes.len()),
        });
    }
    let values: Vec<f64> = bytes
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();
    Array2::from_shape_vec((rows, cols), values).map_err(|e| GeoStatError::StorageIo {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // A spilled tile survives an update round trip bit-for-bit and its
    // directory disappears with the owner.
    fn spilled_tile_update_and_cleanup() {
        let dir = SpillDir::create(&std::env::temp_dir()).expect("spill dir");
        let root = dir.path().to_path_buf();
        let mut slot = TileSlot::zeros(2, 2, Some(&dir), 0, 0).expect("slot");
        slot.update(|t| {
            t.assign(&array![[1.5, -0.25], [1e-300, 3.0]]);
            Ok(())
        })
        .expect("update");
        let back = slot.read().expect("read").into_owned();
        assert_eq!(back, array![[1.5, -0.25], [1e-300, 3.0]]);
        assert!(root.exists());
        drop(slot);
        drop(dir);
        assert!(!root.exists());
    }

    #[test]
    fn update_errors_propagate() {
        let mut slot = TileSlot::zeros(1, 1, None, 0, 0).expect("slot");
        let err = slot.update(|_| Err(GeoStatError::SingularMatrix { row: 0, pivot: -1.0 }));
        assert!(matches!(err, Err(GeoStatError::SingularMatrix { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A tile file that vanished from disk is reported with its own path.
    //
    // Given
    // -----
    // - A spilled 2×2 tile whose backing file is deleted behind its back.
    //
    // Expect
    // ------
    // - `StorageIo` whose `path` is the tile file.
    fn missing_tile_file_names_its_path() {
        let dir = SpillDir::create(&std::env::temp_dir()).expect("spill dir");
        let slot = TileSlot::zeros(2, 2, Some(&dir), 1, 0).expect("slot");
        let TileSlot::Spilled { path, .. } = &slot else { panic!("tile should be spilled") };
        fs::remove_file(path).expect("remove tile file");
        match slot.read() {
            Err(GeoStatError::StorageIo { path: reported, .. }) => {
                assert_eq!(reported, path.display().to_string());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
