//! Documentation Sink - gnuplot friendly run logs
//!
//! Four parallel, whitespace-delimited streams, one row per step:
//!
//! | File | Row |
//! |------|-----|
//! | `<base>_output.dat` | `step activity delta` |
//! | `<base>_weights.dat` | `step w(0,0) w(0,1) ... w(n-1,m-1)` |
//! | `<base>_filter.dat` | `step u(0,0) ...` |
//! | `<base>_filters_weighted.dat` | `step u(0,0)*w(0,0) ...` |
//!
//! Cells are row-major (channel outer, slot inner). Every stream is flushed
//! after each row. Handles close when the sink is dropped.

use crate::bank::Grid;
use crate::error::{IsoError, Result};
use crate::filter::{FilterModel, TimeFilter};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Paths derived from a base name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocuPaths {
    pub output: PathBuf,
    pub weights: PathBuf,
    pub filter: PathBuf,
    pub filters_weighted: PathBuf,
}

impl DocuPaths {
    /// Derive the four log paths from `base`
    pub fn from_base(base: impl AsRef<Path>) -> Self {
        let with_suffix = |suffix: &str| {
            let mut name = OsString::from(base.as_ref().as_os_str());
            name.push(suffix);
            PathBuf::from(name)
        };
        Self {
            output: with_suffix("_output.dat"),
            weights: with_suffix("_weights.dat"),
            filter: with_suffix("_filter.dat"),
            filters_weighted: with_suffix("_filters_weighted.dat"),
        }
    }
}

/// Open log streams for one engine
#[derive(Debug)]
pub struct DocuSink {
    paths: DocuPaths,
    output: BufWriter<File>,
    weights: BufWriter<File>,
    filter: BufWriter<File>,
    filters_weighted: BufWriter<File>,
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    log::info!("Opening {} for docu", path.display());
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| IsoError::DocuOpen {
            path: path.to_path_buf(),
            source,
        })
}

impl DocuSink {
    /// Create (truncate) all four files. Fails on the first path that
    /// cannot be opened; files opened before it are closed again.
    pub fn open(base: impl AsRef<Path>) -> Result<Self> {
        let paths = DocuPaths::from_base(base);
        let weights = create(&paths.weights)?;
        let filter = create(&paths.filter)?;
        let filters_weighted = create(&paths.filters_weighted)?;
        let output = create(&paths.output)?;
        Ok(Self {
            paths,
            output,
            weights,
            filter,
            filters_weighted,
        })
    }

    /// Paths in use
    pub fn paths(&self) -> &DocuPaths {
        &self.paths
    }

    /// Append one row to every stream and flush
    pub fn write_row(
        &mut self,
        step: u64,
        activity: f64,
        delta: f64,
        weights: &Grid<f64>,
        filters: &Grid<FilterModel>,
    ) -> Result<()> {
        writeln!(self.output, "{} {:.6} {:.6}", step, activity, delta)?;
        self.output.flush()?;

        write!(self.weights, "{}", step)?;
        for w in weights.as_slice() {
            write!(self.weights, " {:.6}", w)?;
        }
        writeln!(self.weights)?;
        self.weights.flush()?;

        write!(self.filter, "{}", step)?;
        for f in filters.as_slice() {
            write!(self.filter, " {:.6}", f.output())?;
        }
        writeln!(self.filter)?;
        self.filter.flush()?;

        write!(self.filters_weighted, "{}", step)?;
        for (f, w) in filters.as_slice().iter().zip(weights.as_slice()) {
            write!(self.filters_weighted, " {:.6}", f.output() * w)?;
        }
        writeln!(self.filters_weighted)?;
        self.filters_weighted.flush()?;

        Ok(())
    }
}
