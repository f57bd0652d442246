//! The observer the completion engine reports to.
//!
//! The engine never writes files or looks at clocks itself. It polls the
//! injected [`Controller`] at round boundaries and hands over a full
//! [`CheckpointView`] whenever the controller declares a backup due. This
//! keeps the engine deterministic and makes checkpointing, logging and quiet
//! runs a property of the caller, not of the algorithm.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::checkpoint;
use crate::error::Result;
use crate::lattice::Lattice;
use crate::options::Options;
use crate::rings::Int;

/// A borrowed snapshot of the full engine state.
pub struct CheckpointView<'a, I: Int> {
    pub current_variable: usize,
    pub sum_norm: &'a I,
    pub first_norm: &'a I,
    pub symmetric: bool,
    pub lattice: &'a Lattice<I>,
}

/// Passive collaborator invoked by the engine at defined points.
pub trait Controller<I: Int> {
    /// Called at the start of every pair round.
    fn on_progress(&mut self, variable: usize, sum_norm: &I, pool: usize) {
        let _ = (variable, sum_norm, pool);
    }

    /// Whether a backup should be written now.
    fn backup_due(&mut self) -> bool {
        false
    }

    /// Receives the full state when a backup is due.
    fn write_backup(&mut self, view: CheckpointView<'_, I>) -> Result<()> {
        let _ = view;
        Ok(())
    }
}

/// Ignores everything. The default for library callers that neither log nor
/// checkpoint.
pub struct NopController;

impl<I: Int> Controller<I> for NopController {}

/// Writes periodic checkpoints to a file and logs progress.
pub struct BackupController {
    path: PathBuf,
    options: Options,
    started: Instant,
    last_backup: Instant,
    /// Seconds already spent before this process, carried over on resume.
    elapsed_offset: u64,
}

impl BackupController {
    pub fn new(path: PathBuf, options: Options) -> Self {
        let now = Instant::now();
        Self { path, options, started: now, last_backup: now, elapsed_offset: 0 }
    }

    /// A controller continuing a resumed run, keeping the elapsed timer of
    /// the interrupted one.
    pub fn resumed(path: PathBuf, options: Options, elapsed_offset: u64) -> Self {
        let mut controller = Self::new(path, options);
        controller.elapsed_offset = elapsed_offset;
        controller
    }

    fn elapsed(&self) -> u64 {
        self.elapsed_offset + self.started.elapsed().as_secs()
    }
}

impl<I: Int> Controller<I> for BackupController {
    fn on_progress(&mut self, variable: usize, sum_norm: &I, pool: usize) {
        log::trace!("variable {variable}, norm {sum_norm}, {pool} vectors");
    }

    fn backup_due(&mut self) -> bool {
        self.options.backup_interval > 0
            && self.last_backup.elapsed() >= Duration::from_secs(self.options.backup_interval)
    }

    fn write_backup(&mut self, view: CheckpointView<'_, I>) -> Result<()> {
        // write to the side and rename, a torn checkpoint is worse than a
        // stale one
        let tmp = self.path.with_extension("tmp");
        let mut file = BufWriter::new(File::create(&tmp)?);
        checkpoint::write_checkpoint(&mut file, &self.options, self.elapsed(), &view)?;
        file.flush()?;
        drop(file);
        std::fs::rename(&tmp, &self.path)?;
        self.last_backup = Instant::now();
        log::info!("checkpoint written to {}", self.path.display());
        Ok(())
    }
}
