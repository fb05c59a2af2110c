//! Tensorboard logger
use super::StatsLogger;
use std::fmt;
use std::path::{Path, PathBuf};
use tensorboard_rs::summary_writer::SummaryWriter;

/// Logger that saves scalar series to a tensorboard event file.
pub struct TensorBoardLogger {
    writer: SummaryWriter,
    log_dir: PathBuf,
}

impl fmt::Debug for TensorBoardLogger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TensorBoardLogger")
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl TensorBoardLogger {
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        let log_dir = log_dir.as_ref();
        Self {
            writer: SummaryWriter::new(log_dir),
            log_dir: log_dir.to_owned(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

impl StatsLogger for TensorBoardLogger {
    #[allow(clippy::cast_possible_truncation)]
    fn log_scalar(&mut self, name: &str, step: u64, value: f64) {
        self.writer.add_scalar(name, value as f32, step as usize);
    }

    fn flush(&mut self) {
        self.writer.flush();
    }
}
