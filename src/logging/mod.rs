//! Logging statistics from training runs
mod display;
mod tensorboard;
#[cfg(test)]
pub mod testing;

pub use tensorboard::TensorBoardLogger;

/// Logs named scalar time series.
pub trait StatsLogger {
    /// Log a scalar value.
    ///
    /// # Args
    /// * `name` - The name of the series, like `Train/AverageReturns`.
    /// * `step` - The series index, typically a training episode number.
    /// * `value` - The value to log.
    fn log_scalar(&mut self, name: &str, step: u64, value: f64);

    /// Write out any buffered values.
    fn flush(&mut self) {}
}

/// Logger that does nothing
impl StatsLogger for () {
    #[inline]
    fn log_scalar(&mut self, _: &str, _: u64, _: f64) {}
}

/// Log to both loggers in the pair.
impl<A, B> StatsLogger for (A, B)
where
    A: StatsLogger,
    B: StatsLogger,
{
    #[inline]
    fn log_scalar(&mut self, name: &str, step: u64, value: f64) {
        self.0.log_scalar(name, step, value);
        self.1.log_scalar(name, step, value);
    }
    #[inline]
    fn flush(&mut self) {
        self.0.flush();
        self.1.flush();
    }
}

impl<T: StatsLogger + ?Sized> StatsLogger for &'_ mut T {
    #[inline]
    fn log_scalar(&mut self, name: &str, step: u64, value: f64) {
        T::log_scalar(self, name, step, value)
    }
    #[inline]
    fn flush(&mut self) {
        T::flush(self)
    }
}

impl<T: StatsLogger + ?Sized> StatsLogger for Box<T> {
    #[inline]
    fn log_scalar(&mut self, name: &str, step: u64, value: f64) {
        T::log_scalar(self, name, step, value)
    }
    #[inline]
    fn flush(&mut self) {
        T::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingLogger;
    use super::*;

    #[test]
    fn pair_logs_to_both() {
        let mut pair = (RecordingLogger::default(), RecordingLogger::default());
        pair.log_scalar("Train/EpisodeReturns", 3, 21.0);
        pair.flush();
        for logger in [&pair.0, &pair.1] {
            assert_eq!(logger.series("Train/EpisodeReturns"), vec![(3, 21.0)]);
            assert_eq!(logger.flushes, 1);
        }
    }

    #[test]
    fn boxed_dyn_logger() {
        let mut recorder = RecordingLogger::default();
        {
            let mut logger: Box<dyn StatsLogger + '_> = Box::new(&mut recorder);
            logger.log_scalar("Eval/AverageReturns", 50, 500.0);
        }
        assert_eq!(recorder.series("Eval/AverageReturns"), vec![(50, 500.0)]);
    }
}
