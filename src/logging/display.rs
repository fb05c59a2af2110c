//! Progress display
use crate::simulation::EvalRecord;
use crate::utils::fmt::Rounded;
use std::fmt;
use yansi::Paint;

/// Multi-line progress block shown after each evaluation.
impl fmt::Display for EvalRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "---------------------------------------")?;
        row(f, "Episodes", self.episode)?;
        row(f, "Steps", self.total_steps)?;
        row(f, "AverageReturn", Rounded::new(self.train_average_return, 2))?;
        row(f, "EvalEpisodes", self.eval_episodes)?;
        row(
            f,
            "EvalAverageReturn",
            Paint::fixed(111, Rounded::new(self.eval_average_return, 2)),
        )?;
        row(f, "OtherLogs", &self.agent_stats)?;
        row(f, "Time", self.elapsed_secs)?;
        if let Some(path) = &self.checkpoint {
            row(f, "Checkpoint", Paint::green(path.display()))?;
        }
        write!(f, "---------------------------------------")
    }
}

fn row<T: fmt::Display>(f: &mut fmt::Formatter, name: &str, value: T) -> fmt::Result {
    writeln!(f, "{:<20} {}", Paint::fixed(35, name), value)
}
