use std::io::Write;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::color::{ConflictGraph, InputError};
use crate::search::tabucol::{tabucol, TabucolConfig};

/** outcome of one statistics trial. The coloring itself is discarded: only
the iteration count matters here, and an exhausted trial contributes its
whole budget. */
#[derive(Debug, Clone, Serialize)]
pub struct TrialOutcome {
    /// true if the trial reached a conflict-free coloring
    pub solved: bool,
    /// iterations spent by the trial
    pub nb_iterations: usize,
    /// wall-clock seconds spent by the trial
    pub elapsed: f64,
}

/**
Runs `nb_trials` fully independent tabucol searches and collects their
outcomes. Each trial owns its coloring, tabu list, aspiration table and
random generator, so trials run concurrently on the rayon thread pool and
the reduction is a plain commutative sum. With a base seed set, trial t
runs with seed + t: the collected outcomes do not depend on scheduling.
*/
pub fn run_trials(
    inst: &ConflictGraph,
    nb_colors: usize,
    config: &TabucolConfig,
    nb_trials: usize,
) -> Result<Vec<TrialOutcome>, InputError> {
    (0..nb_trials).into_par_iter()
        .map(|trial| {
            let trial_config = match config.seed {
                Some(seed) => config.clone().with_seed(seed.wrapping_add(trial as u64)),
                None => config.clone(),
            };
            let start = Instant::now();
            tabucol(inst, nb_colors, &trial_config).map(|res| TrialOutcome {
                solved: res.is_solved(),
                nb_iterations: res.nb_iterations(),
                elapsed: start.elapsed().as_secs_f64(),
            })
        })
        .collect()
}

/// per-trial iteration counts over `nb_trials` independent runs
pub fn trial_iterations(
    inst: &ConflictGraph,
    nb_colors: usize,
    config: &TabucolConfig,
    nb_trials: usize,
) -> Result<Vec<usize>, InputError> {
    let outcomes = run_trials(inst, nb_colors, config, nb_trials)?;
    Ok(outcomes.iter().map(|t| t.nb_iterations).collect())
}

/** arithmetic mean of the iteration counts over `nb_trials` independent
runs (0.0 when no trial is requested). */
pub fn mean_iterations(
    inst: &ConflictGraph,
    nb_colors: usize,
    config: &TabucolConfig,
    nb_trials: usize,
) -> Result<f64, InputError> {
    if nb_trials == 0 { return Ok(0.0); }
    let iterations = trial_iterations(inst, nb_colors, config, nb_trials)?;
    Ok(iterations.iter().sum::<usize>() as f64 / iterations.len() as f64)
}

/** one record of a finished run in the line-oriented log consumed by the
external plotting tool. A record is exactly four lines; the fourth is the
parenthesized tuple `(version, nb_colors, nb_iterations, elapsed)` the tool
reads (fields 1-4, comma-space separated). */
#[derive(Debug, Clone, Serialize)]
pub struct StatsRecord {
    /// run label (instance name, trial number, ...)
    pub label: String,
    /// "converged" or "exhausted"
    pub outcome: String,
    /// number of vertices of the instance
    pub nb_vertices: usize,
    /// number of available colors
    pub nb_colors: usize,
    /// iterations spent
    pub nb_iterations: usize,
    /// wall-clock seconds
    pub elapsed: f64,
}

impl StatsRecord {

    /// version identifier written as the tuple's first field
    pub fn version() -> &'static str { env!("CARGO_PKG_VERSION") }

    /// the four lines of the record (the tuple sits at offset 3)
    pub fn record_lines(&self) -> [String; 4] {
        [
            format!("run: {}", self.label),
            format!("outcome: {}", self.outcome),
            format!("vertices: {}", self.nb_vertices),
            format!(
                "({}, {}, {}, {})",
                Self::version(), self.nb_colors, self.nb_iterations, self.elapsed
            ),
        ]
    }

    /// appends the record to a writer
    pub fn write<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in self.record_lines().iter() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> ConflictGraph {
        ConflictGraph::from_adj_list(vec![vec![1,2], vec![0,2], vec![0,1]]).unwrap()
    }

    fn edgeless(n: usize) -> ConflictGraph {
        ConflictGraph::from_adj_list(vec![Vec::new(); n]).unwrap()
    }

    #[test]
    fn test_mean_over_triangle_trials() {
        let inst = triangle();
        let config = TabucolConfig::default().with_seed(11);
        let mean = mean_iterations(&inst, 3, &config, 100).unwrap();
        assert!(mean.is_finite());
        assert!(mean >= 0.0);
        assert!(mean <= config.max_iterations as f64);
    }

    #[test]
    fn test_mean_on_edgeless_graph_is_zero() {
        let inst = edgeless(4);
        let mean = mean_iterations(&inst, 2, &TabucolConfig::default(), 10).unwrap();
        assert_eq!(mean, 0.0);
    }

    #[test]
    fn test_exhausted_trials_count_their_budget() {
        let inst = triangle();
        let config = TabucolConfig::default()
            .with_max_iterations(40)
            .with_seed(13);
        // 2 colors on a triangle: every trial exhausts
        let iterations = trial_iterations(&inst, 2, &config, 5).unwrap();
        assert_eq!(iterations, vec![40; 5]);
        let mean = mean_iterations(&inst, 2, &config, 5).unwrap();
        assert_eq!(mean, 40.0);
    }

    #[test]
    fn test_seeded_trials_are_reproducible() {
        let inst = triangle();
        let config = TabucolConfig::default().with_seed(17);
        let a = trial_iterations(&inst, 3, &config, 20).unwrap();
        let b = trial_iterations(&inst, 3, &config, 20).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_trials() {
        let inst = triangle();
        let mean = mean_iterations(&inst, 3, &TabucolConfig::default(), 0).unwrap();
        assert_eq!(mean, 0.0);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let inst = triangle();
        assert!(run_trials(&inst, 0, &TabucolConfig::default(), 3).is_err());
    }

    #[test]
    fn test_record_tuple_line() {
        let record = StatsRecord {
            label: "triangle trial 0".to_string(),
            outcome: "converged".to_string(),
            nb_vertices: 3,
            nb_colors: 3,
            nb_iterations: 12,
            elapsed: 0.25,
        };
        let lines = record.record_lines();
        let tuple = &lines[3];
        assert!(tuple.starts_with('(') && tuple.ends_with(')'));
        let fields: Vec<&str> = tuple[1..tuple.len()-1].split(", ").collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], StatsRecord::version());
        assert_eq!(fields[1], "3");
        assert_eq!(fields[2], "12");
        assert_eq!(fields[3], "0.25");
    }

    #[test]
    fn test_record_stream_shape() {
        let record = StatsRecord {
            label: "r".to_string(),
            outcome: "exhausted".to_string(),
            nb_vertices: 3,
            nb_colors: 2,
            nb_iterations: 40,
            elapsed: 0.5,
        };
        let mut out: Vec<u8> = Vec::new();
        record.write(&mut out).unwrap();
        record.write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        // every 4th line (offset 3 mod 4) holds the tuple
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(i % 4 == 3, line.starts_with('('), "line {}: {}", i, line);
        }
    }
}
