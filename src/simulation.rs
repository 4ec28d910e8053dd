use crate::calculations::critical_path::{CriticalPathSolver, PathResult};
use crate::error::{AnalysisResult, DistributionError};
use crate::graph::ProjectDag;
use crate::sampling::{DistributionSampler, SampleSet, SamplingMethod};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Re-solves the critical path once per sample row.
pub struct MonteCarloSimulator<'a> {
    dag: &'a ProjectDag,
    solver: CriticalPathSolver,
    parallel: bool,
}

impl<'a> MonteCarloSimulator<'a> {
    pub fn new(dag: &'a ProjectDag) -> AnalysisResult<Self> {
        Ok(Self {
            dag,
            solver: CriticalPathSolver::new(dag)?,
            parallel: true,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Draw `n` samples per activity and evaluate every row.
    pub fn run(
        &self,
        sampler: &mut DistributionSampler,
        method: SamplingMethod,
        n: usize,
        start: &str,
        end: &str,
    ) -> AnalysisResult<SimulationReport> {
        if n == 0 {
            return Err(DistributionError::NonPositiveSampleCount { count: n }.into());
        }
        let samples = sampler.generate(self.dag, method, n)?;
        self.evaluate(samples, start, end)
    }

    /// Evaluate an existing sample set. Unreachable rows are recorded, never fatal.
    pub fn evaluate(
        &self,
        samples: SampleSet,
        start: &str,
        end: &str,
    ) -> AnalysisResult<SimulationReport> {
        samples.ensure_matches(self.dag)?;
        let start_ix = self.solver.index_of(start)?;
        let end_ix = self.solver.index_of(end)?;
        let n = samples.len();

        info!(samples = n, start, end, parallel = self.parallel, "monte carlo run started");

        let width = self.solver.len();
        let evaluate_row = |row: &mut Vec<f64>, i: usize| {
            samples.fill_row(i, row);
            self.solver.longest_path_between(row, start_ix, end_ix)
        };

        // Each row owns its weight buffer; the solver and samples are shared read-only.
        let results: Vec<PathResult> = if self.parallel {
            (0..n)
                .into_par_iter()
                .map_init(|| vec![0.0; width], evaluate_row)
                .collect()
        } else {
            let mut row = vec![0.0; width];
            (0..n).map(|i| evaluate_row(&mut row, i)).collect()
        };

        let report = SimulationReport {
            start: start.to_string(),
            end: end.to_string(),
            samples,
            results,
        };
        let unreachable = report.unreachable_count();
        if unreachable > 0 {
            warn!(unreachable, samples = n, "samples without a path between endpoints");
        }
        info!(samples = n, unreachable, "monte carlo run finished");
        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<'a> {
    pub sample: usize,
    pub total_weight: Option<f64>,
    pub critical_path: Option<&'a [String]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathFrequency {
    pub path: Vec<String>,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub start: String,
    pub end: String,
    pub samples: SampleSet,
    pub results: Vec<PathResult>,
}

impl SimulationReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// One row per sample, unreachable rows included.
    pub fn rows(&self) -> impl Iterator<Item = AggregateRow<'_>> + '_ {
        self.results
            .iter()
            .enumerate()
            .map(|(sample, result)| AggregateRow {
                sample,
                total_weight: result.total_weight(),
                critical_path: result.path(),
            })
    }

    /// Total durations of the samples that reached the end activity.
    pub fn durations(&self) -> Vec<f64> {
        self.results.iter().filter_map(PathResult::total_weight).collect()
    }

    pub fn unreachable_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_reached()).count()
    }

    /// Distinct critical paths, most frequent first; equal counts ordered by path.
    pub fn path_frequencies(&self) -> Vec<PathFrequency> {
        let mut counts: HashMap<&[String], usize> = HashMap::new();
        for path in self.results.iter().filter_map(PathResult::path) {
            *counts.entry(path).or_default() += 1;
        }
        let total = self.len().max(1) as f64;
        let mut frequencies: Vec<PathFrequency> = counts
            .into_iter()
            .map(|(path, count)| PathFrequency {
                path: path.to_vec(),
                count,
                share: count as f64 / total,
            })
            .collect();
        frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
        frequencies
    }

    /// Share of reached samples whose critical path contains each activity.
    pub fn criticality_index(&self) -> Vec<(String, f64)> {
        let reached = self.results.iter().filter(|r| r.is_reached()).count();
        let mut hits: HashMap<&str, usize> = HashMap::new();
        for path in self.results.iter().filter_map(PathResult::path) {
            for code in path {
                *hits.entry(code.as_str()).or_default() += 1;
            }
        }
        self.samples
            .codes()
            .iter()
            .map(|code| {
                let count = hits.get(code.as_str()).copied().unwrap_or(0);
                let index = if reached == 0 {
                    0.0
                } else {
                    count as f64 / reached as f64
                };
                (code.clone(), index)
            })
            .collect()
    }
}
