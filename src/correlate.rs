//! In-memory join of metric rows with per-iteration run parameters
//!
//! The parameter rows are indexed by iteration id, then every metric row
//! looks up each requested parameter for its iteration. A single missing
//! value rejects the whole result: the error lists every missing
//! (iteration, param) pair and no partial rows are returned.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CorrelationError, MissingParam};
use crate::rows::{AugmentedRow, MetricRow, ParamRow, ResultSet};

/// What to do when the backend returns the same (iteration, param) twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    KeepLast,
    KeepFirst,
    /// Fail if the repeated entries carry different values.
    Reject,
}

/// iteration id -> param name -> value
#[derive(Debug, Default, Clone)]
pub struct ParamIndex {
    by_iteration: HashMap<String, HashMap<String, String>>,
}

impl ParamIndex {
    pub fn build(rows: Vec<ParamRow>, policy: DuplicatePolicy) -> Result<Self, CorrelationError> {
        let mut by_iteration: HashMap<String, HashMap<String, String>> = HashMap::new();

        for row in rows {
            let args = by_iteration.entry(row.iteration_id.clone()).or_default();
            match args.get(&row.arg) {
                None => {
                    args.insert(row.arg, row.value);
                }
                Some(existing) if *existing == row.value => {}
                Some(existing) => match policy {
                    DuplicatePolicy::KeepLast => {
                        warn!(
                            iteration = %row.iteration_id,
                            param = %row.arg,
                            old = %existing,
                            new = %row.value,
                            "duplicate param value, keeping last"
                        );
                        args.insert(row.arg, row.value);
                    }
                    DuplicatePolicy::KeepFirst => {
                        warn!(
                            iteration = %row.iteration_id,
                            param = %row.arg,
                            kept = %existing,
                            dropped = %row.value,
                            "duplicate param value, keeping first"
                        );
                    }
                    DuplicatePolicy::Reject => {
                        return Err(CorrelationError::Duplicate {
                            iteration_id: row.iteration_id,
                            arg: row.arg,
                        });
                    }
                },
            }
        }

        Ok(Self { by_iteration })
    }

    pub fn get(&self, iteration_id: &str, arg: &str) -> Option<&str> {
        self.by_iteration
            .get(iteration_id)
            .and_then(|args| args.get(arg))
            .map(String::as_str)
    }

    pub fn iteration_count(&self) -> usize {
        self.by_iteration.len()
    }
}

/// Attach `requested` parameter values to every metric row.
pub fn correlate(
    metrics: Vec<MetricRow>,
    requested: &[String],
    index: &ParamIndex,
) -> Result<Vec<AugmentedRow>, CorrelationError> {
    let mut missing: Vec<MissingParam> = Vec::new();
    let mut seen_missing: HashSet<(String, String)> = HashSet::new();
    let mut rows = Vec::with_capacity(metrics.len());

    for metric in metrics {
        let mut values = Vec::with_capacity(requested.len());
        for name in requested {
            match index.get(&metric.iteration_id, name) {
                Some(v) => values.push(v.to_string()),
                None => {
                    if seen_missing.insert((metric.iteration_id.clone(), name.clone())) {
                        missing.push(MissingParam {
                            iteration_id: metric.iteration_id.clone(),
                            arg: name.clone(),
                        });
                    }
                }
            }
        }
        if missing.is_empty() {
            rows.push(AugmentedRow::new(metric, values));
        }
    }

    if !missing.is_empty() {
        return Err(CorrelationError::Unmatched(missing));
    }
    Ok(rows)
}

/// Index `param_rows` and join them onto `metrics`, producing the final result.
///
/// Fails with [`CorrelationError::NoMatchingParams`] when parameters were
/// requested but the parameter query found nothing.
pub fn correlate_result(
    metrics: Vec<MetricRow>,
    requested: Vec<String>,
    param_rows: Vec<ParamRow>,
    policy: DuplicatePolicy,
) -> Result<ResultSet, CorrelationError> {
    if requested.is_empty() {
        return Ok(ResultSet::from_metrics(metrics));
    }
    if param_rows.is_empty() {
        return Err(CorrelationError::NoMatchingParams);
    }
    let index = ParamIndex::build(param_rows, policy)?;
    let rows = correlate(metrics, &requested, &index)?;
    Ok(ResultSet::new(requested, rows))
}
