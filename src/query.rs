//! The two query shapes issued against the CDM indices
//!
//! OpenSearch SQL joins at most two indices, so metrics (metric_desc JOIN
//! metric_data) and run parameters (param) are fetched by separate queries
//! and joined in memory afterwards.

use crate::filter::{build_filter, conjunction, Field, Predicate};

const RUN_FIELD: &str = "cdm_metric_desc.run.run-uuid";
const ITERATION_FIELD: &str = "cdm_metric_desc.iteration.iteration-uuid";
const METRIC_TYPE_FIELD: &str = "cdm_metric_desc.metric_desc.type";

const PARAM_ARG_FIELD: &str = "param.arg";
const PARAM_ITERATION_FIELD: &str = "iteration.iteration-uuid";

/// Primary query: one row per metric sample, `(run, iteration, type, value)`.
#[derive(Debug, Clone, Default)]
pub struct MetricQuery {
    pub runs: Vec<String>,
    pub iterations: Vec<String>,
    pub metric_types: Vec<String>,
}

impl MetricQuery {
    pub fn predicate(&self) -> Predicate {
        let filters = conjunction([
            build_filter(&Field::new(RUN_FIELD), &self.runs),
            build_filter(&Field::new(ITERATION_FIELD), &self.iterations),
            build_filter(&Field::new(METRIC_TYPE_FIELD), &self.metric_types),
        ]);

        let mut parts = vec![Predicate::NotNull(Field::new("iteration"))];
        if let Some(Predicate::All(rest)) = filters {
            parts.extend(rest);
        }
        Predicate::All(parts)
    }

    pub fn render(&self, index_prefix: &str) -> String {
        format!(
            "SELECT [{run}] as run-uuid, [{iter}] as iteration-uuid, [{mtype}] as metric_type, \
             [cdm_metric_data.metric_data.value] as value \
             FROM {prefix}-metric_desc cdm_metric_desc \
             JOIN {prefix}-metric_data cdm_metric_data \
             ON [cdm_metric_desc.metric_desc.metric_desc-uuid]=[cdm_metric_data.metric_desc.metric_desc-uuid] \
             WHERE {filter};",
            run = RUN_FIELD,
            iter = ITERATION_FIELD,
            mtype = METRIC_TYPE_FIELD,
            prefix = index_prefix,
            filter = self.predicate(),
        )
    }
}

/// Secondary query: `(iteration, arg, value)` for the requested parameters.
#[derive(Debug, Clone, Default)]
pub struct ParamQuery {
    pub params: Vec<String>,
    /// Iterations present in the primary result.
    pub iterations: Vec<String>,
}

impl ParamQuery {
    /// `None` when no parameter names were given; the query needs at least one.
    pub fn predicate(&self) -> Option<Predicate> {
        let params = build_filter(&Field::new(PARAM_ARG_FIELD), &self.params)?;
        conjunction([
            Some(params),
            build_filter(&Field::new(PARAM_ITERATION_FIELD), &self.iterations),
        ])
    }

    pub fn render(&self, index_prefix: &str) -> Option<String> {
        let filter = self.predicate()?;
        Some(format!(
            "SELECT iteration.iteration-uuid, param.arg, param.val FROM {}-param WHERE {}",
            index_prefix, filter
        ))
    }
}
