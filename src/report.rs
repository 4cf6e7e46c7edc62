//! Metric report pipeline: primary query, optional parameter query, join.

use std::collections::HashSet;

use tracing::info;

use crate::backend::SqlBackend;
use crate::correlate::correlate_result;
use crate::error::Result;
use crate::query::{MetricQuery, ParamQuery};
use crate::rows::{MetricRow, ParamRow, ResultSet};
use crate::settings::Settings;

/// What to fetch. Empty lists mean "no filter" / "no parameter columns".
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub runs: Vec<String>,
    pub iterations: Vec<String>,
    pub metric_types: Vec<String>,
    pub params: Vec<String>,
}

impl ReportRequest {
    fn metric_query(&self) -> MetricQuery {
        MetricQuery {
            runs: self.runs.clone(),
            iterations: self.iterations.clone(),
            metric_types: self.metric_types.clone(),
        }
    }
}

/// Distinct iteration ids in first-seen order.
fn distinct_iterations(rows: &[MetricRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| seen.insert(r.iteration_id.as_str()))
        .map(|r| r.iteration_id.clone())
        .collect()
}

/// Run the report against `backend`.
///
/// `on_query` sees each query's text right before it is sent. The parameter
/// query is skipped when no parameters were requested. It is narrowed to the
/// iterations present in the metric result; with no metrics it filters on
/// parameter names only.
pub fn run_report<B, F>(
    backend: &B,
    request: &ReportRequest,
    settings: &Settings,
    mut on_query: F,
) -> Result<ResultSet>
where
    B: SqlBackend + ?Sized,
    F: FnMut(&str),
{
    let primary = request.metric_query().render(&settings.index_prefix);
    on_query(&primary);
    let metrics = MetricRow::decode_all(&backend.execute(&primary)?)?;
    info!(rows = metrics.len(), "fetched metrics");

    let param_query = ParamQuery {
        params: request.params.clone(),
        iterations: distinct_iterations(&metrics),
    };
    let Some(secondary) = param_query.render(&settings.index_prefix) else {
        return Ok(ResultSet::from_metrics(metrics));
    };

    on_query(&secondary);
    let params = ParamRow::decode_all(&backend.execute(&secondary)?)?;
    info!(
        rows = params.len(),
        iterations = param_query.iterations.len(),
        "fetched params"
    );

    let result = correlate_result(metrics, request.params.clone(), params, settings.duplicate_params)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CorrelationError, Error};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Returns canned responses in order and records every query it receives.
    struct FakeBackend {
        responses: RefCell<VecDeque<Vec<Vec<Value>>>>,
        seen: RefCell<Vec<String>>,
    }

    impl FakeBackend {
        fn new(responses: Vec<Vec<Vec<Value>>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl SqlBackend for FakeBackend {
        fn execute(&self, query: &str) -> Result<Vec<Vec<Value>>> {
            self.seen.borrow_mut().push(query.to_string());
            Ok(self.responses.borrow_mut().pop_front().unwrap_or_default())
        }
    }

    fn metric_rows() -> Vec<Vec<Value>> {
        vec![
            vec![json!("r1"), json!("i1"), json!("lat"), json!("5")],
            vec![json!("r1"), json!("i2"), json!("lat"), json!("7")],
            vec![json!("r1"), json!("i1"), json!("tput"), json!(120)],
        ]
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_filters_no_params() {
        let backend = FakeBackend::new(vec![metric_rows()]);
        let mut echoed = Vec::new();

        let set = run_report(&backend, &ReportRequest::default(), &Settings::default(), |q| {
            echoed.push(q.to_string())
        })
        .unwrap();

        let seen = backend.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].ends_with("WHERE [iteration] IS NOT NULL;"));
        assert_eq!(*seen, echoed);
        assert_eq!(set.columns(), vec!["run-uuid", "iteration-uuid", "metric_type", "value"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_param_query_is_narrowed_to_fetched_iterations() {
        let params = vec![
            vec![json!("i1"), json!("threads"), json!("4")],
            vec![json!("i2"), json!("threads"), json!("8")],
        ];
        let backend = FakeBackend::new(vec![metric_rows(), params]);
        let request = ReportRequest {
            runs: strings(&["r1"]),
            params: strings(&["threads"]),
            ..Default::default()
        };

        let set = run_report(&backend, &request, &Settings::default(), |_| {}).unwrap();

        let seen = backend.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[1],
            "SELECT iteration.iteration-uuid, param.arg, param.val FROM cdmv8dev-param \
             WHERE ([param.arg] = 'threads') \
             AND ([iteration.iteration-uuid] = 'i1' OR [iteration.iteration-uuid] = 'i2')"
        );
        assert_eq!(set.rows()[0].values(), vec!["r1", "i1", "4", "lat", "5"]);
        assert_eq!(set.rows()[1].values(), vec!["r1", "i2", "8", "lat", "7"]);
        assert_eq!(set.rows()[2].values(), vec!["r1", "i1", "4", "tput", "120"]);
    }

    #[test]
    fn test_empty_param_result_fails() {
        let backend = FakeBackend::new(vec![metric_rows(), vec![]]);
        let request = ReportRequest { params: strings(&["threads"]), ..Default::default() };

        let err = run_report(&backend, &request, &Settings::default(), |_| {}).unwrap_err();
        assert!(matches!(err, Error::Correlation(CorrelationError::NoMatchingParams)));
    }

    #[test]
    fn test_missing_param_fails_whole_report() {
        let params = vec![vec![json!("i1"), json!("threads"), json!("4")]];
        let backend = FakeBackend::new(vec![metric_rows(), params]);
        let request = ReportRequest { params: strings(&["threads"]), ..Default::default() };

        let err = run_report(&backend, &request, &Settings::default(), |_| {}).unwrap_err();
        assert!(matches!(err, Error::Correlation(CorrelationError::Unmatched(ref m)) if m.len() == 1));
    }

    #[test]
    fn test_empty_metrics_still_query_params_by_name() {
        let params = vec![vec![json!("i9"), json!("threads"), json!("4")]];
        let backend = FakeBackend::new(vec![vec![], params]);
        let request = ReportRequest { params: strings(&["threads", "bs"]), ..Default::default() };

        let set = run_report(&backend, &request, &Settings::default(), |_| {}).unwrap();

        let seen = backend.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[1],
            "SELECT iteration.iteration-uuid, param.arg, param.val FROM cdmv8dev-param \
             WHERE ([param.arg] = 'threads' OR [param.arg] = 'bs')"
        );
        assert!(set.is_empty());
        assert_eq!(
            set.columns(),
            vec!["run-uuid", "iteration-uuid", "threads", "bs", "metric_type", "value"]
        );
    }

    #[test]
    fn test_empty_metrics_and_no_params_fails() {
        let backend = FakeBackend::new(vec![vec![], vec![]]);
        let request = ReportRequest { params: strings(&["threads"]), ..Default::default() };

        let err = run_report(&backend, &request, &Settings::default(), |_| {}).unwrap_err();

        assert_eq!(backend.seen.borrow().len(), 2);
        assert!(matches!(err, Error::Correlation(CorrelationError::NoMatchingParams)));
    }

    #[test]
    fn test_index_prefix_from_settings() {
        let backend = FakeBackend::new(vec![vec![]]);
        let settings = Settings { index_prefix: "cdmv9".into(), ..Settings::default() };

        run_report(&backend, &ReportRequest::default(), &settings, |_| {}).unwrap();
        assert!(backend.seen.borrow()[0].contains("FROM cdmv9-metric_desc"));
    }
}
