//! Typed rows decoded from backend `datarows`.

use serde_json::Value;

use crate::error::{Error, Result};

/// Render a backend cell as the opaque string the rest of the pipeline uses.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn expect_arity(kind: &'static str, index: usize, row: &[Value], expected: usize) -> Result<()> {
    if row.len() != expected {
        return Err(Error::RowShape {
            kind,
            index,
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    pub run_id: String,
    pub iteration_id: String,
    pub metric_type: String,
    pub value: String,
}

impl MetricRow {
    pub fn new(
        run_id: impl Into<String>,
        iteration_id: impl Into<String>,
        metric_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            iteration_id: iteration_id.into(),
            metric_type: metric_type.into(),
            value: value.into(),
        }
    }

    pub fn decode_all(rows: &[Vec<Value>]) -> Result<Vec<MetricRow>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                expect_arity("metric", i, row, 4)?;
                Ok(MetricRow {
                    run_id: cell_text(&row[0]),
                    iteration_id: cell_text(&row[1]),
                    metric_type: cell_text(&row[2]),
                    value: cell_text(&row[3]),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRow {
    pub iteration_id: String,
    pub arg: String,
    pub value: String,
}

impl ParamRow {
    pub fn new(
        iteration_id: impl Into<String>,
        arg: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            iteration_id: iteration_id.into(),
            arg: arg.into(),
            value: value.into(),
        }
    }

    pub fn decode_all(rows: &[Vec<Value>]) -> Result<Vec<ParamRow>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                expect_arity("param", i, row, 3)?;
                Ok(ParamRow {
                    iteration_id: cell_text(&row[0]),
                    arg: cell_text(&row[1]),
                    value: cell_text(&row[2]),
                })
            })
            .collect()
    }
}

/// A metric row with the requested parameter values attached.
///
/// Only the correlator creates these, always with one value per requested
/// parameter, so every row of a [`ResultSet`] lines up with its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedRow {
    metric: MetricRow,
    params: Vec<String>,
}

impl AugmentedRow {
    pub(crate) fn new(metric: MetricRow, params: Vec<String>) -> Self {
        Self { metric, params }
    }

    pub fn param_values(&self) -> &[String] {
        &self.params
    }

    /// Values in column order: run, iteration, params..., metric type, value.
    pub fn values(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(4 + self.params.len());
        out.push(self.metric.run_id.as_str());
        out.push(self.metric.iteration_id.as_str());
        out.extend(self.params.iter().map(String::as_str));
        out.push(self.metric.metric_type.as_str());
        out.push(self.metric.value.as_str());
        out
    }
}

/// Final output of a report: the header and the rows it describes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    params: Vec<String>,
    rows: Vec<AugmentedRow>,
}

impl ResultSet {
    pub(crate) fn new(params: Vec<String>, rows: Vec<AugmentedRow>) -> Self {
        debug_assert!(rows.iter().all(|r| r.params.len() == params.len()));
        Self { params, rows }
    }

    /// Result without parameter columns.
    pub fn from_metrics(rows: Vec<MetricRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|m| AugmentedRow::new(m, Vec::new()))
            .collect();
        Self { params: Vec::new(), rows }
    }

    pub fn columns(&self) -> Vec<&str> {
        let mut cols = Vec::with_capacity(4 + self.params.len());
        cols.push("run-uuid");
        cols.push("iteration-uuid");
        cols.extend(self.params.iter().map(String::as_str));
        cols.push("metric_type");
        cols.push("value");
        cols
    }

    pub fn rows(&self) -> &[AugmentedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
