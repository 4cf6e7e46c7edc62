pub mod backend;
pub mod correlate;
pub mod error;
pub mod filter;
pub mod flatten;
pub mod format;
pub mod query;
pub mod report;
pub mod rows;
pub mod settings;
pub mod utils;

pub use backend::{OpenSearchClient, SqlBackend};
pub use error::{CorrelationError, Error, Result};
pub use report::{run_report, ReportRequest};
pub use rows::{AugmentedRow, MetricRow, ParamRow, ResultSet};
pub use settings::Settings;
