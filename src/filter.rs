//! Predicate building for the OpenSearch SQL dialect
//!
//! Filters are built as a small tree of [`Predicate`] values and turned into
//! query text only when [`Predicate::render`] is called. That keeps literal
//! handling in one place: values are currently inserted verbatim, without
//! escaping, so an identifier containing a quote will break the query.

use std::fmt;

/// A backend field reference such as `[cdm_metric_desc.run.run-uuid]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field(String);

impl Field {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[field] = 'literal'`
    Eq(Field, String),
    /// `[field] IS NOT NULL`
    NotNull(Field),
    /// Parenthesized OR chain.
    Any(Vec<Predicate>),
    /// Flat AND chain.
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq(field, literal) => write!(f, "{} = '{}'", field, literal),
            Predicate::NotNull(field) => write!(f, "{} IS NOT NULL", field),
            Predicate::Any(items) => {
                f.write_str("(")?;
                write_joined(f, items, " OR ")?;
                f.write_str(")")
            }
            Predicate::All(items) => write_joined(f, items, " AND "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Predicate], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Match `field` against any of `values`.
///
/// Returns `None` for an empty list, meaning the field is left unconstrained.
pub fn build_filter<S: AsRef<str>>(field: &Field, values: &[S]) -> Option<Predicate> {
    if values.is_empty() {
        return None;
    }
    Some(Predicate::Any(
        values
            .iter()
            .map(|v| Predicate::Eq(field.clone(), v.as_ref().to_string()))
            .collect(),
    ))
}

/// AND together the present fragments, keeping their order.
pub fn conjunction<I>(fragments: I) -> Option<Predicate>
where
    I: IntoIterator<Item = Option<Predicate>>,
{
    let parts: Vec<Predicate> = fragments.into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(Predicate::All(parts))
    }
}
