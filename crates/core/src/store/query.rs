//! Row filtering and ordering shared by the store backends.

use super::Row;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    Eq(String, Value),
    AnyOf(String, Vec<Value>),
}

impl Filter {
    fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Eq(column, expected) => row.get(column) == Some(expected),
            Filter::AnyOf(column, allowed) => row
                .get(column)
                .is_some_and(|value| allowed.contains(value)),
        }
    }
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// A select over one table: equality filters, "any of" filters and an optional sort column.
///
/// All filters must match for a row to be returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
    order: Option<(String, Order)>,
}

impl Query {
    /// A query matching every row, unordered.
    pub fn all() -> Self {
        Self::default()
    }

    /// Keeps rows whose `column` equals `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.into(), value.into()));
        self
    }

    /// Keeps rows whose `column` equals any of `values`.
    pub fn any_of<V: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filters.push(Filter::AnyOf(column.into(), values));
        self
    }

    /// Sorts results by `column`. Rows missing the column (or holding `null`) sort last in
    /// either direction.
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order = Some((column.into(), order));
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|filter| filter.matches(row))
    }

    /// Filters and sorts `rows` according to this query.
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let mut selected: Vec<Row> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if let Some((column, order)) = &self.order {
            selected.sort_by(|a, b| {
                match (non_null(a.get(column)), non_null(b.get(column))) {
                    (Some(a), Some(b)) => {
                        let ordering = compare_values(a, b);
                        match order {
                            Order::Ascending => ordering,
                            Order::Descending => ordering.reverse(),
                        }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }

        selected
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Compares two column values.
///
/// RFC 3339 timestamps compare chronologically (their textual form does not sort correctly
/// once fractional seconds vary in width), numbers numerically, everything else by its
/// string form.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => {
            match (a.parse::<DateTime<Utc>>(), b.parse::<DateTime<Utc>>()) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}
