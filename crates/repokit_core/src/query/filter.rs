//! Filter expressions over entity columns.
//!
//! # Invariants
//! - A filter names columns, never raw SQL; the store resolves names against
//!   the entity's declared columns.
//! - `Filter::All` matches every row; an empty `Or` matches none.

use std::fmt::{Display, Formatter};

/// Comparison applied by one `FilterCondition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    In,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

impl Display for FilterOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Operand of a filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Integer(i64),
    Real(f64),
    Text(String),
    /// Stored as `0`/`1`.
    Boolean(bool),
    Null,
    /// Operand of `FilterOperator::In`.
    List(Vec<FilterValue>),
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// `column <operator> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub column: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

/// Predicate over the rows of one entity table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    #[default]
    All,
    Condition(FilterCondition),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn all() -> Self {
        Self::All
    }

    pub fn condition(
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self::Condition(FilterCondition {
            column: column.into(),
            operator,
            value: value.into(),
        })
    }

    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::condition(column, FilterOperator::Equal, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::condition(column, FilterOperator::NotEqual, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::condition(column, FilterOperator::GreaterThan, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::condition(column, FilterOperator::GreaterThanOrEqual, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::condition(column, FilterOperator::LessThan, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::condition(column, FilterOperator::LessThanOrEqual, value)
    }

    /// SQL `LIKE` pattern match (`%` and `_` wildcards).
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::condition(column, FilterOperator::Like, pattern.into())
    }

    pub fn in_list<T: Into<FilterValue>>(column: impl Into<String>, values: Vec<T>) -> Self {
        Self::condition(column, FilterOperator::In, values)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::condition(column, FilterOperator::IsNull, FilterValue::Null)
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::condition(column, FilterOperator::IsNotNull, FilterValue::Null)
    }

    /// Conjunction; nested `And`s are flattened.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::All, other) => other,
            (this, Self::All) => this,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (this, other) => Self::And(vec![this, other]),
        }
    }

    /// Disjunction; nested `Or`s are flattened.
    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), other) => {
                left.push(other);
                Self::Or(left)
            }
            (this, other) => Self::Or(vec![this, other]),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, FilterOperator, FilterValue};

    #[test]
    fn and_drops_match_all_and_flattens() {
        let filter = Filter::all()
            .and(Filter::gt("age", 25))
            .and(Filter::eq("name", "ada"))
            .and(Filter::is_null("birth_date"));

        match filter {
            Filter::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("unexpected filter: {other:?}"),
        }
    }

    #[test]
    fn double_negation_cancels() {
        let filter = Filter::eq("age", 30).negate().negate();
        assert_eq!(filter, Filter::eq("age", 30));
    }

    #[test]
    fn option_and_list_values_convert() {
        assert_eq!(FilterValue::from(None::<i64>), FilterValue::Null);
        assert_eq!(
            FilterValue::from(vec![1_i64, 2]),
            FilterValue::List(vec![FilterValue::Integer(1), FilterValue::Integer(2)])
        );
    }

    #[test]
    fn operator_renders_sql_token() {
        assert_eq!(FilterOperator::GreaterThanOrEqual.to_string(), ">=");
        assert_eq!(FilterOperator::IsNotNull.as_sql(), "IS NOT NULL");
    }
}
