//! Filter expressions for ISC collection endpoints.
//!
//! Renders the `filters` query grammar used by `/v3/sources`, `/beta/accounts`
//! and `/beta/entitlements`, e.g.
//! `sourceId in ("a", "b") and uncorrelated eq true`.

use std::fmt;

/// Literal value on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Quoted string literal.
    Str(String),
    /// Bare boolean literal.
    Bool(bool),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "\"{}\"", escape_filter_value(s)),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `attribute eq value`
    Eq {
        attribute: String,
        value: FilterValue,
    },
    /// `attribute in ("a", "b")`
    In {
        attribute: String,
        values: Vec<String>,
    },
    /// Clauses joined with `or`.
    Or(Vec<Filter>),
    /// Clauses joined with `and`.
    And(Vec<Filter>),
}

impl Filter {
    /// `attribute eq "value"`
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            attribute: attribute.into(),
            value: FilterValue::Str(value.into()),
        }
    }

    /// `attribute eq true|false`
    pub fn eq_bool(attribute: impl Into<String>, value: bool) -> Self {
        Self::Eq {
            attribute: attribute.into(),
            value: FilterValue::Bool(value),
        }
    }

    /// `attribute in ("v1", "v2", ...)`
    pub fn is_in<I, S>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::In {
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `attribute eq "v1" or attribute eq "v2" ...`
    pub fn any_eq<I, S>(attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Or(
            values
                .into_iter()
                .map(|value| Self::eq(attribute, value))
                .collect(),
        )
    }

    /// Combines `self` and `other` with `and`.
    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        match self {
            Self::And(mut clauses) => {
                clauses.push(other);
                Self::And(clauses)
            }
            first => Self::And(vec![first, other]),
        }
    }

    fn is_compound(&self) -> bool {
        match self {
            Self::Or(clauses) | Self::And(clauses) => clauses.len() > 1,
            _ => false,
        }
    }

    fn write_joined(f: &mut fmt::Formatter<'_>, clauses: &[Filter], sep: &str) -> fmt::Result {
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " {sep} ")?;
            }
            if clause.is_compound() {
                write!(f, "({clause})")?;
            } else {
                write!(f, "{clause}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq { attribute, value } => write!(f, "{attribute} eq {value}"),
            Self::In { attribute, values } => {
                write!(f, "{attribute} in (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\"", escape_filter_value(value))?;
                }
                f.write_str(")")
            }
            Self::Or(clauses) => Self::write_joined(f, clauses, "or"),
            Self::And(clauses) => Self::write_joined(f, clauses, "and"),
        }
    }
}

/// Escapes a value for use inside a double-quoted filter or search literal.
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
