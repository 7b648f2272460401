//! Literal and regular-expression route patterns.

use regex::Regex;

use crate::error::AppError;
use crate::result::AppResult;

/// How a route matches a request path.
///
/// Paths are written without a leading slash (`"users/{pk}/"`); literal
/// paths use axum `{param}` placeholders, regex paths are matched against
/// the request path with its leading slash removed.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Exact path, possibly with `{param}` segments.
    Literal(String),
    /// Compiled regular expression.
    Regex(Regex),
}

impl RoutePattern {
    /// A literal path pattern.
    pub fn literal(path: &str) -> Self {
        Self::Literal(path.to_string())
    }

    /// A regex path pattern. Fails if the expression does not compile.
    pub fn regex(pattern: &str) -> AppResult<Self> {
        Regex::new(pattern).map(Self::Regex).map_err(|e| {
            AppError::with_source(
                crate::error::ErrorKind::Configuration,
                format!("Invalid route pattern '{pattern}': {e}"),
                e,
            )
        })
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(path) => path,
            Self::Regex(regex) => regex.as_str(),
        }
    }

    /// Whether this is a regex pattern.
    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Regex(_))
    }

    /// Returns this pattern mounted under a literal `prefix`.
    pub fn prefixed(&self, prefix: &str) -> AppResult<Self> {
        if prefix.is_empty() {
            return Ok(self.clone());
        }
        match self {
            Self::Literal(path) => Ok(Self::Literal(format!("{prefix}{path}"))),
            Self::Regex(regex) => {
                let body = regex.as_str();
                let body = body.strip_prefix('^').unwrap_or(body);
                Self::regex(&format!("^{}{}", regex::escape(prefix), body))
            }
        }
    }
}
