//! Error taxonomy for loading statement sources.
//!
//! Every variant here is fatal to the one source being loaded: a statement
//! is all-or-nothing. Reconciliation mismatches are not errors and live in
//! `movs-finance` as a report value instead.

use thiserror::Error;

/// Structural problem inside a text statement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A known header label carried a value that could not be parsed.
    #[error("malformed header field `{field}` ({value:?}): {reason}")]
    Field {
        field: String,
        value: String,
        reason: String,
    },

    /// A required header label never appeared.
    #[error("missing header field `{field}`")]
    MissingField { field: String },

    /// A movement line could not be parsed. `line` is 1-based.
    #[error("line {line}: {reason}")]
    Line { line: usize, reason: String },
}

impl ParseError {
    pub fn field(field: &str, value: &str, reason: impl Into<String>) -> Self {
        ParseError::Field {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn line(line: usize, reason: impl Into<String>) -> Self {
        ParseError::Line {
            line,
            reason: reason.into(),
        }
    }
}

/// Failure to load one source into a `(Header, Ledger)` pair.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{source_id}: {error}")]
    Parse {
        source_id: String,
        #[source]
        error: ParseError,
    },

    /// The source parsed but contained no movements at all.
    #[error("{source_id}: no movements found")]
    EmptyInput { source_id: String },

    #[error("{source_id}: row {row}, column `{column}`: expected {expected}, found {found}")]
    TypeMismatch {
        source_id: String,
        column: String,
        /// 1-based spreadsheet row.
        row: usize,
        expected: &'static str,
        found: String,
    },

    #[error("{source_id}: sheet `{sheet}` not found")]
    SheetNotFound { source_id: String, sheet: String },

    /// The spreadsheet container itself could not be opened.
    #[error("{source_id}: cannot read workbook: {reason}")]
    Workbook { source_id: String, reason: String },

    #[error("{source_id}: {source}")]
    Io {
        source_id: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn parse(source_id: &str, error: ParseError) -> Self {
        LoadError::Parse {
            source_id: source_id.to_string(),
            error,
        }
    }

    /// Identifier of the source that failed.
    pub fn source_id(&self) -> &str {
        match self {
            LoadError::Parse { source_id, .. }
            | LoadError::EmptyInput { source_id }
            | LoadError::TypeMismatch { source_id, .. }
            | LoadError::SheetNotFound { source_id, .. }
            | LoadError::Workbook { source_id, .. }
            | LoadError::Io { source_id, .. } => source_id,
        }
    }

    /// True when the source was well-formed but simply had no data yet.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, LoadError::EmptyInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_error_names_line_number() {
        let err = LoadError::parse("bpol.txt", ParseError::line(7, "bad date"));
        assert_eq!(err.to_string(), "bpol.txt: line 7: bad date");
        assert_eq!(err.source_id(), "bpol.txt");
    }

    #[test]
    fn test_field_error_names_field() {
        let err = ParseError::field("Saldo contabile", "abc", "not a decimal amount");
        assert!(err.to_string().contains("`Saldo contabile`"));
    }

    #[test]
    fn test_empty_input_is_distinguishable() {
        let err = LoadError::EmptyInput {
            source_id: "x.txt".into(),
        };
        assert!(err.is_empty_input());
        let other = LoadError::parse("x.txt", ParseError::line(1, "nope"));
        assert!(!other.is_empty_input());
    }
}
