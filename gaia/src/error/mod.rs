//! Error types and reporting

use crate::ast::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;

/// Compile error
///
/// One sum carries every failure the pipeline can produce; each stage maps
/// onto a subset of the variants. Spans are byte ranges into the file the
/// error was raised for.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("{message}")]
    UnexpectedToken { message: String },

    #[error("unterminated string literal")]
    UnterminatedStringLiteral { span: Span },

    #[error("unterminated block comment")]
    UnterminatedBlockComment { span: Span },

    #[error("unexpected character")]
    UnexpectedCharacter { span: Span },

    #[error("{message}")]
    InvalidNumberOfParameters { message: String, span: Span },

    #[error("{message}")]
    UnknownIdentifier { message: String, span: Span },

    #[error("{message}")]
    Redefinition { message: String, span: Span },

    #[error("{message}")]
    InvalidType { message: String, span: Span },

    #[error("{message}")]
    MismatchingTypes { message: String, span: Span },

    #[error("{message}")]
    NoMatchingFunction { message: String, span: Span },

    #[error("{message}")]
    ArgumentMismatch { message: String },
}

impl CompileError {
    pub fn unexpected_token(message: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            message: message.into(),
        }
    }

    pub fn invalid_parameter_count(message: impl Into<String>, span: Span) -> Self {
        Self::InvalidNumberOfParameters {
            message: message.into(),
            span,
        }
    }

    pub fn unknown_identifier(name: &str, span: Span) -> Self {
        Self::UnknownIdentifier {
            message: format!("unknown identifier '{name}'"),
            span,
        }
    }

    pub fn redefinition(name: &str, span: Span) -> Self {
        Self::Redefinition {
            message: format!("redefinition of '{name}'"),
            span,
        }
    }

    pub fn invalid_type(message: impl Into<String>, span: Span) -> Self {
        Self::InvalidType {
            message: message.into(),
            span,
        }
    }

    pub fn mismatching_types(message: impl Into<String>, span: Span) -> Self {
        Self::MismatchingTypes {
            message: message.into(),
            span,
        }
    }

    pub fn no_matching_function(message: impl Into<String>, span: Span) -> Self {
        Self::NoMatchingFunction {
            message: message.into(),
            span,
        }
    }

    pub fn argument_mismatch(message: impl Into<String>) -> Self {
        Self::ArgumentMismatch {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnterminatedStringLiteral { span }
            | Self::UnterminatedBlockComment { span }
            | Self::UnexpectedCharacter { span }
            | Self::InvalidNumberOfParameters { span, .. }
            | Self::UnknownIdentifier { span, .. }
            | Self::Redefinition { span, .. }
            | Self::InvalidType { span, .. }
            | Self::MismatchingTypes { span, .. }
            | Self::NoMatchingFunction { span, .. } => Some(*span),
            Self::UnexpectedToken { .. } | Self::ArgumentMismatch { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The error kind as a short machine tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnexpectedToken { .. } => "unexpected_token",
            Self::UnterminatedStringLiteral { .. } => "unterminated_string_literal",
            Self::UnterminatedBlockComment { .. } => "unterminated_block_comment",
            Self::UnexpectedCharacter { .. } => "unexpected_character",
            Self::InvalidNumberOfParameters { .. } => "invalid_number_of_parameters",
            Self::UnknownIdentifier { .. } => "unknown_identifier",
            Self::Redefinition { .. } => "redefinition",
            Self::InvalidType { .. } => "invalid_type",
            Self::MismatchingTypes { .. } => "mismatching_types",
            Self::NoMatchingFunction { .. } => "no_matching_function",
            Self::ArgumentMismatch { .. } => "argument_mismatch",
        }
    }
}

/// Format a diagnostic in the canonical plain form:
///
/// ```text
/// path:line:column: error: message
/// <offending source line>
///        ^
/// ```
///
/// Errors without a location print only `error: message`.
pub fn format_diagnostic(filename: &str, source: &str, error: &CompileError) -> String {
    let Some(span) = error.span() else {
        return format!("error: {}", error.message());
    };

    let (line, column) = span.location(source);
    let mut out = format!(
        "{}:{}:{}: error: {}\n",
        filename,
        line,
        column,
        error.message()
    );

    if let Some(text) = source.lines().nth(line - 1) {
        out.push_str(text);
        out.push('\n');
        for _ in 0..column - 1 {
            out.push(' ');
        }
        out.push('^');
    }
    out
}

/// Print a diagnostic in the plain format to stderr
pub fn report_error(filename: &str, source: &str, error: &CompileError) {
    eprintln!("{}", format_diagnostic(filename, source, error));
}

/// Print a rich report via ariadne (`--pretty`)
pub fn report_error_pretty(filename: &str, source: &str, error: &CompileError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(error.message())
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source)))
            .ok();
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(error.message())
            .finish()
            .eprint((filename, Source::from(source)))
            .ok();
    }
}

/// Machine-readable diagnostic (one JSON object per line)
pub fn report_error_machine(filename: &str, source: &str, error: &CompileError) {
    let (line, column) = match error.span() {
        Some(span) => {
            let (l, c) = span.location(source);
            (Some(l), Some(c))
        }
        None => (None, None),
    };
    let payload = serde_json::json!({
        "type": "error",
        "kind": error.kind(),
        "file": filename,
        "line": line,
        "column": column,
        "message": error.message(),
    });
    println!("{payload}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_format_with_location() {
        let source = "foo = 1\nfoo = 2\n";
        let err = CompileError::redefinition("foo", Span::new(8, 11));
        let text = format_diagnostic("main.gaia", source, &err);
        assert!(text.starts_with("main.gaia:2:1: error: redefinition of 'foo'"));
        assert!(text.contains("foo = 2"));
        assert!(text.ends_with("^"));
    }

    #[test]
    fn test_plain_format_without_location() {
        let err = CompileError::argument_mismatch("wrong number of arguments to 'f': expected 1, got 2");
        let text = format_diagnostic("main.gaia", "", &err);
        assert_eq!(
            text,
            "error: wrong number of arguments to 'f': expected 1, got 2"
        );
    }

    #[test]
    fn test_caret_column() {
        let source = "5 + 5.0\n";
        let err = CompileError::invalid_type(
            "invalid types 'Int' and 'Float' for arithmetic operation",
            Span::new(2, 3),
        );
        let text = format_diagnostic("main.gaia", source, &err);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "5 + 5.0");
        assert_eq!(lines[2], "  ^");
    }
}
