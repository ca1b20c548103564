use crate::lexer::TokenKind;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Grammar construct the parser was inside when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Print,
    Assignment,
    Declaration,
    Function,
    Parameters,
    Call,
    Condition,
    Repeat,
    Block,
    Index,
    Property,
    Grouping,
    Expression,
}

impl Construct {
    pub fn describe(&self) -> &'static str {
        match self {
            Construct::Print => "print statement",
            Construct::Assignment => "variable assignment",
            Construct::Declaration => "variable declaration",
            Construct::Function => "function definition",
            Construct::Parameters => "parameter list",
            Construct::Call => "function call",
            Construct::Condition => "condition",
            Construct::Repeat => "repeat loop",
            Construct::Block => "block",
            Construct::Index => "array index",
            Construct::Property => "property access",
            Construct::Grouping => "parenthesized expression",
            Construct::Expression => "expression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Runtime,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Parse => "Parse error",
            Phase::Runtime => "Runtime error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // Parse errors
    MissingStart {
        found: TokenKind,
    },
    MissingEnd {
        found: TokenKind,
    },
    Expected {
        expected: TokenKind,
        construct: Construct,
        found: TokenKind,
    },
    ExpectedExpression {
        construct: Construct,
        found: TokenKind,
    },
    UnexpectedToken {
        found: TokenKind,
    },
    TooDeeplyNested {
        limit: usize,
    },

    // Runtime errors
    UndefinedVariable {
        name: String,
    },
    UndefinedFunction {
        name: String,
    },
    NotAList {
        name: String,
        found: &'static str,
    },
    IndexOutOfBounds {
        index: String,
        len: usize,
    },
    DivisionByZero,
    TypeMismatch {
        operator: &'static str,
        left: &'static str,
        right: &'static str,
    },
    UnknownProperty {
        property: String,
        found: &'static str,
    },
    InvalidRepeatCount {
        count: f64,
    },
    CallDepthExceeded {
        limit: usize,
    },
}

impl ErrorKind {
    pub fn phase(&self) -> Phase {
        match self {
            ErrorKind::MissingStart { .. }
            | ErrorKind::MissingEnd { .. }
            | ErrorKind::Expected { .. }
            | ErrorKind::ExpectedExpression { .. }
            | ErrorKind::UnexpectedToken { .. }
            | ErrorKind::TooDeeplyNested { .. } => Phase::Parse,
            _ => Phase::Runtime,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::MissingStart { found } => write!(
                f,
                "Program must start with start: or sharu:, found {}",
                found.describe()
            ),
            ErrorKind::MissingEnd { found } => write!(
                f,
                "Program must end with end: or samaapt:, found {}",
                found.describe()
            ),
            ErrorKind::Expected {
                expected,
                construct,
                found,
            } => write!(
                f,
                "Expected {} in {}, found {}",
                expected.describe(),
                construct.describe(),
                found.describe()
            ),
            ErrorKind::ExpectedExpression { construct, found } => write!(
                f,
                "Expected expression in {}, found {}",
                construct.describe(),
                found.describe()
            ),
            ErrorKind::UnexpectedToken { found } => {
                write!(f, "Unexpected token: {}", found.describe())
            }
            ErrorKind::TooDeeplyNested { limit } => {
                write!(f, "Nesting deeper than {} levels", limit)
            }
            ErrorKind::UndefinedVariable { name } => {
                write!(f, "Variable {} is not defined", name)
            }
            ErrorKind::UndefinedFunction { name } => {
                write!(f, "Function {} is not defined", name)
            }
            ErrorKind::NotAList { name, .. } => write!(f, "{} is not an array", name),
            ErrorKind::IndexOutOfBounds { index, len } => write!(
                f,
                "Array index {} out of bounds for length {}",
                index, len
            ),
            ErrorKind::DivisionByZero => write!(f, "Division by zero"),
            ErrorKind::TypeMismatch {
                operator,
                left,
                right,
            } => write!(
                f,
                "Type mismatch: cannot apply '{}' to {} and {}",
                operator, left, right
            ),
            ErrorKind::UnknownProperty { property, found } => {
                write!(f, "unknown property '{}' on {}", property, found)
            }
            ErrorKind::InvalidRepeatCount { count } => {
                write!(f, "repeat count {} never terminates", count)
            }
            ErrorKind::CallDepthExceeded { limit } => {
                write!(f, "call depth exceeded the limit of {}", limit)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhaiError {
    pub kind: ErrorKind,
    pub span: Span,
    pub help: Option<String>,
}

impl BhaiError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn phase(&self) -> Phase {
        self.kind.phase()
    }

    /// 1-based source line the error points at.
    pub fn line(&self, source: &str) -> usize {
        let start = self.span.start.min(source.len());
        source.as_bytes()[..start].iter().filter(|&&b| b == b'\n').count() + 1
    }

    pub fn report(&self, source: &str, filename: Option<&str>, headline: &str) -> io::Result<()> {
        let filename = filename.unwrap_or("<repl>");

        let color = match self.phase() {
            Phase::Parse => Color::Yellow,
            Phase::Runtime => Color::Magenta,
        };

        let message = self.kind.to_string();
        let mut report_builder = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("{}: {}", self.phase().label().fg(color), headline))
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .eprint((filename, Source::from(source)))
    }
}

impl fmt::Display for BhaiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.phase().label(), self.kind)
    }
}

impl std::error::Error for BhaiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::mode::Mode;
    use crate::parser::{Parser, MAX_NESTING};

    fn parse_error(source: &str) -> BhaiError {
        match Parser::new(tokenize(source, Mode::Plain)).parse() {
            Ok(program) => panic!("{:?} parsed as {:?}", source, program),
            Err(error) => error,
        }
    }

    #[test]
    fn program_boundaries_have_their_own_kinds() {
        let error = parse_error("print: 1\nend:");
        assert!(matches!(error.kind, ErrorKind::MissingStart { .. }));
        let error = parse_error("start:\n  print: 1");
        assert!(matches!(error.kind, ErrorKind::MissingEnd { .. }));
    }

    #[test]
    fn messages_name_the_construct() {
        let error = parse_error("start:\n  x = (1\nend:");
        assert_eq!(error.phase(), Phase::Parse);
        assert!(
            error.to_string().contains("in parenthesized expression"),
            "{}",
            error
        );
    }

    #[test]
    fn nesting_limit_is_a_parse_error() {
        let error = BhaiError::new(
            ErrorKind::TooDeeplyNested { limit: MAX_NESTING },
            Span::new(0, 1),
        );
        assert_eq!(error.phase(), Phase::Parse);
        assert_eq!(error.to_string(), "Parse error: Nesting deeper than 256 levels");
    }
}
