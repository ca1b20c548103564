use crate::error::{BhaiError, ErrorKind};
use crate::lexer::TokenKind;
use crate::mode::Mode;

/// Category of a failure as shown to the user. Each category has one fixed
/// phrasing per mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    MissingStart,
    MissingEnd,
    MissingOpenBrace,
    MissingCloseBrace,
    /// Every other parse failure.
    MissingColon,
    UndefinedName,
    IndexOutOfBounds,
    InfiniteLoop,
    DivisionByZero,
    TypeMismatch,
    OutOfMemory,
    /// Raw `"<phase>: <message>"` text, wrapped as-is.
    Other(String),
}

impl Diagnostic {
    pub fn classify(error: &BhaiError) -> Self {
        match &error.kind {
            ErrorKind::MissingStart { .. } => Diagnostic::MissingStart,
            ErrorKind::MissingEnd { .. } => Diagnostic::MissingEnd,
            ErrorKind::Expected {
                expected: TokenKind::LeftBrace,
                ..
            } => Diagnostic::MissingOpenBrace,
            ErrorKind::Expected {
                expected: TokenKind::RightBrace,
                ..
            } => Diagnostic::MissingCloseBrace,
            ErrorKind::Expected { .. }
            | ErrorKind::ExpectedExpression { .. }
            | ErrorKind::UnexpectedToken { .. }
            | ErrorKind::TooDeeplyNested { .. } => Diagnostic::MissingColon,
            // Functions share the variable phrasing
            ErrorKind::UndefinedVariable { .. } | ErrorKind::UndefinedFunction { .. } => {
                Diagnostic::UndefinedName
            }
            ErrorKind::IndexOutOfBounds { .. } => Diagnostic::IndexOutOfBounds,
            ErrorKind::InvalidRepeatCount { .. } => Diagnostic::InfiniteLoop,
            ErrorKind::DivisionByZero => Diagnostic::DivisionByZero,
            ErrorKind::TypeMismatch { .. } => Diagnostic::TypeMismatch,
            ErrorKind::CallDepthExceeded { .. } => Diagnostic::OutOfMemory,
            ErrorKind::NotAList { .. } | ErrorKind::UnknownProperty { .. } => {
                Diagnostic::Other(error.to_string())
            }
        }
    }

    pub fn render(&self, mode: Mode) -> String {
        let (plain, colorful) = match self {
            Diagnostic::MissingStart => (
                "Error: 'start:' thi sharu karo - program must begin with start:",
                "Error: 'sharu:' thi sharu kar na! Kyan thi chalu karyo?",
            ),
            Diagnostic::MissingEnd => (
                "Error: 'end:' thi khatam karo - program must end with end:",
                "Error: 'samaapt:' thi khatam kar chodya!",
            ),
            Diagnostic::MissingOpenBrace => (
                "Error: Syntax gadbad che! Missing '{' after 'to'",
                "Error: Ae loda! Syntax gadbad che! '{' kyan che?",
            ),
            Diagnostic::MissingCloseBrace => (
                "Error: Bracket band karo - expected '}'",
                "Error: Bracket to band kar be! '}' bhuli gayo ke?",
            ),
            Diagnostic::MissingColon => (
                "Error: Semicolon ni jarur nathi, pan ':' bhuli gaya",
                "Error: Bhos! ':' to lakh chodya",
            ),
            Diagnostic::UndefinedName => (
                "Error: Variable 'naam' declare nathi - variable not declared",
                "Error: Loda 'naam' declare j nathi karyu! Pehla declare kar",
            ),
            Diagnostic::IndexOutOfBounds => (
                "Error: Array index range ni bahar che - index out of bounds",
                "Error: Index range ni bahar che loda!",
            ),
            Diagnostic::InfiniteLoop => (
                "Error: Infinite loop detect thayo - loop kadi nathi band thatu",
                "Error: Infinite loop ma fas gayo loda! Band kar!",
            ),
            Diagnostic::DivisionByZero => (
                "Error: Division by zero - zero thi divide nahi thai shake",
                "Error: Bhos! Zero thi divide? Gaand mara!",
            ),
            Diagnostic::TypeMismatch => (
                "Error: Type mismatch - string ne number sathe add nahi thai shake",
                "Error: String ne number sathe add kare che? Dimag che ke nahi?",
            ),
            Diagnostic::OutOfMemory => (
                "Error: Memory full thai gai - program motu che",
                "Error: Memory puri thai gai chodya! Ghanu motu program lakhyo che?",
            ),
            Diagnostic::Other(raw) => {
                return if mode.is_alternate() {
                    format!("Error: Ae loda! {}", raw)
                } else {
                    format!("Error: {}", raw)
                };
            }
        };

        if mode.is_alternate() {
            colorful.to_string()
        } else {
            plain.to_string()
        }
    }
}

/// User-facing text for `error` in the phrasing of `mode`.
pub fn localize(error: &BhaiError, mode: Mode) -> String {
    Diagnostic::classify(error).render(mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Construct, Span};

    fn error(kind: ErrorKind) -> BhaiError {
        BhaiError::new(kind, Span::new(0, 1))
    }

    #[test]
    fn division_by_zero_in_both_modes() {
        let error = error(ErrorKind::DivisionByZero);
        assert_eq!(
            localize(&error, Mode::Plain),
            "Error: Division by zero - zero thi divide nahi thai shake"
        );
        assert_eq!(
            localize(&error, Mode::Colorful),
            "Error: Bhos! Zero thi divide? Gaand mara!"
        );
    }

    #[test]
    fn undefined_functions_read_like_undefined_variables() {
        let variable = error(ErrorKind::UndefinedVariable {
            name: "nope".to_string(),
        });
        let function = error(ErrorKind::UndefinedFunction {
            name: "bolavo".to_string(),
        });
        for undefined in [&variable, &function] {
            assert_eq!(
                localize(undefined, Mode::Plain),
                "Error: Variable 'naam' declare nathi - variable not declared"
            );
            assert_eq!(
                localize(undefined, Mode::Colorful),
                "Error: Loda 'naam' declare j nathi karyu! Pehla declare kar"
            );
        }
    }

    #[test]
    fn braces_have_their_own_phrasing() {
        let open = error(ErrorKind::Expected {
            expected: TokenKind::LeftBrace,
            construct: Construct::Repeat,
            found: TokenKind::Print,
        });
        assert_eq!(Diagnostic::classify(&open), Diagnostic::MissingOpenBrace);

        let close = error(ErrorKind::Expected {
            expected: TokenKind::RightBrace,
            construct: Construct::Block,
            found: TokenKind::End,
        });
        assert_eq!(
            localize(&close, Mode::Colorful),
            "Error: Bracket to band kar be! '}' bhuli gayo ke?"
        );
    }

    #[test]
    fn other_parse_errors_ask_for_the_colon() {
        let cases = [
            ErrorKind::Expected {
                expected: TokenKind::Then,
                construct: Construct::Condition,
                found: TokenKind::LeftBrace,
            },
            ErrorKind::Expected {
                expected: TokenKind::LeftParen,
                construct: Construct::Condition,
                found: TokenKind::Number,
            },
            ErrorKind::Expected {
                expected: TokenKind::Identifier,
                construct: Construct::Declaration,
                found: TokenKind::Number,
            },
            ErrorKind::Expected {
                expected: TokenKind::RightBracket,
                construct: Construct::Index,
                found: TokenKind::End,
            },
            ErrorKind::ExpectedExpression {
                construct: Construct::Repeat,
                found: TokenKind::Times,
            },
            ErrorKind::UnexpectedToken {
                found: TokenKind::RightParen,
            },
        ];
        for kind in cases {
            let error = error(kind);
            assert_eq!(
                localize(&error, Mode::Plain),
                "Error: Semicolon ni jarur nathi, pan ':' bhuli gaya"
            );
            assert_eq!(localize(&error, Mode::Colorful), "Error: Bhos! ':' to lakh chodya");
        }
    }

    #[test]
    fn unclassified_errors_wrap_the_raw_message() {
        let unknown = error(ErrorKind::UnknownProperty {
            property: "size".to_string(),
            found: "list",
        });
        assert_eq!(
            localize(&unknown, Mode::Plain),
            "Error: Runtime error: unknown property 'size' on list"
        );
        assert_eq!(
            localize(&unknown, Mode::Colorful),
            "Error: Ae loda! Runtime error: unknown property 'size' on list"
        );

        let not_a_list = error(ErrorKind::NotAList {
            name: "x".to_string(),
            found: "number",
        });
        assert_eq!(
            localize(&not_a_list, Mode::Plain),
            "Error: Runtime error: x is not an array"
        );
    }
}
