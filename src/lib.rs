// BhaiLang Interpreter Library
//
// A small line-oriented scripting language with two keyword vocabularies,
// plain and colorful, sharing one lexer, parser and evaluator.

// Public modules
pub mod ast;
pub mod diagnostic;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod mode;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, Program, Stmt};
pub use diagnostic::{localize, Diagnostic};
pub use error::{BhaiError, ErrorKind, Span};
pub use evaluator::Evaluator;
pub use lexer::{tokenize, Lexer, SkippedLine, Token, TokenKind};
pub use mode::{example, example_names, find_example, keywords_for, KeywordTable, Mode};
pub use parser::Parser;
pub use runner::{ExecutionResult, Interpreter, InterpreterConfig};
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
