use crate::diagnostic::localize;
use crate::error::BhaiError;
use crate::evaluator::{Evaluator, DEFAULT_MAX_CALL_DEPTH};
use crate::lexer::Lexer;
use crate::mode::{self, Mode};
use crate::parser::Parser;
use log::{debug, info, warn};
use std::thread;

/// Stack for the thread that parses and evaluates a program. Recursion in a
/// program becomes native recursion in the evaluator, so the default call
/// depth needs far more than a test or REPL thread provides.
const PIPELINE_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Outcome of one [`Interpreter::execute`] call.
///
/// On failure `output` is empty, even if the program printed lines before
/// the error, and `error` holds the localized message.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: Vec<String>,
    pub error: Option<String>,
}

impl ExecutionResult {
    fn succeeded(output: Vec<String>) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            output: Vec::new(),
            error: Some(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub mode: Mode,
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Plain,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Entry point for running programs. Holds only the configuration; every
/// `execute` builds its own lexer, parser and evaluator, so runs never see
/// each other's variables or functions.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self { config }
    }

    pub fn set_mode(&mut self, is_alternate: bool) {
        self.config.mode = Mode::from_flag(is_alternate);
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Source of the named example in the active mode.
    pub fn example(&self, name: &str) -> Option<&'static str> {
        mode::example(name, self.config.mode)
    }

    pub fn execute(&self, source: &str) -> ExecutionResult {
        match self.run_pipeline(source) {
            Ok(output) => {
                info!("program finished, {} line(s) printed", output.len());
                ExecutionResult::succeeded(output)
            }
            Err(error) => {
                info!("program failed: {}", error);
                ExecutionResult::failed(localize(&error, self.config.mode))
            }
        }
    }

    /// Lex, parse and evaluate `source`, keeping the structured error.
    ///
    /// Runs on a dedicated thread with a large stack, falling back to the
    /// calling thread if one cannot be spawned.
    pub fn run_pipeline(&self, source: &str) -> Result<Vec<String>, BhaiError> {
        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("bhailang-eval".to_string())
                .stack_size(PIPELINE_STACK_SIZE)
                .spawn_scoped(scope, || self.run_stages(source));

            match worker {
                Ok(handle) => match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                },
                Err(error) => {
                    warn!("could not spawn evaluation thread ({}), running inline", error);
                    self.run_stages(source)
                }
            }
        })
    }

    fn run_stages(&self, source: &str) -> Result<Vec<String>, BhaiError> {
        let mut lexer = Lexer::new(source.to_string(), self.config.mode);
        let tokens = lexer.scan_tokens();
        for skipped in lexer.skipped_lines() {
            debug!("line {} ignored: {:?}", skipped.line, skipped.reason);
        }

        let mut parser = Parser::new(tokens);
        let program = parser.parse()?;

        let mut evaluator = Evaluator::with_max_call_depth(self.config.max_call_depth);
        evaluator.evaluate_program(&program)
    }
}

/// Runs a script for the command line: output lines go to stdout, a failure
/// prints the localized message and a source report to stderr.
///
/// Returns whether the program succeeded.
pub fn run(source: &str, filename: Option<&str>, config: &InterpreterConfig) -> bool {
    let interpreter = Interpreter::with_config(*config);

    match interpreter.run_pipeline(source) {
        Ok(output) => {
            for line in output {
                println!("{}", line);
            }
            true
        }
        Err(error) => {
            let message = localize(&error, config.mode);
            eprintln!("{}", message);
            if let Err(io_error) = error.report(source, filename, &message) {
                debug!("could not render error report: {}", io_error);
            }
            false
        }
    }
}
