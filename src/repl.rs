use crate::mode::{self, Mode};
use crate::runner::{ExecutionResult, Interpreter, InterpreterConfig};
use std::io::{self, BufRead, Write};

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Exit,
    Reset,
    SetMode(Mode),
    Example(String),
    Invalid(String),
    Source(String),
}

/// Commands are only recognised when no program is being buffered, except
/// `:reset` which always applies.
pub fn parse_command(line: &str, buffering: bool) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed == ":reset" {
        return ReplCommand::Reset;
    }
    if buffering {
        return ReplCommand::Source(line.to_string());
    }

    match trimmed {
        "exit" | "quit" => ReplCommand::Exit,
        _ => {
            if let Some(rest) = trimmed.strip_prefix(":mode") {
                match rest.parse::<Mode>() {
                    Ok(mode) => ReplCommand::SetMode(mode),
                    Err(message) => ReplCommand::Invalid(message),
                }
            } else if let Some(rest) = trimmed.strip_prefix(":example") {
                ReplCommand::Example(rest.trim().to_string())
            } else if trimmed.starts_with(':') {
                ReplCommand::Invalid(format!("unknown command '{}'", trimmed))
            } else {
                ReplCommand::Source(line.to_string())
            }
        }
    }
}

/// True when `line` closes a program, i.e. its first word is the end keyword
/// of `mode` (optionally followed by a colon).
pub fn is_program_end(line: &str, mode: Mode) -> bool {
    let end = mode.keywords().end;
    line.split_whitespace().next().map_or(false, |word| {
        word == end || word.strip_suffix(':') == Some(end)
    })
}

pub fn start(config: InterpreterConfig) {
    let mut interpreter = Interpreter::with_config(config);

    println!("BhaiLang v{}", env!("CARGO_PKG_VERSION"));
    print_banner(&interpreter);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "> " } else { ". " };
        print!("{}", prompt);
        if let Err(error) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", error);
            break;
        }

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                // Ctrl+D or end of piped input
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim_end_matches(['\r', '\n']);
                if buffer.is_empty() && line.trim().is_empty() {
                    continue;
                }

                match parse_command(line, !buffer.is_empty()) {
                    ReplCommand::Exit => {
                        println!("Aavjo!");
                        break;
                    }
                    ReplCommand::Reset => {
                        buffer.clear();
                        println!("Buffer cleared.");
                    }
                    ReplCommand::SetMode(mode) => {
                        interpreter.set_mode(mode.is_alternate());
                        print_banner(&interpreter);
                    }
                    ReplCommand::Example(name) => match interpreter.example(&name) {
                        Some(source) => {
                            println!("{}", source);
                            print_result(&interpreter.execute(source));
                        }
                        None => {
                            let names: Vec<_> = mode::example_names().collect();
                            eprintln!("Unknown example '{}'. Try one of: {}", name, names.join(", "));
                        }
                    },
                    ReplCommand::Invalid(message) => eprintln!("{}", message),
                    ReplCommand::Source(line) => {
                        buffer.push_str(&line);
                        buffer.push('\n');
                        if is_program_end(&line, interpreter.mode()) {
                            print_result(&interpreter.execute(&buffer));
                            buffer.clear();
                        }
                    }
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn print_banner(interpreter: &Interpreter) {
    let keywords = interpreter.mode().keywords();
    println!(
        "Mode: {}. Programs run from '{}:' to '{}:'. Type 'exit' to quit.",
        interpreter.mode(),
        keywords.start,
        keywords.end
    );
}

fn print_result(result: &ExecutionResult) {
    for line in &result.output {
        println!("{}", line);
    }
    if let Some(message) = &result.error {
        eprintln!("{}", message);
    }
}
