use anyhow::{bail, Context, Result};
use bhailang::{example_names, find_example, repl, runner, InterpreterConfig, Mode};
use clap::{value_parser, Arg, ArgAction, Command};
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};
use std::fs;
use std::path::Path;

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    SimpleLogger::init(filter, LogConfig::default()).context("failed to initialize logger")
}

fn main() -> Result<()> {
    let matches = Command::new("bhailang")
        .about("Gujarati-flavoured toy language in plain and colorful modes")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .help("Keyword vocabulary and error phrasing")
                .value_parser(["plain", "colorful"])
                .default_value("plain"),
        )
        .arg(
            Arg::new("example")
                .long("example")
                .value_name("NAME")
                .help("Print a built-in example program for the selected mode"),
        )
        .arg(
            Arg::new("max-call-depth")
                .long("max-call-depth")
                .value_name("N")
                .help("Maximum nesting of function calls")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Log lexer and interpreter decisions to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("debug"))?;

    let mut config = InterpreterConfig::default();
    if let Some(mode) = matches.get_one::<String>("mode") {
        config.mode = mode.parse::<Mode>().map_err(anyhow::Error::msg)?;
    }
    if let Some(depth) = matches.get_one::<usize>("max-call-depth") {
        config.max_call_depth = *depth;
    }

    if let Some(name) = matches.get_one::<String>("example") {
        let Some(example) = find_example(name) else {
            let names: Vec<_> = example_names().collect();
            bail!("unknown example '{}', expected one of: {}", name, names.join(", "));
        };
        println!("{}", example.source(config.mode));
        return Ok(());
    }

    match matches.get_one::<String>("file") {
        Some(file_path) if !matches.get_flag("interactive") => run_file(file_path, &config),
        _ => {
            repl::start(config);
            Ok(())
        }
    }
}

fn run_file(path: &str, config: &InterpreterConfig) -> Result<()> {
    let path = Path::new(path);
    if !path.exists() {
        bail!("file '{}' not found", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let filename = path.display().to_string();

    if !runner::run(&source, Some(&filename), config) {
        std::process::exit(1);
    }
    Ok(())
}
