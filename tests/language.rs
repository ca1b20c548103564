use bhailang::mode::EXAMPLES;
use bhailang::{ExecutionResult, Interpreter, InterpreterConfig, Mode};

fn run(source: &str) -> ExecutionResult {
    Interpreter::new().execute(source)
}

fn run_colorful(source: &str) -> ExecutionResult {
    let mut interpreter = Interpreter::new();
    interpreter.set_mode(true);
    interpreter.execute(source)
}

fn output(source: &str) -> Vec<String> {
    let result = run(source);
    assert!(result.success, "program failed: {:?}", result.error);
    result.output
}

fn error(source: &str) -> String {
    let result = run(source);
    assert!(!result.success, "program unexpectedly succeeded: {:?}", result.output);
    assert!(result.output.is_empty());
    result.error.unwrap_or_default()
}

#[test]
fn prints_a_string() {
    let result = run("start:\n  print: \"hi\"\nend:");
    assert_eq!(
        result,
        ExecutionResult {
            success: true,
            output: vec!["hi".to_string()],
            error: None,
        }
    );
}

#[test]
fn conditional_takes_the_then_branch() {
    let source = "start:
  umar = 25
  jo (umar > 18) to {
    print: \"adult\"
  } nahi to {
    print: \"minor\"
  }
end:";
    assert_eq!(output(source), vec!["adult"]);
    assert_eq!(output(&source.replace("25", "12")), vec!["minor"]);
}

#[test]
fn division_by_zero_is_reported_in_both_modes() {
    assert_eq!(
        error("start:\n  x = 5 / 0\nend:"),
        "Error: Division by zero - zero thi divide nahi thai shake"
    );
    let result = run_colorful("sharu:\n  loda ayia nakh x = 5 / 0\nsamaapt:");
    assert_eq!(
        result.error.as_deref(),
        Some("Error: Bhos! Zero thi divide? Gaand mara!")
    );
}

#[test]
fn undefined_names_use_the_placeholder_phrase() {
    assert_eq!(
        error("start:\n  print: nope\nend:"),
        "Error: Variable 'naam' declare nathi - variable not declared"
    );
    let result = run_colorful("sharu:\n  lakh chodya: nope\nsamaapt:");
    assert_eq!(
        result.error.as_deref(),
        Some("Error: Loda 'naam' declare j nathi karyu! Pehla declare kar")
    );
    let result = run_colorful("sharu:\n  bolavo(1)\nsamaapt:");
    assert_eq!(
        result.error.as_deref(),
        Some("Error: Loda 'naam' declare j nathi karyu! Pehla declare kar")
    );
}

#[test]
fn function_call_prints_once() {
    let source = "start:
  function bolavo(naam) {
    print: \"Kem cho \" + naam
  }
  bolavo(\"Bhai\")
end:";
    assert_eq!(output(source), vec!["Kem cho Bhai"]);
}

#[test]
fn every_example_reproduces_its_output() {
    for example in EXAMPLES {
        for mode in [Mode::Plain, Mode::Colorful] {
            let interpreter = Interpreter::with_config(InterpreterConfig {
                mode,
                ..InterpreterConfig::default()
            });
            let result = interpreter.execute(example.source(mode));
            assert!(
                result.success,
                "example '{}' failed in {} mode: {:?}",
                example.name, mode, result.error
            );
            assert_eq!(
                result.output,
                example.expected_output(mode),
                "example '{}' in {} mode",
                example.name,
                mode
            );
        }
    }
}

#[test]
fn both_vocabularies_agree() {
    let plain = "start:
  umar = 20
  list mitro = [\"A\", \"B\"]
  function kaho(x) {
    print: x + umar
  }
  repeat 2 vaar {
    kaho(mitro[1])
  }
  jo (mitro.length == 2) to { print: true }
end:";
    let colorful = "sharu:
  loda ayia nakh umar = 20
  loda ayia nakh list mitro = [\"A\", \"B\"]
  function kaho(x) {
    lakh chodya: x + umar
  }
  repeat 2 vaar {
    kaho(mitro[1])
  }
  jo (mitro.length == 2) to { lakh chodya: true }
samaapt:";
    let plain_result = run(plain);
    assert_eq!(plain_result.output, vec!["B20", "B20", "true"]);
    assert_eq!(plain_result, run_colorful(colorful));
}

#[test]
fn executing_twice_gives_the_same_result() {
    let interpreter = Interpreter::new();
    let source = "start:\n  x = 1\n  repeat 3 vaar { x = x * 2 }\n  print: x\nend:";
    let first = interpreter.execute(source);
    assert_eq!(first.output, vec!["8"]);
    assert_eq!(first, interpreter.execute(source));
}

#[test]
fn runs_do_not_share_variables_or_functions() {
    let interpreter = Interpreter::new();
    assert!(interpreter
        .execute("start:\n  x = 1\n  function f() { }\nend:")
        .success);
    assert!(!interpreter.execute("start:\n  print: x\nend:").success);
    assert_eq!(
        interpreter.execute("start:\n  f()\nend:").error.as_deref(),
        Some("Error: Variable 'naam' declare nathi - variable not declared")
    );
}

#[test]
fn repeat_counts() {
    assert!(output("start:\n  repeat 0 vaar { print: 1 }\nend:").is_empty());
    assert!(output("start:\n  repeat -2 vaar { print: 1 }\nend:").is_empty());
    // Fractional counts round up
    assert_eq!(output("start:\n  repeat 2.5 vaar { print: 1 }\nend:").len(), 3);
}

#[test]
fn unbounded_repeat_count_is_rejected() {
    let source = "start:
  x = 10
  repeat 9 vaar { x = x * x }
  repeat x vaar { print: 1 }
end:";
    assert_eq!(
        error(source),
        "Error: Infinite loop detect thayo - loop kadi nathi band thatu"
    );
}

#[test]
fn list_indexing_bounds() {
    let list = "  list mitro = [\"Ram\", \"Shyam\", \"Mohan\"]\n";
    assert_eq!(
        output(&format!("start:\n{}  print: mitro[2]\nend:", list)),
        vec!["Mohan"]
    );
    assert_eq!(
        output(&format!("start:\n{}  print: mitro[mitro.length - 1]\nend:", list)),
        vec!["Mohan"]
    );
    assert_eq!(
        error(&format!("start:\n{}  print: mitro[3]\nend:", list)),
        "Error: Array index range ni bahar che - index out of bounds"
    );
    assert_eq!(
        error(&format!("start:\n{}  print: mitro[-1]\nend:", list)),
        "Error: Array index range ni bahar che - index out of bounds"
    );
    assert_eq!(
        error(&format!("start:\n{}  print: mitro[0.5]\nend:", list)),
        "Error: Array index range ni bahar che - index out of bounds"
    );
}

#[test]
fn indexing_a_non_list_fails() {
    assert_eq!(
        error("start:\n  x = 5\n  print: x[0]\nend:"),
        "Error: Runtime error: x is not an array"
    );
}

#[test]
fn unbounded_recursion_hits_the_call_depth_limit() {
    let source = "start:
  function f(n) {
    f(n + 1)
  }
  f(0)
end:";
    assert_eq!(error(source), "Error: Memory full thai gai - program motu che");
    let colorful = source.replace("start:", "sharu:").replace("end:", "samaapt:");
    assert_eq!(
        run_colorful(&colorful).error.as_deref(),
        Some("Error: Memory puri thai gai chodya! Ghanu motu program lakhyo che?")
    );
}

#[test]
fn bounded_recursion_completes() {
    let source = "start:
  function countdown(n) {
    jo (n > 0) to {
      print: n
      countdown(n - 1)
    }
  }
  countdown(3)
end:";
    assert_eq!(output(source), vec!["3", "2", "1"]);
}

#[test]
fn deep_recursion_within_the_default_limit_completes() {
    let source = "start:
  function f(n) {
    jo (n > 0) to { f(n - 1) } nahi to { print: \"done\" }
  }
  f(DEPTH)
end:";
    for depth in ["150", "900", "998"] {
        assert_eq!(output(&source.replace("DEPTH", depth)), vec!["done"]);
    }
}

#[test]
fn callee_writes_stay_in_the_callee() {
    let source = "start:
  x = 1
  function f(x) {
    x = 5
    y = 9
    print: x
  }
  f(2)
  print: x
end:";
    assert_eq!(output(source), vec!["5", "1"]);
    assert_eq!(
        error(&source.replace("print: x\nend:", "print: y\nend:")),
        "Error: Variable 'naam' declare nathi - variable not declared"
    );
}

#[test]
fn callee_reads_caller_variables_and_missing_params_are_undefined() {
    let source = "start:
  y = 7
  function g(a, b) {
    print: y
    print: b
  }
  g(1)
end:";
    assert_eq!(output(source), vec!["7", "undefined"]);
}

#[test]
fn logical_operators_evaluate_both_sides() {
    assert_eq!(
        error("start:\n  x = false and nope\nend:"),
        "Error: Variable 'naam' declare nathi - variable not declared"
    );
    assert_eq!(
        output("start:\n  print: true and 0\n  print: 0 or \"a\"\n  print: not 0\nend:"),
        vec!["false", "true", "true"]
    );
}

#[test]
fn arithmetic_and_concatenation() {
    let source = "start:
  print: 1 + 2 * 3
  print: (1 + 2) * 3
  print: 7 / 2
  print: \"Total: \" + 3
  print: -4 + 1
  print: \"b\" > \"a\"
  print: 5 == \"5\"
end:";
    assert_eq!(
        output(source),
        vec!["7", "9", "3.5", "Total: 3", "-3", "true", "true"]
    );
}

#[test]
fn arithmetic_on_strings_is_a_type_mismatch() {
    assert_eq!(
        error("start:\n  x = \"a\" - 1\nend:"),
        "Error: Type mismatch - string ne number sathe add nahi thai shake"
    );
}

#[test]
fn lists_print_joined_and_resolve_names() {
    let source = "start:
  naam = \"Ram\"
  list a = [naam, 2, true]
  print: a
  print: a[0]
  print: a.length
end:";
    assert_eq!(output(source), vec!["Ram,2,true", "Ram", "3"]);
}

#[test]
fn unknown_property_uses_the_generic_message() {
    assert_eq!(
        error("start:\n  list a = [1]\n  print: a.size\nend:"),
        "Error: Runtime error: unknown property 'size' on list"
    );
}

#[test]
fn unrecognised_lines_are_skipped() {
    let source = "start:
  print: \"ok\"
  print: \"broken
  x = 1 @ 2
  print: 2
end:";
    assert_eq!(output(source), vec!["ok", "2"]);
}

#[test]
fn output_before_a_failure_is_discarded() {
    let result = run("start:\n  print: 1\n  print: 2\n  bolavo()\nend:");
    assert!(!result.success);
    assert!(result.output.is_empty());
    assert_eq!(
        result.error.as_deref(),
        Some("Error: Variable 'naam' declare nathi - variable not declared")
    );
}

#[test]
fn parse_errors_are_localized() {
    assert_eq!(
        error("print: 1\nend:"),
        "Error: 'start:' thi sharu karo - program must begin with start:"
    );
    assert_eq!(
        error("start:\n  print: 1"),
        "Error: 'end:' thi khatam karo - program must end with end:"
    );
    assert_eq!(
        error("start:\n  repeat 2 vaar {\n    print: 1\nend:"),
        "Error: Bracket band karo - expected '}'"
    );
    assert_eq!(
        error("start:\n  repeat 2 vaar\n    print: 1\n  }\nend:"),
        "Error: Syntax gadbad che! Missing '{' after 'to'"
    );
    let colon = "Error: Semicolon ni jarur nathi, pan ':' bhuli gaya";
    for source in [
        "start:\n  jo (true) {\n    print: 1\n  }\nend:",
        "start:\n  jo 1 > 0 to {\n    print: 1\n  }\nend:",
        "start:\n  = 2\nend:",
        "start:\n  list a = [1]\n  print: a[0\nend:",
        "start:\n  x 5\nend:",
    ] {
        assert_eq!(error(source), colon, "for {:?}", source);
    }
    assert_eq!(
        run_colorful("sharu:\n  loda ayia nakh 5 = 2\nsamaapt:").error.as_deref(),
        Some("Error: Bhos! ':' to lakh chodya")
    );
    assert_eq!(
        run_colorful("start:\nend:").error.as_deref(),
        Some("Error: 'sharu:' thi sharu kar na! Kyan thi chalu karyo?")
    );
}

#[test]
fn runaway_nesting_is_a_parse_error() {
    let nots = format!("start:\n  print: {}true\nend:", "not ".repeat(5000));
    assert_eq!(
        error(&nots),
        "Error: Semicolon ni jarur nathi, pan ':' bhuli gaya"
    );
    let parens = format!("start:\n  print: {}1{}\nend:", "(".repeat(5000), ")".repeat(5000));
    assert!(!run(&parens).success);
}

#[test]
fn interpreters_run_on_separate_threads() {
    let plain = Interpreter::new();
    let mut colorful = Interpreter::new();
    colorful.set_mode(true);

    std::thread::scope(|scope| {
        let a = scope.spawn(|| plain.execute("start:\n  print: 1\nend:"));
        let b = scope.spawn(|| colorful.execute("sharu:\n  lakh chodya: 2\nsamaapt:"));
        assert_eq!(a.join().map(|r| r.output).unwrap_or_default(), vec!["1"]);
        assert_eq!(b.join().map(|r| r.output).unwrap_or_default(), vec!["2"]);
    });
}
