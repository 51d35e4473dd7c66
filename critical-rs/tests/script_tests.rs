//! End-to-end scripts through the public interpreter API.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use critical::script::Signal;
use critical::{BuiltinTable, Interpreter, Outcome, ScriptError};

fn run(src: &str) -> (Result<Outcome, ScriptError>, Vec<String>) {
    let mut interp = Interpreter::new(src).unwrap_or_else(|e| panic!("parse failed: {e}"));
    interp.capture_output();
    let out = interp.evaluate();
    (out, interp.take_output())
}

fn value(src: &str) -> String {
    run(src).0.unwrap_or_else(|e| panic!("{src:?} failed: {e}")).into_value()
}

// ── Substitution ──────────────────────────────────────────────────────────────

#[test]
fn bracket_result_is_spliced_into_string() {
    let (out, lines) = run("puts \"[expr 3 + 3]ab\"");
    assert_eq!(out.unwrap(), Outcome::Normal("6ab".into()));
    assert_eq!(lines, vec!["6ab"]);
}

#[test]
fn command_name_built_from_variables() {
    let (_, lines) = run("set a pu ; set b ts ; $a$b \"OK\"");
    assert_eq!(lines, vec!["OK"]);
}

#[test]
fn nested_brackets() {
    assert_eq!(value("expr [expr 1 + 2] * [expr [expr 2 * 2] - 1]"), "9");
}

#[test]
fn braces_defer_substitution() {
    assert_eq!(value("set x 1; set y {$x [expr 1 + 1]}"), "$x [expr 1 + 1]");
}

#[test]
fn braced_variable_names() {
    assert_eq!(value("set name world; set greeting \"hello ${name}!\""), "hello world!");
    assert_eq!(value("set my_var1 5; expr \"$my_var1\" + 1"), "6");
}

#[test]
fn bare_variable_words_end_at_non_letters() {
    // `$a1` outside quotes is two words, `$a` and `1`.
    assert_eq!(value("set a X; set a1 Y; append r $a1"), "X1");
    assert_eq!(value("set a X; set a1 Y; set r \"$a1\""), "Y");
}

// ── Variables ─────────────────────────────────────────────────────────────────

#[test]
fn decr_sequence() {
    assert_eq!(value("set a 10 ; decr a ; decr a 2; decr a; set a"), "6");
}

#[test]
fn incr_from_unset() {
    assert_eq!(value("incr a ; incr a 1; incr a"), "3");
}

#[test]
fn append_builds_strings() {
    assert_eq!(value("append s a; append s b c; set s"), "abc");
}

#[test]
fn unset_variable_reads_empty() {
    assert_eq!(value("set a 1; unset a; set a"), "");
}

// ── Control flow ──────────────────────────────────────────────────────────────

#[test]
fn while_loop_counts() {
    let (_, lines) = run("set i 0\nwhile {expr $i < 3} { puts $i; incr i }");
    assert_eq!(lines, vec!["0", "1", "2"]);
}

#[test]
fn for_loop_sums() {
    let src = "set sum 0\nfor {set i 1} {expr $i <= 10} {incr i} { set sum [expr $sum + $i] }\nset sum";
    assert_eq!(value(src), "55");
}

#[test]
fn break_and_continue() {
    let src = r#"
        set out ""
        for {set i 0} {expr $i < 10} {incr i} {
            if {expr $i == 2} { continue }
            if {expr $i == 5} { break }
            append out $i
        }
        set out
    "#;
    assert_eq!(value(src), "0134");
}

#[test]
fn if_else_branches() {
    assert_eq!(value("if {expr 1 > 2} { set r yes } else { set r no }"), "no");
    assert_eq!(value("if {expr 1 < 2} { set r yes } else { set r no }"), "yes");
    assert_eq!(value("if {expr 1 > 2} { set r yes }"), "");
}

#[test]
fn exit_inside_loop_stops_everything() {
    let src = r#"
        set i 0
        while {1} {
            incr i
            if {expr $i == 3} { exit 321 }
        }
        puts unreachable
    "#;
    let (out, lines) = run(src);
    assert_eq!(out.unwrap(), Outcome::Exit("321".into()));
    assert!(lines.is_empty());
}

#[test]
fn exit_inside_proc_stops_everything() {
    let (out, lines) = run("proc quit {} { exit 43 }\nquit\nputs unreachable");
    assert_eq!(out.unwrap(), Outcome::Exit("43".into()));
    assert!(lines.is_empty());
}

#[test]
fn exit_from_brackets_in_a_loop_in_a_proc() {
    let src = r#"
        proc f {} {
            while {1} { set x [expr 1 + [exit 43]] }
        }
        set y [f]
        puts unreachable
    "#;
    let (out, lines) = run(src);
    assert_eq!(out.unwrap(), Outcome::Exit("43".into()));
    assert!(lines.is_empty());
}

#[test]
fn top_level_return() {
    let (out, lines) = run("return 7\nputs unreachable");
    assert_eq!(out.unwrap(), Outcome::Return("7".into()));
    assert!(lines.is_empty());
}

#[test]
fn break_outside_loop_is_an_error() {
    assert!(matches!(run("break").0, Err(ScriptError::BreakOutsideLoop)));
    assert!(matches!(run("continue").0, Err(ScriptError::ContinueOutsideLoop)));
}

// ── Procedures ────────────────────────────────────────────────────────────────

#[test]
fn return_from_function() {
    assert_eq!(value("proc f {} { return 32; puts no }\nf"), "32");
}

#[test]
fn function_value_is_last_command() {
    assert_eq!(value("proc add {a b} { expr $a + $b }\nadd 2 3"), "5");
}

#[test]
fn recursive_factorial() {
    let src = r#"
        proc fact {n} {
            if {expr $n <= 1} { return 1 }
            expr $n * [fact [expr $n - 1]]
        }
        fact 10
    "#;
    assert_eq!(value(src), "3628800");
}

#[test]
fn function_arity_is_checked() {
    let (out, _) = run("proc f {a b} { expr $a + $b }\nf 1");
    match out {
        Err(ScriptError::FunctionArity { name, expected, got }) => {
            assert_eq!((name.as_str(), expected, got), ("f", 2, 1));
        }
        other => panic!("expected arity error, got {other:?}"),
    }
}

#[test]
fn function_scope_reads_and_updates_globals() {
    let src = r#"
        set g 1
        proc bump {} { set g [expr $g + 1]; set local 9 }
        bump
        bump
        set g
    "#;
    let mut interp = Interpreter::new(src).unwrap();
    interp.capture_output();
    assert_eq!(interp.evaluate().unwrap().into_value(), "3");
    assert_eq!(interp.get_var("local"), None);
}

#[test]
fn parameters_shadow_globals() {
    let src = "set x outer\nproc f {x} { set x inner }\nf arg\nset x";
    assert_eq!(value(src), "outer");
}

#[test]
fn break_escaping_proc_is_an_error() {
    let err = run("proc f {} { break }\nwhile {1} { f }").0.unwrap_err();
    assert!(matches!(err.root(), ScriptError::BreakOutsideLoop));
}

#[test]
fn proc_with_bad_body_fails_at_definition() {
    let (out, _) = run("proc f {} { puts \"open }");
    assert!(matches!(out.unwrap_err().root(), ScriptError::Parse { .. }));
}

// ── Errors and limits ─────────────────────────────────────────────────────────

#[test]
fn builtin_errors_name_the_command() {
    let err = run("expr 1 / 0").0.unwrap_err();
    assert_eq!(err.to_string(), "error invoking expr: division by zero");
    assert!(matches!(err.root(), ScriptError::DivisionByZero));
}

#[test]
fn unknown_command() {
    assert!(matches!(run("frobnicate 1 2").0, Err(ScriptError::UnknownCommand(n)) if n == "frobnicate"));
}

#[test]
fn runaway_recursion_is_stopped() {
    let mut interp = Interpreter::new("proc f {} { f }\nf").unwrap();
    interp.set_max_depth(64);
    assert!(matches!(interp.evaluate(), Err(ScriptError::RecursionLimit(64))));
}

#[test]
fn interrupt_flag_stops_infinite_loop() {
    let mut interp = Interpreter::new("while {1} { set a 1 }").unwrap();
    let flag = Arc::new(AtomicBool::new(true));
    interp.set_interrupt(flag);
    assert!(matches!(interp.evaluate(), Err(ScriptError::Interrupted)));
}

// ── Host embedding ────────────────────────────────────────────────────────────

#[test]
fn host_builtins_receive_expanded_arguments() {
    let mut interp = Interpreter::new("set n 4\nforward [expr $n * 10]\nturn 90").unwrap();
    interp.capture_output();
    interp
        .register_builtin("forward", |i: &mut Interpreter, args: &[String]| {
            i.write_line(&format!("forward {}", args.join(" ")))?;
            Ok(args[0].clone())
        })
        .unwrap();
    interp
        .register_builtin("turn", |_: &mut Interpreter, args: &[String]| {
            Ok(format!("turned {}", args[0]))
        })
        .unwrap();
    assert_eq!(interp.evaluate().unwrap(), Outcome::Normal("turned 90".into()));
    assert_eq!(interp.take_output(), vec!["forward 40"]);
}

#[test]
fn host_builtin_signals_propagate() {
    let mut interp = Interpreter::new("halt\nputs unreachable").unwrap();
    interp.capture_output();
    interp
        .register_builtin("halt", |_: &mut Interpreter, _: &[String]| {
            Err(Signal::Exit("9".into()))
        })
        .unwrap();
    assert_eq!(interp.evaluate().unwrap(), Outcome::Exit("9".into()));
    assert!(interp.take_output().is_empty());
}

#[test]
fn builtins_are_sealed_after_evaluation() {
    let mut interp = Interpreter::new("set a 1").unwrap();
    interp.evaluate().unwrap();
    let err = interp
        .register_builtin("late", |_: &mut Interpreter, _: &[String]| Ok(String::new()))
        .unwrap_err();
    assert!(matches!(err, ScriptError::BuiltinsSealed(_)));
}

#[test]
fn empty_builtin_table_knows_nothing() {
    let mut interp = Interpreter::with_builtins("set a 1", BuiltinTable::new()).unwrap();
    assert!(matches!(interp.evaluate(), Err(ScriptError::UnknownCommand(n)) if n == "set"));
}

#[test]
fn state_persists_between_evaluations() {
    let mut interp = Interpreter::new("incr counter").unwrap();
    interp.evaluate().unwrap();
    interp.evaluate().unwrap();
    assert_eq!(interp.get_var("counter"), Some("2"));
}
