//! Scripted end-to-end REPL sessions: feed a whole program through the
//! session driver and check what lands on the diagnostic stream.

use kaleido::backend::interp::Interpreter;
use kaleido::repl::Session;

fn run(input: &str) -> String {
    let mut out = Vec::new();
    let mut session = Session::new(Interpreter::new(), &mut out);
    session
        .run(input.chars())
        .expect("writing to a Vec cannot fail");
    drop(session);
    String::from_utf8(out).unwrap()
}

/// Byte offset of `needle` in `haystack`, for asserting output order.
fn pos(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("expected {needle:?} in output:\n{haystack}"))
}

#[test]
fn evaluates_expressions_with_precedence() {
    let out = run("1+2*3;");
    assert!(out.contains("Evaluated to 7"), "{out}");
}

#[test]
fn defines_then_calls_a_function() {
    let out = run("def foo(a b) a+b; foo(4, 5);");
    assert!(out.contains("Read a function definition: def foo(a b) (a + b)"));
    assert!(out.contains("Evaluated to 9"));
}

#[test]
fn extern_math_functions_evaluate() {
    let out = run("extern sin(x); sin(0);");
    assert!(out.contains("Read extern: sin(x)"));
    assert!(out.contains("Evaluated to 0"));
}

#[test]
fn comments_are_skipped() {
    let out = run("# this line is ignored\n1;");
    assert!(out.contains("Evaluated to 1"));
    assert!(!out.contains("Error"));
}

#[test]
fn lenient_number_lexing_survives_to_the_result() {
    // "1.2.3" lexes as a single number with the strtod value 1.2.
    let out = run("1.2.3;");
    assert!(out.contains("Evaluated to 1.2"), "{out}");
}

#[test]
fn syntax_error_does_not_kill_the_session() {
    let out = run("def f( ; 4+5;");
    let err = pos(&out, "Error: Expected ')' in prototype");
    let ok = pos(&out, "Evaluated to 9");
    assert!(err < ok, "recovery should happen before the next statement");
}

#[test]
fn redefinition_fails_but_original_still_works() {
    let out = run("def f(x) x; def f(x) x+1; f(2);");
    assert!(out.contains("Error: Function cannot be redefined: f"));
    // First definition is intact: f(2) still evaluates to 2, not 3.
    assert!(out.contains("Evaluated to 2"));
    assert!(!out.contains("Evaluated to 3"));
}

#[test]
fn extern_then_def_completes_a_declared_function() {
    let out = run("extern g(x); def g(x) x*2; g(3);");
    assert!(out.contains("Read extern: g(x)"));
    assert!(out.contains("Read a function definition: def g(x) (x * 2)"));
    assert!(out.contains("Evaluated to 6"));
}

#[test]
fn call_arity_mismatch_is_reported_and_recovered() {
    let out = run("def foo(a b) a+b; foo(1); foo(1, 2);");
    let err = pos(&out, "Error: Incorrect # arguments passed: foo takes 2, got 1");
    let ok = pos(&out, "Evaluated to 3");
    assert!(err < ok);
}

#[test]
fn unknown_variable_in_definition_is_reported() {
    let out = run("def f(x) y; 7;");
    assert!(out.contains("Error: Unknown variable name: y"));
    assert!(out.contains("Evaluated to 7"));
}

#[test]
fn unregistered_operator_splits_the_statement() {
    // '$' is not in the precedence table: the first expression ends at
    // `1`, the stray '$' is an error, and `2` evaluates on its own.
    let out = run("1 $ 2;");
    let first = pos(&out, "Evaluated to 1");
    let err = pos(&out, "Error: unknown token when expecting an expression");
    let second = pos(&out, "Evaluated to 2");
    assert!(first < err && err < second);
}

#[test]
fn each_statement_runs_in_a_fresh_unit() {
    let out = run("1+1; 2+2; 3+3;");
    assert!(out.contains("Evaluated to 2"));
    assert!(out.contains("Evaluated to 4"));
    assert!(out.contains("Evaluated to 6"));
}

#[test]
fn repeated_externs_refresh_the_declaration() {
    let out = run("extern h(a); extern h(a b); def usesh(p q) h(p, q);");
    assert!(out.contains("Read a function definition: def usesh(p q) h(p, q)"));
    assert!(!out.contains("Error"));
}

#[test]
fn session_ends_cleanly_at_end_of_input() {
    let out = run("1;");
    assert!(out.ends_with("ready> "), "{out:?}");
}
