//! End-to-end tests: compile GILL source and evaluate it in the interpreter.

use gill_compiler::compile_source;
use gill_rt::{Interpreter, RuntimeError, Value};

/// Helper: parse and evaluate a program, returning its value.
fn run(source: &str) -> Value {
    let program = compile_source(source).expect("source should parse");
    let mut interp = Interpreter::new();
    interp.run(&program).expect("program should evaluate")
}

/// Helper: run and also capture printed output.
fn run_with_output(source: &str) -> (Value, Vec<String>) {
    let program = compile_source(source).expect("source should parse");
    let mut interp = Interpreter::new();
    let value = interp.run(&program).expect("program should evaluate");
    (value, interp.output)
}

/// Helper: run a program that must fail, returning the error.
fn run_err(source: &str) -> RuntimeError {
    let program = compile_source(source).expect("source should parse");
    let mut interp = Interpreter::new();
    interp.run(&program).expect_err("program should fail")
}

// ─── The reference scenarios ───

#[test]
fn e2e_define_assign_out() {
    let (_, output) = run_with_output(
        r#"
define n int 21
assign n n * 2
out n
"#,
    );
    assert_eq!(output, vec!["42"]);
}

#[test]
fn e2e_string_concatenation() {
    let (_, output) = run_with_output(
        r#"
define s string "hi"
define t string s + " there"
out t
"#,
    );
    assert_eq!(output, vec!["hi there"]);
}

#[test]
fn e2e_function_call() {
    let (_, output) = run_with_output(
        r#"
function int add(int a, int b) { return a + b }
out exec add(2, 3)
"#,
    );
    assert_eq!(output, vec!["5"]);
}

#[test]
fn e2e_foreach_over_array() {
    let (_, output) = run_with_output(
        r#"
define a[3] int [10, 20, 30]
foreach (define x int : a) { out x }
"#,
    );
    assert_eq!(output, vec!["10", "20", "30"]);
}

#[test]
fn e2e_for_loop() {
    let (_, output) = run_with_output("for (define i int 0, i < 3, i++) { out i }");
    assert_eq!(output, vec!["0", "1", "2"]);
}

#[test]
fn e2e_if_else() {
    let (_, output) = run_with_output(
        r#"
define x int 1
if x == 1 { out "y" } else { out "n" }
"#,
    );
    assert_eq!(output, vec!["y"]);
}

#[test]
fn e2e_try_catch_finally() {
    let (_, output) = run_with_output(
        r#"
try { define x int "bad" } catch { out "caught" } finally { out "fin" }
"#,
    );
    assert_eq!(output, vec!["caught", "fin"]);
}

// ─── Arithmetic and associativity ───

#[test]
fn e2e_subtraction_chains_left() {
    assert_eq!(run("10 - 3 - 2"), Value::Int(5));
}

#[test]
fn e2e_division_chains_left() {
    // `/` is true division; chaining still evaluates to 1.
    assert_eq!(run("10 / 2 / 5"), Value::Float(1.0));
    assert_eq!(run("10 / 2 / 5"), Value::Int(1)); // cross-numeric equality
}

#[test]
fn e2e_precedence() {
    assert_eq!(run("1 + 2 * 3"), Value::Int(7));
    assert_eq!(run("10 // 3"), Value::Int(3));
    assert_eq!(run("10 % 3"), Value::Int(1));
}

#[test]
fn e2e_division_by_zero_is_catchable() {
    let (_, output) = run_with_output(
        r#"
define d int 0
try { out 1 / d } catch { out "div" }
"#,
    );
    assert_eq!(output, vec!["div"]);
}

// ─── Booleans ───

#[test]
fn e2e_boolean_operators() {
    assert_eq!(run("true && false"), Value::Bool(false));
    assert_eq!(run("true || false"), Value::Bool(true));
    assert_eq!(run("!true"), Value::Bool(false));
    assert_eq!(run("1 < 2 && 3 > 2"), Value::Bool(true));
}

#[test]
fn e2e_and_evaluates_both_operands() {
    let (_, output) = run_with_output(
        r#"
function bool side() {
    out "evaluated"
    return true
}
define r bool false && exec side()
out r
"#,
    );
    assert_eq!(output, vec!["evaluated", "false"]);
}

// ─── Definitions and typing ───

#[test]
fn e2e_assign_to_undefined_is_name_error() {
    let err = run_err("assign x 2");
    assert_eq!(err.kind(), "NameError");
}

#[test]
fn e2e_define_type_mismatch() {
    let err = run_err(r#"define x int "hi""#);
    assert_eq!(err.kind(), "TypeError");
}

#[test]
fn e2e_char_accepts_only_one_character() {
    let err = run_err(r#"define c char "ab""#);
    assert_eq!(err.kind(), "TypeError");
    assert_eq!(run(r#"define c char "a""#), Value::Str("a".into()));
    assert_eq!(run("define c char 'x'\nout c"), Value::Char('x'));
}

#[test]
fn e2e_reassign_keeps_declared_type() {
    let err = run_err("define x int 1\nassign x 2.5");
    assert_eq!(err.kind(), "TypeError");
}

// ─── Arrays ───

#[test]
fn e2e_array_access_and_display() {
    let (_, output) = run_with_output(
        r#"
define a[3] int [10, 20, 30]
out a[1]
out a
"#,
    );
    assert_eq!(output, vec!["20", "[10, 20, 30]"]);
}

#[test]
fn e2e_array_index_out_of_bounds() {
    let err = run_err("define a[3] int [1, 2, 3]\na[3]");
    assert_eq!(err.kind(), "IndexError");
}

#[test]
fn e2e_array_element_type_mismatch() {
    let err = run_err(r#"define a[3] int [1, 2, "x"]"#);
    assert_eq!(err.kind(), "TypeError");
}

#[test]
fn e2e_array_literal_shorter_than_declared_size() {
    let err = run_err("define a[3] int [1, 2]");
    assert_eq!(err.kind(), "ValueError");
}

#[test]
fn e2e_index_must_be_integer() {
    let err = run_err(r#"define a[2] int [1, 2]
a["no"]"#);
    assert_eq!(err.kind(), "TypeError");
}

// ─── Scoping ───

#[test]
fn e2e_loop_iterator_not_visible_after_for() {
    let err = run_err("for (define i int 0, i < 3, i++) { out i }\nout i");
    assert_eq!(err.kind(), "NameError");
}

#[test]
fn e2e_loop_iterator_not_visible_after_foreach() {
    let err = run_err("define a[2] int [1, 2]\nforeach (define x int : a) { out x }\nout x");
    assert_eq!(err.kind(), "NameError");
}

#[test]
fn e2e_loop_body_sees_enclosing_scope() {
    let (_, output) = run_with_output(
        r#"
define nums[3] int [1, 2, 3]
define total int 0
foreach (define x int : nums) { assign total total + x }
out total
"#,
    );
    assert_eq!(output, vec!["6"]);
}

#[test]
fn e2e_while_loop() {
    let (_, output) = run_with_output(
        r#"
define n int 3
while n > 0 {
    out n
    assign n n - 1
}
"#,
    );
    assert_eq!(output, vec!["3", "2", "1"]);
}

// ─── Functions ───

#[test]
fn e2e_missing_argument_is_type_error() {
    let err = run_err("function int add(int a, int b) { return a + b }\nexec add(1)");
    assert_eq!(err.kind(), "TypeError");
}

#[test]
fn e2e_extra_argument_is_type_error() {
    let err = run_err("function int add(int a, int b) { return a + b }\nexec add(1, 2, 3)");
    assert_eq!(err.kind(), "TypeError");
}

#[test]
fn e2e_function_without_return_yields_last_statement() {
    let (_, output) = run_with_output(
        r#"
function int forty_two() { 42 }
out exec forty_two()
"#,
    );
    assert_eq!(output, vec!["42"]);
}

#[test]
fn e2e_return_terminates_enclosing_function_not_just_loop() {
    let (_, output) = run_with_output(
        r#"
function int first_above(int limit) {
    for (define i int 0, i < 100, i++) {
        if i > limit { return i }
    }
    return 0 - 1
}
out exec first_above(5)
"#,
    );
    assert_eq!(output, vec!["6"]);
}

#[test]
fn e2e_return_at_top_level_is_runtime_error() {
    let err = run_err("return 1");
    assert_eq!(err.kind(), "RuntimeError");
}

#[test]
fn e2e_return_is_not_caught_by_try_catch() {
    let (_, output) = run_with_output(
        r#"
function int f() {
    try { return 1 } catch { out "caught" } finally { out "fin" }
    return 2
}
out exec f()
"#,
    );
    assert_eq!(output, vec!["fin", "1"]);
}

#[test]
fn e2e_finally_runs_on_success() {
    let (_, output) = run_with_output(r#"try { out "ok" } catch { out "no" } finally { out "fin" }"#);
    assert_eq!(output, vec!["ok", "fin"]);
}

#[test]
fn e2e_function_sees_globals_through_defining_env() {
    let (_, output) = run_with_output(
        r#"
define base int 10
function int plus_base(int n) { return n + base }
out exec plus_base(5)
"#,
    );
    assert_eq!(output, vec!["15"]);
}

#[test]
fn e2e_recursion() {
    let (_, output) = run_with_output(
        r#"
function int fact(int n) {
    if n <= 1 { return 1 }
    return n * exec fact(n - 1)
}
out exec fact(6)
"#,
    );
    assert_eq!(output, vec!["720"]);
}

// ─── Switch ───

#[test]
fn e2e_switch_matches_first_case_without_fallthrough() {
    let (_, output) = run_with_output(
        r#"
define x int 2
switch (x) {
    case (1) { out "one" }
    case (2) { out "two" }
    default { out "many" }
}
"#,
    );
    assert_eq!(output, vec!["two"]);
}

#[test]
fn e2e_switch_default_when_no_case_matches() {
    let (_, output) = run_with_output(
        r#"
define x int 9
switch (x) {
    case (1) { out "one" }
    default { out "many" }
}
"#,
    );
    assert_eq!(output, vec!["many"]);
}

// ─── Casts ───

#[test]
fn e2e_casts() {
    assert_eq!(run(r#"(int)"12""#), Value::Int(12));
    assert_eq!(run("(int)3.9"), Value::Int(3));
    assert_eq!(run("(string)true"), Value::Str("true".into()));
    assert_eq!(run("(bool)0"), Value::Bool(false));
    assert_eq!(run(r#"(char)"abc""#), Value::Char('a'));
    assert_eq!(run("(void)1"), Value::Null);
    assert_eq!(run("(float)2"), Value::Float(2.0));
}

#[test]
fn e2e_bad_int_cast_is_value_error() {
    let err = run_err(r#"(int)"not a number""#);
    assert_eq!(err.kind(), "ValueError");
}

// ─── Increment and decrement ───

#[test]
fn e2e_inc_dec_statements() {
    let (_, output) = run_with_output(
        r#"
define n int 5
n++
n++
n--
out n
"#,
    );
    assert_eq!(output, vec!["6"]);
}

#[test]
fn e2e_inc_requires_numeric_binding() {
    let err = run_err(r#"define s string "x"
s++"#);
    assert_eq!(err.kind(), "TypeError");
}

// ─── Modules ───

#[test]
fn e2e_import_unknown_module() {
    let err = run_err("import nosuch");
    assert_eq!(err.kind(), "ImportError");
}

#[test]
fn e2e_stdlib_functions_need_qualification() {
    let err = run_err("import stdlib\nexec printfr(\"x\")");
    assert_eq!(err.kind(), "NameError");
}

#[test]
fn e2e_stdlib_printfr() {
    let (_, output) = run_with_output(
        r#"
import stdlib
define line string exec stdlib::printfr("{} and {}", 1, 2)
out line
"#,
    );
    // printfr prints directly to stdout; only `out` is captured.
    assert_eq!(output, vec!["1 and 2"]);
}

#[test]
fn e2e_stdlib_str_len_and_pow() {
    assert_eq!(
        run("import stdlib\nexec stdlib::str_len(\"hello\")"),
        Value::Int(5)
    );
    assert_eq!(
        run("import stdlib\nexec stdlib::pow(2, 8)"),
        Value::Float(256.0)
    );
}

#[test]
fn e2e_reimport_returns_cached_handle() {
    let (value, _) = run_with_output(
        r#"
import stdlib
import stdlib
exec stdlib::str_len("ok")
"#,
    );
    assert_eq!(value, Value::Int(2));
}

#[test]
fn e2e_scope_ref_yields_native_ref() {
    let (value, _) = run_with_output("import stdlib\nstdlib::version");
    let shown = value.to_string();
    assert_eq!(shown, "<native variable 'stdlib.version'>");
}

#[test]
fn e2e_scope_ref_missing_member() {
    let err = run_err("import stdlib\nstdlib::nope");
    assert_eq!(err.kind(), "NameError");
}

#[test]
fn e2e_namespace_functions_resolve_via_scope() {
    let (_, output) = run_with_output(
        r#"
namespace math {
    function int double(int n) { return n * 2 }
}
out exec math::double(21)
"#,
    );
    assert_eq!(output, vec!["42"]);
}

#[test]
fn e2e_namespace_functions_are_isolated() {
    let err = run_err(
        r#"
namespace math {
    function int double(int n) { return n * 2 }
}
exec double(21)
"#,
    );
    assert_eq!(err.kind(), "NameError");
}

// ─── Output forms ───

#[test]
fn e2e_output_canonical_forms() {
    let (_, output) = run_with_output(
        r#"
out true
out false
out (void)0
out 2.5
out 'c'
"#,
    );
    assert_eq!(output, vec!["true", "false", "null", "2.5", "c"]);
}

#[test]
fn e2e_output_value_is_the_emitted_value() {
    assert_eq!(run("out 42"), Value::Int(42));
}

#[test]
fn e2e_output_works_in_expression_position() {
    let (_, output) = run_with_output(
        r#"
define x int out 5
out x
"#,
    );
    assert_eq!(output, vec!["5", "5"]);
}

#[test]
fn e2e_string_plus_number_concatenates() {
    let (_, output) = run_with_output(r#"out "n = " + 3"#);
    assert_eq!(output, vec!["n = 3"]);
}
