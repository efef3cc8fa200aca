use jack_compiler::{
    compile_str, compile_str_with,
    error::{LexErrorKind, SemanticReason},
    lex::tokenize,
    tokens::TokenKind,
    CompileError, CompilerConf,
};
use std::collections::HashSet;

const MAIN: &str = include_str!("Main.jack");
const POINT: &str = include_str!("Point.jack");
const COUNTER: &str = include_str!("Counter.jack");

fn compile_lines(source: &str) -> Vec<String> {
    match compile_str(source) {
        Ok(unit) => unit.lines().collect(),
        Err(err) => panic!("{}", err),
    }
}

fn compile_err(source: &str) -> CompileError {
    match compile_str(source) {
        Ok(unit) => panic!("expected error, compiled:\n{}", unit),
        Err(err) => err,
    }
}

/// Position of the first occurrence of `needle`.
fn position_of(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|line| line == needle)
        .unwrap_or_else(|| panic!("missing {:?} in {:#?}", needle, lines))
}

#[test]
fn test_empty_function() {
    let unit = compile_str("class Main { function void main() { return; } }").unwrap();

    assert_eq!(unit.class_name, "Main");
    assert_eq!(unit.to_string(), "function Main.main 0\npush constant 0\nreturn\n");
}

#[test]
fn test_constructor() {
    let lines = compile_lines(
        "class P { field int x, y; constructor P new(int ax, int ay) { let x = ax; let y = ay; return this; } }",
    );

    assert_eq!(
        lines,
        [
            "function P.new 0",
            "push constant 2",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push argument 1",
            "pop this 1",
            "push pointer 0",
            "return",
        ]
    );
}

#[test]
fn test_constructor_always_returns_object() {
    let cases = [
        ("return;", vec![]),
        ("return this;", vec![]),
        ("return 7;", vec!["push constant 7", "pop temp 0"]),
        ("return x;", vec!["push this 0", "pop temp 0"]),
        ("return this + 1;", vec!["push pointer 0", "push constant 1", "add", "pop temp 0"]),
    ];

    for (statement, discarded) in cases {
        let source = format!("class P {{ field int x; constructor P new() {{ {statement} }} }}");
        let lines = compile_lines(&source);

        let mut expected = vec!["function P.new 0", "push constant 1", "call Memory.alloc 1", "pop pointer 0"];
        expected.extend(discarded);
        expected.extend(["push pointer 0", "return"]);
        assert_eq!(lines, expected, "{}", statement);
    }
}

#[test]
fn test_constructor_calls_own_method() {
    let lines = compile_lines(
        "class P {
            field int x;
            constructor P new() { do init(); return this; }
            method void init() { let x = 5; return; }
        }",
    );

    let end = position_of(&lines, "function P.init 0");
    assert_eq!(
        &lines[..end],
        [
            "function P.new 0",
            "push constant 1",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push pointer 0",
            "call P.init 1",
            "pop temp 0",
            "push pointer 0",
            "return",
        ]
    );
}

#[test]
fn test_nested_control_flow_labels() {
    let lines = compile_lines(
        "class N {
            function void f() {
                var int i;
                while (i) {
                    if (i) {
                        while (i) { let i = i - 1; }
                    }
                }
                return;
            }
        }",
    );

    assert_eq!(
        lines,
        [
            "function N.f 1",
            "label WHILE_EXP0",
            "push local 0",
            "not",
            "if-goto WHILE_END0",
            "push local 0",
            "if-goto IF_TRUE1",
            "goto IF_FALSE1",
            "label IF_TRUE1",
            "label WHILE_EXP2",
            "push local 0",
            "not",
            "if-goto WHILE_END2",
            "push local 0",
            "push constant 1",
            "sub",
            "pop local 0",
            "goto WHILE_EXP2",
            "label WHILE_END2",
            "label IF_FALSE1",
            "goto WHILE_EXP0",
            "label WHILE_END0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_counter_class() {
    let lines = compile_lines(COUNTER);

    #[rustfmt::skip]
    let expected = [
        // new
        "function Counter.new 0",
        "push constant 2",
        "call Memory.alloc 1",
        "pop pointer 0",
        "push constant 0",
        "pop this 0",
        "push constant 0",
        "not",
        "pop this 1",
        "push pointer 0",
        "return",
        // tick
        "function Counter.tick 0",
        "push argument 0",
        "pop pointer 0",
        "push this 1",
        "if-goto IF_TRUE0",
        "goto IF_FALSE0",
        "label IF_TRUE0",
        "push pointer 0",
        "push constant 1",
        "call Counter.increment 2",
        "pop temp 0",
        "label IF_FALSE0",
        "push this 1",
        "not",
        "if-goto IF_TRUE1",
        "goto IF_FALSE1",
        "label IF_TRUE1",
        "push constant 1",
        "neg",
        "pop this 0",
        "label IF_FALSE1",
        "push constant 0",
        "return",
        // increment
        "function Counter.increment 0",
        "push argument 0",
        "pop pointer 0",
        "push this 0",
        "push argument 1",
        "add",
        "pop this 0",
        "push constant 0",
        "return",
        // isEven
        "function Counter.isEven 0",
        "push argument 0",
        "pop pointer 0",
        "push this 0",
        "push constant 1",
        "and",
        "push constant 0",
        "eq",
        "return",
    ];

    assert_eq!(lines, expected);
}

#[test]
fn test_function_and_local_counts() {
    let lines = compile_lines(POINT);
    let functions: Vec<&str> = lines
        .iter()
        .filter(|line| line.starts_with("function "))
        .map(String::as_str)
        .collect();

    assert_eq!(
        functions,
        [
            "function Point.new 0",
            "function Point.getX 0",
            "function Point.getY 0",
            "function Point.plus 0",
            "function Point.distanceSquared 2",
            "function Point.getPointCount 0",
            "function Point.dispose 0",
        ]
    );

    let lines = compile_lines(MAIN);
    assert_eq!(lines[0], "function Main.main 4");
    assert_eq!(lines.iter().filter(|line| line.starts_with("function ")).count(), 1);
}

#[test]
fn test_constructor_allocates_fields_only() {
    let lines = compile_lines(POINT);

    // The static doesn't count towards the object size.
    assert_eq!(&lines[1..4], ["push constant 2", "call Memory.alloc 1", "pop pointer 0"]);

    let start = position_of(&lines, "function Point.new 0");
    let end = position_of(&lines, "function Point.getX 0");
    let body = &lines[start..end];
    assert!(body.contains(&"push static 0".to_owned()));
    assert!(body.contains(&"pop static 0".to_owned()));
}

#[test]
fn test_method_calls() {
    let lines = compile_lines(POINT);

    // other.getX() pushes the receiver, typed as Point.
    let start = position_of(&lines, "function Point.plus 0");
    let body = &lines[start..];
    assert_eq!(
        &body[..8],
        [
            "function Point.plus 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "push argument 1",
            "call Point.getX 1",
            "add",
            "push this 1",
        ]
    );
    assert!(body.contains(&"call Point.new 2".to_owned()));

    // A class name qualifies a plain call.
    let start = position_of(&lines, "function Point.dispose 0");
    assert_eq!(
        &lines[start..],
        [
            "function Point.dispose 0",
            "push argument 0",
            "pop pointer 0",
            "push pointer 0",
            "call Memory.deAlloc 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_function_calls_without_receiver() {
    let lines = compile_lines(
        "class Util {
            function int twice(int n) { return n + n; }
            function int quad(int n) { return twice(twice(n)); }
        }",
    );

    let start = position_of(&lines, "function Util.quad 0");
    assert_eq!(
        &lines[start..],
        [
            "function Util.quad 0",
            "push argument 0",
            "call Util.twice 1",
            "call Util.twice 1",
            "return",
        ]
    );
}

#[test]
fn test_array_assignment_order() {
    let lines = compile_lines(MAIN);

    // let a[i] = Keyboard.readInt(...);
    let store = position_of(&lines, "pop that 0");
    assert_eq!(
        &lines[store - 5..=store],
        [
            "call Keyboard.readInt 1",
            "push local 2",
            "push local 0",
            "add",
            "pop pointer 1",
            "pop that 0",
        ]
    );

    // let sum = sum + a[i];
    let load = position_of(&lines, "push that 0");
    assert_eq!(
        &lines[load - 5..=load + 2],
        [
            "push local 3",
            "push local 2",
            "push local 0",
            "add",
            "pop pointer 1",
            "push that 0",
            "add",
            "pop local 3",
        ]
    );
}

#[test]
fn test_array_index_with_nested_element() {
    let lines = compile_lines(
        "class A {
            function void copy(Array a, Array b, int i) {
                let a[b[i]] = b[i + 1];
                return;
            }
        }",
    );

    assert_eq!(
        lines,
        [
            "function A.copy 0",
            // b[i + 1]
            "push argument 2",
            "push constant 1",
            "add",
            "push argument 1",
            "add",
            "pop pointer 1",
            "push that 0",
            // b[i]
            "push argument 2",
            "push argument 1",
            "add",
            "pop pointer 1",
            "push that 0",
            // a[...] =
            "push argument 0",
            "add",
            "pop pointer 1",
            "pop that 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_while_lowering() {
    let lines = compile_lines(MAIN);

    let top = position_of(&lines, "label WHILE_EXP0");
    assert_eq!(
        &lines[top..top + 6],
        [
            "label WHILE_EXP0",
            "push local 2",
            "push local 1",
            "lt",
            "not",
            "if-goto WHILE_END0",
        ]
    );

    let end = position_of(&lines, "label WHILE_END0");
    assert_eq!(lines[end - 1], "goto WHILE_EXP0");
    assert!(top < end);
}

#[test]
fn test_if_else_lowering() {
    let lines = compile_lines(MAIN);

    let branch = position_of(&lines, "if-goto IF_TRUE1");
    assert_eq!(&lines[branch - 3..branch], ["push local 1", "push constant 0", "gt"]);
    assert_eq!(&lines[branch + 1..branch + 3], ["goto IF_FALSE1", "label IF_TRUE1"]);

    let goto_end = position_of(&lines, "goto IF_END1");
    let label_false = position_of(&lines, "label IF_FALSE1");
    let label_end = position_of(&lines, "label IF_END1");
    assert_eq!(goto_end + 1, label_false);
    assert!(label_false < label_end);

    // sum / length
    let divide = position_of(&lines, "call Math.divide 2");
    assert_eq!(&lines[divide - 2..divide], ["push local 3", "push local 1"]);
}

#[test]
fn test_distinct_labels() {
    let lines = compile_lines(
        "class Main {
            function void main() {
                var int x;
                if (x) { let x = 1; }
                if (x) { let x = 2; } else { let x = 3; }
                while (x) { let x = x - 1; }
                return;
            }
            function void other() {
                if (true) { return; }
                return;
            }
        }",
    );

    let labels: Vec<&String> = lines.iter().filter(|line| line.starts_with("label ")).collect();
    let unique: HashSet<&String> = labels.iter().copied().collect();
    assert_eq!(labels.len(), unique.len(), "duplicate labels in {:#?}", labels);

    // Numbering continues across subroutines of the same class.
    assert!(lines.contains(&"label IF_TRUE3".to_owned()));
}

#[test]
fn test_string_constant() {
    let lines = compile_lines(r#"class S { function String hi() { return "Hi!"; } }"#);

    assert_eq!(
        lines,
        [
            "function S.hi 0",
            "push constant 3",
            "call String.new 1",
            "push constant 72",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
            "push constant 33",
            "call String.appendChar 2",
            "return",
        ]
    );
}

#[test]
fn test_no_operator_precedence() {
    let lines = compile_lines("class E { function int f() { return 1 + 2 * 3; } }");

    // (1 + 2) * 3
    assert_eq!(
        lines,
        [
            "function E.f 0",
            "push constant 1",
            "push constant 2",
            "add",
            "push constant 3",
            "call Math.multiply 2",
            "return",
        ]
    );
}

#[test]
fn test_keyword_constants() {
    let lines = compile_lines(
        "class K { method void f() { var K k; var boolean b; let b = false; let k = null; let k = this; return; } }",
    );

    assert_eq!(
        &lines[3..],
        [
            "push constant 0",
            "pop local 1",
            "push constant 0",
            "pop local 0",
            "push pointer 0",
            "pop local 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_custom_runtime_names() {
    let conf = CompilerConf {
        alloc: "Heap.alloc".into(),
        multiply: "Mul.mul".into(),
        ..CompilerConf::default()
    };
    let source = "class C { field int a; constructor C new() { let a = 6 * 7 / 2; return this; } }";
    let unit = compile_str_with(source, conf).unwrap();
    let lines: Vec<String> = unit.lines().collect();

    assert!(lines.contains(&"call Heap.alloc 1".to_owned()));
    assert!(lines.contains(&"call Mul.mul 2".to_owned()));
    assert!(lines.contains(&"call Math.divide 2".to_owned()));
    assert!(!lines.iter().any(|line| line.contains("Memory.alloc")));
}

#[test]
fn test_indices_restart_per_subroutine() {
    let lines = compile_lines(
        "class R {
            static int s;
            field int f;
            method void a(int p, int q) { var int x, y; let y = q; return; }
            function void b(int r) { var int z; let z = r; let s = z; return; }
        }",
    );

    assert!(lines.contains(&"function R.a 2".to_owned()));
    assert!(lines.contains(&"function R.b 1".to_owned()));

    // q is the second declared argument, after the receiver.
    assert_eq!(&lines[3..5], ["push argument 2", "pop local 1"]);

    let start = position_of(&lines, "function R.b 1");
    assert_eq!(
        &lines[start + 1..start + 5],
        ["push argument 0", "pop local 0", "push local 0", "pop static 0"]
    );
}

#[test]
fn test_tokens_round_trip() {
    for source in [MAIN, POINT, COUNTER] {
        let tokens = tokenize(source).unwrap();
        let joined = tokens
            .iter()
            .filter(|token| token.kind != TokenKind::EOS)
            .map(|token| token.lexeme.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let retokenized = tokenize(&joined).unwrap();

        let kinds = |tokens: &[jack_compiler::tokens::Token]| -> Vec<TokenKind> {
            tokens.iter().map(|token| token.kind).collect()
        };
        assert_eq!(kinds(&tokens), kinds(&retokenized));
    }
}

#[test]
fn test_undefined_variable() {
    let err = compile_err("class U { function void f() { let x = 1; return; } }");

    match err {
        CompileError::Semantic(err) => {
            assert_eq!(err.name, "x");
            assert_eq!(err.reason, SemanticReason::UndefinedVariable);
            assert_eq!((err.span.line, err.span.column), (1, 35));
        }
        _ => panic!("unexpected error: {}", err),
    }
}

#[test]
fn test_semantic_errors() {
    let cases = [
        (
            "class U { field int x; function int f() { return x; } }",
            SemanticReason::FieldInFunction,
        ),
        (
            "class U { function U f() { return this; } }",
            SemanticReason::ThisInFunction,
        ),
        (
            "class U { function void f() { var int n; do n.foo(); return; } }",
            SemanticReason::PrimitiveReceiver,
        ),
        (
            "class U { method void f() { do g(y); return; } }",
            SemanticReason::UndefinedVariable,
        ),
    ];

    for (source, reason) in cases {
        match compile_err(source) {
            CompileError::Semantic(err) => assert_eq!(err.reason, reason, "{}", source),
            err => panic!("unexpected error for {}: {}", source, err),
        }
    }
}

#[test]
fn test_syntax_errors() {
    let cases = [
        // Missing semicolon
        ("class S { function void f() { return } }", 1, 38),
        // Class variable after a subroutine
        ("class S { function void f() { return; } field int x; }", 1, 41),
        // Only one class per unit
        ("class S { } class T { }", 1, 13),
        // Not a statement
        ("class S { function void f() { var int x; x = 1; return; } }", 1, 42),
        // Missing class body
        ("class S", 1, 8),
    ];

    for (source, line, column) in cases {
        match compile_err(source) {
            CompileError::Syntax(err) => {
                assert_eq!((err.span.line, err.span.column), (line, column), "{}", source)
            }
            err => panic!("unexpected error for {}: {}", source, err),
        }
    }
}

#[test]
fn test_syntax_error_message() {
    let err = compile_err("class S { function void f() { let = 1; return; } }");

    assert_eq!(err.to_string(), "1:35: syntax error: expected variable name, found '='");
}

#[test]
fn test_duplicate_symbol() {
    let err = compile_err("class D { field int a; static boolean a; }");
    assert!(matches!(err, CompileError::DuplicateSymbol(ref err) if err.name == "a"));
    assert!(err.span().is_none());

    let err = compile_err("class D { function void f(int a) { var int a; return; } }");
    assert!(matches!(err, CompileError::DuplicateSymbol(_)));

    // Shadowing across scopes is allowed.
    compile_lines("class D { field int a; method void f(int a) { return; } }");
}

#[test]
fn test_lex_errors() {
    let cases = [
        ("class L { function void f() { return \"open; } }", LexErrorKind::UnterminatedString),
        ("class L { /* never closed", LexErrorKind::UnterminatedComment),
        ("class L { function int f() { return 32768; } }", LexErrorKind::IntegerOverflow("32768".into())),
        ("class L { function int f() { return 12ab; } }", LexErrorKind::MalformedNumber("12ab".into())),
        ("class L { # }", LexErrorKind::UnknownCharacter('#')),
        ("class L { function String f() { return \"caf\u{e9}\"; } }", LexErrorKind::UnknownCharacter('\u{e9}')),
    ];

    for (source, reason) in cases {
        match compile_err(source) {
            CompileError::Lex(err) => assert_eq!(err.reason, reason, "{}", source),
            err => panic!("unexpected error for {}: {}", source, err),
        }
    }
}

#[test]
fn test_max_integer() {
    let lines = compile_lines("class M { function int f() { return 32767; } }");
    assert_eq!(lines[1], "push constant 32767");
}
