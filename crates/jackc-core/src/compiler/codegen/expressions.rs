//! Expression lowering documentation.
//!
//! This module documents the expression translations performed in `mod.rs`.
//! Expressions compile to code that leaves exactly one value on the stack.
//!
//! ## No Operator Precedence
//!
//! An expression is a flat `term (op term)*` chain compiled strictly left
//! to right; each operator is emitted immediately after its right-hand
//! term. There is no precedence climbing, so:
//!
//! ```text
//! Expression: 1 + 2 * 3        (evaluates as (1 + 2) * 3)
//!
//! push constant 1      ; stack: [1]
//! push constant 2      ; stack: [1, 2]
//! add                  ; stack: [3]
//! push constant 3      ; stack: [3, 3]
//! call Math.multiply 2 ; stack: [9]
//! ```
//!
//! This is a defining property of the language, not an omission; only
//! parentheses reorder evaluation.
//!
//! ## Operators
//!
//! | Operator | Lowering |
//! |----------|----------|
//! | `+` `-` `&` `\|` | `add` `sub` `and` `or` |
//! | `<` `>` `=` | `lt` `gt` `eq` |
//! | `*` `/` | `call Math.multiply 2` / `call Math.divide 2` (no native form) |
//! | unary `-` | `neg` |
//! | unary `~` | `not` |
//!
//! ## Terms
//!
//! | Term | Lowering |
//! |------|----------|
//! | integer `n` | `push constant n` |
//! | `"s"` | `push constant len`, `call String.new 1`, then per char `push constant c`, `call String.appendChar 2` |
//! | `true` | `push constant 1`, `neg` |
//! | `false`, `null` | `push constant 0` |
//! | `this` | push the receiver (argument 0, or local 0 in a constructor) |
//! | variable `v` | `push seg i` (fields anchor pointer 0 first) |
//! | `v[e]` | `push seg i`, `[e]`, `add`, `pop pointer 1`, `push that 0` |
//! | `(e)` | `[e]` |
//!
//! ## Call Resolution
//!
//! A call target is resolved with one token of lookahead and one symbol
//! table probe, at parse time:
//!
//! | Form | Condition | Callee | Implicit argument |
//! |------|-----------|--------|-------------------|
//! | `v.m(...)` | `v` is a known variable | `<typeOf v>.m` | `v` pushed first |
//! | `C.f(...)` | `C` not in the table | `C.f` | none |
//! | `f(...)` | bare name | `<Class>.f` | current receiver pushed first |

#[cfg(test)]
mod tests {
    use crate::compile_unit;

    fn compile(src: &str) -> Vec<String> {
        let mut buf = Vec::new();
        compile_unit(src, &mut buf).expect("should compile");
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Compiles `expr` in the body of `function int f() { return <expr>; }`
    /// and strips the surrounding function/return instructions.
    fn compile_expr(expr: &str) -> Vec<String> {
        let src = format!("class Main {{ function int f() {{ return {}; }} }}", expr);
        let mut vm = compile(&src);
        assert_eq!(vm.remove(0), "function Main.f 0");
        assert_eq!(vm.pop().as_deref(), Some("return"));
        vm
    }

    #[test]
    fn test_no_precedence_left_to_right() {
        assert_eq!(
            compile_expr("1 + 2 * 3"),
            vec![
                "push constant 1",
                "push constant 2",
                "add",
                "push constant 3",
                "call Math.multiply 2",
            ]
        );
    }

    #[test]
    fn test_parentheses_reorder_evaluation() {
        assert_eq!(
            compile_expr("2 * (3 + 4)"),
            vec![
                "push constant 2",
                "push constant 3",
                "push constant 4",
                "add",
                "call Math.multiply 2",
            ]
        );
    }

    #[test]
    fn test_division_lowered_to_runtime_call() {
        assert_eq!(
            compile_expr("10 / 2"),
            vec!["push constant 10", "push constant 2", "call Math.divide 2"]
        );
    }

    #[test]
    fn test_comparisons_and_logic() {
        assert_eq!(
            compile_expr("1 < 2"),
            vec!["push constant 1", "push constant 2", "lt"]
        );
        assert_eq!(
            compile_expr("1 > 2"),
            vec!["push constant 1", "push constant 2", "gt"]
        );
        assert_eq!(
            compile_expr("1 = 2"),
            vec!["push constant 1", "push constant 2", "eq"]
        );
        assert_eq!(
            compile_expr("1 & 2"),
            vec!["push constant 1", "push constant 2", "and"]
        );
        assert_eq!(
            compile_expr("1 | 2"),
            vec!["push constant 1", "push constant 2", "or"]
        );
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(compile_expr("-5"), vec!["push constant 5", "neg"]);
        assert_eq!(compile_expr("~5"), vec!["push constant 5", "not"]);
    }

    #[test]
    fn test_unary_binds_to_a_single_term() {
        let vm = compile(
            "class Main { function int f(int n) { return -n + ~n; } }",
        );
        assert_eq!(
            vm,
            vec![
                "function Main.f 0",
                "push argument 0",
                "neg",
                "push argument 0",
                "not",
                "add",
                "return",
            ]
        );
    }

    #[test]
    fn test_keyword_constants() {
        assert_eq!(compile_expr("true"), vec!["push constant 1", "neg"]);
        assert_eq!(compile_expr("false"), vec!["push constant 0"]);
        assert_eq!(compile_expr("null"), vec!["push constant 0"]);
    }

    #[test]
    fn test_this_pushes_method_receiver() {
        let vm = compile("class Point { method Point me() { return this; } }");
        assert_eq!(
            vm,
            vec!["function Point.me 0", "push argument 0", "return"]
        );
    }

    #[test]
    fn test_string_constant_builds_string_object() {
        let vm = compile(
            "class Main { function void main() { do Output.printString(\"Hi\"); return; } }",
        );
        assert_eq!(
            vm,
            vec![
                "function Main.main 0",
                "push constant 2",
                "call String.new 1",
                "push constant 72",
                "call String.appendChar 2",
                "push constant 105",
                "call String.appendChar 2",
                "call Output.printString 1",
                "pop temp 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn test_array_read() {
        let vm = compile(
            "class Main { function int first(Array a) { return a[0]; } }",
        );
        assert_eq!(
            vm,
            vec![
                "function Main.first 0",
                "push argument 0",
                "push constant 0",
                "add",
                "pop pointer 1",
                "push that 0",
                "return",
            ]
        );
    }

    #[test]
    fn test_class_call_has_no_implicit_argument() {
        let vm = compile(
            "class Main { function int f() { return Math.max(1, 2); } }",
        );
        assert_eq!(
            vm,
            vec![
                "function Main.f 0",
                "push constant 1",
                "push constant 2",
                "call Math.max 2",
                "return",
            ]
        );
    }

    #[test]
    fn test_method_call_on_variable_passes_object() {
        let vm = compile(
            "class Main { function void main() { var Point p; \
             let p = Point.new(1, 2); do p.getX(); return; } }",
        );
        assert_eq!(
            vm,
            vec![
                "function Main.main 1",
                "push constant 1",
                "push constant 2",
                "call Point.new 2",
                "pop local 0",
                "push local 0",
                "call Point.getX 1",
                "pop temp 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn test_method_call_on_field_anchors_pointer() {
        let vm = compile(
            "class Main { field Point p; method int px() { return p.getX(); } }",
        );
        assert_eq!(
            vm,
            vec![
                "function Main.px 0",
                "push argument 0",
                "pop pointer 0",
                "push this 0",
                "call Point.getX 1",
                "return",
            ]
        );
    }

    #[test]
    fn test_bare_call_targets_current_class_on_current_receiver() {
        let vm = compile("class Square { method int twice() { return half() + half(); } }");
        assert_eq!(
            vm,
            vec![
                "function Square.twice 0",
                "push argument 0",
                "call Square.half 1",
                "push argument 0",
                "call Square.half 1",
                "add",
                "return",
            ]
        );
    }

    #[test]
    fn test_bare_call_in_do_statement() {
        let vm = compile("class Square { method void draw() { do show(); return; } }");
        assert_eq!(
            vm,
            vec![
                "function Square.draw 0",
                "push argument 0",
                "call Square.show 1",
                "pop temp 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn test_nested_call_arguments() {
        let vm = compile(
            "class Main { function int f() { return Math.max(Math.min(1, 2), 3); } }",
        );
        assert_eq!(
            vm,
            vec![
                "function Main.f 0",
                "push constant 1",
                "push constant 2",
                "call Math.min 2",
                "push constant 3",
                "call Math.max 2",
                "return",
            ]
        );
    }
}
