// ABOUTME: Tests for the self-hosted standard library

use rlisp::interpreter::Interpreter;

fn interpreter() -> Interpreter {
    let interpreter = Interpreter::new();
    interpreter
        .eval_source(include_str!("../lisp/stdlib/core.lisp"), "core.lisp")
        .expect("core stdlib should load");
    interpreter
        .eval_source(include_str!("../lisp/stdlib/enhanced.lisp"), "enhanced.lisp")
        .expect("enhanced stdlib should load");
    interpreter
}

fn printed(interpreter: &Interpreter, source: &str) -> String {
    interpreter
        .eval_source(source, "<test>")
        .expect(source)
        .to_string()
}

#[test]
fn test_defn_defines_a_callable() {
    let interp = interpreter();
    printed(&interp, "(defn add2 [a b] (+ a b))");
    assert_eq!(printed(&interp, "(add2 19 23)"), "42");
}

#[test]
fn test_defn_supports_rest_params_and_multi_form_bodies() {
    let interp = interpreter();
    printed(&interp, "(defn tally [label & xs] (def ignored label) (sum xs))");
    assert_eq!(printed(&interp, "(tally :total 1 2 3)"), "6");
}

#[test]
fn test_map_filter_reduce() {
    let interp = interpreter();
    assert_eq!(printed(&interp, "(map inc '(1 2 3))"), "(2 3 4)");
    assert_eq!(printed(&interp, "(map (fn [x] (* x x)) '(1 2 3))"), "(1 4 9)");
    assert_eq!(printed(&interp, "(map inc [1 2 3])"), "(2 3 4)");
    assert_eq!(printed(&interp, "(filter even? '(1 2 3 4 5 6))"), "(2 4 6)");
    assert_eq!(printed(&interp, "(reduce + 0 '(1 2 3 4))"), "10");
    assert_eq!(
        printed(&interp, "(reduce (fn [acc x] (cons x acc)) () '(1 2 3))"),
        "(3 2 1)"
    );
    assert_eq!(printed(&interp, "(map inc ())"), "()");
}

#[test]
fn test_when_and_unless() {
    let interp = interpreter();
    assert_eq!(printed(&interp, "(when true 1 2)"), "2");
    assert_eq!(printed(&interp, "(when false 1 2)"), "nil");
    assert_eq!(printed(&interp, "(unless false 5)"), "5");
    assert_eq!(printed(&interp, "(unless true 5)"), "nil");
}

#[test]
fn test_cond_falls_through_in_order() {
    let interp = interpreter();
    printed(&interp, "(defn classify [n] (cond (neg? n) :neg (zero? n) :zero :else :pos))");
    assert_eq!(printed(&interp, "(classify -3)"), ":neg");
    assert_eq!(printed(&interp, "(classify 0)"), ":zero");
    assert_eq!(printed(&interp, "(classify 9)"), ":pos");
    assert_eq!(printed(&interp, "(cond)"), "nil");
}

#[test]
fn test_not_follows_truthiness() {
    let interp = interpreter();
    assert_eq!(printed(&interp, "(not nil)"), "true");
    assert_eq!(printed(&interp, "(not false)"), "true");
    assert_eq!(printed(&interp, "(not 0)"), "false");
    // The empty list is truthy
    assert_eq!(printed(&interp, "(not ())"), "false");
}

#[test]
fn test_inc_dec() {
    let interp = interpreter();
    assert_eq!(printed(&interp, "(inc 41)"), "42");
    assert_eq!(printed(&interp, "(dec 43)"), "42");
    assert_eq!(printed(&interp, "(inc 1.5)"), "2.5");
}

#[test]
fn test_and_or_values() {
    let interp = interpreter();
    assert_eq!(printed(&interp, "(and)"), "true");
    assert_eq!(printed(&interp, "(and 1 2)"), "2");
    assert_eq!(printed(&interp, "(and 1 nil 2)"), "nil");
    assert_eq!(printed(&interp, "(or)"), "nil");
    assert_eq!(printed(&interp, "(or nil false 3)"), "3");
    assert_eq!(printed(&interp, "(or false)"), "false");
}

#[test]
fn test_and_or_short_circuit() {
    let interp = interpreter();
    printed(&interp, "(def hits 0)");
    printed(&interp, "(defn bump! [] (def hits (inc hits)) true)");

    assert_eq!(printed(&interp, "(and false (bump!))"), "false");
    assert_eq!(printed(&interp, "hits"), "0");

    assert_eq!(printed(&interp, "(or true (bump!))"), "true");
    assert_eq!(printed(&interp, "hits"), "0");

    // The side effect does run when reached
    assert_eq!(printed(&interp, "(or false (bump!))"), "true");
    assert_eq!(printed(&interp, "hits"), "1");
}

#[test]
fn test_sequence_helpers() {
    let interp = interpreter();
    assert_eq!(printed(&interp, "(second '(1 2 3))"), "2");
    assert_eq!(printed(&interp, "(last '(1 2 3))"), "3");
    assert_eq!(printed(&interp, "(reverse '(1 2 3))"), "(3 2 1)");
    assert_eq!(printed(&interp, "(reverse ())"), "()");
}

#[test]
fn test_enhanced_numeric_predicates() {
    let interp = interpreter();
    assert_eq!(printed(&interp, "(zero? 0)"), "true");
    assert_eq!(printed(&interp, "(pos? 3)"), "true");
    assert_eq!(printed(&interp, "(neg? -3)"), "true");
    assert_eq!(printed(&interp, "(even? 4)"), "true");
    assert_eq!(printed(&interp, "(odd? 4)"), "false");
    assert_eq!(printed(&interp, "(abs -7)"), "7");
    assert_eq!(printed(&interp, "(min 2 9)"), "2");
    assert_eq!(printed(&interp, "(max 2 9)"), "9");
}

#[test]
fn test_range_take_drop_sum() {
    let interp = interpreter();
    assert_eq!(printed(&interp, "(range 5)"), "(0 1 2 3 4)");
    assert_eq!(printed(&interp, "(range 0)"), "()");
    assert_eq!(printed(&interp, "(take 2 '(1 2 3))"), "(1 2)");
    assert_eq!(printed(&interp, "(take 9 '(1 2))"), "(1 2)");
    assert_eq!(printed(&interp, "(drop 2 '(1 2 3))"), "(3)");
    assert_eq!(printed(&interp, "(sum (range 11))"), "55");
}

#[test]
fn test_identity_and_comp() {
    let interp = interpreter();
    assert_eq!(printed(&interp, "(identity :x)"), ":x");
    assert_eq!(printed(&interp, "((comp inc inc) 40)"), "42");
}

#[test]
fn test_string_join() {
    let interp = interpreter();
    assert_eq!(
        printed(&interp, "(string-join \", \" '(\"a\" \"b\" \"c\"))"),
        "\"a, b, c\""
    );
    assert_eq!(printed(&interp, "(string-join \",\" ())"), "\"\"");
    assert_eq!(printed(&interp, "(string-join \"-\" '(1 2 3))"), "\"1-2-3\"");
}

#[test]
fn test_stdlib_composes_with_collections() {
    let interp = interpreter();
    assert_eq!(
        printed(&interp, "(filter (fn [kv] (even? (second kv)))
                           (map (fn [k] (list k (get {:a 1 :b 2 :c 3} k)))
                                (keys {:a 1 :b 2 :c 3})))"),
        "((:b 2))"
    );
}
