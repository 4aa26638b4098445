use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::ast::*;
use crate::error::{ErrorKind, Position};
use crate::interpreter::{floor_div, int_pow};
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::product::{Attributes, ParentId, Product};
use crate::scope::Scope;
use crate::token::{AttributeName, ShapeTag, TokenKind};
use crate::tree::SceneGraph;
use crate::value::Value;
use crate::{interpret, run};

// ── Shared fixture runners ──────────────────────────────────────────

/// Embed fixture files at compile time.
const INTERPRET_FIXTURES: &str = include_str!("../test-data/fixtures/interpret.json");
const ERROR_FIXTURES: &str = include_str!("../test-data/fixtures/errors.json");

/// Interpret `input` and re-read the compact JSON as a generic value.
fn output_json(input: &str) -> serde_json::Value {
    serde_json::from_str(&interpret(input).to_json()).unwrap()
}

fn eval(input: &str) -> Value {
    run(input).unwrap().value
}

#[test]
fn test_fixture_interpret() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(INTERPRET_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let input = fixture["input"].as_str().unwrap();
        let expected = &fixture["expected"];

        let actual = output_json(input);
        assert_eq!(
            &actual, expected,
            "Fixture '{}': output mismatch for input {:?}",
            name, input
        );
    }
}

#[test]
fn test_fixture_errors() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(ERROR_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let input = fixture["input"].as_str().unwrap();

        let output = interpret(input);
        assert!(
            !output.success,
            "Fixture '{}': expected failure for input {:?}",
            name, input
        );
        let err = output.error.unwrap();
        let actual = (
            err.kind.as_str(),
            err.message.as_str(),
            err.line() as u64,
            err.column() as u64,
        );
        let expected = (
            fixture["type"].as_str().unwrap(),
            fixture["message"].as_str().unwrap(),
            fixture["line"].as_u64().unwrap(),
            fixture["column"].as_u64().unwrap(),
        );
        assert_eq!(actual, expected, "Fixture '{}': error mismatch", name);
    }
}

// ── Tokenizer ───────────────────────────────────────────────────────

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_tokenize_operators_are_greedy() {
    assert_eq!(
        kinds("** * <= < >= > == != + - / % ( ) ;"),
        vec![
            TokenKind::Pow,
            TokenKind::Asterisk,
            TokenKind::LessThanEqual,
            TokenKind::LessThan,
            TokenKind::GreaterThanEqual,
            TokenKind::GreaterThan,
            TokenKind::Equal,
            TokenKind::NotEqual,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Slash,
            TokenKind::Mod,
            TokenKind::LeftParenthesis,
            TokenKind::RightParenthesis,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_tokenize_keywords_and_identifiers() {
    assert_eq!(
        kinds("set size_x size group rectangle positionX scaleY then _tmp"),
        vec![
            TokenKind::Set,
            TokenKind::Identifier,
            TokenKind::Size,
            TokenKind::Tag(ShapeTag::Group),
            TokenKind::Tag(ShapeTag::Rectangle),
            TokenKind::Attribute(AttributeName::PositionX),
            TokenKind::Attribute(AttributeName::ScaleY),
            TokenKind::Then,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize("12 3.25 0x1F 0b101 0xg").unwrap();
    let summary: Vec<(TokenKind, &str)> = tokens
        .iter()
        .map(|t| (t.kind, t.literal.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (TokenKind::Int, "12"),
            (TokenKind::Float, "3.25"),
            (TokenKind::Int, "0x1F"),
            (TokenKind::Int, "0b101"),
            (TokenKind::Int, "0"),
            (TokenKind::Identifier, "xg"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn test_tokenize_positions() {
    let tokens = tokenize("set a 1\n  // note\n  a + 2").unwrap();
    let positions: Vec<(String, usize, usize)> = tokens
        .iter()
        .map(|t| (t.literal.clone(), t.position.line, t.position.column))
        .collect();
    assert_eq!(
        positions,
        vec![
            ("set".to_string(), 1, 1),
            ("a".to_string(), 1, 5),
            ("1".to_string(), 1, 7),
            ("a".to_string(), 3, 3),
            ("+".to_string(), 3, 5),
            ("2".to_string(), 3, 7),
            ("".to_string(), 3, 8),
        ]
    );
}

#[test]
fn test_tokenize_unknown_character_is_illegal() {
    assert_eq!(
        kinds("1 { 2"),
        vec![
            TokenKind::Int,
            TokenKind::Illegal,
            TokenKind::Int,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_tokenize_error_location() {
    let err = tokenize("abc\n123\n   !").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExpectedCharError);
    assert_eq!(err.position, Position::new(3, 5));
}

#[test]
fn test_tokenize_lone_carriage_return_breaks_lines() {
    let tokens = tokenize("1\r2").unwrap();
    assert_eq!(tokens[1].position, Position::new(2, 1));
}

// ── Parser ──────────────────────────────────────────────────────────

fn parse_source(input: &str) -> Program {
    parse(&tokenize(input).unwrap()).unwrap()
}

fn single_expression(input: &str) -> Expression {
    let program = parse_source(input);
    assert_eq!(program.statements.len(), 1, "input {:?}", input);
    match program.statements.into_iter().next().unwrap() {
        Statement::Expression(s) => s.expression,
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

/// Render an expression with explicit parentheses.
fn shape(expression: &Expression) -> String {
    match expression {
        Expression::Identifier(i) => i.name.clone(),
        Expression::Integer(i) => i.value.to_string(),
        Expression::Float(f) => f.value.to_string(),
        Expression::Boolean(b) => b.value.to_string(),
        Expression::Prefix(p) => match p.operator {
            PrefixOperator::Negate => format!("(-{})", shape(&p.right)),
            PrefixOperator::Not => format!("(not {})", shape(&p.right)),
        },
        Expression::Infix(i) => format!(
            "({} {} {})",
            shape(&i.left),
            i.operator.as_str(),
            shape(&i.right)
        ),
        other => format!("<{}>", other.token().literal),
    }
}

#[test]
fn test_parse_precedence() {
    let cases = [
        ("1 + 2 * 3", "(1 + (2 * 3))"),
        ("1 - 2 - 3", "((1 - 2) - 3)"),
        ("2 ** 3 % 2", "(2 ** (3 % 2))"),
        ("-a * b", "((-a) * b)"),
        ("not a and b", "((not a) and b)"),
        ("a or b and c", "(a or (b and c))"),
        ("a < b == c > d", "((a < b) == (c > d))"),
        ("1 + 2 < 3 * 4", "((1 + 2) < (3 * 4))"),
        ("(1 + 2) * 3", "((1 + 2) * 3)"),
        ("2 ** 2 ** 3", "((2 ** 2) ** 3)"),
    ];
    for (input, expected) in cases {
        assert_eq!(shape(&single_expression(input)), expected, "input {:?}", input);
    }
}

#[test]
fn test_parse_semicolons_separate_statements() {
    let program = parse_source("set a 5; -a;;");
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(program.statements[0], Statement::Set(_)));

    // Without the separator the minus is infix.
    let program = parse_source("set a 5 - a");
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn test_parse_if_cases() {
    let Expression::If(if_expr) = single_expression("if a then 1 elsif b then 2; 3 else 4 end") else {
        panic!("expected an if expression");
    };
    assert_eq!(if_expr.cases.len(), 2);
    assert_eq!(if_expr.cases[1].body.statements.len(), 2);
    assert_eq!(if_expr.else_body.map(|b| b.statements.len()), Some(1));
}

#[test]
fn test_parse_repeat() {
    let Expression::Repeat(repeat) = single_expression("repeat i from 1 + 1 to n do i end") else {
        panic!("expected a repeat expression");
    };
    assert_eq!(repeat.index.name, "i");
    assert_eq!(shape(&repeat.from), "(1 + 1)");
    assert_eq!(shape(&repeat.to), "n");
    assert_eq!(repeat.body.statements.len(), 1);
}

#[test]
fn test_parse_tag_attributes_take_one_expression_each() {
    let Expression::Tag(tag) = single_expression("rectangle width 10 height 5 * 2 end") else {
        panic!("expected a tag expression");
    };
    assert_eq!(tag.tag, ShapeTag::Rectangle);
    let names: Vec<AttributeName> = tag.attributes.iter().map(|a| a.name).collect();
    assert_eq!(names, vec![AttributeName::Width, AttributeName::Height]);
    assert_eq!(shape(&tag.attributes[1].value), "(5 * 2)");
    assert!(tag.body.statements.is_empty());
    assert_eq!(tag.body.token.literal, "2");
}

#[test]
fn test_parse_attribute_leaves_second_value_for_the_body() {
    let Expression::Tag(tag) = single_expression("rectangle width 1 2 end") else {
        panic!("expected a tag expression");
    };
    assert_eq!(tag.attributes.len(), 1);
    assert_eq!(shape(&tag.attributes[0].value), "1");
    assert_eq!(tag.body.statements.len(), 1);
    let Statement::Expression(body) = &tag.body.statements[0] else {
        panic!("expected an expression statement");
    };
    assert_eq!(shape(&body.expression), "2");
}

#[test]
fn test_parse_size_attributes_are_optional() {
    let Expression::Size(size) = single_expression("size height 3 end") else {
        panic!("expected a size expression");
    };
    assert!(size.width.is_none());
    assert_eq!(size.height.map(|h| h.name), Some(AttributeName::Height));
}

#[test]
fn test_parse_block_token_opens_the_body() {
    let Expression::Tag(tag) = single_expression("group\n  set x 1\nend") else {
        panic!("expected a tag expression");
    };
    assert_eq!(tag.body.token.literal, "group");
    assert_eq!(tag.body.token.position, Position::new(1, 1));

    let Expression::If(if_expr) = single_expression("if a then 1 else\n 2 end") else {
        panic!("expected an if expression");
    };
    assert_eq!(if_expr.cases[0].body.token.kind, TokenKind::Then);
    assert_eq!(if_expr.else_body.map(|b| b.token.position), Some(Position::new(1, 13)));

    let Expression::Repeat(repeat) = single_expression("repeat i from 0 to 2 do end") else {
        panic!("expected a repeat expression");
    };
    assert_eq!(repeat.body.token.kind, TokenKind::Do);
}

#[test]
fn test_parse_empty_token_stream() {
    assert_eq!(parse(&[]).unwrap(), Program::default());
}

#[test]
fn test_parse_deep_nesting() {
    let depth = 5_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(eval(&source), Value::Int(1));
}

// ── Scope ───────────────────────────────────────────────────────────

#[test]
fn test_scope_set_shadows_and_pop_restores() {
    let mut scope = Scope::new();
    scope.set("a", Value::Int(1));
    scope.push();
    scope.set("a", Value::Int(2));
    assert_eq!(scope.get("a"), Some(Value::Int(2)));
    scope.pop();
    assert_eq!(scope.get("a"), Some(Value::Int(1)));
}

#[test]
fn test_scope_update_reaches_nearest_binding() {
    let mut scope = Scope::new();
    scope.set("a", Value::Int(1));
    scope.push();
    assert!(scope.update("a", Value::Int(5)));
    assert!(!scope.update("missing", Value::Int(0)));
    scope.pop();
    assert_eq!(scope.get("a"), Some(Value::Int(5)));
    assert_eq!(scope.get("missing"), None);
}

#[test]
fn test_scope_root_is_never_popped() {
    let mut scope = Scope::new();
    scope.set("a", Value::Boolean(true));
    scope.pop();
    assert_eq!(scope.depth(), 1);
    assert_eq!(scope.get("a"), Some(Value::Boolean(true)));
}

// ── Evaluator ───────────────────────────────────────────────────────

#[test]
fn test_evaluate_examples() {
    assert_eq!(eval("1 + 1"), Value::Int(2));
    assert_eq!(eval("7 / 2"), Value::Int(3));
    assert_eq!(eval("2 ** 10"), Value::Int(1024));
    assert_eq!(eval("set a 10"), Value::Int(10));
    assert_eq!(eval("set a 10; update a 20; a"), Value::Int(20));
    assert_eq!(eval("if 1 == 1 then 2 else 3 end"), Value::Int(2));
    assert_eq!(eval("if false then 1 elsif false then 2 end"), Value::Null);
    assert_eq!(eval("repeat i from 0 to 5 do i end"), Value::Int(4));
    assert_eq!(eval("repeat i from 5 to 5 do i end"), Value::Null);
    assert_eq!(eval("-2.5"), Value::Float(-2.5));
    assert_eq!(eval("1 < 1.5"), Value::Boolean(true));
    assert_eq!(eval("true != false"), Value::Boolean(true));
}

#[test]
fn test_evaluate_scoping() {
    assert_eq!(eval("set a 1; if true then set a 2 end; a"), Value::Int(1));
    assert_eq!(eval("set a 1; if true then update a 2 end; a"), Value::Int(2));
}

/// Case branches get their own frame but `else` runs in the enclosing one,
/// so a `set` in `else` is still visible after the `if`.
#[test]
fn test_evaluate_else_runs_in_enclosing_scope() {
    assert_eq!(eval("if false then 0 else set b 5 end; b"), Value::Int(5));

    let err = run("if true then set b 5 else 0 end; b").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoValueAssignedError);
}

#[test]
fn test_evaluate_leaves_scope_balanced() {
    let tokens = tokenize("set a 1; if true then set b 2 end; repeat i from 0 to 2 do set c i end").unwrap();
    let program = parse(&tokens).unwrap();
    let mut scope = Scope::new();
    let mut product = Product::new();
    let value = crate::interpreter::evaluate(&program, &mut scope, &mut product).unwrap();
    assert_eq!(value, Value::Int(1));
    assert_eq!(scope.depth(), 1);
    assert_eq!(scope.get("a"), Some(Value::Int(1)));
    assert_eq!(scope.get("b"), None);
    assert_eq!(scope.get("i"), None);
}

#[test]
fn test_evaluate_update_of_undeclared_name() {
    let err = run("update b 1").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndeclaredVariableError);
    assert_eq!(err.position, Position::new(1, 8));
}

#[test]
fn test_evaluate_stops_at_first_error() {
    // The second statement fails, the third never runs.
    let err = run("set a 1; a + true; update zzz 1").unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
}

#[test]
fn test_evaluate_body_error_stops_repeat() {
    let err = run("repeat i from 0 to 3 do if i == 1 then nope end end").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoValueAssignedError);
    assert_eq!(err.message, "'nope' has no value assigned.");
}

#[test]
fn test_evaluate_group_restores_current_scope() {
    let evaluation =
        run("size width 9 height 9 group rectangle end end rectangle end end").unwrap();
    let parents: Vec<ParentId> = evaluation.product.shapes.iter().map(|s| s.parent).collect();
    assert_eq!(
        parents,
        vec![ParentId::Size, ParentId::Shape(0), ParentId::Size]
    );
    assert_eq!(evaluation.product.current_scope, Some(ParentId::Size));
}

#[test]
fn test_evaluate_tag_result() {
    assert_eq!(
        eval("size width 1 height 1 rectangle width 2 rotate 3 end end"),
        Value::Attribute {
            key: AttributeName::Rotate,
            value: 3.0
        }
    );
    assert_eq!(eval("size width 1 height 1 rectangle end end"), Value::Null);
    assert_eq!(eval("size width 1 height 1 group 7 end end"), Value::Int(7));
}

#[test]
fn test_evaluate_duplicate_attribute_keeps_last_value() {
    let evaluation = run("size width 1 height 1 rectangle width 2 width 3 end end").unwrap();
    let attributes = &evaluation.product.shapes[0].attributes;
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes.get(AttributeName::Width), Some(3.0));
}

#[test]
fn test_evaluate_remainder_of_min_by_minus_one() {
    assert_eq!(eval("(0 - 9223372036854775807 - 1) % -1"), Value::Int(0));
    let err = run("(0 - 9223372036854775807 - 1) / -1").unwrap_err();
    assert_eq!(err.message, "integer overflow.");
}

#[test]
fn test_evaluate_size_reports_height_when_both_are_missing() {
    let err = run("size end").unwrap_err();
    assert_eq!(err.message, "Attribute 'height' is missing for 'size'.");
    let err = run("size height 1 end").unwrap_err();
    assert_eq!(err.message, "Attribute 'width' is missing for 'size'.");
}

#[test]
fn test_int_pow() {
    assert_eq!(int_pow(2, 10), Some(1024));
    assert_eq!(int_pow(-3, 3), Some(-27));
    assert_eq!(int_pow(5, 0), Some(1));
    assert_eq!(int_pow(2, -1), Some(0));
    assert_eq!(int_pow(-2, -1), Some(-1));
    assert_eq!(int_pow(-2, -2), Some(0));
    assert_eq!(int_pow(-1, -3), Some(-1));
    assert_eq!(int_pow(1, i64::MAX), Some(1));
    assert_eq!(int_pow(2, 63), None);
}

// ── Product & tree ──────────────────────────────────────────────────

#[test]
fn test_product_requires_size_and_scope() {
    let mut product = Product::new();
    assert!(Attributes::new().is_empty());
    assert_eq!(product.add_shape(ShapeTag::Rectangle, Attributes::new()), None);

    product.size = Some(crate::product::SizeRecord {
        width: 1.0,
        height: 1.0,
    });
    assert_eq!(product.add_shape(ShapeTag::Rectangle, Attributes::new()), None);

    product.current_scope = Some(ParentId::Size);
    assert_eq!(product.add_shape(ShapeTag::Group, Attributes::new()), Some(0));
    assert_eq!(product.add_shape(ShapeTag::Rectangle, Attributes::new()), Some(1));
}

#[test]
fn test_scene_graph_absent_without_size() {
    let evaluation = run("set a 1").unwrap();
    assert_eq!(evaluation.scene_graph(), None);
    assert_eq!(interpret("set a 1").data, None);
}

#[test]
fn test_scene_graph_nesting() {
    let graph = run(
        "size width 10 height 10 group width 4 rotate 1 group rectangle scale 2 end end end end",
    )
    .unwrap()
    .scene_graph()
    .unwrap();

    assert_eq!(graph.node_count(), 3);
    let outer = &graph.grid[0];
    assert!(outer.is_group());
    assert_eq!(outer.parent, None);
    assert_eq!(outer.attribute("width"), None);
    assert_eq!(outer.attribute("rotate"), Some(1.0));

    let inner = &outer.children.as_ref().unwrap()[0];
    assert_eq!(inner.parent.as_deref(), Some("0"));
    let leaf = &inner.children.as_ref().unwrap()[0];
    assert_eq!(leaf.id, "2");
    assert_eq!(leaf.parent.as_deref(), Some("1"));
    assert_eq!(leaf.children, None);
    assert_eq!(leaf.attributes, vec![("scale".to_string(), 2.0)]);
}

// ── JSON ────────────────────────────────────────────────────────────

#[test]
fn test_json_key_order() {
    let output = interpret(
        "size width 2 height 3 group rotate 5 rectangle positionY 1 width 0.5 end end end",
    );
    assert_eq!(
        output.to_json(),
        concat!(
            r#"{"success":true,"log":{"type":"Attribute","key":"width","value":0.5},"#,
            r#""data":{"size":{"id":"size","width":2,"height":3},"grid":["#,
            r#"{"id":"0","parent":null,"tag":"group","rotate":5,"children":["#,
            r#"{"id":"1","parent":"0","tag":"rectangle","positionY":1,"width":0.5}]}]}}"#,
        )
    );
}

#[test]
fn test_json_failure_shape() {
    assert_eq!(
        interpret("a = 1").to_json(),
        r#"{"success":false,"error":{"type":"ExpectedCharError","message":"'=' is missing after '='.","line":1,"column":4}}"#
    );
}

#[test]
fn test_json_pretty_uses_two_space_indent() {
    let pretty = interpret("1").to_json_pretty();
    assert!(pretty.starts_with("{\n  \"success\": true,\n  \"log\": {\n    \"type\": \"Int\""));
}

#[test]
fn test_error_display() {
    let err = run("b").unwrap_err();
    assert_eq!(
        err.to_string(),
        "NoValueAssignedError at 1:1: 'b' has no value assigned."
    );
}

#[test]
fn test_from_json_round_trip() {
    let source = include_str!("../test-data/fixtures/interpret.json");
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(source).unwrap();
    for fixture in &fixtures {
        let input = fixture["input"].as_str().unwrap();
        let Some(graph) = interpret(input).data else {
            continue;
        };
        let parsed = crate::from_json(&graph.to_json()).unwrap();
        assert_eq!(parsed, graph, "input {:?}", input);
        let parsed = crate::from_json(&graph.to_json_pretty()).unwrap();
        assert_eq!(parsed, graph, "input {:?}", input);
    }
}

#[test]
fn test_from_json_rejects_bad_documents() {
    assert!(crate::from_json(r#"{"size":{"id":"root","width":1,"height":1},"grid":[]}"#).is_err());
    assert!(crate::from_json(r#"{"size":{"id":"size","width":1,"height":1},"grid":[{"id":"0","parent":null}]}"#).is_err());
    assert!(crate::from_json(r#"{"size":{"id":"size","width":1,"height":1},"grid":[{"id":"0","parent":null,"tag":"rectangle","width":"wide"}]}"#).is_err());
}

// ── Properties ──────────────────────────────────────────────────────

/// Build a program from (is_group, width, height, x) rows: groups wrap a
/// rectangle, plain rows are rectangles at the root.
fn scene_source(rows: &[(bool, u32, u32, u32)]) -> String {
    let mut source = String::from("size width 500 height 500\n");
    for &(is_group, width, height, x) in rows {
        if is_group {
            source.push_str(&format!(
                "group positionX {x} rectangle width {width} height {height} scale {width} / 7.0 end end\n"
            ));
        } else {
            source.push_str(&format!(
                "rectangle width {width} height {height} positionX {x} end\n"
            ));
        }
    }
    source.push_str("end\n");
    source
}

proptest! {
    #[test]
    fn prop_int_division_floors(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        prop_assume!(b != 0);
        let expected = (a as f64 / b as f64).floor() as i64;
        prop_assert_eq!(eval(&format!("{} / {}", a, b)), Value::Int(expected));
        prop_assert_eq!(floor_div(a, b), Some(expected));
    }

    #[test]
    fn prop_int_remainder_truncates(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        prop_assume!(b != 0);
        let expected = a - b * (a as f64 / b as f64).trunc() as i64;
        prop_assert_eq!(eval(&format!("{} % {}", a, b)), Value::Int(expected));
    }

    #[test]
    fn prop_scene_graph_round_trip(
        rows in prop::collection::vec((any::<bool>(), 0u32..1000, 0u32..1000, 0u32..1000), 0..8)
    ) {
        let evaluation = run(&scene_source(&rows)).unwrap();
        let graph = SceneGraph::from_product(&evaluation.product).unwrap();
        let parsed = crate::from_json(&graph.to_json()).unwrap();
        prop_assert_eq!(&parsed, &graph);

        // Every record survives with its id, parent and tag.
        prop_assert_eq!(parsed.node_count(), evaluation.product.shapes.len());
        let mut stack: Vec<&crate::tree::SceneNode> = parsed.grid.iter().collect();
        while let Some(node) = stack.pop() {
            let id: usize = node.id.parse().unwrap();
            let record = &evaluation.product.shapes[id];
            prop_assert_eq!(node.tag.as_str(), record.tag.as_str());
            let parent = match record.parent {
                ParentId::Size => None,
                ParentId::Shape(p) => Some(p.to_string()),
            };
            prop_assert_eq!(&node.parent, &parent);
            if let Some(children) = &node.children {
                stack.extend(children.iter());
            }
        }
    }
}
