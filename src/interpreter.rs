use tracing::debug;

use crate::ast::*;
use crate::error::{ErrorKind, InterpretError, Position};
use crate::product::{Attributes, ParentId, Product, SizeRecord};
use crate::scope::Scope;
use crate::stack::ensure_sufficient_stack;
use crate::token::AttributeName;
use crate::value::Value;

/// Evaluate `program` against `scope` and `product`, mutating both in place,
/// and return the value of the last statement (`Null` for an empty program).
///
/// Evaluation stops at the first error. Bindings and records made before it
/// remain in `scope` and `product`.
#[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
pub fn evaluate(
    program: &Program,
    scope: &mut Scope,
    product: &mut Product,
) -> Result<Value, InterpretError> {
    let mut interpreter = Interpreter { scope, product };
    let result = interpreter.eval_statements(&program.statements);
    match &result {
        Ok(value) => debug!(
            result = value.type_name(),
            shapes = interpreter.product.shapes.len(),
            "evaluated"
        ),
        Err(err) => debug!(%err, "evaluation failed"),
    }
    result
}

struct Interpreter<'a> {
    scope: &'a mut Scope,
    product: &'a mut Product,
}

impl<'a> Interpreter<'a> {
    // ── Statements ──────────────────────────────────────────────────

    fn eval_statements(&mut self, statements: &[Statement]) -> Result<Value, InterpretError> {
        let mut result = Value::Null;
        for statement in statements {
            result = self.eval_statement(statement)?;
        }
        Ok(result)
    }

    fn eval_statement(&mut self, statement: &Statement) -> Result<Value, InterpretError> {
        match statement {
            Statement::Expression(s) => self.eval_expression(&s.expression),
            Statement::Set(s) => {
                let value = self.eval_expression(&s.value)?;
                self.scope.set(&s.name.name, value);
                Ok(value)
            }
            Statement::Update(s) => {
                let value = self.eval_expression(&s.value)?;
                if !self.scope.update(&s.name.name, value) {
                    return Err(InterpretError::undeclared(
                        "Variable is not declared.",
                        s.name.token.position,
                    ));
                }
                Ok(value)
            }
        }
    }

    /// Run `f` inside a fresh innermost frame, discarding it afterwards on
    /// every path.
    fn with_child_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scope.push();
        let result = f(self);
        self.scope.pop();
        result
    }

    // ── Expressions ─────────────────────────────────────────────────

    fn eval_expression(&mut self, expression: &Expression) -> Result<Value, InterpretError> {
        ensure_sufficient_stack(|| match expression {
            Expression::Identifier(ident) => self.scope.get(&ident.name).ok_or_else(|| {
                InterpretError::no_value(
                    format!("'{}' has no value assigned.", ident.name),
                    ident.token.position,
                )
            }),
            Expression::Integer(lit) => Ok(Value::Int(lit.value)),
            Expression::Float(lit) => Ok(Value::Float(lit.value)),
            Expression::Boolean(lit) => Ok(Value::Boolean(lit.value)),
            Expression::Prefix(prefix) => self.eval_prefix(prefix),
            Expression::Infix(infix) => self.eval_infix(infix),
            Expression::If(if_expr) => self.eval_if(if_expr),
            Expression::Repeat(repeat) => self.eval_repeat(repeat),
            Expression::Size(size) => self.eval_size(size),
            Expression::Tag(tag) => self.eval_tag(tag),
            Expression::Attribute(attribute) => self.eval_attribute(attribute),
        })
    }

    fn eval_prefix(&mut self, prefix: &PrefixExpression) -> Result<Value, InterpretError> {
        let right = self.eval_expression(&prefix.right)?;
        let operand_at = prefix.right.token().position;
        match (prefix.operator, right) {
            (PrefixOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
            (PrefixOperator::Not, _) => Err(InterpretError::type_error(
                "Wrong type to have 'not'. Please use boolean type.",
                operand_at,
            )),
            (PrefixOperator::Negate, Value::Int(n)) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| overflow(prefix.token.position)),
            (PrefixOperator::Negate, Value::Float(n)) => Ok(Value::Float(-n)),
            (PrefixOperator::Negate, _) => Err(InterpretError::type_error(
                "Wrong type to have '-'. Please use integer or float type.",
                operand_at,
            )),
        }
    }

    fn eval_infix(&mut self, infix: &InfixExpression) -> Result<Value, InterpretError> {
        let left = self.eval_expression(&infix.left)?;
        let right = self.eval_expression(&infix.right)?;
        let operator_at = infix.token.position;

        match (left, right) {
            (Value::Int(l), Value::Int(r)) => int_infix(infix.operator, l, r, operator_at),
            (Value::Boolean(l), Value::Boolean(r)) => bool_infix(infix.operator, l, r, operator_at),
            _ => match (left.as_number(), right.as_number()) {
                (Some(l), Some(r)) => float_infix(infix.operator, l, r, operator_at),
                _ if left.type_name() != right.type_name() => Err(InterpretError::type_error(
                    format!("Type mismatch for {}.", infix.operator.as_str()),
                    infix.left.token().position,
                )),
                _ => Err(unknown_operator(operator_at)),
            },
        }
    }

    fn eval_block(&mut self, block: &BlockStatement) -> Result<Value, InterpretError> {
        self.eval_statements(&block.statements)
    }

    /// The first true case runs in a child frame. `else` runs directly in the
    /// enclosing frame, so its `set`s stay visible after the `if`.
    fn eval_if(&mut self, if_expr: &IfExpression) -> Result<Value, InterpretError> {
        for case in &if_expr.cases {
            match self.eval_expression(&case.condition)? {
                Value::Boolean(true) => {
                    return self.with_child_scope(|this| this.eval_block(&case.body));
                }
                Value::Boolean(false) => {}
                _ => {
                    return Err(InterpretError::type_error(
                        "Invalid condition type.",
                        case.condition.token().position,
                    ))
                }
            }
        }
        match &if_expr.else_body {
            Some(body) => self.eval_block(body),
            None => Ok(Value::Null),
        }
    }

    /// `[from, to)` with step 1. One child frame holds the index and every
    /// binding made by the body for the whole loop.
    fn eval_repeat(&mut self, repeat: &RepeatExpression) -> Result<Value, InterpretError> {
        let from = self.eval_expression(&repeat.from)?;
        if from.as_number().is_none() {
            return Err(InterpretError::type_error(
                "Invalid type for 'from'.",
                repeat.from.token().position,
            ));
        }
        let to = self.eval_expression(&repeat.to)?;
        if to.as_number().is_none() {
            return Err(InterpretError::type_error(
                "Invalid type for 'to'.",
                repeat.to.token().position,
            ));
        }

        let index = repeat.index.name.as_str();
        self.with_child_scope(|this| -> Result<Value, InterpretError> {
            let mut result = Value::Null;
            match (from, to) {
                (Value::Int(start), Value::Int(end)) => {
                    for i in start..end {
                        this.scope.set(index, Value::Int(i));
                        result = this.eval_block(&repeat.body)?;
                    }
                }
                _ => {
                    let both_float = matches!((from, to), (Value::Float(_), Value::Float(_)));
                    let (mut counter, end) = match (from.as_number(), to.as_number()) {
                        (Some(start), Some(end)) => (start, end),
                        _ => return Ok(Value::Null),
                    };
                    while counter < end {
                        let bound = if both_float {
                            Value::Float(counter)
                        } else {
                            Value::Int(counter.floor() as i64)
                        };
                        this.scope.set(index, bound);
                        result = this.eval_block(&repeat.body)?;
                        let next = counter + 1.0;
                        // Past 2^53 a unit step no longer changes the counter.
                        if next == counter {
                            break;
                        }
                        counter = next;
                    }
                }
            }
            Ok(result)
        })
    }

    fn eval_attribute(&mut self, attribute: &AttributeStatement) -> Result<Value, InterpretError> {
        let value = self.eval_expression(&attribute.value)?;
        match value.as_number() {
            Some(number) => Ok(Value::Attribute {
                key: attribute.name,
                value: number,
            }),
            None => Err(InterpretError::type_error(
                "Wrong type for attributes.",
                attribute.value.token().position,
            )),
        }
    }

    fn eval_size(&mut self, size: &SizeExpression) -> Result<Value, InterpretError> {
        let at = size.token.position;
        if self.product.size.is_some() {
            return Err(InterpretError::syntax("nested 'size' is not allowed.", at));
        }
        // With both missing, `height` is the one reported.
        let height = required_size_attribute(size.height.as_ref(), AttributeName::Height, at)?;
        let width = required_size_attribute(size.width.as_ref(), AttributeName::Width, at)?;

        let width = self.attribute_number(width)?;
        let height = self.attribute_number(height)?;

        self.product.size = Some(SizeRecord { width, height });
        self.product.current_scope = Some(ParentId::Size);
        debug!(width, height, "size");

        self.with_child_scope(|this| this.eval_block(&size.body))
    }

    fn eval_tag(&mut self, tag: &TagExpression) -> Result<Value, InterpretError> {
        let mut result = Value::Null;
        let mut attributes = Attributes::new();
        for attribute in &tag.attributes {
            result = self.eval_attribute(attribute)?;
            if let Value::Attribute { key, value } = result {
                attributes.insert(key, value);
            }
        }

        let Some(id) = self.product.add_shape(tag.tag, attributes) else {
            return Err(InterpretError::syntax(
                format!("{} can only be used inside 'size'.", tag.tag),
                tag.token.position,
            ));
        };

        if tag.tag.is_group() {
            let enclosing = self.product.current_scope;
            self.product.current_scope = Some(ParentId::Shape(id));
            let body = self.with_child_scope(|this| this.eval_block(&tag.body));
            self.product.current_scope = enclosing;
            return body;
        }

        if !tag.body.statements.is_empty() {
            return Err(InterpretError::syntax(
                format!("statements are not allowed inside {}.", tag.tag),
                tag.body.token.position,
            ));
        }
        Ok(result)
    }

    /// Evaluate an attribute statement down to its number.
    fn attribute_number(&mut self, attribute: &AttributeStatement) -> Result<f64, InterpretError> {
        match self.eval_attribute(attribute)? {
            Value::Attribute { value, .. } => Ok(value),
            other => Err(InterpretError::new(
                ErrorKind::UnknownError,
                format!("attribute evaluated to {}.", other.type_name()),
                attribute.token.position,
            )),
        }
    }
}

fn required_size_attribute(
    attribute: Option<&AttributeStatement>,
    name: AttributeName,
    at: Position,
) -> Result<&AttributeStatement, InterpretError> {
    attribute.ok_or_else(|| {
        InterpretError::syntax(format!("Attribute '{}' is missing for 'size'.", name), at)
    })
}

// ── Operators ───────────────────────────────────────────────────────

fn unknown_operator(at: Position) -> InterpretError {
    InterpretError::syntax("Unknown infix operator.", at)
}

fn overflow(at: Position) -> InterpretError {
    InterpretError::type_error("integer overflow.", at)
}

fn division_by_zero(at: Position) -> InterpretError {
    InterpretError::type_error("division by zero.", at)
}

fn int_infix(operator: InfixOperator, l: i64, r: i64, at: Position) -> Result<Value, InterpretError> {
    use InfixOperator::*;

    let arithmetic = |result: Option<i64>| result.map(Value::Int).ok_or_else(|| overflow(at));
    match operator {
        Plus => arithmetic(l.checked_add(r)),
        Minus => arithmetic(l.checked_sub(r)),
        Multiply => arithmetic(l.checked_mul(r)),
        Divide if r == 0 => Err(division_by_zero(at)),
        Divide => arithmetic(floor_div(l, r)),
        Modulo if r == 0 => Err(division_by_zero(at)),
        // MIN % -1 is 0; only the zero divisor can fail.
        Modulo => Ok(Value::Int(l.wrapping_rem(r))),
        Power if l == 0 && r < 0 => Err(division_by_zero(at)),
        Power => arithmetic(int_pow(l, r)),
        LessThan => Ok(Value::Boolean(l < r)),
        GreaterThan => Ok(Value::Boolean(l > r)),
        LessThanEqual => Ok(Value::Boolean(l <= r)),
        GreaterThanEqual => Ok(Value::Boolean(l >= r)),
        Equal => Ok(Value::Boolean(l == r)),
        NotEqual => Ok(Value::Boolean(l != r)),
        And | Or => Err(unknown_operator(at)),
    }
}

fn float_infix(operator: InfixOperator, l: f64, r: f64, at: Position) -> Result<Value, InterpretError> {
    use InfixOperator::*;

    let value = match operator {
        Plus => Value::Float(l + r),
        Minus => Value::Float(l - r),
        Multiply => Value::Float(l * r),
        Divide => Value::Float(l / r),
        Power => Value::Float(l.powf(r)),
        Modulo => Value::Float(l % r),
        LessThan => Value::Boolean(l < r),
        GreaterThan => Value::Boolean(l > r),
        LessThanEqual => Value::Boolean(l <= r),
        GreaterThanEqual => Value::Boolean(l >= r),
        Equal => Value::Boolean(l == r),
        NotEqual => Value::Boolean(l != r),
        And | Or => return Err(unknown_operator(at)),
    };
    Ok(value)
}

fn bool_infix(operator: InfixOperator, l: bool, r: bool, at: Position) -> Result<Value, InterpretError> {
    match operator {
        InfixOperator::And => Ok(Value::Boolean(l && r)),
        InfixOperator::Or => Ok(Value::Boolean(l || r)),
        InfixOperator::Equal => Ok(Value::Boolean(l == r)),
        InfixOperator::NotEqual => Ok(Value::Boolean(l != r)),
        _ => Err(unknown_operator(at)),
    }
}

/// Quotient rounded toward negative infinity. `None` on overflow.
pub(crate) fn floor_div(l: i64, r: i64) -> Option<i64> {
    let quotient = l.checked_div(r)?;
    if l % r != 0 && ((l < 0) != (r < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

/// `base ** exp` floored to an integer. A negative exponent gives a result
/// in (-1, 1) except for bases 1 and -1. `None` on overflow.
pub(crate) fn int_pow(base: i64, exp: i64) -> Option<i64> {
    if exp < 0 {
        return Some(match base {
            1 => 1,
            -1 if exp % 2 == 0 => 1,
            -1 => -1,
            b if b < 0 && exp % 2 != 0 => -1,
            _ => 0,
        });
    }
    match base {
        0 | 1 => Some(if exp == 0 { 1 } else { base }),
        -1 => Some(if exp % 2 == 0 { 1 } else { -1 }),
        _ => u32::try_from(exp).ok().and_then(|e| base.checked_pow(e)),
    }
}
