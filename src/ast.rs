//! Syntax tree produced by the parser and walked by the interpreter.
//!
//! Every node except `Program` keeps the token that introduced it so the
//! interpreter can report errors at a precise source location.

use crate::token::{AttributeName, ShapeTag, Token};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(ExpressionStatement),
    /// `set name value`: bind in the innermost scope.
    Set(BindingStatement),
    /// `update name value`: mutate the nearest existing binding.
    Update(BindingStatement),
}

impl Statement {
    pub fn token(&self) -> &Token {
        match self {
            Statement::Expression(s) => &s.token,
            Statement::Set(s) | Statement::Update(s) => &s.token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub token: Token,
    pub expression: Expression,
}

/// Shared shape of `set` and `update`.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

/// An ordered statement list. `token` is the token just before the body:
/// `then`, `do`, `else`, or the last token of a tag or size header.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    Boolean(BooleanLiteral),
    Prefix(Box<PrefixExpression>),
    Infix(Box<InfixExpression>),
    If(IfExpression),
    Repeat(Box<RepeatExpression>),
    Size(Box<SizeExpression>),
    Tag(TagExpression),
    Attribute(Box<AttributeStatement>),
}

impl Expression {
    pub fn token(&self) -> &Token {
        match self {
            Expression::Identifier(e) => &e.token,
            Expression::Integer(e) => &e.token,
            Expression::Float(e) => &e.token,
            Expression::Boolean(e) => &e.token,
            Expression::Prefix(e) => &e.token,
            Expression::Infix(e) => &e.token,
            Expression::If(e) => &e.token,
            Expression::Repeat(e) => &e.token,
            Expression::Size(e) => &e.token,
            Expression::Tag(e) => &e.token,
            Expression::Attribute(e) => &e.token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        Identifier {
            name: token.literal.clone(),
            token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub token: Token,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub token: Token,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    /// `-x`
    Negate,
    /// `not x`
    Not,
}

impl PrefixOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefixOperator::Negate => "-",
            PrefixOperator::Not => "not",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: PrefixOperator,
    pub right: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Power,
    Modulo,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl InfixOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Power => "**",
            InfixOperator::Modulo => "%",
            InfixOperator::LessThan => "<",
            InfixOperator::GreaterThan => ">",
            InfixOperator::LessThanEqual => "<=",
            InfixOperator::GreaterThanEqual => ">=",
            InfixOperator::Equal => "==",
            InfixOperator::NotEqual => "!=",
            InfixOperator::And => "and",
            InfixOperator::Or => "or",
        }
    }
}

/// `token` is the operator token.
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub token: Token,
    pub operator: InfixOperator,
    pub left: Expression,
    pub right: Expression,
}

/// One `if`/`elsif` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct IfCase {
    pub condition: Expression,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub token: Token,
    pub cases: Vec<IfCase>,
    pub else_body: Option<BlockStatement>,
}

/// `repeat index from a to b do ... end`
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatExpression {
    pub token: Token,
    pub index: Identifier,
    pub from: Expression,
    pub to: Expression,
    pub body: BlockStatement,
}

/// `size [width w] [height h] ... end`. Both attributes are required at
/// evaluation time, not at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeExpression {
    pub token: Token,
    pub width: Option<AttributeStatement>,
    pub height: Option<AttributeStatement>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagExpression {
    pub token: Token,
    pub tag: ShapeTag,
    pub attributes: Vec<AttributeStatement>,
    pub body: BlockStatement,
}

/// `<attribute> <expr>`, e.g. `width 30`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeStatement {
    pub token: Token,
    pub name: AttributeName,
    pub value: Expression,
}
