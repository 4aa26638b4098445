use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{ErrorKind, InterpretError};
use crate::stack::ensure_sufficient_stack;
use crate::token::{AttributeName, Token, TokenKind};

/// Binding power of an operator, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Or,         // or
    And,        // and
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * /
    Power,      // **
    Mod,        // %
    Prefix,     // -x, not x
}

impl Precedence {
    /// Precedence of `kind` in infix position. Tokens without an infix
    /// handler bind at `Lowest`, which ends any expression.
    fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Or => Precedence::Or,
            TokenKind::And => Precedence::And,
            TokenKind::Equal | TokenKind::NotEqual => Precedence::Equality,
            TokenKind::LessThan
            | TokenKind::GreaterThan
            | TokenKind::LessThanEqual
            | TokenKind::GreaterThanEqual => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Factor,
            TokenKind::Pow => Precedence::Power,
            TokenKind::Mod => Precedence::Mod,
            _ => Precedence::Lowest,
        }
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    let operator = match kind {
        TokenKind::Plus => InfixOperator::Plus,
        TokenKind::Minus => InfixOperator::Minus,
        TokenKind::Asterisk => InfixOperator::Multiply,
        TokenKind::Slash => InfixOperator::Divide,
        TokenKind::Pow => InfixOperator::Power,
        TokenKind::Mod => InfixOperator::Modulo,
        TokenKind::LessThan => InfixOperator::LessThan,
        TokenKind::GreaterThan => InfixOperator::GreaterThan,
        TokenKind::LessThanEqual => InfixOperator::LessThanEqual,
        TokenKind::GreaterThanEqual => InfixOperator::GreaterThanEqual,
        TokenKind::Equal => InfixOperator::Equal,
        TokenKind::NotEqual => InfixOperator::NotEqual,
        TokenKind::And => InfixOperator::And,
        TokenKind::Or => InfixOperator::Or,
        _ => return None,
    };
    Some(operator)
}

/// Parser state: a cursor over the token stream. `pos` always names the
/// next unconsumed token and never moves past the trailing `Eof`.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

/// Parse a token stream (as produced by `tokenize`) into a program.
///
/// There is no error recovery: the first structural fault aborts the parse.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn parse(tokens: &[Token]) -> Result<Program, InterpretError> {
    let Some(last) = tokens.last() else {
        return Ok(Program::default());
    };
    if !last.is(TokenKind::Eof) {
        return Err(InterpretError::new(
            ErrorKind::UnknownError,
            "token stream is not terminated.",
            last.position,
        ));
    }

    let mut parser = Parser { tokens, pos: 0 };
    let mut statements = Vec::new();

    while !parser.at(TokenKind::Eof) {
        let statement = parser.parse_statement().inspect_err(|err| {
            debug!(%err, "parse failed");
        })?;
        statements.push(statement);
    }

    debug!(statements = statements.len(), "parsed");
    Ok(Program { statements })
}

impl<'a> Parser<'a> {
    // ── Helpers ──────────────────────────────────────────────────────

    fn current(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.pos]
    }

    /// The most recently consumed token, or the current one at the start.
    fn previous(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.pos.saturating_sub(1)]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    /// Consume the current token and return it.
    fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<&'a Token, InterpretError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(message))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> InterpretError {
        InterpretError::syntax(message, self.current().position)
    }

    fn skip_semicolons(&mut self) {
        while self.eat(TokenKind::Semicolon) {}
    }

    // ── Statements ──────────────────────────────────────────────────

    fn parse_statement(&mut self) -> Result<Statement, InterpretError> {
        let statement = match self.current().kind {
            TokenKind::Set => Statement::Set(self.parse_binding()?),
            TokenKind::Update => Statement::Update(self.parse_binding()?),
            _ => {
                let token = self.current().clone();
                let expression = self.parse_expression(Precedence::Lowest)?;
                Statement::Expression(ExpressionStatement { token, expression })
            }
        };
        // Semicolons separate statements; any number may follow one.
        self.skip_semicolons();
        Ok(statement)
    }

    /// `set <identifier> <expr>` / `update <identifier> <expr>`
    fn parse_binding(&mut self) -> Result<BindingStatement, InterpretError> {
        let token = self.advance().clone();
        let name = self.expect(TokenKind::Identifier, "variable name is expected.")?;
        let name = Identifier::new(name.clone());
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(BindingStatement { token, name, value })
    }

    /// Parse statements until `stop` holds for the current token. The stop
    /// token itself is left for the caller. The block is located at the
    /// token that opens it (`then`, `do`, `else`, or the last token of a
    /// tag or size header).
    fn parse_block(
        &mut self,
        stop: impl Fn(TokenKind) -> bool,
    ) -> Result<BlockStatement, InterpretError> {
        let token = self.previous().clone();
        let mut statements = Vec::new();
        while !stop(self.current().kind) {
            if self.at(TokenKind::Eof) {
                return Err(InterpretError::statement(
                    "unterminated block statement.",
                    self.current().position,
                ));
            }
            statements.push(self.parse_statement()?);
        }
        trace!(statements = statements.len(), line = token.position.line, "block");
        Ok(BlockStatement { token, statements })
    }

    /// A block closed by `end`, consuming the `end`.
    fn parse_end_block(&mut self) -> Result<BlockStatement, InterpretError> {
        let body = self.parse_block(|kind| kind == TokenKind::End)?;
        self.expect(TokenKind::End, "'end' is expected.")?;
        Ok(body)
    }

    // ── Expressions ─────────────────────────────────────────────────

    /// Precedence climbing: a prefix handler for the current token, then
    /// infix handlers while the next operator binds tighter than `precedence`.
    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression, InterpretError> {
        ensure_sufficient_stack(|| {
            let mut left = self.parse_prefix()?;
            while precedence < Precedence::of(self.current().kind) {
                left = self.parse_infix(left)?;
            }
            Ok(left)
        })
    }

    fn parse_prefix(&mut self) -> Result<Expression, InterpretError> {
        let token = self.current();
        match token.kind {
            TokenKind::Identifier => Ok(Expression::Identifier(Identifier::new(
                self.advance().clone(),
            ))),
            TokenKind::Int => self.parse_integer(),
            TokenKind::Float => self.parse_float(),
            TokenKind::True | TokenKind::False => {
                let token = self.advance().clone();
                let value = token.is(TokenKind::True);
                Ok(Expression::Boolean(BooleanLiteral { token, value }))
            }
            TokenKind::LeftParenthesis => self.parse_grouped(),
            TokenKind::Minus => self.parse_prefix_operator(PrefixOperator::Negate),
            TokenKind::Not => self.parse_prefix_operator(PrefixOperator::Not),
            TokenKind::If => self.parse_if(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::Size => self.parse_size(),
            TokenKind::Tag(_) => self.parse_tag(),
            TokenKind::Attribute(_) => self
                .parse_attribute_statement()
                .map(|attribute| Expression::Attribute(Box::new(attribute))),
            _ => Err(self.error_here(format!("unknown prefix '{}'.", token.literal))),
        }
    }

    fn parse_integer(&mut self) -> Result<Expression, InterpretError> {
        let token = self.advance();
        let literal = token.literal.as_str();
        let parsed = if let Some(hex) = literal.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else if let Some(bin) = literal.strip_prefix("0b") {
            i64::from_str_radix(bin, 2)
        } else {
            literal.parse::<i64>()
        };
        let value = parsed.map_err(|_| {
            InterpretError::syntax(
                format!("integer literal '{}' is too large.", literal),
                token.position,
            )
        })?;
        Ok(Expression::Integer(IntegerLiteral {
            token: token.clone(),
            value,
        }))
    }

    fn parse_float(&mut self) -> Result<Expression, InterpretError> {
        let token = self.advance();
        let value = token.literal.parse::<f64>().map_err(|_| {
            InterpretError::syntax(
                format!("invalid number '{}'.", token.literal),
                token.position,
            )
        })?;
        Ok(Expression::Float(FloatLiteral {
            token: token.clone(),
            value,
        }))
    }

    /// `( <expr> )`
    fn parse_grouped(&mut self) -> Result<Expression, InterpretError> {
        self.advance();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RightParenthesis, "')' is missing.")?;
        Ok(expression)
    }

    fn parse_prefix_operator(
        &mut self,
        operator: PrefixOperator,
    ) -> Result<Expression, InterpretError> {
        let token = self.advance().clone();
        let right = self
            .parse_expression(Precedence::Prefix)
            .map_err(|err| malformed_operand(operator.as_str(), err))?;
        Ok(Expression::Prefix(Box::new(PrefixExpression {
            token,
            operator,
            right,
        })))
    }

    fn parse_infix(&mut self, left: Expression) -> Result<Expression, InterpretError> {
        let token = self.current();
        let Some(operator) = infix_operator(token.kind) else {
            return Err(self.error_here(format!("unknown operator '{}'.", token.literal)));
        };
        let precedence = Precedence::of(token.kind);
        let token = self.advance().clone();
        let right = self
            .parse_expression(precedence)
            .map_err(|err| malformed_operand(operator.as_str(), err))?;
        Ok(Expression::Infix(Box::new(InfixExpression {
            token,
            operator,
            left,
            right,
        })))
    }

    /// `if <cond> then <block> {elsif <cond> then <block>} [else <block>] end`
    fn parse_if(&mut self) -> Result<Expression, InterpretError> {
        let token = self.advance().clone();
        let arm_end =
            |kind: TokenKind| matches!(kind, TokenKind::Elsif | TokenKind::Else | TokenKind::End);

        let mut cases = Vec::new();
        loop {
            let condition = self.parse_expression(Precedence::Lowest)?;
            self.expect(TokenKind::Then, "'Then' is expected.")?;
            let body = self.parse_block(arm_end)?;
            cases.push(IfCase { condition, body });
            if !self.eat(TokenKind::Elsif) {
                break;
            }
        }

        let else_body = if self.eat(TokenKind::Else) {
            Some(self.parse_block(|kind| kind == TokenKind::End)?)
        } else {
            None
        };
        self.expect(TokenKind::End, "'end' is expected.")?;

        Ok(Expression::If(IfExpression {
            token,
            cases,
            else_body,
        }))
    }

    /// `repeat <identifier> from <expr> to <expr> do <block> end`
    fn parse_repeat(&mut self) -> Result<Expression, InterpretError> {
        let token = self.advance().clone();
        let index = self.expect(TokenKind::Identifier, "missing index variable.")?;
        let index = Identifier::new(index.clone());
        self.expect(TokenKind::From, "missing 'from'.")?;
        let from = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::To, "missing 'to'.")?;
        let to = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::Do, "missing 'do'.")?;
        let body = self.parse_end_block()?;

        Ok(Expression::Repeat(Box::new(RepeatExpression {
            token,
            index,
            from,
            to,
            body,
        })))
    }

    /// `size [width <expr>] [height <expr>] <block> end`
    fn parse_size(&mut self) -> Result<Expression, InterpretError> {
        let token = self.advance().clone();
        let mut width = None;
        let mut height = None;

        while let TokenKind::Attribute(name) = self.current().kind {
            match name {
                AttributeName::Width => width = Some(self.parse_attribute_statement()?),
                AttributeName::Height => height = Some(self.parse_attribute_statement()?),
                _ => {
                    return Err(self.error_here(format!(
                        "unknown attribute '{}' for 'size'.",
                        self.current().literal
                    )))
                }
            }
        }

        let body = self.parse_end_block()?;
        Ok(Expression::Size(Box::new(SizeExpression {
            token,
            width,
            height,
            body,
        })))
    }

    /// `<tag> {<attribute> <expr>} <block> end`
    fn parse_tag(&mut self) -> Result<Expression, InterpretError> {
        let token = self.advance().clone();
        let TokenKind::Tag(tag) = token.kind else {
            return Err(InterpretError::syntax(
                format!("unknown tag '{}'.", token.literal),
                token.position,
            ));
        };

        let mut attributes = Vec::new();
        while matches!(self.current().kind, TokenKind::Attribute(_)) {
            attributes.push(self.parse_attribute_statement()?);
        }

        let body = self.parse_end_block()?;
        Ok(Expression::Tag(TagExpression {
            token,
            tag,
            attributes,
            body,
        }))
    }

    /// `<attribute> <expr>`; exactly one expression is consumed.
    fn parse_attribute_statement(&mut self) -> Result<AttributeStatement, InterpretError> {
        let token = self.advance().clone();
        let TokenKind::Attribute(name) = token.kind else {
            return Err(InterpretError::syntax(
                format!("unknown attribute '{}'.", token.literal),
                token.position,
            ));
        };
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(AttributeStatement { token, name, value })
    }
}

/// A bad operand is reported against its operator, at the location where
/// the operand went wrong.
fn malformed_operand(operator: &str, err: InterpretError) -> InterpretError {
    InterpretError::syntax(
        format!("incorrect expression after '{}'.", operator),
        err.position,
    )
}
