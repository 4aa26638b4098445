use std::fmt;

use crate::error::Position;

/// A shape kind keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeTag {
    /// The only tag whose body may contain statements and nested tags.
    Group,
    Rectangle,
}

impl ShapeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeTag::Group => "group",
            ShapeTag::Rectangle => "rectangle",
        }
    }

    pub fn is_group(self) -> bool {
        self == ShapeTag::Group
    }
}

impl fmt::Display for ShapeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named numeric property of a shape or of the `size` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeName {
    Width,
    Height,
    PositionX,
    PositionY,
    Rotate,
    Scale,
    ScaleX,
    ScaleY,
}

impl AttributeName {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeName::Width => "width",
            AttributeName::Height => "height",
            AttributeName::PositionX => "positionX",
            AttributeName::PositionY => "positionY",
            AttributeName::Rotate => "rotate",
            AttributeName::Scale => "scale",
            AttributeName::ScaleX => "scaleX",
            AttributeName::ScaleY => "scaleY",
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A character that starts no token. Rejected by the parser.
    Illegal,
    Eof,

    Identifier,
    Int,
    Float,

    // Operators
    Plus,     // +
    Minus,    // -
    Asterisk, // *
    Slash,    // /
    Mod,      // %
    Pow,      // **

    // Comparators
    LessThan,         // <
    GreaterThan,      // >
    LessThanEqual,    // <=
    GreaterThanEqual, // >=
    Equal,            // ==
    NotEqual,         // !=

    LeftParenthesis,  // (
    RightParenthesis, // )

    /// Separates `set a 5; -a` from `set a (5 - a)`.
    Semicolon,

    // Keywords
    True,
    False,
    Not,
    And,
    Or,
    Set,
    Update,
    End,
    If,
    Then,
    Elsif,
    Else,
    Repeat,
    From,
    To,
    Do,
    Size,
    Tag(ShapeTag),
    Attribute(AttributeName),
}

/// A located token. `literal` is the exact source text; `position` is where
/// the token starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            literal: literal.into(),
            position: Position::new(line, column),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Resolve an identifier-shaped word against the keyword table.
pub fn lookup_identifier(literal: &str) -> TokenKind {
    match literal {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "not" => TokenKind::Not,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "set" => TokenKind::Set,
        "update" => TokenKind::Update,
        "end" => TokenKind::End,
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "elsif" => TokenKind::Elsif,
        "else" => TokenKind::Else,
        "repeat" => TokenKind::Repeat,
        "from" => TokenKind::From,
        "to" => TokenKind::To,
        "do" => TokenKind::Do,
        "size" => TokenKind::Size,
        "group" => TokenKind::Tag(ShapeTag::Group),
        "rectangle" => TokenKind::Tag(ShapeTag::Rectangle),
        "width" => TokenKind::Attribute(AttributeName::Width),
        "height" => TokenKind::Attribute(AttributeName::Height),
        "positionX" => TokenKind::Attribute(AttributeName::PositionX),
        "positionY" => TokenKind::Attribute(AttributeName::PositionY),
        "rotate" => TokenKind::Attribute(AttributeName::Rotate),
        "scale" => TokenKind::Attribute(AttributeName::Scale),
        "scaleX" => TokenKind::Attribute(AttributeName::ScaleX),
        "scaleY" => TokenKind::Attribute(AttributeName::ScaleY),
        _ => TokenKind::Identifier,
    }
}
