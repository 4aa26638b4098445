use std::fmt;

/// A 1-based position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 1-based column (character offset within the line, plus one)
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The category of an interpreter failure.
///
/// The variant name is part of the external contract: it is emitted verbatim
/// as `error.type` in the JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A two-character operator is missing its second character, or a bare `.`.
    ExpectedCharError,
    SyntaxError,
    /// A block never reached its terminator.
    StatementError,
    TypeError,
    /// `update` of a name that has no binding anywhere in the scope chain.
    UndeclaredVariableError,
    /// Read of a name that has no binding anywhere in the scope chain.
    NoValueAssignedError,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ExpectedCharError => "ExpectedCharError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::StatementError => "StatementError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::UndeclaredVariableError => "UndeclaredVariableError",
            ErrorKind::NoValueAssignedError => "NoValueAssignedError",
            ErrorKind::UnknownError => "UnknownError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first error raised by any interpreter stage, with the location of the
/// token judged responsible.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} at {position}: {message}")]
pub struct InterpretError {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Position,
}

impl InterpretError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: Position) -> Self {
        InterpretError {
            kind,
            message: message.into(),
            position,
        }
    }

    pub fn expected_char(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::ExpectedCharError, message, position)
    }

    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::SyntaxError, message, position)
    }

    pub fn statement(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::StatementError, message, position)
    }

    pub fn type_error(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::TypeError, message, position)
    }

    pub fn undeclared(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::UndeclaredVariableError, message, position)
    }

    pub fn no_value(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::NoValueAssignedError, message, position)
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }
}
