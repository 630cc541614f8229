use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    /// Human readable description used in syntax errors
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Newline => "NEWLINE".to_string(),
            TokenKind::Indent => "INDENT".to_string(),
            TokenKind::Dedent => "DEDENT".to_string(),
            _ => format!("{} ('{}')", self.kind, self.lexeme),
        }
    }
}

/// All possible token types in QOR
///
/// Literal values are not carried by the tag; the parser converts the
/// token's lexeme when it builds the literal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer or floating-point literal
    Number,
    /// String literal (lexeme includes the quotes)
    String,
    /// Boolean true literal
    True,
    /// Boolean false literal
    False,

    /// Identifier (variable or function name)
    Identifier,

    // Keywords
    /// `print`
    Print,
    /// `function`
    Function,
    /// `return`
    Return,
    /// `if`
    If,
    /// `elif`
    Elif,
    /// `else`
    Else,
    /// `for`
    For,
    /// `in`
    In,
    /// `while`
    While,
    /// `range`
    Range,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,

    // Operators
    /// Plus operator (+)
    Plus,
    /// Minus operator (-)
    Minus,
    /// Star operator (*)
    Star,
    /// Slash operator (/)
    Slash,
    /// Percent operator (%)
    Percent,
    /// Power operator (**)
    StarStar,
    /// Equality operator (==)
    Eq,
    /// Inequality operator (!=)
    NotEq,
    /// Less than operator (<)
    Lt,
    /// Greater than operator (>)
    Gt,
    /// Less than or equal operator (<=)
    LtEq,
    /// Greater than or equal operator (>=)
    GtEq,
    /// Assignment operator (=)
    Assign,

    // Delimiters
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left bracket [
    LeftBracket,
    /// Right bracket ]
    RightBracket,
    /// Left brace {
    LeftBrace,
    /// Right brace }
    RightBrace,
    /// Comma delimiter
    Comma,
    /// Colon (block opener, dict separator)
    Colon,
    /// Dot (method call)
    Dot,

    // Layout
    /// End of a logical line
    Newline,
    /// Indentation increased
    Indent,
    /// Indentation decreased by one level
    Dedent,
}

impl TokenKind {
    /// Check if token ends a simple statement
    pub fn ends_statement(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Dedent)
    }

    /// Upper-case tag name, as shown in token dumps and error messages
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Identifier => "ID",
            TokenKind::Print => "PRINT",
            TokenKind::Function => "FUNCTION",
            TokenKind::Return => "RETURN",
            TokenKind::If => "IF",
            TokenKind::Elif => "ELIF",
            TokenKind::Else => "ELSE",
            TokenKind::For => "FOR",
            TokenKind::In => "IN",
            TokenKind::While => "WHILE",
            TokenKind::Range => "RANGE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "MULTIPLY",
            TokenKind::Slash => "DIVIDE",
            TokenKind::Percent => "MODULO",
            TokenKind::StarStar => "POWER",
            TokenKind::Eq => "EQ",
            TokenKind::NotEq => "NE",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::LtEq => "LE",
            TokenKind::GtEq => "GE",
            TokenKind::Assign => "ASSIGN",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::LeftBracket => "LBRACKET",
            TokenKind::RightBracket => "RBRACKET",
            TokenKind::LeftBrace => "LBRACE",
            TokenKind::RightBrace => "RBRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Dot => "DOT",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
