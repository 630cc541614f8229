use lazy_static::lazy_static;
use regex::Regex;

use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

/// Columns a tab advances indentation by
const TAB_WIDTH: usize = 4;

/// What the scanner does with a rule's match
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    /// Recognized and discarded (whitespace, comments)
    Skip,
    /// Line break
    Newline,
    /// Emitted as a token of this kind
    Emit(TokenKind),
}

/// A single entry of the ordered pattern table
struct Rule {
    action: Action,
    regex: Regex,
}

fn rule(action: Action, pattern: &str) -> Rule {
    Rule {
        action,
        regex: Regex::new(&format!("^(?:{})", pattern)).unwrap(),
    }
}

lazy_static! {
    /// Ordered pattern table. The first rule that matches at the cursor wins,
    /// so keywords precede identifiers and two-character operators precede
    /// their one-character prefixes.
    static ref RULES: Vec<Rule> = vec![
        rule(Action::Skip, r"#[^\n]*"),
        rule(Action::Newline, r"\r?\n"),
        rule(Action::Skip, r"[ \t\r]+"),
        rule(Action::Emit(TokenKind::String), r#""(?:[^"\\\n]|\\.)*""#),
        rule(Action::Emit(TokenKind::String), r"'(?:[^'\\\n]|\\.)*'"),
        rule(Action::Emit(TokenKind::Number), r"\d+(?:\.\d+)?"),
        // Keywords are anchored to a word boundary so `index` or `format`
        // stay identifiers.
        rule(Action::Emit(TokenKind::Function), r"function\b"),
        rule(Action::Emit(TokenKind::Return), r"return\b"),
        rule(Action::Emit(TokenKind::Print), r"print\b"),
        rule(Action::Emit(TokenKind::Elif), r"elif\b"),
        rule(Action::Emit(TokenKind::Else), r"else\b"),
        rule(Action::Emit(TokenKind::If), r"if\b"),
        rule(Action::Emit(TokenKind::For), r"for\b"),
        rule(Action::Emit(TokenKind::In), r"in\b"),
        rule(Action::Emit(TokenKind::While), r"while\b"),
        rule(Action::Emit(TokenKind::Range), r"range\b"),
        rule(Action::Emit(TokenKind::And), r"and\b"),
        rule(Action::Emit(TokenKind::Or), r"or\b"),
        rule(Action::Emit(TokenKind::Not), r"not\b"),
        rule(Action::Emit(TokenKind::True), r"(?:true|True)\b"),
        rule(Action::Emit(TokenKind::False), r"(?:false|False)\b"),
        rule(Action::Emit(TokenKind::StarStar), r"\*\*"),
        rule(Action::Emit(TokenKind::Eq), r"=="),
        rule(Action::Emit(TokenKind::NotEq), r"!="),
        rule(Action::Emit(TokenKind::LtEq), r"<="),
        rule(Action::Emit(TokenKind::GtEq), r">="),
        rule(Action::Emit(TokenKind::Lt), r"<"),
        rule(Action::Emit(TokenKind::Gt), r">"),
        rule(Action::Emit(TokenKind::Plus), r"\+"),
        rule(Action::Emit(TokenKind::Minus), r"-"),
        rule(Action::Emit(TokenKind::Star), r"\*"),
        rule(Action::Emit(TokenKind::Slash), r"/"),
        rule(Action::Emit(TokenKind::Percent), r"%"),
        rule(Action::Emit(TokenKind::Assign), r"="),
        rule(Action::Emit(TokenKind::LeftParen), r"\("),
        rule(Action::Emit(TokenKind::RightParen), r"\)"),
        rule(Action::Emit(TokenKind::LeftBracket), r"\["),
        rule(Action::Emit(TokenKind::RightBracket), r"\]"),
        rule(Action::Emit(TokenKind::LeftBrace), r"\{"),
        rule(Action::Emit(TokenKind::RightBrace), r"\}"),
        rule(Action::Emit(TokenKind::Comma), r","),
        rule(Action::Emit(TokenKind::Colon), r":"),
        rule(Action::Emit(TokenKind::Dot), r"\."),
        rule(Action::Emit(TokenKind::Identifier), r"[A-Za-z_][A-Za-z0-9_]*"),
    ];
}

/// Scanner for QOR source text
///
/// Walks the source with a byte cursor, trying the ordered pattern table at
/// every position. Layout is tracked on the side: an indentation stack turns
/// leading whitespace into `Indent`/`Dedent` tokens, and bracket nesting
/// suppresses newlines inside `()`, `[]` and `{}`.
pub struct Scanner<'a> {
    /// Source code
    source: &'a str,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Current byte offset in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Byte offset where the current line starts
    line_start: usize,
    /// Open indentation widths; the bottom entry is always 0
    indents: Vec<usize>,
    /// Bracket nesting depth
    depth: usize,
    /// True when the cursor sits at the beginning of a logical line
    at_line_start: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner from source code
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source,
            tokens: Vec::new(),
            current: 0,
            line: 1,
            line_start: 0,
            indents: vec![0],
            depth: 0,
            at_line_start: true,
        }
    }

    /// Scans all tokens from source code and returns them as a vector
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            if self.at_line_start && self.depth == 0 {
                self.at_line_start = false;
                self.scan_indentation()?;
                continue;
            }
            self.scan_token()?;
        }

        while self.indents.len() > 1 {
            self.indents.pop();
            let column = self.column();
            self.tokens
                .push(Token::new(TokenKind::Dedent, "", self.line, column));
        }

        tracing::debug!(tokens = self.tokens.len(), lines = self.line, "tokenized source");
        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<()> {
        let source = self.source;
        let rest = &source[self.current..];

        let matched = RULES
            .iter()
            .find_map(|rule| rule.regex.find(rest).map(|m| (rule.action, m.end())));

        let (action, len) = match matched {
            Some(found) => found,
            None => {
                return Err(Error::LexError {
                    character: rest.chars().next().unwrap_or('\0'),
                    line: self.line,
                    column: self.column(),
                })
            }
        };

        let lexeme = &rest[..len];
        match action {
            Action::Skip => {}
            Action::Newline => {
                if self.depth == 0 {
                    self.add_token(TokenKind::Newline, lexeme);
                    self.at_line_start = true;
                }
                self.line += 1;
                self.line_start = self.current + len;
            }
            Action::Emit(kind) => {
                match kind {
                    TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                        self.depth += 1
                    }
                    TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                        self.depth = self.depth.saturating_sub(1)
                    }
                    _ => {}
                }
                self.add_token(kind, lexeme);
            }
        }

        self.current += len;
        Ok(())
    }

    /// Measures the leading whitespace of the next non-blank line and emits
    /// layout tokens for it. Blank and comment-only lines are consumed whole.
    fn scan_indentation(&mut self) -> Result<()> {
        let source = self.source;
        loop {
            let bytes = source.as_bytes();
            let mut width = 0;
            let mut cursor = self.current;
            while cursor < bytes.len() {
                match bytes[cursor] {
                    b' ' => width += 1,
                    b'\t' => width += TAB_WIDTH,
                    b'\r' => {}
                    _ => break,
                }
                cursor += 1;
            }

            let rest = &source[cursor..];
            if rest.is_empty() {
                self.current = cursor;
                return Ok(());
            }

            if rest.starts_with('\n') || rest.starts_with('#') {
                match rest.find('\n') {
                    Some(offset) => {
                        self.current = cursor + offset + 1;
                        self.line += 1;
                        self.line_start = self.current;
                        continue;
                    }
                    None => {
                        self.current = source.len();
                        return Ok(());
                    }
                }
            }

            let lexeme = &source[self.current..cursor];
            self.current = cursor;
            return self.apply_indent(width, lexeme);
        }
    }

    fn apply_indent(&mut self, width: usize, lexeme: &str) -> Result<()> {
        let top = self.indents.last().copied().unwrap_or(0);

        if width > top {
            self.indents.push(width);
            let token = Token::new(TokenKind::Indent, lexeme, self.line, 1);
            self.tokens.push(token);
            return Ok(());
        }

        while width < self.indents.last().copied().unwrap_or(0) {
            self.indents.pop();
            self.tokens
                .push(Token::new(TokenKind::Dedent, "", self.line, 1));
        }

        if self.indents.last().copied().unwrap_or(0) != width {
            return Err(Error::InconsistentIndent {
                line: self.line,
                width,
            });
        }

        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn column(&self) -> usize {
        self.source[self.line_start..self.current].chars().count() + 1
    }

    fn add_token(&mut self, kind: TokenKind, lexeme: &str) {
        let column = self.column();
        self.tokens
            .push(Token::new(kind, lexeme, self.line, column));
    }
}
