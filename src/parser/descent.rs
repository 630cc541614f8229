use super::ast::{BinaryOp, ElifBranch, Expression, Program, Statement, UnaryOp};
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

/// Recursive-descent parser for QOR
///
/// Grammar, lowest precedence first:
///
/// ```text
/// expression     := or
/// or             := and ("or" and)*
/// and            := not ("and" not)*
/// not            := "not" not | comparison
/// comparison     := additive (("==" | "!=" | "<" | ">" | "<=" | ">=") additive)?
/// additive       := multiplicative (("+" | "-") multiplicative)*
/// multiplicative := power (("*" | "/" | "%") power)*
/// power          := unary ("**" multiplicative)?
/// unary          := "-" unary | primary
/// ```
///
/// Recursion is capped at [`MAX_NESTING_DEPTH`] levels of brackets, blocks
/// and prefix operators.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

/// Deepest nesting of sub-expressions and blocks the parser accepts
pub const MAX_NESTING_DEPTH: usize = 128;

impl Parser {
    /// Creates a new parser over a token sequence
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    /// Parses the tokens into an AST
    pub fn parse(&mut self) -> Result<Program> {
        let mut statements = Vec::new();

        self.skip_newlines();
        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
            self.skip_newlines();
        }

        tracing::debug!(statements = statements.len(), "parsed program");
        Ok(Program { statements })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.peek_kind() {
            Some(TokenKind::Function) => self.parse_function_def(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::For) => self.parse_for(),
            Some(TokenKind::While) => self.parse_while(),
            _ => {
                let statement = self.parse_simple_statement()?;
                self.end_of_statement()?;
                Ok(statement)
            }
        }
    }

    /// Statements that fit on one line: print, return, assignment and bare
    /// expressions. The terminator is left for the caller.
    fn parse_simple_statement(&mut self) -> Result<Statement> {
        match self.peek_kind() {
            Some(TokenKind::Print) => self.parse_print(),
            Some(TokenKind::Return) => self.parse_return(),
            _ => {
                let expr = self.parse_expression()?;
                if !self.match_kind(TokenKind::Assign) {
                    return Ok(Statement::Expression(expr));
                }

                let value = self.parse_expression()?;
                match expr {
                    Expression::Identifier(name) => Ok(Statement::Assignment { name, value }),
                    Expression::Index { target, index } => match *target {
                        Expression::Identifier(name) => Ok(Statement::IndexAssignment {
                            name,
                            index: *index,
                            value,
                        }),
                        _ => Err(self.invalid_target()),
                    },
                    _ => Err(self.invalid_target()),
                }
            }
        }
    }

    fn parse_print(&mut self) -> Result<Statement> {
        self.consume(TokenKind::Print)?;
        self.consume(TokenKind::LeftParen)?;
        let expr = self.parse_expression()?;
        self.consume(TokenKind::RightParen)?;
        Ok(Statement::Print(expr))
    }

    fn parse_return(&mut self) -> Result<Statement> {
        self.consume(TokenKind::Return)?;

        let value = match self.peek_kind() {
            None => None,
            Some(kind) if kind.ends_statement() => None,
            Some(_) => Some(self.parse_expression()?),
        };

        Ok(Statement::Return { value })
    }

    fn parse_function_def(&mut self) -> Result<Statement> {
        self.consume(TokenKind::Function)?;
        let name = self.expect_identifier()?;

        self.consume(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RightParen) {
            params.push(self.expect_identifier()?);
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen)?;
        self.consume(TokenKind::Colon)?;

        let body = self.parse_block()?;
        Ok(Statement::FunctionDef { name, params, body })
    }

    fn parse_if(&mut self) -> Result<Statement> {
        self.consume(TokenKind::If)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Colon)?;
        let then_branch = self.parse_block()?;

        let mut elif_branches = Vec::new();
        while self.match_kind(TokenKind::Elif) {
            let condition = self.parse_expression()?;
            self.consume(TokenKind::Colon)?;
            let body = self.parse_block()?;
            elif_branches.push(ElifBranch { condition, body });
        }

        let else_branch = if self.match_kind(TokenKind::Else) {
            self.consume(TokenKind::Colon)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_branch,
            elif_branches,
            else_branch,
        })
    }

    fn parse_for(&mut self) -> Result<Statement> {
        self.consume(TokenKind::For)?;
        let variable = self.expect_identifier()?;
        self.consume(TokenKind::In)?;
        let iterable = self.parse_expression()?;
        self.consume(TokenKind::Colon)?;
        let body = self.parse_block()?;

        Ok(Statement::For {
            variable,
            iterable,
            body,
        })
    }

    fn parse_while(&mut self) -> Result<Statement> {
        self.consume(TokenKind::While)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Colon)?;
        let body = self.parse_block()?;

        Ok(Statement::While { condition, body })
    }

    /// Body following a `:`. Either one simple statement on the same line, or
    /// an indented run of statements closed by a dedent.
    fn parse_block(&mut self) -> Result<Vec<Statement>> {
        if !self.match_kind(TokenKind::Newline) {
            let statement = self.parse_simple_statement()?;
            self.end_of_statement()?;
            return Ok(vec![statement]);
        }

        self.consume(TokenKind::Indent)?;
        self.nested(Self::parse_indented_body)
    }

    fn parse_indented_body(&mut self) -> Result<Vec<Statement>> {
        let mut body = Vec::new();
        loop {
            body.push(self.parse_statement()?);
            self.skip_newlines();
            if self.match_kind(TokenKind::Dedent) || self.is_at_end() {
                break;
            }
        }

        Ok(body)
    }

    /// A simple statement ends at a newline, a dedent, or the end of input.
    /// Dedents are left for the enclosing block.
    fn end_of_statement(&mut self) -> Result<()> {
        match self.peek_kind() {
            None | Some(TokenKind::Dedent) => Ok(()),
            Some(TokenKind::Newline) => {
                self.advance();
                Ok(())
            }
            Some(_) => Err(self.expected("end of statement")),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Parses a full expression
    pub fn parse_expression(&mut self) -> Result<Expression> {
        self.nested(Self::parse_or)
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        while self.match_kind(TokenKind::Or) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_not()?;
        while self.match_kind(TokenKind::And) {
            let right = self.parse_not()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression> {
        if self.match_kind(TokenKind::Not) {
            let operand = self.nested(Self::parse_not)?;
            return Ok(Expression::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    /// Comparisons do not chain: `a < b < c` leaves the second `<` unparsed,
    /// which the statement terminator then rejects.
    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_additive()?;

        let op = match self.peek_kind() {
            Some(TokenKind::Eq) => BinaryOp::Eq,
            Some(TokenKind::NotEq) => BinaryOp::NotEq,
            Some(TokenKind::Lt) => BinaryOp::Lt,
            Some(TokenKind::Gt) => BinaryOp::Gt,
            Some(TokenKind::LtEq) => BinaryOp::LtEq,
            Some(TokenKind::GtEq) => BinaryOp::GtEq,
            _ => return Ok(left),
        };
        self.advance();

        let right = self.parse_additive()?;
        Ok(binary(op, left, right))
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.parse_power()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                Some(TokenKind::Percent) => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_power()?;
            left = binary(op, left, right);
        }
    }

    /// The right operand of `**` re-enters the multiplicative level, so
    /// `2 ** 3 * 2` groups as `2 ** (3 * 2)`.
    fn parse_power(&mut self) -> Result<Expression> {
        let left = self.parse_unary()?;
        if self.match_kind(TokenKind::StarStar) {
            let right = self.nested(Self::parse_multiplicative)?;
            return Ok(binary(BinaryOp::Pow, left, right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        if !self.match_kind(TokenKind::Minus) {
            return self.parse_primary();
        }

        match self.nested(Self::parse_unary)? {
            Expression::IntLiteral(n) => Ok(Expression::IntLiteral(-n)),
            Expression::FloatLiteral(f) => Ok(Expression::FloatLiteral(-f)),
            operand => Ok(Expression::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            }),
        }
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return Err(self.expected("expression")),
        };

        match token.kind {
            TokenKind::Number => {
                self.advance();
                parse_number(&token)
            }
            TokenKind::String => {
                self.advance();
                Ok(Expression::StringLiteral(unescape_string(&token.lexeme)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::BoolLiteral(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::BoolLiteral(false))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.parse_list_literal(),
            TokenKind::LeftBrace => self.parse_dict_literal(),
            TokenKind::Range => self.parse_range(),
            TokenKind::Identifier => {
                self.advance();
                self.parse_postfix(token.lexeme)
            }
            _ => Err(self.expected("expression")),
        }
    }

    /// At most one postfix form per identifier: call, index, or method call.
    fn parse_postfix(&mut self, name: String) -> Result<Expression> {
        match self.peek_kind() {
            Some(TokenKind::LeftParen) => {
                let args = self.parse_arguments()?;
                Ok(Expression::Call { name, args })
            }
            Some(TokenKind::LeftBracket) => {
                self.advance();
                let index = self.parse_expression()?;
                self.consume(TokenKind::RightBracket)?;
                Ok(Expression::Index {
                    target: Box::new(Expression::Identifier(name)),
                    index: Box::new(index),
                })
            }
            Some(TokenKind::Dot) => {
                self.advance();
                let method = self.expect_identifier()?;
                let args = self.parse_arguments()?;
                Ok(Expression::MethodCall {
                    target: Box::new(Expression::Identifier(name)),
                    method,
                    args,
                })
            }
            _ => Ok(Expression::Identifier(name)),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>> {
        self.consume(TokenKind::LeftParen)?;
        let mut args = Vec::new();
        while !self.check(TokenKind::RightParen) {
            args.push(self.parse_expression()?);
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen)?;
        Ok(args)
    }

    fn parse_list_literal(&mut self) -> Result<Expression> {
        self.consume(TokenKind::LeftBracket)?;
        let mut elements = Vec::new();
        while !self.check(TokenKind::RightBracket) {
            elements.push(self.parse_expression()?);
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightBracket)?;
        Ok(Expression::ListLiteral(elements))
    }

    fn parse_dict_literal(&mut self) -> Result<Expression> {
        self.consume(TokenKind::LeftBrace)?;
        let mut pairs = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            let key = self.parse_expression()?;
            self.consume(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            pairs.push((key, value));
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightBrace)?;
        Ok(Expression::DictLiteral(pairs))
    }

    fn parse_range(&mut self) -> Result<Expression> {
        let keyword = self.consume(TokenKind::Range)?;
        let mut args = self.parse_arguments()?.into_iter().map(Box::new);

        let (start, stop, step) = match (args.next(), args.next(), args.next(), args.next()) {
            (Some(stop), None, None, None) => (None, stop, None),
            (Some(start), Some(stop), None, None) => (Some(start), stop, None),
            (Some(start), Some(stop), Some(step), None) => (Some(start), stop, Some(step)),
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: "1 to 3 range arguments".to_string(),
                    got: "a different argument count".to_string(),
                    line: keyword.line,
                    column: keyword.column,
                })
            }
        };

        Ok(Expression::Range { start, stop, step })
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    /// Runs one level deeper, failing once the nesting limit is reached
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.expected("shallower nesting"));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(64 * 1024, 1024 * 1024, || parse(self));
        self.depth -= 1;
        result
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned();
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(kind) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(self.expected(kind.name()))
    }

    fn expect_identifier(&mut self) -> Result<String> {
        Ok(self.consume(TokenKind::Identifier)?.lexeme)
    }

    fn skip_newlines(&mut self) {
        while self.match_kind(TokenKind::Newline) {}
    }

    /// Builds an expected-vs-actual error at the current token
    fn expected(&self, expected: &str) -> Error {
        match self.peek() {
            Some(token) => Error::UnexpectedToken {
                expected: expected.to_string(),
                got: token.describe(),
                line: token.line,
                column: token.column,
            },
            None => Error::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    fn invalid_target(&self) -> Error {
        let (line, column) = self
            .tokens
            .get(self.current.saturating_sub(1))
            .map(|token| (token.line, token.column))
            .unwrap_or((0, 0));
        Error::UnexpectedToken {
            expected: "variable or element as assignment target".to_string(),
            got: "expression".to_string(),
            line,
            column,
        }
    }
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn parse_number(token: &Token) -> Result<Expression> {
    let invalid = || Error::InvalidLiteral {
        literal: token.lexeme.clone(),
        line: token.line,
    };

    if token.lexeme.contains('.') {
        token
            .lexeme
            .parse::<f64>()
            .map(Expression::FloatLiteral)
            .map_err(|_| invalid())
    } else {
        token
            .lexeme
            .parse::<i64>()
            .map(Expression::IntLiteral)
            .map_err(|_| invalid())
    }
}

/// Strips the quotes from a string lexeme and resolves backslash escapes
fn unescape_string(lexeme: &str) -> String {
    let inner = if lexeme.len() >= 2 {
        &lexeme[1..lexeme.len() - 1]
    } else {
        ""
    };

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_str(source: &str) -> Result<Program> {
        let tokens = tokenize(source)?;
        Parser::new(tokens).parse()
    }

    fn parse_expr(source: &str) -> Expression {
        let program = parse_str(source).unwrap();
        match program.statements.into_iter().next() {
            Some(Statement::Expression(expr)) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_precedence() {
        let program = parse_str("result = 10 + 5 * 2").unwrap();
        assert_eq!(
            program.statements,
            vec![Statement::Assignment {
                name: "result".to_string(),
                value: binary(
                    BinaryOp::Add,
                    Expression::IntLiteral(10),
                    binary(
                        BinaryOp::Mul,
                        Expression::IntLiteral(5),
                        Expression::IntLiteral(2)
                    ),
                ),
            }]
        );
    }

    #[test]
    fn test_power_right_operand_is_multiplicative() {
        assert_eq!(
            parse_expr("2 ** 3 * 2"),
            binary(
                BinaryOp::Pow,
                Expression::IntLiteral(2),
                binary(
                    BinaryOp::Mul,
                    Expression::IntLiteral(3),
                    Expression::IntLiteral(2)
                ),
            )
        );
    }

    #[test]
    fn test_logical_precedence() {
        // not binds looser than comparison, and looser than not, or loosest
        let expr = parse_expr("a or not b == c and d");
        let expected = binary(
            BinaryOp::Or,
            Expression::Identifier("a".to_string()),
            binary(
                BinaryOp::And,
                Expression::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(binary(
                        BinaryOp::Eq,
                        Expression::Identifier("b".to_string()),
                        Expression::Identifier("c".to_string()),
                    )),
                },
                Expression::Identifier("d".to_string()),
            ),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_comparison_does_not_chain() {
        let err = parse_str("x = 1 < 2 < 3").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_negative_literal_folds() {
        assert_eq!(parse_expr("-5"), Expression::IntLiteral(-5));
        assert_eq!(
            parse_expr("-x"),
            Expression::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(Expression::Identifier("x".to_string())),
            }
        );
    }

    #[test]
    fn test_collection_literals_with_trailing_comma() {
        assert_eq!(
            parse_expr("[1, 2,]"),
            Expression::ListLiteral(vec![Expression::IntLiteral(1), Expression::IntLiteral(2)])
        );
        assert_eq!(
            parse_expr("{\"a\": 1, \"b\": true,}"),
            Expression::DictLiteral(vec![
                (
                    Expression::StringLiteral("a".to_string()),
                    Expression::IntLiteral(1)
                ),
                (
                    Expression::StringLiteral("b".to_string()),
                    Expression::BoolLiteral(true)
                ),
            ])
        );
    }

    #[test]
    fn test_postfix_forms() {
        assert!(matches!(parse_expr("f(1, 2)"), Expression::Call { ref args, .. } if args.len() == 2));
        assert!(matches!(parse_expr("xs[0]"), Expression::Index { .. }));
        assert!(matches!(
            parse_expr("xs.append(3)"),
            Expression::MethodCall { ref method, .. } if method == "append"
        ));
        // postfix forms do not chain
        assert!(parse_str("xs[0][1]").is_err());
    }

    #[test]
    fn test_range_arity() {
        assert!(matches!(
            parse_expr("range(5)"),
            Expression::Range { start: None, step: None, .. }
        ));
        assert!(matches!(
            parse_expr("range(1, 10, 2)"),
            Expression::Range { start: Some(_), step: Some(_), .. }
        ));
        assert!(parse_str("range()").is_err());
        assert!(parse_str("range(1, 2, 3, 4)").is_err());
    }

    #[test]
    fn test_inline_function_def() {
        let program = parse_str("function add(a, b): return a + b").unwrap();
        match &program.statements[0] {
            Statement::FunctionDef { name, params, body } => {
                assert_eq!(name, "add");
                assert_eq!(params, &vec!["a".to_string(), "b".to_string()]);
                assert_eq!(body.len(), 1);
                assert!(matches!(body[0], Statement::Return { value: Some(_) }));
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_indented_blocks() {
        let source = "\
function fact(n):
    result = 1
    while n > 1:
        result = result * n
        n = n - 1
    return result
print(fact(5))
";
        let program = parse_str(source).unwrap();
        assert_eq!(program.statements.len(), 2);
        match &program.statements[0] {
            Statement::FunctionDef { body, .. } => {
                assert_eq!(body.len(), 3);
                assert!(matches!(&body[1], Statement::While { body, .. } if body.len() == 2));
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_if_elif_else_chain() {
        let source = "\
if x > 0: sign = 1
elif x < 0: sign = -1
else:
    sign = 0
";
        let program = parse_str(source).unwrap();
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::If {
                elif_branches,
                else_branch,
                ..
            } => {
                assert_eq!(elif_branches.len(), 1);
                assert_eq!(else_branch.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_index_assignment() {
        let program = parse_str("xs[0] = 5").unwrap();
        assert!(matches!(
            &program.statements[0],
            Statement::IndexAssignment { name, .. } if name == "xs"
        ));
        assert!(parse_str("f(x) = 5").is_err());
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            parse_expr(r#""a\tb\n\"c\"""#),
            Expression::StringLiteral("a\tb\n\"c\"".to_string())
        );
        assert_eq!(
            parse_expr("'it\\'s'"),
            Expression::StringLiteral("it's".to_string())
        );
    }

    #[test]
    fn test_expected_vs_actual() {
        let err = parse_str("print(1").unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedEof {
                expected: "RPAREN".to_string()
            }
        );

        let err = parse_str("print 1").unwrap_err();
        match err {
            Error::UnexpectedToken {
                expected,
                got,
                line,
                column,
            } => {
                assert_eq!(expected, "LPAREN");
                assert_eq!(got, "NUMBER ('1')");
                assert_eq!((line, column), (1, 7));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_block_body() {
        let err = parse_str("if x:\n").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let shallow = format!("x = {}1{}", "(".repeat(100), ")".repeat(100));
        assert!(parse_str(&shallow).is_ok());

        let deep_sources = [
            format!("x = {}1{}", "(".repeat(20_000), ")".repeat(20_000)),
            format!("x = {}1{}", "[".repeat(20_000), "]".repeat(20_000)),
            format!("x = {}true", "not ".repeat(20_000)),
            format!("x = {}1", "- ".repeat(20_000)),
            format!("x = 2{}", " ** 2".repeat(20_000)),
        ];
        for source in &deep_sources {
            match parse_str(source) {
                Err(Error::UnexpectedToken { expected, .. }) => {
                    assert_eq!(expected, "shallower nesting")
                }
                other => panic!("unexpected result {:?}", other.map(|_| ())),
            }
        }
    }
}
