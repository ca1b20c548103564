use crate::ast::{BinaryOp, Expr, Program, Stmt, UnaryOp};
use crate::error::{BhaiError, Construct, ErrorKind, Span};
use crate::lexer::{ArrayItem, Token, TokenKind, TokenValue};
use log::debug;

type Level = fn(&mut Parser) -> Result<Expr, BhaiError>;

/// Deepest nesting of blocks, groupings, indexes and unary operators.
pub const MAX_NESTING: usize = 256;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let (end, line) = tokens
                .last()
                .map_or((0, 1), |token| (token.span.end, token.line));
            tokens.push(Token::new(
                TokenKind::Eof,
                TokenValue::Text(String::new()),
                line,
                Span::new(end, end),
            ));
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Program, BhaiError> {
        if !self.match_kind(TokenKind::Start) {
            let found = self.peek().kind;
            return Err(self
                .error_here(ErrorKind::MissingStart { found })
                .with_help("Programs begin with `start:` in plain mode or `sharu:` in colorful mode."));
        }
        self.match_kind(TokenKind::Colon);

        let mut body = Vec::new();
        while !self.check(TokenKind::End) && !self.is_at_end() {
            body.push(self.statement()?);
        }

        if !self.match_kind(TokenKind::End) {
            let found = self.peek().kind;
            return Err(self
                .error_here(ErrorKind::MissingEnd { found })
                .with_help("Programs end with `end:` in plain mode or `samaapt:` in colorful mode."));
        }
        self.match_kind(TokenKind::Colon);

        if !self.is_at_end() {
            debug!(
                "ignoring {} token(s) after the end keyword",
                self.tokens.len() - self.current - 1
            );
        }

        Ok(Program { body })
    }

    fn statement(&mut self) -> Result<Stmt, BhaiError> {
        match self.peek().kind {
            TokenKind::Print => self.print_statement(),
            TokenKind::VariableAssign | TokenKind::List => self.variable_statement(),
            TokenKind::Function => self.function_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::Repeat => self.repeat_statement(),
            TokenKind::Identifier => {
                if self.peek_next().kind == TokenKind::LeftParen {
                    self.call_statement()
                } else {
                    self.variable_statement()
                }
            }
            found => Err(self
                .error_here(ErrorKind::UnexpectedToken { found })
                .with_help("A statement starts with print, a declaration, function, jo, repeat, or a name.")),
        }
    }

    fn print_statement(&mut self) -> Result<Stmt, BhaiError> {
        let start = self.advance().span.clone();
        self.match_kind(TokenKind::Colon);

        let expr = self.expression_in(Construct::Print)?;
        let span = start.to(expr.span());
        Ok(Stmt::Print { expr, span })
    }

    fn variable_statement(&mut self) -> Result<Stmt, BhaiError> {
        let start = self.peek().span.clone();
        let (declared, is_list) = match self.peek().kind {
            TokenKind::List => {
                self.advance();
                (true, true)
            }
            TokenKind::VariableAssign => {
                self.advance();
                (true, false)
            }
            _ => (false, false),
        };

        let construct = if declared {
            Construct::Declaration
        } else {
            Construct::Assignment
        };
        let name = self
            .consume_with_help(
                TokenKind::Identifier,
                construct,
                "Variable names start with a letter or '_': `umar = 25`.",
            )?
            .text()
            .to_string();
        self.consume_with_help(
            TokenKind::Assign,
            Construct::Assignment,
            "Give the variable a value with '=': `umar = 25`.",
        )?;

        let value = self.expression_in(Construct::Assignment)?;
        let span = start.to(value.span());
        Ok(Stmt::Variable {
            name,
            value,
            is_list,
            span,
        })
    }

    fn function_statement(&mut self) -> Result<Stmt, BhaiError> {
        let start = self.advance().span.clone();
        let name = self
            .consume(TokenKind::Identifier, Construct::Function)?
            .text()
            .to_string();
        self.consume_with_help(
            TokenKind::LeftParen,
            Construct::Function,
            "Parameters go in parentheses after the name: `function bolavo(naam) { ... }`.",
        )?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                params.push(
                    self.consume(TokenKind::Identifier, Construct::Parameters)?
                        .text()
                        .to_string(),
                );
                if self.check(TokenKind::RightParen) {
                    break;
                }
                self.consume(TokenKind::Comma, Construct::Parameters)?;
            }
        }
        self.consume(TokenKind::RightParen, Construct::Parameters)?;

        let (body, end) = self.block(Construct::Function)?;
        Ok(Stmt::Function {
            name,
            params,
            body,
            span: start.to(&end),
        })
    }

    fn if_statement(&mut self) -> Result<Stmt, BhaiError> {
        let start = self.advance().span.clone();

        self.consume_with_help(
            TokenKind::LeftParen,
            Construct::Condition,
            "Conditions are written in parentheses: `jo (umar > 18) to { ... }`.",
        )?;
        let condition = self.expression_in(Construct::Condition)?;
        self.consume_with_help(
            TokenKind::RightParen,
            Construct::Condition,
            "Close the condition with ')' before 'to'.",
        )?;
        self.consume_with_help(
            TokenKind::Then,
            Construct::Condition,
            "The condition is followed by 'to' and a block: `jo (x) to { ... }`.",
        )?;

        let (then_body, mut end) = self.block(Construct::Condition)?;
        let else_body = if self.match_kind(TokenKind::Else) {
            let (else_body, else_end) = self.block(Construct::Condition)?;
            end = else_end;
            Some(else_body)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_body,
            else_body,
            span: start.to(&end),
        })
    }

    fn repeat_statement(&mut self) -> Result<Stmt, BhaiError> {
        let start = self.advance().span.clone();

        let count = self.expression_in(Construct::Repeat)?;
        self.consume_with_help(
            TokenKind::Times,
            Construct::Repeat,
            "Loops read `repeat 5 vaar { ... }`.",
        )?;

        let (body, end) = self.block(Construct::Repeat)?;
        Ok(Stmt::Repeat {
            count,
            body,
            span: start.to(&end),
        })
    }

    fn call_statement(&mut self) -> Result<Stmt, BhaiError> {
        let name_token = self.advance().clone();
        self.consume(TokenKind::LeftParen, Construct::Call)?;

        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.expression_in(Construct::Call)?);
                if self.check(TokenKind::RightParen) {
                    break;
                }
                self.consume(TokenKind::Comma, Construct::Call)?;
            }
        }
        let end = self
            .consume(TokenKind::RightParen, Construct::Call)?
            .span
            .clone();

        Ok(Stmt::Call {
            name: name_token.text().to_string(),
            args,
            span: name_token.span.to(&end),
        })
    }

    /// `{ statements }`, returning the statements and the closing brace span.
    fn block(&mut self, construct: Construct) -> Result<(Vec<Stmt>, Span), BhaiError> {
        self.consume_with_help(
            TokenKind::LeftBrace,
            construct,
            "Blocks are wrapped in braces: `{ ... }`.",
        )?;

        let statements = self.nested(|parser| {
            let mut statements = Vec::new();
            while !parser.check(TokenKind::RightBrace)
                && !parser.check(TokenKind::End)
                && !parser.is_at_end()
            {
                statements.push(parser.statement()?);
            }
            Ok(statements)
        })?;

        let end = self
            .consume_with_help(
                TokenKind::RightBrace,
                Construct::Block,
                "Every '{' needs a matching '}'.",
            )?
            .span
            .clone();
        Ok((statements, end))
    }

    /// Parses an expression, reporting a missing one in terms of `construct`.
    fn expression_in(&mut self, construct: Construct) -> Result<Expr, BhaiError> {
        let found = self.peek().kind;
        if !can_start_expression(found) {
            return Err(self.error_here(ErrorKind::ExpectedExpression { construct, found }));
        }
        self.expression()
    }

    fn expression(&mut self) -> Result<Expr, BhaiError> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr, BhaiError> {
        self.binary_level(&[(TokenKind::Or, BinaryOp::Or)], Parser::and)
    }

    fn and(&mut self) -> Result<Expr, BhaiError> {
        self.binary_level(&[(TokenKind::And, BinaryOp::And)], Parser::equality)
    }

    fn equality(&mut self) -> Result<Expr, BhaiError> {
        self.binary_level(
            &[
                (TokenKind::EqualEqual, BinaryOp::Equal),
                (TokenKind::BangEqual, BinaryOp::NotEqual),
            ],
            Parser::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Expr, BhaiError> {
        self.binary_level(
            &[
                (TokenKind::Greater, BinaryOp::Greater),
                (TokenKind::Less, BinaryOp::Less),
            ],
            Parser::term,
        )
    }

    fn term(&mut self) -> Result<Expr, BhaiError> {
        self.binary_level(
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Subtract),
            ],
            Parser::factor,
        )
    }

    fn factor(&mut self) -> Result<Expr, BhaiError> {
        self.binary_level(
            &[
                (TokenKind::Star, BinaryOp::Multiply),
                (TokenKind::Slash, BinaryOp::Divide),
            ],
            Parser::unary,
        )
    }

    /// Left-associative loop shared by every binary precedence level.
    fn binary_level(
        &mut self,
        operators: &[(TokenKind, BinaryOp)],
        next: Level,
    ) -> Result<Expr, BhaiError> {
        let mut expr = next(self)?;

        while let Some(&(_, operator)) = operators.iter().find(|(kind, _)| self.check(*kind)) {
            self.advance();
            let right = self.operand(operator.symbol(), next)?;
            let span = expr.span().to(right.span());

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn operand(&mut self, symbol: &str, next: Level) -> Result<Expr, BhaiError> {
        let found = self.peek().kind;
        if !can_start_expression(found) {
            return Err(self
                .error_here(ErrorKind::ExpectedExpression {
                    construct: Construct::Expression,
                    found,
                })
                .with_help(format!("'{}' needs an expression on both sides.", symbol)));
        }
        next(self)
    }

    fn unary(&mut self) -> Result<Expr, BhaiError> {
        let operator = match self.peek().kind {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.primary(),
        };

        let start = self.advance().span.clone();
        let operand = self.nested(|parser| parser.operand(operator.symbol(), Parser::unary))?;
        let span = start.to(operand.span());

        Ok(Expr::Unary {
            operator,
            operand: Box::new(operand),
            span,
        })
    }

    fn primary(&mut self) -> Result<Expr, BhaiError> {
        let token = self.peek().clone();
        let span = token.span.clone();

        let expr = match &token.value {
            TokenValue::Number(value) => Expr::Number { value: *value, span },
            TokenValue::Str(value) => Expr::String {
                value: value.clone(),
                span,
            },
            TokenValue::Boolean(value) => Expr::Boolean { value: *value, span },
            TokenValue::Array(items) => Expr::Array {
                items: items.iter().map(|item| array_item(item, &span)).collect(),
                span,
            },
            TokenValue::Text(text) => match token.kind {
                TokenKind::Identifier => {
                    self.advance();
                    return self.identifier_tail(text.clone(), span);
                }
                TokenKind::LeftParen => {
                    self.advance();
                    let expr = self.nested(|parser| parser.expression_in(Construct::Grouping))?;
                    self.consume_with_help(
                        TokenKind::RightParen,
                        Construct::Grouping,
                        "Every opening parenthesis '(' must have a matching closing parenthesis ')'.",
                    )?;
                    return Ok(expr);
                }
                found => {
                    return Err(self.error_here(ErrorKind::ExpectedExpression {
                        construct: Construct::Expression,
                        found,
                    }))
                }
            },
        };

        self.advance();
        Ok(expr)
    }

    /// Optional `[index]` or `.property` after a name.
    fn identifier_tail(&mut self, name: String, span: Span) -> Result<Expr, BhaiError> {
        if self.match_kind(TokenKind::LeftBracket) {
            let index = self.nested(|parser| parser.expression_in(Construct::Index))?;
            let end = self
                .consume_with_help(
                    TokenKind::RightBracket,
                    Construct::Index,
                    "Index a list with brackets: `mitro[0]`.",
                )?
                .span
                .clone();
            return Ok(Expr::Index {
                name,
                index: Box::new(index),
                span: span.to(&end),
            });
        }

        if self.match_kind(TokenKind::Dot) {
            let property = self.consume(TokenKind::Identifier, Construct::Property)?;
            let end = property.span.clone();
            let property = property.text().to_string();
            return Ok(Expr::Property {
                name,
                property,
                span: span.to(&end),
            });
        }

        Ok(Expr::Identifier { name, span })
    }

    /// Runs `parse` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Parser) -> Result<T, BhaiError>,
    ) -> Result<T, BhaiError> {
        if self.depth >= MAX_NESTING {
            return Err(self
                .error_here(ErrorKind::TooDeeplyNested { limit: MAX_NESTING })
                .with_help("Move part of it into a variable or a function."));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> &Token {
        self.tokens
            .get(self.current + 1)
            .unwrap_or_else(|| self.peek())
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, kind: TokenKind, construct: Construct) -> Result<&Token, BhaiError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek().kind;
            Err(self.error_here(ErrorKind::Expected {
                expected: kind,
                construct,
                found,
            }))
        }
    }

    fn consume_with_help(
        &mut self,
        kind: TokenKind,
        construct: Construct,
        help: &str,
    ) -> Result<&Token, BhaiError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek().kind;
            Err(self
                .error_here(ErrorKind::Expected {
                    expected: kind,
                    construct,
                    found,
                })
                .with_help(help))
        }
    }

    fn error_here(&self, kind: ErrorKind) -> BhaiError {
        let token = self.peek();
        // At EOF, point just past the last real token
        let span = if token.kind == TokenKind::Eof && self.current > 0 {
            Span::single(self.tokens[self.current - 1].span.end)
        } else {
            token.span.clone()
        };
        BhaiError::new(kind, span)
    }
}

fn can_start_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number
            | TokenKind::String
            | TokenKind::Boolean
            | TokenKind::Array
            | TokenKind::Identifier
            | TokenKind::LeftParen
            | TokenKind::Minus
            | TokenKind::Not
    )
}

fn array_item(item: &ArrayItem, span: &Span) -> Expr {
    let span = span.clone();
    match item {
        ArrayItem::Number(value) => Expr::Number { value: *value, span },
        ArrayItem::Str(value) => Expr::String {
            value: value.clone(),
            span,
        },
        ArrayItem::Boolean(value) => Expr::Boolean { value: *value, span },
        ArrayItem::Identifier(name) => Expr::Identifier {
            name: name.clone(),
            span,
        },
    }
}
