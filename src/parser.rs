use crate::error::ParseError;
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, Type};

type ParseResult<T> = Result<T, ParseError>;

/// The parser's output shape: a clean run of statements, or (in the
/// REPL's dual-mode fallback) a single bare expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretable {
    Statements(Vec<Stmt>),
    Expression(Option<Expr>),
}

/// Recursive-descent, one-token lookahead (two for `fun` vs. a named
/// function declaration).
///
/// ```text
/// program    -> declaration* EOF
/// declaration -> classDecl | funDecl | varDecl | statement
/// classDecl  -> "class" IDENT ("<" IDENT)? "{" function* "}"
/// funDecl    -> "fun" function
/// function   -> IDENT "(" params? ")" block
/// varDecl    -> "var" IDENT ("=" expression)? ";"
/// statement  -> forStmt | ifStmt | printStmt | returnStmt | whileStmt | block | exprStmt
/// forStmt    -> "for" "(" (varDecl | exprStmt | ";") expression? ";" expression? ")" statement
/// ifStmt     -> "if" "(" expression ")" statement ("else" statement)?
/// printStmt  -> "print" expression ";"
/// returnStmt -> "return" expression? ";"
/// whileStmt  -> "while" "(" expression ")" statement
/// block      -> "{" declaration* "}"
/// exprStmt   -> expression ";"
///
/// expression -> assignment
/// assignment -> (call ".")? IDENT "=" assignment | logic_or
/// logic_or   -> logic_and ("or" logic_and)*
/// logic_and  -> lambda ("and" lambda)*
/// lambda     -> "fun" "(" params? ")" block | equality
/// equality   -> comparison (("!="|"==") comparison)*
/// comparison -> term (("<"|"<="|">"|">=") term)*
/// term       -> factor (("-"|"+") factor)*
/// factor     -> unary (("/"|"*") unary)*
/// unary      -> ("!"|"-") unary | call
/// call       -> primary ("(" args? ")" | "." IDENT)*
/// primary    -> "true"|"false"|"nil"|NUMBER|STRING | "super" "." IDENT | "this" | IDENT
///             | "(" expression ")"
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: u32,
    errors: Vec<ParseError>,
}

impl Parser {
    /// `starting_id` is the session-wide expression-id counter; it must
    /// never be reset across REPL lines or ids could collide in the
    /// interpreter's persistent side-table.
    pub fn new(tokens: Vec<Token>, starting_id: u32) -> Self {
        Parser { tokens, current: 0, next_id: starting_id, errors: Vec::new() }
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    fn fresh_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Parses a sequence of declarations. If that pass collected no errors,
    /// returns it as-is. Otherwise rewinds and retries as a single bare
    /// expression (for REPL-style `1 + 2` input); only if that also fails
    /// are the original statement-pass errors reported.
    pub fn parse(&mut self, mut on_error: impl FnMut(ParseError)) -> Interpretable {
        let start_token = self.current;
        let start_id = self.next_id;

        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        if self.errors.is_empty() {
            return Interpretable::Statements(statements);
        }

        self.current = start_token;
        self.next_id = start_id;
        let buffered = std::mem::take(&mut self.errors);

        match self.expression() {
            Ok(expr) if self.errors.is_empty() && self.check(Type::EOF) => Interpretable::Expression(Some(expr)),
            _ => {
                self.errors.clear();
                for err in buffered {
                    on_error(err);
                }
                Interpretable::Statements(Vec::new())
            }
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    fn check(&self, r#type: Type) -> bool {
        !self.is_at_end() && self.peek().r#type == r#type
    }

    fn check_next(&self, r#type: Type) -> bool {
        self.peek_next().is_some_and(|token| token.r#type == r#type)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn match_token(&mut self, r#type: Type) -> bool {
        if self.check(r#type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, r#type: Type, message: &str) -> ParseResult<&Token> {
        if self.check(r#type) {
            return Ok(self.advance());
        }

        Err(ParseError { token: self.peek().clone(), message: message.to_string() })
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.check(Type::Class) {
            self.advance();
            self.class_declaration()
        } else if self.check(Type::Fun) && self.check_next(Type::Identifier) {
            self.advance();
            self.function("function")
        } else if self.check(Type::Var) {
            self.advance();
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                self.errors.push(err);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect class name.")?.clone();

        let superclass = if self.match_token(Type::Less) {
            self.consume(Type::Identifier, "Expect superclass name.")?;
            Some(Expr::Variable(VariableData { id: self.fresh_id(), name: self.previous().clone() }))
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(Type::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect variable name.")?.clone();

        let initializer = if self.match_token(Type::Equal) { Some(self.expression()?) } else { None };

        self.consume(Type::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.match_token(Type::For) {
            return self.for_statement();
        }
        if self.match_token(Type::If) {
            return self.if_statement();
        }
        if self.match_token(Type::Print) {
            return self.print_statement();
        }
        if self.match_token(Type::Return) {
            return self.return_statement();
        }
        if self.match_token(Type::While) {
            return self.while_statement();
        }
        if self.match_token(Type::LeftBrace) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        self.expression_statement()
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_token(Type::Semicolon) {
            None
        } else if self.match_token(Type::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(Type::RightParen) { Some(self.expression()?) } else { None };
        self.consume(Type::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(BlockData { statements: vec![body, Stmt::Expression(ExpressionData { expr: increment })] });
        }

        body = Stmt::While(WhileData {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockData { statements: vec![initializer, body] });
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(Type::Else) { Some(Box::new(self.statement()?)) } else { None };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(PrintData { expr }))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };

        self.consume(Type::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While(WhileData { condition, body }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    fn function(&mut self, kind: &str) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, &format!("Expect {kind} name."))?.clone();
        self.consume(Type::LeftParen, &format!("Expect '(' after {kind} name."))?;
        let params = self.params()?;
        self.consume(Type::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;

        Ok(Stmt::Function(FunctionData { name, params, body }))
    }

    fn params(&mut self) -> ParseResult<Vec<Token>> {
        let mut params = Vec::new();

        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= 255 {
                    self.errors.push(ParseError {
                        token: self.peek().clone(),
                        message: "Can't have more than 255 parameters.".to_string(),
                    });
                }

                params.push(self.consume(Type::Identifier, "Expect parameter name.")?.clone());

                if !self.match_token(Type::Comma) {
                    break;
                }
            }
        }

        self.consume(Type::RightParen, "Expect ')' after parameters.")?;
        Ok(params)
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(Type::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.match_token(Type::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(data) => Ok(Expr::Assign(AssignData { id: self.fresh_id(), name: data.name, value: Box::new(value) })),
                Expr::Get(data) => Ok(Expr::Set(SetData { object: data.object, name: data.name, value: Box::new(value) })),
                other => {
                    self.errors.push(ParseError { token: equals, message: "Invalid assignment target.".to_string() });
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.match_token(Type::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.lambda()?;

        while self.match_token(Type::And) {
            let operator = self.previous().clone();
            let right = self.lambda()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn lambda(&mut self) -> ParseResult<Expr> {
        if self.check(Type::Fun) && self.check_next(Type::LeftParen) {
            self.advance();
            self.consume(Type::LeftParen, "Expect '(' after 'fun'.")?;
            let params = self.params()?;
            self.consume(Type::LeftBrace, "Expect '{' before lambda body.")?;
            let body = self.block()?;
            return Ok(Expr::Lambda(LambdaData { params, body }));
        }

        self.equality()
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while self.check(Type::BangEqual) || self.check(Type::EqualEqual) {
            self.advance();
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while self.check(Type::Greater) || self.check(Type::GreaterEqual) || self.check(Type::Less) || self.check(Type::LessEqual) {
            self.advance();
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while self.check(Type::Minus) || self.check(Type::Plus) {
            self.advance();
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while self.check(Type::Slash) || self.check(Type::Star) {
            self.advance();
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.check(Type::Bang) || self.check(Type::Minus) {
            self.advance();
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(UnaryData { operator, expr: Box::new(right) }));
        }

        self.call()
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    self.errors.push(ParseError {
                        token: self.peek().clone(),
                        message: "Can't have more than 255 arguments.".to_string(),
                    });
                }

                arguments.push(self.expression()?);

                if !self.match_token(Type::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments.")?.clone();

        Ok(Expr::Call(CallData { callee: Box::new(callee), paren, arguments }))
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.match_token(Type::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if self.match_token(Type::Dot) {
                let name = self.consume(Type::Identifier, "Expect property name after '.'.")?.clone();
                expr = Expr::Get(GetData { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.match_token(Type::False) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }
        if self.match_token(Type::True) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }
        if self.match_token(Type::Nil) {
            return Ok(Expr::Literal(Literal::Nil));
        }
        if self.match_token(Type::Number) || self.match_token(Type::String) {
            let literal = self.previous().literal.clone().expect("number or string token to carry a literal");
            return Ok(Expr::Literal(literal));
        }
        if self.match_token(Type::Super) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Type::Identifier, "Expect superclass method name.")?.clone();
            return Ok(Expr::Super(SuperData { id: self.fresh_id(), keyword, method }));
        }
        if self.match_token(Type::This) {
            return Ok(Expr::This(ThisData { id: self.fresh_id(), keyword: self.previous().clone() }));
        }
        if self.match_token(Type::Identifier) {
            return Ok(Expr::Variable(VariableData { id: self.fresh_id(), name: self.previous().clone() }));
        }
        if self.match_token(Type::LeftParen) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(ParseError { token: self.peek().clone(), message: "Expect expression.".to_string() })
    }

    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Class | Type::Fun | Type::Var | Type::For | Type::If | Type::While | Type::Print | Type::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
