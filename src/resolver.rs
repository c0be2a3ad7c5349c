use std::collections::HashMap;
use std::mem;

use crate::error::ResolveError;
use crate::expr::{Expr, ExprVisitor};
use crate::interpreter::Interpreter;
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::Token;

#[derive(PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// A static pre-pass over the AST that computes, for every name reference
/// resolvable to a local, how many environment hops separate the use site
/// from its declaration. Populates the interpreter's side-table; reports
/// no values of its own.
pub struct Resolver<'i, 'a> {
    interpreter: &'i mut Interpreter<'a>,
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionType,
    current_class: ClassType,
    on_error: Box<dyn FnMut(ResolveError) + 'i>,
}

impl<'i, 'a> Resolver<'i, 'a> {
    pub fn new(interpreter: &'i mut Interpreter<'a>, on_error: impl FnMut(ResolveError) + 'i) -> Self {
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            on_error: Box::new(on_error),
        }
    }

    fn error(&mut self, token: Token, message: impl Into<String>) {
        (self.on_error)(ResolveError { token, message: message.into() });
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_function(&mut self, params: &[Token], body: &[Stmt], r#type: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, r#type);

        self.begin_scope();
        for param in params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };

        if scope.contains_key(&name.lexeme) {
            let token = name.clone();
            self.error(token, "Already a variable with this name in this scope.");
        }

        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        scope.insert(name.lexeme.clone(), true);
    }

    fn resolve_local(&mut self, id: u32, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.interpreter.resolve(id, depth);
                return;
            }
        }
    }
}

impl<'i, 'a> ExprVisitor<()> for Resolver<'i, 'a> {
    fn visit_variable_expr(&mut self, expr: &Expr) {
        let Expr::Variable(data) = expr else { unreachable!() };

        if let Some(scope) = self.scopes.last() {
            if scope.get(&data.name.lexeme) == Some(&false) {
                let token = data.name.clone();
                self.error(token, "Can't read local variable in its own initializer.");
            }
        }

        self.resolve_local(data.id, &data.name);
    }

    fn visit_assign_expr(&mut self, expr: &Expr) {
        let Expr::Assign(data) = expr else { unreachable!() };

        self.resolve_expr(&data.value);
        self.resolve_local(data.id, &data.name);
    }

    fn visit_literal_expr(&mut self, _expr: &Expr) {}

    fn visit_logical_expr(&mut self, expr: &Expr) {
        let Expr::Logical(data) = expr else { unreachable!() };

        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_unary_expr(&mut self, expr: &Expr) {
        let Expr::Unary(data) = expr else { unreachable!() };

        self.resolve_expr(&data.expr);
    }

    fn visit_binary_expr(&mut self, expr: &Expr) {
        let Expr::Binary(data) = expr else { unreachable!() };

        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) {
        let Expr::Grouping(data) = expr else { unreachable!() };

        self.resolve_expr(&data.expr);
    }

    fn visit_call_expr(&mut self, expr: &Expr) {
        let Expr::Call(data) = expr else { unreachable!() };

        self.resolve_expr(&data.callee);
        for argument in &data.arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get_expr(&mut self, expr: &Expr) {
        let Expr::Get(data) = expr else { unreachable!() };

        self.resolve_expr(&data.object);
    }

    fn visit_set_expr(&mut self, expr: &Expr) {
        let Expr::Set(data) = expr else { unreachable!() };

        self.resolve_expr(&data.value);
        self.resolve_expr(&data.object);
    }

    fn visit_this_expr(&mut self, expr: &Expr) {
        let Expr::This(data) = expr else { unreachable!() };

        if self.current_class == ClassType::None {
            let token = data.keyword.clone();
            self.error(token, "Can't use 'this' outside of a class.");
            return;
        }

        self.resolve_local(data.id, &data.keyword);
    }

    fn visit_super_expr(&mut self, expr: &Expr) {
        let Expr::Super(data) = expr else { unreachable!() };

        match self.current_class {
            ClassType::Subclass => {}
            ClassType::None => {
                let token = data.keyword.clone();
                self.error(token, "Can't use 'super' outside of a class.");
            }
            ClassType::Class => {
                let token = data.keyword.clone();
                self.error(token, "Can't use 'super' in a class with no superclass.");
            }
        }

        self.resolve_local(data.id, &data.keyword);
    }

    fn visit_lambda_expr(&mut self, expr: &Expr) {
        let Expr::Lambda(data) = expr else { unreachable!() };

        self.resolve_function(&data.params, &data.body, FunctionType::Function);
    }
}

impl<'i, 'a> StmtVisitor<()> for Resolver<'i, 'a> {
    fn visit_block_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Block(data) = stmt else { unreachable!() };

        self.begin_scope();
        self.resolve(&data.statements);
        self.end_scope();
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Var(data) = stmt else { unreachable!() };

        self.declare(&data.name);
        if let Some(initializer) = &data.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&data.name);
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Function(data) = stmt else { unreachable!() };

        self.declare(&data.name);
        self.define(&data.name);

        self.resolve_function(&data.params, &data.body, FunctionType::Function);
    }

    fn visit_expression_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Expression(data) = stmt else { unreachable!() };

        self.resolve_expr(&data.expr);
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) {
        let Stmt::If(data) = stmt else { unreachable!() };

        self.resolve_expr(&data.condition);
        self.resolve_stmt(&data.then_branch);
        if let Some(else_branch) = &data.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Print(data) = stmt else { unreachable!() };

        self.resolve_expr(&data.expr);
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Return(data) = stmt else { unreachable!() };

        if self.current_function == FunctionType::None {
            let token = data.keyword.clone();
            self.error(token, "Can't return from top-level code.");
        }

        if let Some(value) = &data.value {
            if self.current_function == FunctionType::Initializer && !matches!(value, Expr::This(_)) {
                let token = data.keyword.clone();
                self.error(token, "Can't return a non-this value from an initializer.");
            }

            self.resolve_expr(value);
        }
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) {
        let Stmt::While(data) = stmt else { unreachable!() };

        self.resolve_expr(&data.condition);
        self.resolve_stmt(&data.body);
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Class(data) = stmt else { unreachable!() };

        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(&data.name);
        self.define(&data.name);

        if let Some(superclass) = &data.superclass {
            if let Expr::Variable(variable) = superclass {
                if variable.name.lexeme == data.name.lexeme {
                    let token = variable.name.clone();
                    self.error(token, "A class can't inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.scopes.last_mut().expect("scope stack non-empty").insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes.last_mut().expect("scope stack non-empty").insert("this".to_string(), true);

        for method in &data.methods {
            let Stmt::Function(function) = method else { unreachable!() };
            let declaration =
                if function.name.lexeme == "init" { FunctionType::Initializer } else { FunctionType::Method };
            self.resolve_function(&function.params, &function.body, declaration);
        }

        self.end_scope();

        if data.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }
}
