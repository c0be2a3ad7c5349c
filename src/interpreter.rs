use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::Expr;
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::Stmt;
use crate::token::{Token, Type};
use crate::{expr::ExprVisitor, stmt::StmtVisitor};

/// What a statement's execution can unwind with, besides finishing
/// normally: a `return` value, caught only at the nearest function call, or
/// a runtime error propagating out to the driver. Kept distinct so a
/// `return` can never be mistaken for (or reported as) a runtime error.
pub enum Signal {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Signal {
    fn from(err: RuntimeError) -> Self {
        Signal::Error(err)
    }
}

/// Walks the AST directly, evaluating expressions to [`Object`]s and
/// executing statements for their effects. Holds the live environment chain
/// and the resolver's side-table (`locals`), and borrows the sink that
/// `print` writes to.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<u32, usize>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::globals() {
            globals.borrow_mut().define(&native.name.lexeme.clone(), Object::from(native), true);
        }

        Interpreter { environment: Rc::clone(&globals), globals, locals: HashMap::new(), output }
    }

    /// Records that the expression identified by `id` resolves `depth`
    /// environments out from wherever it's evaluated. Called only by the
    /// resolver.
    pub fn resolve(&mut self, id: u32, depth: usize) {
        self.locals.insert(id, depth);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        tracing::debug!(statements = statements.len(), "interpreting");

        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}
                Err(Signal::Error(err)) => return Err(err),
                Err(Signal::Return(_)) => {
                    unreachable!("resolver guarantees 'return' cannot appear in top-level code")
                }
            }
        }

        Ok(())
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        expr.accept(self)
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        stmt.accept(self)
    }

    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> Result<(), Signal> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;
        result
    }

    /// Writes `value` to the same sink `print` statements use. Lets the
    /// driver route a REPL's auto-printed expression value through the
    /// interpreter's injected output rather than the real process stdout.
    pub fn print_value(&mut self, value: &Object) {
        let _ = writeln!(self.output, "{value}");
    }

    fn look_up_variable(&self, id: u32, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => self.environment.borrow().get_at(distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn number_operand(&self, object: &Object, operator: &Token) -> Result<f64, RuntimeError> {
        object
            .as_number()
            .ok_or_else(|| RuntimeError { token: operator.clone(), message: "Operands must be numbers.".to_string() })
    }

    fn call_value(&mut self, callee: Object, paren: &Token, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let arity = match &callee {
            Object::Function(function) => function.arity(),
            Object::NativeFunction(function) => function.arity(),
            Object::Class(class) => class.borrow().arity(),
            _ => {
                return Err(RuntimeError {
                    token: paren.clone(),
                    message: "Can only call functions and classes.".to_string(),
                })
            }
        };

        if arguments.len() != arity {
            return Err(RuntimeError {
                token: paren.clone(),
                message: format!("Expected {arity} arguments but got {}.", arguments.len()),
            });
        }

        match callee {
            Object::Function(function) => function.call(self, arguments),
            Object::NativeFunction(function) => function.call(self, arguments),
            Object::Class(class) => Class::instantiate(&class, self, arguments),
            _ => unreachable!("non-callable objects are rejected above"),
        }
    }
}

impl<'a> ExprVisitor<Result<Object, RuntimeError>> for Interpreter<'a> {
    fn visit_literal_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Literal(literal) = expr else { unreachable!() };
        Ok(Object::from(literal.clone()))
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Grouping(data) = expr else { unreachable!() };
        self.evaluate(&data.expr)
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Unary(data) = expr else { unreachable!() };

        let right = self.evaluate(&data.expr)?;

        match data.operator.r#type {
            Type::Minus => {
                let n = right
                    .as_number()
                    .ok_or_else(|| RuntimeError { token: data.operator.clone(), message: "Operand must be a number.".to_string() })?;
                Ok(Object::from(-n))
            }
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!("parser never produces a unary node with this operator"),
        }
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Binary(data) = expr else { unreachable!() };

        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;
        let op = &data.operator;

        match op.r#type {
            Type::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => Ok(Object::from(l + r)),
                (Object::Literal(Literal::String(_)), _) | (_, Object::Literal(Literal::String(_))) => {
                    Ok(Object::from(format!("{left}{right}")))
                }
                _ => Err(RuntimeError {
                    token: op.clone(),
                    message: "Operands must be two numbers or either operands must be a string.".to_string(),
                }),
            },
            Type::Minus => Ok(Object::from(self.number_operand(&left, op)? - self.number_operand(&right, op)?)),
            Type::Star => Ok(Object::from(self.number_operand(&left, op)? * self.number_operand(&right, op)?)),
            Type::Slash => {
                let l = self.number_operand(&left, op)?;
                let r = self.number_operand(&right, op)?;
                if r == 0.0 {
                    return Err(RuntimeError { token: op.clone(), message: "Cannot divide by zero.".to_string() });
                }
                Ok(Object::from(l / r))
            }
            Type::Greater => Ok(Object::from(self.number_operand(&left, op)? > self.number_operand(&right, op)?)),
            Type::GreaterEqual => Ok(Object::from(self.number_operand(&left, op)? >= self.number_operand(&right, op)?)),
            Type::Less => Ok(Object::from(self.number_operand(&left, op)? < self.number_operand(&right, op)?)),
            Type::LessEqual => Ok(Object::from(self.number_operand(&left, op)? <= self.number_operand(&right, op)?)),
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),
            _ => unreachable!("parser never produces a binary node with this operator"),
        }
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Logical(data) = expr else { unreachable!() };

        let left = self.evaluate(&data.left)?;

        if data.operator.r#type == Type::Or {
            if left.is_truthy() {
                return Ok(left);
            }
        } else if !left.is_truthy() {
            return Ok(left);
        }

        self.evaluate(&data.right)
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Variable(data) = expr else { unreachable!() };
        self.look_up_variable(data.id, &data.name)
    }

    fn visit_assign_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Assign(data) = expr else { unreachable!() };

        let value = self.evaluate(&data.value)?;

        match self.locals.get(&data.id) {
            Some(&distance) => self.environment.borrow_mut().assign_at(distance, &data.name, value.clone())?,
            None => self.globals.borrow_mut().assign(&data.name, value.clone())?,
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Call(data) = expr else { unreachable!() };

        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        self.call_value(callee, &data.paren, arguments)
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Get(data) = expr else { unreachable!() };

        let object = self.evaluate(&data.object)?;

        match &object {
            Object::Instance(instance) => instance.borrow().get(&data.name, &object),
            _ => Err(RuntimeError { token: data.name.clone(), message: "Only instances have properties.".to_string() }),
        }
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Set(data) = expr else { unreachable!() };

        let object = self.evaluate(&data.object)?;

        let Object::Instance(instance) = &object else {
            return Err(RuntimeError { token: data.name.clone(), message: "Only instances have fields.".to_string() });
        };

        let value = self.evaluate(&data.value)?;
        instance.borrow_mut().set(&data.name, value.clone());
        Ok(value)
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::This(data) = expr else { unreachable!() };
        self.look_up_variable(data.id, &data.keyword)
    }

    fn visit_super_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Super(data) = expr else { unreachable!() };

        let distance = *self.locals.get(&data.id).expect("resolver records a distance for every 'super'");

        let superclass = self.environment.borrow().get_at(distance, &Token::from("super"))?;
        let Object::Class(superclass) = superclass else {
            panic!("resolver guarantee violated: 'super' did not resolve to a class");
        };

        let instance = self.environment.borrow().get_at(distance - 1, &Token::from("this"))?;

        let method = superclass.borrow().get_method(&data.method.lexeme).ok_or_else(|| RuntimeError {
            token: data.method.clone(),
            message: format!("Undefined property '{}'.", data.method.lexeme),
        })?;

        Ok(Object::from(method.bind(instance)))
    }

    fn visit_lambda_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Lambda(data) = expr else { unreachable!() };
        Ok(Object::from(Function::from_lambda(data, Rc::clone(&self.environment))))
    }
}

impl<'a> StmtVisitor<Result<(), Signal>> for Interpreter<'a> {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Expression(data) = stmt else { unreachable!() };
        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Print(data) = stmt else { unreachable!() };
        let value = self.evaluate(&data.expr)?;
        let _ = writeln!(self.output, "{value}");
        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Var(data) = stmt else { unreachable!() };

        match &data.initializer {
            Some(initializer) => {
                let value = self.evaluate(initializer)?;
                self.environment.borrow_mut().define(&data.name.lexeme, value, true);
            }
            None => {
                self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil), false);
            }
        }

        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Block(data) = stmt else { unreachable!() };
        let scope = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&data.statements, Rc::new(RefCell::new(scope)))
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::If(data) = stmt else { unreachable!() };

        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::While(data) = stmt else { unreachable!() };

        while self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.body)?;
        }

        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Return(data) = stmt else { unreachable!() };

        let value = match &data.value {
            Some(expr) => self.evaluate(expr)?,
            None => Object::from(Literal::Nil),
        };

        Err(Signal::Return(value))
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Function(data) = stmt else { unreachable!() };

        let function = Function::from_declaration(data, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(function), true);

        Ok(())
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Class(data) = stmt else { unreachable!() };

        let superclass = match &data.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Object::Class(class) => Some(class),
                _ => {
                    let Expr::Variable(variable) = expr else { unreachable!() };
                    return Err(Signal::Error(RuntimeError {
                        token: variable.name.clone(),
                        message: "Superclass must be a class.".to_string(),
                    }));
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil), true);

        let method_env = match &superclass {
            Some(superclass) => {
                let env = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
                env.borrow_mut().define("super", Object::from(Rc::clone(superclass)), true);
                env
            }
            None => Rc::clone(&self.environment),
        };

        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(function_data) = method else { unreachable!() };
            let is_initializer = function_data.name.lexeme == "init";
            let function = Function::from_declaration(function_data, Rc::clone(&method_env), is_initializer);
            methods.insert(function_data.name.lexeme.clone(), function);
        }

        let class = Class::new(data.name.lexeme.clone(), superclass, methods);

        self.environment
            .borrow_mut()
            .assign(&data.name, Object::from(Rc::new(RefCell::new(class))))
            .map_err(Signal::Error)?;

        Ok(())
    }
}
