use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::LambdaData;
use crate::interpreter::{Interpreter, Signal};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{FunctionData, Stmt};
use crate::token::{Token, Type};

/// A user-defined function or method, closing over the environment active
/// where it was declared. Lambdas are the same shape with `name: None`.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Option<Token>,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(
        name: Option<Token>,
        params: Vec<Token>,
        body: Vec<Stmt>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        Function { name, params, body, closure, is_initializer }
    }

    pub fn from_declaration(declaration: &FunctionData, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function::new(
            Some(declaration.name.clone()),
            declaration.params.clone(),
            declaration.body.clone(),
            closure,
            is_initializer,
        )
    }

    pub fn from_lambda(declaration: &LambdaData, closure: Rc<RefCell<Environment>>) -> Self {
        Function::new(None, declaration.params.clone(), declaration.body.clone(), closure, false)
    }

    /// Produces a copy of this function whose closure has `this` bound to
    /// `instance`, one environment hop out. Used when a method is looked up
    /// off an instance.
    pub fn bind(&self, instance: Object) -> Function {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));
        environment.define("this", instance, true);
        Function::new(
            self.name.clone(),
            self.params.clone(),
            self.body.clone(),
            Rc::new(RefCell::new(environment)),
            self.is_initializer,
        )
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.body == other.body
            && Rc::ptr_eq(&self.closure, &other.closure)
            && self.is_initializer == other.is_initializer
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        for (param, arg) in self.params.iter().zip(arguments.into_iter()) {
            environment.define(&param.lexeme, arg, true);
        }

        let outcome = interpreter.execute_block(&self.body, Rc::new(RefCell::new(environment)));

        match outcome {
            Ok(()) => {
                if self.is_initializer {
                    self.closure.borrow().get_at(0, &Token::from("this"))
                } else {
                    Ok(Object::from(Literal::Nil))
                }
            }
            Err(Signal::Return(value)) => {
                if self.is_initializer {
                    self.closure.borrow().get_at(0, &Token::from("this"))
                } else {
                    Ok(value)
                }
            }
            Err(Signal::Error(err)) => Err(err),
        }
    }

    fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<fn {}>", name.lexeme),
            None => write!(f, "<fn>"),
        }
    }
}

/// A function implemented in Rust and exposed to Lox programs under a fixed
/// name, such as `clock`.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: Token,
    pub arity: usize,
    pub function: fn(&mut Interpreter<'_>, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl NativeFunction {
    pub fn globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: Token::new(Type::Identifier, "clock".to_owned(), None, 0),
                arity: 0,
                function: |_, _| {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .expect("system clock before unix epoch")
                        .as_secs_f64();
                    Ok(Object::from(now))
                },
            },
            NativeFunction {
                name: Token::new(Type::Identifier, "input".to_owned(), None, 0),
                arity: 0,
                function: |_, _| {
                    let mut line = String::new();
                    std::io::stdin().read_line(&mut line).unwrap_or(0);
                    if line.ends_with('\n') {
                        line.pop();
                        if line.ends_with('\r') {
                            line.pop();
                        }
                    }
                    Ok(Object::from(line))
                },
            },
        ]
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name.lexeme)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name.lexeme)
    }
}
