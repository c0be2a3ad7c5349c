use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A lexical scope. Chains to its enclosing scope to model nested blocks,
/// function bodies, and the global scope at the root.
///
/// `uninitialized` tracks names declared with `var name;` (no initializer):
/// reading one before it's assigned is a runtime error rather than silently
/// observing `nil`.
#[derive(Debug, Clone)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, Object>,
    uninitialized: HashSet<String>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            enclosing,
            values: HashMap::new(),
            uninitialized: HashSet::new(),
        }
    }

    pub fn define(&mut self, name: &str, value: Object, initialized: bool) {
        self.values.insert(name.to_string(), value);
        if initialized {
            self.uninitialized.remove(name);
        } else {
            self.uninitialized.insert(name.to_string());
        }
    }

    /// Walks `distance` scopes out. Only ever called with `distance > 0` and
    /// a resolver-verified distance, so a missing link is a resolver bug.
    fn ancestor(&self, distance: usize) -> Rc<RefCell<Environment>> {
        let mut environment = self
            .enclosing
            .clone()
            .unwrap_or_else(|| panic!("resolver reported a scope at depth {distance} that doesn't exist"));

        for _ in 1..distance {
            let parent = environment
                .borrow()
                .enclosing
                .clone()
                .unwrap_or_else(|| panic!("resolver reported a scope at depth {distance} that doesn't exist"));
            environment = parent;
        }

        environment
    }

    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if self.uninitialized.contains(&name.lexeme) {
            return Err(RuntimeError {
                token: name.clone(),
                message: format!("Uninitialized variable '{}'.", name.lexeme),
            });
        }

        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    /// Jumps exactly `distance` hops out, then reads that scope's map
    /// directly — no fallback. A miss here means the resolver computed the
    /// wrong distance, not that the variable lives one scope further out.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        if distance == 0 {
            if self.uninitialized.contains(&name.lexeme) {
                return Err(RuntimeError {
                    token: name.clone(),
                    message: format!("Uninitialized variable '{}'.", name.lexeme),
                });
            }

            return self.values.get(&name.lexeme).cloned().ok_or_else(|| RuntimeError {
                token: name.clone(),
                message: format!("Undefined variable '{}'.", name.lexeme),
            });
        }

        let ancestor = self.ancestor(distance);
        let environment = ancestor.borrow();

        if environment.uninitialized.contains(&name.lexeme) {
            return Err(RuntimeError {
                token: name.clone(),
                message: format!("Uninitialized variable '{}'.", name.lexeme),
            });
        }

        environment.values.get(&name.lexeme).cloned().ok_or_else(|| RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.values.contains_key(&name.lexeme) {
            self.uninitialized.remove(&name.lexeme);
            self.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    /// Jumps exactly `distance` hops out, then writes that scope's map
    /// directly — no fallback. See `get_at`.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if distance == 0 {
            self.uninitialized.remove(&name.lexeme);
            self.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        let ancestor = self.ancestor(distance);
        let mut environment = ancestor.borrow_mut();
        environment.uninitialized.remove(&name.lexeme);
        environment.values.insert(name.lexeme.clone(), value);
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}
