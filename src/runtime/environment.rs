use std::collections::HashMap;

use super::value::Value;
use crate::error::{Error, Result};

/// Variable environment with snapshot scoping
///
/// Entering a block or a function call pushes a snapshot: a copy of every
/// binding currently visible. Reads inside the snapshot see the outer
/// bindings, but writes land in the snapshot and are discarded when the
/// scope is popped. The only way a nested scope affects its surroundings is
/// through the shared storage behind array and record values.
#[derive(Debug, Default)]
pub struct Environment {
    scopes: Vec<HashMap<String, Value>>,
}

impl Environment {
    /// Creates an environment with a single empty global scope
    pub fn new() -> Self {
        Environment {
            scopes: vec![HashMap::new()],
        }
    }

    /// Pushes a snapshot of all currently visible bindings
    pub fn push_snapshot(&mut self) {
        let snapshot = self
            .scopes
            .last()
            .cloned()
            .unwrap_or_default();
        self.scopes.push(snapshot);
    }

    /// Pops the innermost scope, discarding its bindings
    ///
    /// The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Binds a name in the innermost scope, shadowing any outer binding
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Looks a name up, innermost scope first
    pub fn get(&self, name: &str) -> Result<Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Ok(value.clone());
            }
        }
        Err(Error::UndefinedVariable {
            name: name.to_string(),
        })
    }

    /// Assigns a name in the innermost scope
    ///
    /// Assignment never reaches past the current snapshot; a name that is
    /// not yet bound is created here, which makes first assignment an
    /// implicit declaration.
    pub fn assign(&mut self, name: &str, value: Value) {
        self.define(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        assert_eq!(env.get("x").unwrap(), Value::Number(1.0));
        assert!(matches!(
            env.get("y"),
            Err(Error::UndefinedVariable { .. })
        ));
    }

    #[test]
    fn test_snapshot_sees_outer_bindings() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.push_snapshot();
        assert_eq!(env.get("x").unwrap(), Value::Number(1.0));
        env.pop_scope();
    }

    #[test]
    fn test_writes_do_not_escape_snapshot() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));

        env.push_snapshot();
        env.assign("x", Value::Number(2.0));
        assert_eq!(env.get("x").unwrap(), Value::Number(2.0));
        env.pop_scope();

        // The outer binding is untouched
        assert_eq!(env.get("x").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_implicit_declaration_on_assign() {
        let mut env = Environment::new();
        env.assign("fresh", Value::Bool(true));
        assert_eq!(env.get("fresh").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_global_scope_is_never_popped() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.pop_scope();
        env.pop_scope();
        // The global frame survives any number of extra pops
        assert_eq!(env.get("x").unwrap(), Value::Number(1.0));
        env.define("y", Value::Number(2.0));
        assert_eq!(env.get("y").unwrap(), Value::Number(2.0));
    }
}
