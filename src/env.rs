// ABOUTME: Lexically-scoped environment frames for variable bindings

use crate::error::RuntimeError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn global() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment, e.g. for a function call, loop body,
    /// or conditional block.
    pub fn child(parent: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// `var x = expr`: always creates a new binding in this frame, shadowing
    /// any binding of the same name in an outer frame.
    pub fn declare(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks up `name`, walking from this frame outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// `x = expr`: updates the binding in the nearest frame that contains
    /// `x`. Fails with `NameError` if no frame contains it.
    pub fn assign(&self, name: &str, value: Value, line: usize) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value, line),
            None => Err(RuntimeError::AssignToUnbound {
                name: name.to_string(),
                line,
            }),
        }
    }

    /// Snapshots this frame's own bindings (not the parent chain), used to
    /// roll back a failed top-level REPL statement.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.bindings.borrow().clone()
    }

    /// Restores this frame's bindings from a prior `snapshot`.
    pub fn restore(&self, snapshot: HashMap<String, Value>) {
        *self.bindings.borrow_mut() = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_get() {
        let env = Environment::global();
        env.declare("x", Value::Int(42));
        assert!(matches!(env.get("x"), Some(Value::Int(42))));
    }

    #[test]
    fn test_unbound_lookup() {
        let env = Environment::global();
        assert!(env.get("missing").is_none());
    }

    #[test]
    fn test_shadowing_in_child() {
        let parent = Environment::global();
        parent.declare("x", Value::Int(1));
        let child = Environment::child(&parent);
        child.declare("x", Value::Int(2));
        assert!(matches!(child.get("x"), Some(Value::Int(2))));
        assert!(matches!(parent.get("x"), Some(Value::Int(1))));
    }

    #[test]
    fn test_assign_updates_nearest_frame() {
        let parent = Environment::global();
        parent.declare("x", Value::Int(1));
        let child = Environment::child(&parent);
        child.assign("x", Value::Int(99), 1).unwrap();
        assert!(matches!(child.get("x"), Some(Value::Int(99))));
        assert!(matches!(parent.get("x"), Some(Value::Int(99))));
    }

    #[test]
    fn test_assign_to_unbound_fails() {
        let env = Environment::global();
        let err = env.assign("ghost", Value::Int(1), 3).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::AssignToUnbound {
                name: "ghost".to_string(),
                line: 3
            }
        );
    }

    #[test]
    fn test_snapshot_restore_rolls_back() {
        let env = Environment::global();
        env.declare("x", Value::Int(1));
        let snap = env.snapshot();
        env.declare("x", Value::Int(2));
        env.declare("y", Value::Int(3));
        env.restore(snap);
        assert!(matches!(env.get("x"), Some(Value::Int(1))));
        assert!(env.get("y").is_none());
    }
}
