use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

#[derive(Debug)]
struct Frame {
    bindings: HashMap<Rc<str>, Value>,
    parent: Option<Environment>,
}

/// A scope frame. Cloning shares the frame.
///
/// Frames live outside the collected heap: no runtime value points back at a
/// frame, so the parent links cannot form a cycle. The `Gc` handles held in
/// `bindings` stay rooted for as long as the frame is alive.
///
/// Reads and writes resolve names differently: [`Environment::lookup`] looks
/// at this frame only when no ancestor binds the name, while
/// [`Environment::set`] tries this frame first.
#[derive(Debug, Clone)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    pub fn new_enclosed(parent: &Environment) -> Self {
        Self::with_parent(Some(parent.clone()))
    }

    fn with_parent(parent: Option<Environment>) -> Self {
        Environment {
            frame: Rc::new(RefCell::new(Frame {
                bindings: HashMap::new(),
                parent,
            })),
        }
    }

    fn parent(&self) -> Option<Environment> {
        self.frame.borrow().parent.clone()
    }

    /// The nearest ancestor binding `name` wins over this frame's own binding.
    /// Unbound names are `nil`.
    pub fn lookup(&self, name: &str) -> Value {
        self.parent()
            .and_then(|parent| parent.binding(name))
            .or_else(|| self.frame.borrow().bindings.get(name).cloned())
            .unwrap_or(Value::Nil)
    }

    /// Value of the nearest frame binding `name`, starting with this one.
    fn binding(&self, name: &str) -> Option<Value> {
        let owner = self.owner(name)?;
        let frame = owner.frame.borrow();
        frame.bindings.get(name).cloned()
    }

    /// Rebinds `name` in the nearest frame that already binds it, starting
    /// with this one. Otherwise binds it here.
    pub fn set(&self, name: Rc<str>, value: Value) {
        let target = self.owner(&name).unwrap_or_else(|| self.clone());
        target.define(name, value);
    }

    /// Binds `name` in this frame regardless of its ancestors.
    pub fn define(&self, name: Rc<str>, value: Value) {
        self.frame.borrow_mut().bindings.insert(name, value);
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.frame.borrow().bindings.contains_key(name)
    }

    /// Walks the chain in a loop: deep recursion leaves one frame per
    /// pending call between here and the root.
    fn owner(&self, name: &str) -> Option<Environment> {
        let mut current = Some(self.clone());
        while let Some(environment) = current {
            if environment.contains_local(name) {
                return Some(environment);
            }
            current = environment.parent();
        }
        None
    }

    /// Copy of this frame's own bindings, without the ancestors'.
    pub fn snapshot(&self) -> HashMap<Rc<str>, Value> {
        self.frame.borrow().bindings.clone()
    }
}

/// Unlinks uniquely owned ancestors one at a time instead of recursively.
impl Drop for Frame {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(environment) = parent {
            parent = match Rc::try_unwrap(environment.frame) {
                Ok(cell) => cell.into_inner().parent.take(),
                Err(_) => None,
            };
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
