// ABOUTME: Environment module for managing variable bindings and scopes

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One frame in the lexical chain: bindings plus an optional parent. The
/// root frame is the global environment; function calls, `let`, and `loop`
/// push children. Closures hold their defining frame by `Rc`, so a `def`
/// that runs later is visible through previously captured frames.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<Rc<str>, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS frame (doesn't walk the parent chain).
    pub fn define(&self, name: Rc<str>, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a symbol in this frame and parent frames recursively.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        if let Some(parent) = &self.parent {
            return parent.get(name);
        }
        None
    }

    /// Walks to the root frame. `def` always binds there.
    pub fn global(self: &Rc<Self>) -> Rc<Environment> {
        let mut env = self.clone();
        while let Some(parent) = env.parent.clone() {
            env = parent;
        }
        env
    }

    fn collect_names(&self, out: &mut Vec<Rc<str>>) {
        out.extend(self.bindings.borrow().keys().cloned());
        if let Some(parent) = &self.parent {
            parent.collect_names(out);
        }
    }

    /// "Did you mean" candidates for an unbound name: bindings anywhere in
    /// the scope chain sharing a prefix of at least two characters.
    pub fn suggestions(&self, name: &str) -> Vec<Rc<str>> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        let mut hits: Vec<Rc<str>> = names
            .into_iter()
            .filter(|candidate| &**candidate != name && common_prefix_len(candidate, name) >= 2)
            .collect();
        hits.sort();
        hits.dedup();
        hits.truncate(3);
        hits
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}
