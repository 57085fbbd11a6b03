// ABOUTME: Interning for symbols and keywords, plus the gensym counter

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

// Symbols and keywords intern in separate tables: a symbol and a keyword
// with the same name are distinct values. Each thread owns its tables, so
// two interpreters on one thread share identities and no locking is needed.
thread_local! {
    static SYMBOLS: RefCell<HashMap<Box<str>, Rc<str>>> = RefCell::new(HashMap::new());
    static KEYWORDS: RefCell<HashMap<Box<str>, Rc<str>>> = RefCell::new(HashMap::new());
}

// Process-wide so gensyms stay distinct even across interpreter instances.
static GENSYM_COUNTER: AtomicU64 = AtomicU64::new(0);

fn intern_in(table: &RefCell<HashMap<Box<str>, Rc<str>>>, name: &str) -> Rc<str> {
    let mut table = table.borrow_mut();
    if let Some(interned) = table.get(name) {
        return interned.clone();
    }
    let interned: Rc<str> = Rc::from(name);
    table.insert(Box::from(name), interned.clone());
    interned
}

/// Returns the canonical `Rc<str>` for a symbol name. Equal names always
/// yield pointer-equal results within a thread.
pub fn symbol(name: &str) -> Rc<str> {
    SYMBOLS.with(|t| intern_in(t, name))
}

/// Returns the canonical `Rc<str>` for a keyword name (without the colon).
pub fn keyword(name: &str) -> Rc<str> {
    KEYWORDS.with(|t| intern_in(t, name))
}

/// Returns a fresh symbol guaranteed not to collide within this process.
pub fn gensym(prefix: &str) -> Rc<str> {
    let n = GENSYM_COUNTER.fetch_add(1, Ordering::Relaxed);
    symbol(&format!("{}__{}", prefix, n))
}
