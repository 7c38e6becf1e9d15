//! Environment for variable bindings
//!
//! The Environment is a lexical scope that holds variable bindings.
//! It forms a chain of scopes, with child environments referencing their
//! parents. Handles are cheap to clone (an `Rc` increment); a closure keeps
//! its defining scope alive by holding such a handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::interner::InternedSymbol;
use crate::interpreter::eval;
use crate::language::Value;
use crate::session::Session;

// ============================================================================
// Environment
// ============================================================================

// Internal state holding the data and parent pointer
struct EnvironmentState {
    data: FxHashMap<InternedSymbol, Value>,
    parent: Option<Environment>,
}

#[derive(Clone)]
pub struct Environment {
    state: Rc<RefCell<EnvironmentState>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Environment")
            .field("bindings", &state.data.len())
            .field("depth", &self.depth())
            .finish()
    }
}

impl Environment {
    /// Create a new, empty root environment
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Environment>) -> Self {
        Environment {
            state: Rc::new(RefCell::new(EnvironmentState {
                data: FxHashMap::default(),
                parent,
            })),
        }
    }

    /// Create an empty child scope of `self`
    pub fn extend(&self) -> Self {
        Self::with_parent(Some(self.clone()))
    }

    /// Build the frame for one closure invocation.
    ///
    /// Arguments are evaluated in `caller`; the new frame is chained to
    /// `outer`, the environment the closure captured. A bare symbol as the
    /// parameter spec (or as the tail of a parameter list) collects every
    /// remaining argument into a list. Surplus arguments are ignored and
    /// parameters without an argument stay unbound.
    pub fn call_frame(
        params: &Value,
        args: &Value,
        caller: &Environment,
        outer: &Environment,
        session: &mut Session,
    ) -> Self {
        let frame = outer.extend();
        let mut params = params;
        let mut args = args;

        loop {
            match params {
                Value::Symbol(rest) => {
                    let values: Vec<Value> =
                        args.iter().map(|arg| eval(arg, caller, session)).collect();
                    frame.define(*rest, Value::list(values));
                    break;
                }
                Value::Pair(cell) => {
                    let Some(arg) = args.head() else {
                        break;
                    };
                    if let Some(name) = cell.car.as_symbol() {
                        let value = eval(arg, caller, session);
                        frame.define(name, value);
                    }
                    params = &cell.cdr;
                    args = args.tail().unwrap_or(args);
                }
                _ => break,
            }
        }

        frame
    }

    /// Define a variable in the CURRENT scope
    pub fn define(&self, name: InternedSymbol, value: Value) {
        self.state.borrow_mut().data.insert(name, value);
    }

    /// Create or update a binding.
    ///
    /// An existing local binding is always overwritten. Otherwise
    /// `current_scope_only` creates the binding here (`define`); without it
    /// the update is passed outward and fails, creating nothing, when no
    /// enclosing scope declares the name (`setq`).
    pub fn bind(&self, name: InternedSymbol, value: Value, current_scope_only: bool) -> bool {
        let parent = {
            let mut state = self.state.borrow_mut();
            if let Some(slot) = state.data.get_mut(&name) {
                *slot = value;
                return true;
            }
            if current_scope_only {
                state.data.insert(name, value);
                return true;
            }
            state.parent.clone()
        };

        match parent {
            Some(parent) => parent.bind(name, value, false),
            None => false,
        }
    }

    /// Look up a variable, walking up the parent chain
    pub fn lookup(&self, name: InternedSymbol) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let parent = {
                let state = current.state.borrow();
                if let Some(val) = state.data.get(&name) {
                    return Some(val.clone());
                }
                state.parent.clone()
            };
            current = parent?;
        }
    }

    /// Like [`lookup`](Self::lookup), but a miss is reported to the session
    /// as an undefined symbol.
    pub fn resolve(&self, name: InternedSymbol, session: &mut Session) -> Option<Value> {
        let found = self.lookup(name);
        if found.is_none() {
            session.report_undefined(name);
        }
        found
    }

    pub fn is_bound_locally(&self, name: InternedSymbol) -> bool {
        self.state.borrow().data.contains_key(&name)
    }

    /// Number of scopes from this one up to the root, inclusive
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut parent = self.state.borrow().parent.clone();
        while let Some(env) = parent {
            depth += 1;
            parent = env.state.borrow().parent.clone();
        }
        depth
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::cons;
    use crate::session::Diagnostic;

    fn sym(name: &str) -> InternedSymbol {
        InternedSymbol::new(name)
    }

    #[test]
    fn test_lookup_walks_parent_chain() {
        let root = Environment::new();
        root.define(sym("x"), Value::int(5));
        let child = root.extend().extend();
        assert_eq!(child.lookup(sym("x")), Some(Value::int(5)));
        assert_eq!(child.depth(), 3);
    }

    #[test]
    fn test_resolve_reports_undefined_once() {
        let root = Environment::new();
        let mut session = Session::new();
        assert!(root.resolve(sym("nowhere"), &mut session).is_none());
        assert!(root.resolve(sym("nowhere"), &mut session).is_none());
        assert_eq!(
            session.diagnostics(),
            &[Diagnostic::UndefinedSymbol(sym("nowhere"))]
        );
    }

    #[test]
    fn test_bind_define_shadows_in_current_scope() {
        let root = Environment::new();
        root.define(sym("x"), Value::int(1));
        let child = root.extend();

        assert!(child.bind(sym("x"), Value::int(2), true));
        assert_eq!(child.lookup(sym("x")), Some(Value::int(2)));
        assert_eq!(root.lookup(sym("x")), Some(Value::int(1)));
    }

    #[test]
    fn test_bind_assignment_updates_outer_scope() {
        let root = Environment::new();
        root.define(sym("x"), Value::int(1));
        let child = root.extend();

        assert!(child.bind(sym("x"), Value::int(2), false));
        assert!(!child.is_bound_locally(sym("x")));
        assert_eq!(root.lookup(sym("x")), Some(Value::int(2)));
    }

    #[test]
    fn test_bind_assignment_fails_without_declaration() {
        let root = Environment::new();
        let child = root.extend();
        assert!(!child.bind(sym("ghost"), Value::int(2), false));
        assert!(child.lookup(sym("ghost")).is_none());
    }

    #[test]
    fn test_call_frame_binds_in_lockstep() {
        let root = Environment::new();
        let mut session = Session::new();
        let params = Value::list(vec![Value::symbol("a"), Value::symbol("b")]);
        let args = Value::list(vec![Value::int(3), Value::int(4), Value::int(5)]);

        let frame = Environment::call_frame(&params, &args, &root, &root, &mut session);
        assert_eq!(frame.lookup(sym("a")), Some(Value::int(3)));
        assert_eq!(frame.lookup(sym("b")), Some(Value::int(4)));
        assert!(!root.is_bound_locally(sym("a")));
    }

    #[test]
    fn test_call_frame_leaves_missing_arguments_unbound() {
        let root = Environment::new();
        let mut session = Session::new();
        let params = Value::list(vec![Value::symbol("p"), Value::symbol("q")]);
        let args = Value::list(vec![Value::int(1)]);

        let frame = Environment::call_frame(&params, &args, &root, &root, &mut session);
        assert_eq!(frame.lookup(sym("p")), Some(Value::int(1)));
        assert!(!frame.is_bound_locally(sym("q")));
    }

    #[test]
    fn test_call_frame_rest_symbol_collects_arguments() {
        let root = Environment::new();
        let mut session = Session::new();
        let args = Value::list(vec![Value::int(1), Value::int(2)]);

        let frame = Environment::call_frame(&Value::symbol("rest"), &args, &root, &root, &mut session);
        assert_eq!(frame.lookup(sym("rest")), Some(args));
    }

    #[test]
    fn test_call_frame_dotted_rest() {
        let root = Environment::new();
        let mut session = Session::new();
        let params = cons(Value::symbol("first"), Value::symbol("more"));
        let args = Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]);

        let frame = Environment::call_frame(&params, &args, &root, &root, &mut session);
        assert_eq!(frame.lookup(sym("first")), Some(Value::int(1)));
        assert_eq!(
            frame.lookup(sym("more")),
            Some(Value::list(vec![Value::int(2), Value::int(3)]))
        );
    }

    #[test]
    fn test_call_frame_evaluates_in_caller_and_chains_to_outer() {
        let outer = Environment::new();
        outer.define(sym("captured"), Value::int(10));
        let caller = Environment::new();
        caller.define(sym("y"), Value::int(7));
        let mut session = Session::new();

        let params = Value::list(vec![Value::symbol("x")]);
        let args = Value::list(vec![Value::symbol("y")]);
        let frame = Environment::call_frame(&params, &args, &caller, &outer, &mut session);

        assert_eq!(frame.lookup(sym("x")), Some(Value::int(7)));
        assert_eq!(frame.lookup(sym("captured")), Some(Value::int(10)));
        assert!(frame.lookup(sym("y")).is_none());
    }
}
