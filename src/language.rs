use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::interner::InternedSymbol;
use crate::primitives::Primitive;

// ============================================================================
// Core Type System
// ============================================================================

/// The four reserved constants.
///
/// Sentinels have their own variant so they are compared by identity: a
/// symbol spelled `#f` is not the false sentinel until it is resolved
/// through the root environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    True,
    False,
    Nil,
    Error,
}

impl Sentinel {
    pub fn name(self) -> &'static str {
        match self {
            Sentinel::True => "#t",
            Sentinel::False => "#f",
            Sentinel::Nil => "#nil",
            Sentinel::Error => "#error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConsCell {
    pub car: Value,
    pub cdr: Value,
}

/// A procedure closed over the environment it was created in.
#[derive(Clone)]
pub struct LambdaCell {
    pub params: Value,
    pub body: Value,
    pub env: Environment,
}

// Manual implementation since the captured environment may be cyclic
impl fmt::Debug for LambdaCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaCell")
            .field("params", &self.params)
            .field("body", &self.body)
            .field("env", &"<environment>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Str(Rc<str>),
    Symbol(InternedSymbol),
    Sentinel(Sentinel),
    Native(Primitive),
    Pair(Rc<ConsCell>),
    Closure(Rc<LambdaCell>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Sentinel(a), Value::Sentinel(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b) || a == b,
            // Closures have no structural identity
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

pub fn cons(car: Value, cdr: Value) -> Value {
    Value::Pair(Rc::new(ConsCell { car, cdr }))
}

impl Value {
    pub fn int(n: i64) -> Self {
        Value::Integer(n)
    }

    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    pub fn string(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn symbol(name: &str) -> Self {
        Value::Symbol(InternedSymbol::new(name))
    }

    pub fn nil() -> Self {
        Value::Sentinel(Sentinel::Nil)
    }

    pub fn t() -> Self {
        Value::Sentinel(Sentinel::True)
    }

    pub fn f() -> Self {
        Value::Sentinel(Sentinel::False)
    }

    pub fn error() -> Self {
        Value::Sentinel(Sentinel::Error)
    }

    pub fn bool(b: bool) -> Self {
        if b { Value::t() } else { Value::f() }
    }

    pub fn closure(params: Value, body: Value, env: Environment) -> Self {
        Value::Closure(Rc::new(LambdaCell { params, body, env }))
    }

    /// Build a `#nil`-terminated list from the given elements.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Value::nil(), |acc, val| cons(val, acc))
    }

    // ========================================================================
    // Test-and-extract
    // ========================================================================

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<InternedSymbol> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&ConsCell> {
        match self {
            Value::Pair(cell) => Some(&**cell),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Rc<LambdaCell>> {
        match self {
            Value::Closure(lambda) => Some(lambda),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Value::Native(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_sentinel(&self, which: Sentinel) -> bool {
        matches!(self, Value::Sentinel(s) if *s == which)
    }

    pub fn is_nil(&self) -> bool {
        self.is_sentinel(Sentinel::Nil)
    }

    /// Every variant except Pair is an atom.
    pub fn is_atom(&self) -> bool {
        !matches!(self, Value::Pair(_))
    }

    /// Self-evaluating literal data.
    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_) | Value::Str(_))
    }

    pub fn head(&self) -> Option<&Value> {
        self.as_pair().map(|cell| &cell.car)
    }

    pub fn tail(&self) -> Option<&Value> {
        self.as_pair().map(|cell| &cell.cdr)
    }

    /// Iterate the elements of a Pair chain. Stops at the first tail that is
    /// not a Pair, so the terminator of an improper list is not yielded.
    pub fn iter(&self) -> ListIter<'_> {
        ListIter { current: self }
    }
}

pub struct ListIter<'a> {
    current: &'a Value,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current {
            Value::Pair(cell) => {
                self.current = &cell.cdr;
                Some(&cell.car)
            }
            _ => None,
        }
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:.6}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Sentinel(s) => write!(f, "{}", s.name()),
            Value::Native(p) => write!(f, "<primitive {}>", p.name()),
            Value::Closure(_) => write!(f, "<lambda>"),
            Value::Pair(_) => {
                write!(f, "(")?;
                let mut current = self;
                while let Value::Pair(cell) = current {
                    write!(f, "{}", cell.car)?;
                    match &cell.cdr {
                        Value::Sentinel(Sentinel::Nil) => break,
                        next @ Value::Pair(_) => {
                            write!(f, " ")?;
                            current = next;
                        }
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_atom_and_is_constant() {
        assert!(Value::int(1).is_atom());
        assert!(Value::symbol("x").is_atom());
        assert!(Value::nil().is_atom());
        assert!(!cons(Value::int(1), Value::nil()).is_atom());

        assert!(Value::int(1).is_constant());
        assert!(Value::float(1.5).is_constant());
        assert!(Value::string("s").is_constant());
        assert!(!Value::symbol("x").is_constant());
        assert!(!Value::t().is_constant());
        assert!(!Value::Native(Primitive::Add).is_constant());
    }

    #[test]
    fn test_extract_on_mismatch_returns_none() {
        let v = Value::string("hello");
        assert_eq!(v.as_str(), Some("hello"));
        assert_eq!(v.as_integer(), None);
        assert_eq!(v.as_symbol(), None);
        assert!(v.as_pair().is_none());
        assert!(v.head().is_none());
        assert!(v.tail().is_none());
    }

    #[test]
    fn test_head_and_tail() {
        let pair = cons(Value::int(1), Value::int(2));
        assert_eq!(pair.head(), Some(&Value::int(1)));
        assert_eq!(pair.tail(), Some(&Value::int(2)));
    }

    #[test]
    fn test_sentinels_are_distinct_from_symbols() {
        assert_ne!(Value::f(), Value::symbol("#f"));
        assert!(Value::f().is_sentinel(Sentinel::False));
        assert!(!Value::nil().is_sentinel(Sentinel::False));
    }

    #[test]
    fn test_list_and_iter() {
        let list = Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]);
        let items: Vec<i64> = list.iter().filter_map(Value::as_integer).collect();
        assert_eq!(items, vec![1, 2, 3]);
        assert!(Value::list(Vec::new()).is_nil());
    }

    #[test]
    fn test_display() {
        let list = Value::list(vec![Value::symbol("a"), Value::int(-2), Value::string("s")]);
        assert_eq!(list.to_string(), "(a -2 \"s\")");
        assert_eq!(cons(Value::int(1), Value::int(2)).to_string(), "(1 . 2)");
        assert_eq!(Value::float(2.5).to_string(), "2.500000");
        assert_eq!(Value::error().to_string(), "#error");
        assert_eq!(Value::Native(Primitive::Car).to_string(), "<primitive car>");
    }

    #[test]
    fn test_display_nested() {
        let inner = Value::list(vec![Value::symbol("f"), Value::symbol("x")]);
        let outer = Value::list(vec![Value::symbol("+"), Value::int(1), inner]);
        assert_eq!(outer.to_string(), "(+ 1 (f x))");
    }
}
