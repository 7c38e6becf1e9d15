//! Root environment setup
//!
//! Binds the sentinel spellings and every primitive under its name.

use crate::environment::Environment;
use crate::interner::InternedSymbol;
use crate::language::{Sentinel, Value};
use crate::primitives::Primitive;

const SENTINEL_NAMES: [(&str, Sentinel); 5] = [
    ("nil", Sentinel::Nil),
    ("#nil", Sentinel::Nil),
    ("#t", Sentinel::True),
    ("#f", Sentinel::False),
    ("#error", Sentinel::Error),
];

pub fn register_globals(env: &Environment) {
    for (name, sentinel) in SENTINEL_NAMES {
        env.define(InternedSymbol::new(name), Value::Sentinel(sentinel));
    }
    for primitive in Primitive::ALL {
        env.define(InternedSymbol::new(primitive.name()), Value::Native(primitive));
    }
}

impl Environment {
    /// A fresh root environment with the globals registered
    pub fn with_globals() -> Self {
        let env = Environment::new();
        register_globals(&env);
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_spellings_resolve_to_sentinels() {
        let env = Environment::with_globals();
        assert_eq!(env.lookup(InternedSymbol::new("#f")), Some(Value::f()));
        assert_eq!(env.lookup(InternedSymbol::new("nil")), Some(Value::nil()));
        assert_eq!(env.lookup(InternedSymbol::new("#error")), Some(Value::error()));
    }

    #[test]
    fn test_every_primitive_is_bound() {
        let env = Environment::with_globals();
        for primitive in Primitive::ALL {
            let bound = env.lookup(InternedSymbol::new(primitive.name()));
            assert_eq!(bound.and_then(|v| v.as_primitive()), Some(primitive));
        }
    }
}
