use crate::errors::{LowerError, LowerResult};
use eva_core::{GlobalId, SlotId, Type, Value};
use std::collections::HashMap;

/// What a name refers to, decided when the name is declared.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Mutable local living in a stack slot of the entry block.
    Slot { slot: SlotId, ty: Type },
    /// Module-level variable.
    Global { global: GlobalId, ty: Type },
    /// Already-computed value such as a function reference. Never loaded or assigned.
    Value(Value),
}

impl Binding {
    pub fn is_variable(&self) -> bool {
        !matches!(self, Binding::Value(_))
    }

    /// Address to load from or store to, for variable bindings.
    pub fn address(&self) -> Option<(Value, &Type)> {
        match self {
            Binding::Slot { slot, ty } => Some((Value::Slot(*slot), ty)),
            Binding::Global { global, ty } => Some((Value::Global(*global), ty)),
            Binding::Value(_) => None,
        }
    }
}

/// One lexical scope. Parents are borrowed, so scopes live on the stack and
/// disappear when the form that opened them is done.
#[derive(Debug, Default)]
pub struct Environment<'p> {
    bindings: HashMap<String, Binding>,
    parent: Option<&'p Environment<'p>>,
}

impl<'p> Environment<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: HashMap<String, Binding>) -> Self {
        Self {
            bindings,
            parent: None,
        }
    }

    pub fn with_parent(parent: &'p Environment<'p>) -> Self {
        Self {
            bindings: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Binds `name` in this scope only, shadowing any outer binding.
    pub fn define(&mut self, name: impl Into<String>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    pub fn lookup(&self, name: &str) -> LowerResult<&Binding> {
        self.resolve(name)
            .ok_or_else(|| LowerError::UnboundName(name.to_string()))
    }

    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |p| p.depth() + 1)
    }

    fn resolve(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .get(name)
            .or_else(|| self.parent.and_then(|p| p.resolve(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: u32) -> Binding {
        Binding::Slot {
            slot: SlotId(n),
            ty: Type::I32,
        }
    }

    #[test]
    fn test_lookup_walks_parents() {
        let mut root = Environment::new();
        root.define("x", slot(0));
        let child = Environment::with_parent(&root);
        assert_eq!(child.lookup("x").unwrap(), &slot(0));
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_shadowing_stays_in_child() {
        let mut root = Environment::new();
        root.define("x", slot(0));
        {
            let mut child = Environment::with_parent(&root);
            child.define("x", slot(1));
            assert_eq!(child.lookup("x").unwrap(), &slot(1));
        }
        assert_eq!(root.lookup("x").unwrap(), &slot(0));
    }

    #[test]
    fn test_unbound_name() {
        let root = Environment::new();
        let err = root.lookup("missing").unwrap_err();
        assert!(matches!(err, LowerError::UnboundName(name) if name == "missing"));
    }

    #[test]
    fn test_value_bindings_have_no_address() {
        let binding = Binding::Value(Value::Function("main".to_string()));
        assert!(!binding.is_variable());
        assert!(binding.address().is_none());
        assert_eq!(slot(3).address(), Some((Value::Slot(SlotId(3)), &Type::I32)));
    }
}
