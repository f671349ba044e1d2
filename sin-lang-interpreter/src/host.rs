use std::collections::HashMap;
use std::rc::Rc;

use crate::builtins;
use crate::value::{NativeResult, Value};

/// Values that embedded host code (`{name}`) can refer to.
///
/// The text between the braces, trimmed, is the key. Nothing outside the
/// registry is reachable from a program.
#[derive(Debug, Clone)]
pub struct HostRegistry {
    entries: HashMap<Rc<str>, Value>,
}

impl HostRegistry {
    pub fn empty() -> Self {
        HostRegistry {
            entries: HashMap::new(),
        }
    }

    pub fn register(&mut self, code: &str, value: Value) -> &mut Self {
        self.entries.insert(code.trim().into(), value);
        self
    }

    pub fn register_native(
        &mut self,
        name: &str,
        func: impl Fn(Vec<Value>) -> NativeResult + 'static,
    ) -> &mut Self {
        self.register(name, Value::native(name, func))
    }

    pub fn resolve(&self, code: &str) -> Option<Value> {
        self.entries.get(code.trim()).cloned()
    }

    /// Registered callables, sorted by name.
    pub fn native_names(&self) -> Vec<Rc<str>> {
        let mut names: Vec<Rc<str>> = self
            .entries
            .iter()
            .filter(|(_, value)| matches!(value, Value::Native(_)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

/// The default host functions plus the constants `true`, `false` and `nil`.
impl Default for HostRegistry {
    fn default() -> Self {
        let mut registry = HostRegistry::empty();
        for (name, native) in builtins::natives() {
            registry.register(name, native);
        }
        registry
            .register("true", Value::Boolean(true))
            .register("false", Value::Boolean(false))
            .register("nil", Value::Nil);
        registry
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::HostRegistry;
    use crate::value::Value;

    #[test]
    fn test_resolve_trims_code() {
        let registry = HostRegistry::default();

        assert_eq!(registry.resolve(" true "), Some(Value::Boolean(true)));
        assert_eq!(registry.resolve("nil"), Some(Value::Nil));
        assert!(matches!(registry.resolve("add"), Some(Value::Native(_))));
        assert_eq!(registry.resolve("int.__gt__"), None);
    }

    #[test]
    fn test_register_native() {
        let mut registry = HostRegistry::empty();
        registry.register_native("twice", |args| match args.as_slice() {
            [Value::Number(value)] => Ok(Value::Number(value * 2)),
            _ => Err("expected one number".to_owned()),
        });

        let resolved = registry.resolve("twice");
        let Some(Value::Native(twice)) = &resolved else {
            panic!("twice was not registered");
        };
        assert_eq!((twice.func)(vec![Value::Number(4)]), Ok(Value::Number(8)));
        assert_eq!(registry.native_names(), vec![Rc::<str>::from("twice")]);
    }

    #[test]
    fn test_default_natives() {
        let names = HostRegistry::default().native_names();
        for name in ["add", "assert", "concat", "print", "push", "sub"] {
            assert!(names.iter().any(|n| n.as_ref() == name), "{name} missing");
        }
        assert!(!names.iter().any(|n| n.as_ref() == "true"));
    }
}
