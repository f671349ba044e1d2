use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

use gc::{Finalize, Gc, GcCell, Trace};
use sin_lang_core::ast;

/// Result of a host callable. The message becomes an [`EvalError::Host`]
/// tagged with the callable's name.
///
/// [`EvalError::Host`]: crate::error::EvalError::Host
pub type NativeResult = Result<Value, String>;

#[derive(Debug, Clone, Trace, Finalize)]
pub enum Value {
    Nil,
    Number(i64),
    String(Rc<str>),
    Boolean(bool),
    List(Gc<GcCell<Vec<Value>>>),
    Record(Gc<GcCell<Record>>),
    Function(Gc<Closure>),
    Native(NativeFunction),
}

impl Value {
    pub fn string(value: &str) -> Value {
        Value::String(value.into())
    }

    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Gc::new(GcCell::new(elements)))
    }

    pub fn record(record: Record) -> Value {
        Value::Record(Gc::new(GcCell::new(record)))
    }

    pub fn native(name: &str, func: impl Fn(Vec<Value>) -> NativeResult + 'static) -> Value {
        Value::Native(NativeFunction {
            name: name.into(),
            func: Rc::new(func),
        })
    }

    /// `0`, `""`, `nil` and `false` are falsy. Everything else, including empty
    /// lists and records, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Number(value) => *value != 0,
            Value::String(value) => !value.is_empty(),
            Value::Boolean(value) => *value,
            Value::List(_) | Value::Record(_) | Value::Function(_) | Value::Native(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Function(_) => "function",
            Value::Native(_) => "host function",
        }
    }
}

/// Fields in insertion order. Comparison ignores the order.
#[derive(Debug, Clone, Default, Trace, Finalize)]
pub struct Record {
    fields: Vec<Field>,
}

#[derive(Debug, PartialEq, Clone, Trace, Finalize)]
pub struct Field {
    pub name: Rc<str>,
    pub value: Value,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name.as_ref() == name)
            .map(|field| &field.value)
    }

    /// Overwrites the field in place, or appends it if the record lacks it.
    pub fn set(&mut self, name: Rc<str>, value: Value) {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(Field { name, value }),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        records_equal(self, other, &mut Vec::new())
    }
}

/// A function value: parameters, body, and the bindings of the frame it was
/// evaluated in. Only that one frame is captured, never its ancestors.
#[derive(Trace, Finalize)]
pub struct Closure {
    pub parameters: Vec<Rc<str>>,
    #[unsafe_ignore_trace]
    pub body: Rc<ast::Block>,
    pub captured: HashMap<Rc<str>, Value>,
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
            && self.parameters == other.parameters
            && self.captured == other.captured
    }
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closure")
            .field("parameters", &self.parameters)
            .field("body", &Rc::as_ptr(&self.body))
            .finish()
    }
}

#[derive(Clone, Trace, Finalize)]
pub struct NativeFunction {
    #[unsafe_ignore_trace]
    pub name: Rc<str>,
    #[unsafe_ignore_trace]
    #[allow(clippy::type_complexity)]
    pub func: Rc<dyn Fn(Vec<Value>) -> NativeResult>,
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Structural for lists and records, by identity of body and captures for
/// closures, by name for host functions.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other, &mut Vec::new())
    }
}

/// `open` holds the pairs of lists or records being compared further up. Meeting
/// one of them again means the two structures repeat the same way from there,
/// so the pair counts as equal.
fn values_equal(left: &Value, right: &Value, open: &mut Vec<(*const (), *const ())>) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,
        (Value::Number(left), Value::Number(right)) => left == right,
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Boolean(left), Value::Boolean(right)) => left == right,
        (Value::List(left), Value::List(right)) => {
            let pair = (address(left), address(right));
            if pair.0 == pair.1 || open.contains(&pair) {
                return true;
            }
            open.push(pair);
            let (left, right) = (left.borrow(), right.borrow());
            let equal = left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(left, right)| values_equal(left, right, open));
            open.pop();
            equal
        }
        (Value::Record(left), Value::Record(right)) => {
            let pair = (address(left), address(right));
            if pair.0 == pair.1 || open.contains(&pair) {
                return true;
            }
            open.push(pair);
            let equal = records_equal(&left.borrow(), &right.borrow(), open);
            open.pop();
            equal
        }
        (Value::Function(left), Value::Function(right)) => {
            std::ptr::eq::<Closure>(&**left, &**right) || **left == **right
        }
        (Value::Native(left), Value::Native(right)) => left == right,
        _ => false,
    }
}

fn records_equal(left: &Record, right: &Record, open: &mut Vec<(*const (), *const ())>) -> bool {
    left.len() == right.len()
        && left.fields.iter().all(|field| match right.get(&field.name) {
            Some(value) => values_equal(&field.value, value, open),
            None => false,
        })
}

fn address<T: Trace>(cell: &Gc<GcCell<T>>) -> *const () {
    &**cell as *const GcCell<T> as *const ()
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

/// `open` holds the lists and records currently being written, so a structure
/// that contains itself prints `...` instead of recursing forever.
fn write_value(
    f: &mut std::fmt::Formatter<'_>,
    value: &Value,
    open: &mut Vec<*const ()>,
) -> std::fmt::Result {
    match value {
        Value::Nil => write!(f, "nil"),
        Value::Number(value) => write!(f, "{}", value),
        Value::String(value) => write!(f, "{}", value),
        Value::Boolean(value) => write!(f, "{}", value),
        Value::List(list) => {
            let cell = address(list);
            if open.contains(&cell) {
                return write!(f, "[...]");
            }
            open.push(cell);
            write!(f, "[")?;
            for (i, element) in list.borrow().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_value(f, element, open)?;
            }
            open.pop();
            write!(f, "]")
        }
        Value::Record(record) => {
            let cell = address(record);
            if open.contains(&cell) {
                return write!(f, "data ... end");
            }
            open.push(cell);
            write!(f, "data")?;
            for field in record.borrow().fields() {
                write!(f, " {} -> ", field.name)?;
                write_value(f, &field.value, open)?;
            }
            open.pop();
            write!(f, " end")
        }
        Value::Function(closure) => write!(f, "<fun({})>", closure.parameters.join(", ")),
        Value::Native(native) => write!(f, "<host {}>", native.name),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Record, Value};

    fn point(fields: &[(&str, i64)]) -> Record {
        let mut record = Record::default();
        for (name, value) in fields {
            record.set((*name).into(), Value::Number(*value));
        }
        record
    }

    #[test]
    fn test_truthiness() {
        let inputs = vec![
            (Value::Nil, false),
            (Value::Number(0), false),
            (Value::Number(-1), true),
            (Value::string(""), false),
            (Value::string("0"), true),
            (Value::Boolean(false), false),
            (Value::Boolean(true), true),
            (Value::list(vec![]), true),
            (Value::record(Record::default()), true),
        ];

        for (value, expected) in inputs {
            assert_eq!(value.is_truthy(), expected, "truthiness of {value}");
        }
    }

    #[test]
    fn test_display() {
        let inputs = vec![
            (Value::Nil, "nil"),
            (Value::Number(-3), "-3"),
            (Value::string("raw text"), "raw text"),
            (Value::Boolean(true), "true"),
            (
                Value::list(vec![Value::Number(1), Value::list(vec![Value::Number(2)])]),
                "[1, [2]]",
            ),
            (
                Value::record(point(&[("x", 1), ("y", 2)])),
                "data x -> 1 y -> 2 end",
            ),
            (Value::native("add", |_| Ok(Value::Nil)), "<host add>"),
        ];

        for (value, expected) in inputs {
            assert_eq!(value.to_string(), expected);
        }
    }

    #[test]
    fn test_display_of_self_containing_list() {
        let list = Value::list(vec![Value::Number(1)]);
        if let Value::List(elements) = &list {
            elements.borrow_mut().push(list.clone());
        }

        assert_eq!(list.to_string(), "[1, [...]]");
    }

    fn self_containing(first: i64) -> Value {
        let list = Value::list(vec![Value::Number(first)]);
        if let Value::List(elements) = &list {
            elements.borrow_mut().push(list.clone());
        }
        list
    }

    #[test]
    fn test_equality_of_self_containing_values() {
        let list = self_containing(1);
        assert_eq!(list, list.clone());
        assert_eq!(list, self_containing(1));
        assert_ne!(list, self_containing(2));
        assert_ne!(list, Value::list(vec![Value::Number(1), Value::Nil]));

        let record = Value::record(point(&[("x", 1)]));
        if let Value::Record(fields) = &record {
            fields.borrow_mut().set("me".into(), record.clone());
        }
        let other = Value::record(point(&[("x", 1)]));
        if let Value::Record(fields) = &other {
            fields.borrow_mut().set("me".into(), other.clone());
        }
        assert_eq!(record, other);
    }

    #[test]
    fn test_record_set_keeps_insertion_order() {
        let mut record = point(&[("y", 2), ("x", 1)]);
        record.set("y".into(), Value::Number(5));
        record.set("z".into(), Value::Number(0));

        let names: Vec<&str> = record.fields().iter().map(|f| f.name.as_ref()).collect();
        assert_eq!(names, vec!["y", "x", "z"]);
        assert_eq!(record.get("y"), Some(&Value::Number(5)));
        assert_eq!(record.get("w"), None);
    }

    #[test]
    fn test_record_equality_ignores_order() {
        assert_eq!(point(&[("x", 1), ("y", 2)]), point(&[("y", 2), ("x", 1)]));
        assert_ne!(point(&[("x", 1)]), point(&[("x", 1), ("y", 2)]));
        assert_ne!(point(&[("x", 1)]), point(&[("x", 3)]));
    }
}
