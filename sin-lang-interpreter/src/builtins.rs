use std::io::BufRead;

use crate::value::{NativeResult, Value};

fn unexpected_number_of_arguments(expected: usize, got: usize) -> String {
    format!(
        "unexpected number of arguments. Expected {} got {}",
        expected, got
    )
}

fn unexpected_argument_type(expected: &str, got: &Value) -> String {
    format!(
        "unexpected argument type. Expected {} got {} {}",
        expected,
        got.type_name(),
        got
    )
}

fn exactly<const N: usize>(args: Vec<Value>) -> Result<[Value; N], String> {
    let got = args.len();
    args.try_into()
        .map_err(|_| unexpected_number_of_arguments(N, got))
}

fn numbers(args: Vec<Value>) -> Result<(i64, i64), String> {
    match &exactly::<2>(args)? {
        [Value::Number(left), Value::Number(right)] => Ok((*left, *right)),
        [Value::Number(_), other] | [other, _] => Err(unexpected_argument_type("number", other)),
    }
}

fn checked(
    operation: fn(i64, i64) -> Option<i64>,
    failure: &'static str,
) -> impl Fn(Vec<Value>) -> NativeResult {
    move |args| {
        let (left, right) = numbers(args)?;
        operation(left, right)
            .map(Value::Number)
            .ok_or_else(|| format!("{} of {} and {}", failure, left, right))
    }
}

fn comparison(compare: fn(&i64, &i64) -> bool) -> impl Fn(Vec<Value>) -> NativeResult {
    move |args| {
        let (left, right) = numbers(args)?;
        Ok(Value::Boolean(compare(&left, &right)))
    }
}

pub(crate) fn builtin_neg(args: Vec<Value>) -> NativeResult {
    match &exactly::<1>(args)? {
        [Value::Number(value)] => value
            .checked_neg()
            .map(Value::Number)
            .ok_or_else(|| format!("overflow negating {}", value)),
        [other] => Err(unexpected_argument_type("number", other)),
    }
}

fn builtin_eq(args: Vec<Value>) -> NativeResult {
    let [left, right] = exactly::<2>(args)?;
    Ok(Value::Boolean(left == right))
}

fn builtin_ne(args: Vec<Value>) -> NativeResult {
    let [left, right] = exactly::<2>(args)?;
    Ok(Value::Boolean(left != right))
}

fn builtin_not(args: Vec<Value>) -> NativeResult {
    let [value] = exactly::<1>(args)?;
    Ok(Value::Boolean(!value.is_truthy()))
}

fn builtin_and(args: Vec<Value>) -> NativeResult {
    let [left, right] = exactly::<2>(args)?;
    Ok(Value::Boolean(left.is_truthy() && right.is_truthy()))
}

fn builtin_or(args: Vec<Value>) -> NativeResult {
    let [left, right] = exactly::<2>(args)?;
    Ok(Value::Boolean(left.is_truthy() || right.is_truthy()))
}

/// Joins the display forms of any number of arguments.
fn builtin_concat(args: Vec<Value>) -> NativeResult {
    let joined: String = args.iter().map(Value::to_string).collect();
    Ok(Value::string(&joined))
}

pub(crate) fn builtin_len(args: Vec<Value>) -> NativeResult {
    let length = match &exactly::<1>(args)? {
        [Value::String(value)] => value.chars().count(),
        [Value::List(list)] => list.borrow().len(),
        [Value::Record(record)] => record.borrow().len(),
        [other] => return Err(unexpected_argument_type("string, list or record", other)),
    };
    i64::try_from(length)
        .map(Value::Number)
        .map_err(|_| format!("length {} does not fit a number", length))
}

/// Appends to the list in place and returns the same list.
fn builtin_push(args: Vec<Value>) -> NativeResult {
    let [target, element] = exactly::<2>(args)?;
    match &target {
        Value::List(list) => list.borrow_mut().push(element),
        other => return Err(unexpected_argument_type("list", other)),
    }
    Ok(target)
}

fn builtin_str(args: Vec<Value>) -> NativeResult {
    let [value] = exactly::<1>(args)?;
    Ok(Value::string(&value.to_string()))
}

fn builtin_int(args: Vec<Value>) -> NativeResult {
    match &exactly::<1>(args)? {
        [Value::Number(value)] => Ok(Value::Number(*value)),
        [Value::Boolean(value)] => Ok(Value::Number(i64::from(*value))),
        [Value::String(text)] => text
            .trim()
            .parse::<i64>()
            .map(Value::Number)
            .map_err(|_| format!("cannot convert {:?} to a number", text)),
        [other] => Err(unexpected_argument_type("number, boolean or string", other)),
    }
}

fn builtin_print(args: Vec<Value>) -> NativeResult {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", line);
    Ok(Value::Nil)
}

fn builtin_input(args: Vec<Value>) -> NativeResult {
    let [] = exactly::<0>(args)?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|error| error.to_string())?;
    let trimmed = line.trim_end_matches(['\n', '\r']);
    Ok(Value::string(trimmed))
}

/// Returns `actual` when it equals `expected`.
fn builtin_assert(args: Vec<Value>) -> NativeResult {
    let [actual, expected] = exactly::<2>(args)?;
    if actual == expected {
        Ok(actual)
    } else {
        Err(format!("assertion failed: {} != {}", actual, expected))
    }
}

/// Every default host callable with the name it is registered under.
pub(crate) fn natives() -> Vec<(&'static str, Value)> {
    vec![
        ("add", Value::native("add", checked(i64::checked_add, "overflow"))),
        ("sub", Value::native("sub", checked(i64::checked_sub, "overflow"))),
        ("mul", Value::native("mul", checked(i64::checked_mul, "overflow"))),
        ("div", Value::native("div", checked(i64::checked_div, "invalid division"))),
        ("mod", Value::native("mod", checked(i64::checked_rem, "invalid modulo"))),
        ("neg", Value::native("neg", builtin_neg)),
        ("eq", Value::native("eq", builtin_eq)),
        ("ne", Value::native("ne", builtin_ne)),
        ("lt", Value::native("lt", comparison(i64::lt))),
        ("le", Value::native("le", comparison(i64::le))),
        ("gt", Value::native("gt", comparison(i64::gt))),
        ("ge", Value::native("ge", comparison(i64::ge))),
        ("not", Value::native("not", builtin_not)),
        ("and", Value::native("and", builtin_and)),
        ("or", Value::native("or", builtin_or)),
        ("concat", Value::native("concat", builtin_concat)),
        ("len", Value::native("len", builtin_len)),
        ("push", Value::native("push", builtin_push)),
        ("str", Value::native("str", builtin_str)),
        ("int", Value::native("int", builtin_int)),
        ("print", Value::native("print", builtin_print)),
        ("input", Value::native("input", builtin_input)),
        ("assert", Value::native("assert", builtin_assert)),
    ]
}
