// ABOUTME: Native functions registered into the global environment at session start

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::value::{Arity, BuiltinValue, Value};
use std::rc::Rc;

fn define(env: &Rc<Environment>, name: &'static str, arity: Arity, func: fn(&[Value], usize) -> Result<Value, RuntimeError>) {
    env.declare(
        name.to_string(),
        Value::Builtin(Rc::new(BuiltinValue { name, arity, func })),
    );
}

/// Registers every built-in from spec §4.5, plus the Greek aliases (`μ` →
/// `mean`, `σ` → `stdev`, `Σ` → `sum`) as additional bindings to the same
/// `Value::Builtin` — they are ordinary identifiers, not special syntax.
pub fn register_builtins(env: &Rc<Environment>) {
    define(env, "print", Arity::AtLeast(0), builtin_print);
    define(env, "len", Arity::Exact(1), builtin_len);
    define(env, "range", Arity::Exact(2), builtin_range);
    define(env, "sum", Arity::Exact(1), builtin_sum);
    define(env, "mean", Arity::Exact(1), builtin_mean);
    define(env, "median", Arity::Exact(1), builtin_median);
    define(env, "mode", Arity::Exact(1), builtin_mode);
    define(env, "stdev", Arity::Exact(1), builtin_stdev);
    define(env, "variance", Arity::Exact(1), builtin_variance);
    define(env, "min", Arity::OneOrMore, builtin_min);
    define(env, "max", Arity::OneOrMore, builtin_max);
    define(env, "sqrt", Arity::Exact(1), builtin_sqrt);
    define(env, "abs", Arity::Exact(1), builtin_abs);
    define(env, "floor", Arity::Exact(1), builtin_floor);
    define(env, "ceil", Arity::Exact(1), builtin_ceil);
    define(env, "round", Arity::Exact(1), builtin_round);
    define(env, "pow", Arity::Exact(2), builtin_pow);

    define(env, "Σ", Arity::Exact(1), builtin_sum);
    define(env, "μ", Arity::Exact(1), builtin_mean);
    define(env, "σ", Arity::Exact(1), builtin_stdev);
}

fn as_numbers(items: &[Value], function: &str, line: usize) -> Result<Vec<f64>, RuntimeError> {
    items
        .iter()
        .map(|v| match v {
            Value::Int(n) => Ok(*n as f64),
            Value::Float(f) => Ok(*f),
            other => Err(RuntimeError::type_error(
                format!(
                    "{function} expects a numeric array, found element of type '{}'",
                    other.type_name()
                ),
                line,
            )),
        })
        .collect()
}

fn expect_array<'a>(
    args: &'a [Value],
    function: &str,
    line: usize,
) -> Result<&'a [Value], RuntimeError> {
    match &args[0] {
        Value::Array(items) => Ok(items.as_slice()),
        other => Err(RuntimeError::type_error(
            format!(
                "{function} expects an array, found '{}'",
                other.type_name()
            ),
            line,
        )),
    }
}

fn builtin_print(args: &[Value], _line: usize) -> Result<Value, RuntimeError> {
    let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
    Ok(Value::Unit)
}

fn builtin_len(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Array(items) => Ok(Value::Int(items.len() as i64)),
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(RuntimeError::type_error(
            format!("len expects an array or string, found '{}'", other.type_name()),
            line,
        )),
    }
}

fn builtin_range(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    match (&args[0], &args[1]) {
        (Value::Int(lo), Value::Int(hi)) => {
            Ok(Value::array((*lo..*hi).map(Value::Int).collect()))
        }
        (a, b) => Err(RuntimeError::type_error(
            format!(
                "range expects two integers, found '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ),
            line,
        )),
    }
}

fn builtin_sum(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    let items = expect_array(args, "sum", line)?;
    if items.is_empty() {
        return Ok(Value::Int(0));
    }
    let mut all_int = true;
    let mut int_total: i64 = 0;
    let mut float_total: f64 = 0.0;
    for item in items {
        match item {
            Value::Int(n) => {
                match int_total.checked_add(*n) {
                    Some(sum) => int_total = sum,
                    None => all_int = false,
                }
                float_total += *n as f64;
            }
            Value::Float(f) => {
                all_int = false;
                float_total += f;
            }
            other => {
                return Err(RuntimeError::type_error(
                    format!("sum expects a numeric array, found element of type '{}'", other.type_name()),
                    line,
                ))
            }
        }
    }
    Ok(if all_int {
        Value::Int(int_total)
    } else {
        Value::Float(float_total)
    })
}

fn builtin_mean(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    let items = expect_array(args, "mean", line)?;
    if items.is_empty() {
        return Err(RuntimeError::EmptyReduction {
            function: "mean".to_string(),
            required: 1,
            line,
        });
    }
    let numbers = as_numbers(items, "mean", line)?;
    Ok(Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64))
}

fn builtin_median(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    let items = expect_array(args, "median", line)?;
    if items.is_empty() {
        return Err(RuntimeError::EmptyReduction {
            function: "median".to_string(),
            required: 1,
            line,
        });
    }
    let mut numbers = as_numbers(items, "median", line)?;
    if numbers.iter().any(|n| n.is_nan()) {
        return Err(RuntimeError::type_error("cannot compare NaN", line));
    }
    numbers.sort_by(|a, b| a.partial_cmp(b).expect("NaN already rejected above"));
    let mid = numbers.len() / 2;
    if numbers.len() % 2 == 1 {
        Ok(Value::Float(numbers[mid]))
    } else {
        Ok(Value::Float((numbers[mid - 1] + numbers[mid]) / 2.0))
    }
}

fn builtin_mode(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    let items = expect_array(args, "mode", line)?;
    if items.is_empty() {
        return Err(RuntimeError::EmptyReduction {
            function: "mode".to_string(),
            required: 1,
            line,
        });
    }
    let numbers = as_numbers(items, "mode", line)?;
    let mut best_index = 0;
    let mut best_count = 0usize;
    for (i, &candidate) in numbers.iter().enumerate() {
        let count = numbers.iter().filter(|&&n| n == candidate).count();
        if count > best_count {
            best_count = count;
            best_index = i;
        }
    }
    Ok(items[best_index].clone())
}

fn sample_variance(numbers: &[f64]) -> f64 {
    let n = numbers.len() as f64;
    let mean = numbers.iter().sum::<f64>() / n;
    numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
}

fn builtin_variance(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    let items = expect_array(args, "variance", line)?;
    if items.len() < 2 {
        return Err(RuntimeError::EmptyReduction {
            function: "variance".to_string(),
            required: 2,
            line,
        });
    }
    let numbers = as_numbers(items, "variance", line)?;
    Ok(Value::Float(sample_variance(&numbers)))
}

fn builtin_stdev(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    let items = expect_array(args, "stdev", line)?;
    if items.len() < 2 {
        return Err(RuntimeError::EmptyReduction {
            function: "stdev".to_string(),
            required: 2,
            line,
        });
    }
    let numbers = as_numbers(items, "stdev", line)?;
    Ok(Value::Float(sample_variance(&numbers).sqrt()))
}

/// Shared implementation for `min`/`max`: accepts either a single array
/// argument, or one-or-more scalar arguments.
fn min_max(args: &[Value], name: &str, line: usize, want_max: bool) -> Result<Value, RuntimeError> {
    let candidates: &[Value] = if args.len() == 1 {
        if let Value::Array(items) = &args[0] {
            items.as_slice()
        } else {
            args
        }
    } else {
        args
    };
    if candidates.is_empty() {
        return Err(RuntimeError::EmptyReduction {
            function: name.to_string(),
            required: 1,
            line,
        });
    }
    let mut best = &candidates[0];
    for candidate in &candidates[1..] {
        let ordering = candidate.compare(best, line)?;
        let replace = if want_max {
            ordering.is_gt()
        } else {
            ordering.is_lt()
        };
        if replace {
            best = candidate;
        }
    }
    Ok(best.clone())
}

fn builtin_min(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    min_max(args, "min", line, false)
}

fn builtin_max(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    min_max(args, "max", line, true)
}

fn expect_number(value: &Value, function: &str, line: usize) -> Result<f64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeError::type_error(
            format!("{function} expects a number, found '{}'", other.type_name()),
            line,
        )),
    }
}

fn builtin_sqrt(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    Ok(Value::Float(expect_number(&args[0], "sqrt", line)?.sqrt()))
}

fn builtin_abs(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(n.abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(RuntimeError::type_error(
            format!("abs expects a number, found '{}'", other.type_name()),
            line,
        )),
    }
}

fn builtin_floor(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) => Ok(Value::Float(f.floor())),
        other => Err(RuntimeError::type_error(
            format!("floor expects a number, found '{}'", other.type_name()),
            line,
        )),
    }
}

fn builtin_ceil(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) => Ok(Value::Float(f.ceil())),
        other => Err(RuntimeError::type_error(
            format!("ceil expects a number, found '{}'", other.type_name()),
            line,
        )),
    }
}

fn builtin_round(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) => Ok(Value::Float(f.round())),
        other => Err(RuntimeError::type_error(
            format!("round expects a number, found '{}'", other.type_name()),
            line,
        )),
    }
}

fn builtin_pow(args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    args[0].pow(&args[1], line)
}
