// ABOUTME: Tree-walking evaluator: statement/expression dispatch and function calls

use crate::ast::{BinOp, Expr, Stmt, UnOp};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::lexer::NumberLit;
use crate::value::{Arity, BuiltinValue, FunctionValue, Value};
use std::rc::Rc;

/// Non-local control flow signal threaded back through statement evaluation.
/// Distinct from `RuntimeError`: `return` is not a user-visible error.
pub enum Signal {
    Normal(Value),
    Return(Value),
}

pub fn eval_expr(expr: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Number(NumberLit::Int(n), _) => Ok(Value::Int(*n)),
        Expr::Number(NumberLit::Float(f), _) => Ok(Value::Float(*f)),
        Expr::String(s, _) => Ok(Value::str(s.clone())),
        Expr::Bool(b, _) => Ok(Value::Bool(*b)),
        Expr::Ident(name, line) => env
            .get(name)
            .ok_or_else(|| RuntimeError::NameError {
                name: name.clone(),
                line: *line,
            }),
        Expr::Array(elements, _) => {
            let values = elements
                .iter()
                .map(|e| eval_expr(e, env))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(values))
        }
        Expr::Range(lo, hi, line) => {
            let (lo, hi) = eval_range_bounds(lo, hi, *line, env)?;
            Ok(Value::array((lo..hi).map(Value::Int).collect()))
        }
        Expr::Binary(op, lhs, rhs, line) => eval_binary(*op, lhs, rhs, *line, env),
        Expr::Unary(op, operand, line) => {
            let value = eval_expr(operand, env)?;
            match op {
                UnOp::Neg => match value {
                    Value::Int(n) => Ok(Value::Int(-n)),
                    Value::Float(f) => Ok(Value::Float(-f)),
                    other => Err(RuntimeError::type_error(
                        format!("cannot negate '{}'", other.type_name()),
                        *line,
                    )),
                },
                UnOp::Not => Ok(Value::Bool(!value.is_truthy())),
            }
        }
        Expr::Call(callee, args, line) => {
            let func = eval_expr(callee, env)?;
            let arg_values = args
                .iter()
                .map(|a| eval_expr(a, env))
                .collect::<Result<Vec<_>, _>>()?;
            call_value(func, arg_values, *line)
        }
        Expr::Index(..) => unreachable!("indexing is reserved and never produced by the parser"),
        Expr::FunctionLiteral(params, body, _) => Ok(Value::Function(Rc::new(FunctionValue {
            name: None,
            params: params.iter().map(|p| p.name.clone()).collect(),
            body: body.clone(),
            env: Rc::clone(env),
        }))),
    }
}

fn eval_range_bounds(
    lo: &Expr,
    hi: &Expr,
    line: usize,
    env: &Rc<Environment>,
) -> Result<(i64, i64), RuntimeError> {
    let lo_v = eval_expr(lo, env)?;
    let hi_v = eval_expr(hi, env)?;
    match (lo_v, hi_v) {
        (Value::Int(a), Value::Int(b)) => Ok((a, b)),
        (a, b) => Err(RuntimeError::type_error(
            format!(
                "range bounds must be integers, got '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ),
            line,
        )),
    }
}

fn eval_binary(
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    line: usize,
    env: &Rc<Environment>,
) -> Result<Value, RuntimeError> {
    // `and`/`or` short-circuit before the right operand is evaluated.
    match op {
        BinOp::And => {
            let l = eval_expr(lhs, env)?;
            return if !l.is_truthy() { Ok(l) } else { eval_expr(rhs, env) };
        }
        BinOp::Or => {
            let l = eval_expr(lhs, env)?;
            return if l.is_truthy() { Ok(l) } else { eval_expr(rhs, env) };
        }
        _ => {}
    }

    let l = eval_expr(lhs, env)?;
    let r = eval_expr(rhs, env)?;
    match op {
        BinOp::Add => l.add(&r, line),
        BinOp::Sub => l.sub(&r, line),
        BinOp::Mul => l.mul(&r, line),
        BinOp::Div => l.div(&r, line),
        BinOp::Rem => l.rem(&r, line),
        BinOp::Pow => l.pow(&r, line),
        BinOp::Eq => Ok(Value::Bool(l.values_equal(&r))),
        BinOp::NotEq => Ok(Value::Bool(!l.values_equal(&r))),
        BinOp::Lt => Ok(Value::Bool(l.compare(&r, line)?.is_lt())),
        BinOp::Gt => Ok(Value::Bool(l.compare(&r, line)?.is_gt())),
        BinOp::LtEq => Ok(Value::Bool(l.compare(&r, line)?.is_le())),
        BinOp::GtEq => Ok(Value::Bool(l.compare(&r, line)?.is_ge())),
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    }
}

pub fn eval_stmt(stmt: &Stmt, env: &Rc<Environment>) -> Result<Signal, RuntimeError> {
    match stmt {
        Stmt::ExprStmt(expr) => Ok(Signal::Normal(eval_expr(expr, env)?)),
        Stmt::VarDecl { name, init, .. } => {
            let value = eval_expr(init, env)?;
            env.declare(name.clone(), value);
            Ok(Signal::Normal(Value::Unit))
        }
        Stmt::Assign { name, expr, line } => {
            let value = eval_expr(expr, env)?;
            env.assign(name, value, *line)?;
            Ok(Signal::Normal(Value::Unit))
        }
        Stmt::If {
            cond,
            then_block,
            else_block,
            ..
        } => {
            let cond_value = eval_expr(cond, env)?;
            if cond_value.is_truthy() {
                eval_block_scoped(then_block, env)
            } else if let Some(else_body) = else_block {
                eval_block_scoped(else_body, env)
            } else {
                Ok(Signal::Normal(Value::Unit))
            }
        }
        Stmt::While { cond, body, .. } => {
            loop {
                let cond_value = eval_expr(cond, env)?;
                if !cond_value.is_truthy() {
                    break;
                }
                if let Signal::Return(v) = eval_block_scoped(body, env)? {
                    return Ok(Signal::Return(v));
                }
            }
            Ok(Signal::Normal(Value::Unit))
        }
        Stmt::For {
            var_name,
            iterable,
            body,
            line,
        } => eval_for(var_name, iterable, body, *line, env),
        Stmt::Return { expr, .. } => {
            let value = match expr {
                Some(e) => eval_expr(e, env)?,
                None => Value::Unit,
            };
            Ok(Signal::Return(value))
        }
        Stmt::FunctionDecl {
            name, params, body, ..
        } => {
            let function = Value::Function(Rc::new(FunctionValue {
                name: Some(name.clone()),
                params: params.iter().map(|p| p.name.clone()).collect(),
                body: body.clone(),
                env: Rc::clone(env),
            }));
            env.declare(name.clone(), function);
            Ok(Signal::Normal(Value::Unit))
        }
    }
}

fn eval_for(
    var_name: &str,
    iterable: &Expr,
    body: &[Stmt],
    line: usize,
    env: &Rc<Environment>,
) -> Result<Signal, RuntimeError> {
    // A literal range iterates lazily: bounds are evaluated once, and no
    // intermediate array is built, per spec.
    if let Expr::Range(lo, hi, range_line) = iterable {
        let (lo, hi) = eval_range_bounds(lo, hi, *range_line, env)?;
        for i in lo..hi {
            let frame = Environment::child(env);
            frame.declare(var_name.to_string(), Value::Int(i));
            if let Signal::Return(v) = eval_block(body, &frame)? {
                return Ok(Signal::Return(v));
            }
        }
        return Ok(Signal::Normal(Value::Unit));
    }

    let iterable_value = eval_expr(iterable, env)?;
    match iterable_value {
        Value::Array(items) => {
            for item in items.iter() {
                let frame = Environment::child(env);
                frame.declare(var_name.to_string(), item.clone());
                if let Signal::Return(v) = eval_block(body, &frame)? {
                    return Ok(Signal::Return(v));
                }
            }
            Ok(Signal::Normal(Value::Unit))
        }
        other => Err(RuntimeError::type_error(
            format!("cannot iterate over '{}'", other.type_name()),
            line,
        )),
    }
}

/// Runs `stmts` in a fresh child frame of `env` (loop body / conditional
/// block frame-creation point from spec §3.4).
fn eval_block_scoped(stmts: &[Stmt], env: &Rc<Environment>) -> Result<Signal, RuntimeError> {
    let frame = Environment::child(env);
    eval_block(stmts, &frame)
}

/// Runs `stmts` directly in `env`, without creating a new frame. Used by
/// callers (like `for`) that already created the frame for this iteration.
pub fn eval_block(stmts: &[Stmt], env: &Rc<Environment>) -> Result<Signal, RuntimeError> {
    for stmt in stmts {
        if let Signal::Return(v) = eval_stmt(stmt, env)? {
            return Ok(Signal::Return(v));
        }
    }
    Ok(Signal::Normal(Value::Unit))
}

fn check_arity(arity: &Arity, given: usize, name: &str, line: usize) -> Result<(), RuntimeError> {
    let ok = match arity {
        Arity::Exact(n) => given == *n,
        Arity::AtLeast(n) => given >= *n,
        Arity::OneOrMore => given >= 1,
    };
    if ok {
        Ok(())
    } else {
        Err(RuntimeError::arity_error(name, arity.to_string(), given, line))
    }
}

pub fn call_value(func: Value, args: Vec<Value>, line: usize) -> Result<Value, RuntimeError> {
    match func {
        Value::Function(f) => call_function(&f, args, line),
        Value::Builtin(b) => call_builtin(&b, args, line),
        other => Err(RuntimeError::type_error(
            format!("'{}' is not callable", other.type_name()),
            line,
        )),
    }
}

fn call_function(f: &FunctionValue, args: Vec<Value>, line: usize) -> Result<Value, RuntimeError> {
    if f.params.len() != args.len() {
        return Err(RuntimeError::arity_error(
            f.name.as_deref().unwrap_or("<anonymous>"),
            f.params.len().to_string(),
            args.len(),
            line,
        ));
    }
    let call_env = Environment::child(&f.env);
    for (param, arg) in f.params.iter().zip(args) {
        call_env.declare(param.clone(), arg);
    }
    match eval_block(&f.body, &call_env)? {
        Signal::Return(v) => Ok(v),
        Signal::Normal(_) => Ok(Value::Unit),
    }
}

fn call_builtin(b: &BuiltinValue, args: Vec<Value>, line: usize) -> Result<Value, RuntimeError> {
    check_arity(&b.arity, args.len(), b.name, line)?;
    (b.func)(&args, line)
}
