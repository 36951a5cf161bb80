//! The builtin functions other than `send`/`close`, which dispatch on
//! a channel name carried by the `Call` node itself rather than on a
//! function-table lookup (see [`crate::eval::Evaluator::eval_call`]).

use std::io::Write;
use std::time::Duration;

use mp_util::Line;

use crate::error::{RunResult, RuntimeError};
use crate::value::Value;

pub fn call_builtin(name: &str, args: Vec<Value>, line: Line) -> RunResult<Value> {
    match name {
        "print" => {
            print(&args);
            Ok(Value::None)
        }
        "input" => Ok(Value::String(input(&args))),
        "sleep" => {
            sleep(&args, line)?;
            Ok(Value::None)
        }
        "to_number" => to_number(&args, line),
        "to_string" => Ok(Value::String(arg0(&args, line)?.to_string())),
        "to_bool" => Ok(Value::Bool(arg0(&args, line)?.is_truthy())),
        "len" => len(&args, line),
        "isalpha" => Ok(Value::Bool(whole_string(&args, line)?.chars().all(|c| c.is_alphabetic()))),
        "isnum" => Ok(Value::Bool(whole_string(&args, line)?.chars().all(|c| c.is_ascii_digit()))),
        other => unreachable!("'{other}' is not a plain builtin"),
    }
}

fn arg0(args: &[Value], line: Line) -> RunResult<&Value> {
    args.first().ok_or_else(|| RuntimeError::Other {
        message: "missing argument".into(),
        line,
    })
}

fn whole_string(args: &[Value], line: Line) -> RunResult<String> {
    Ok(arg0(args, line)?.to_string())
}

fn print(args: &[Value]) {
    let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    println!("{}", rendered.join(" "));
}

fn input(args: &[Value]) -> String {
    if let Some(prompt) = args.first() {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
    }
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_ok() {
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
    }
    line
}

fn sleep(args: &[Value], line: Line) -> RunResult<()> {
    let secs = arg0(args, line)?.as_f64().ok_or_else(|| RuntimeError::Other {
        message: "sleep expects a number of seconds".into(),
        line,
    })?;
    std::thread::sleep(Duration::from_secs_f64(secs.max(0.0)));
    Ok(())
}

/// Parses to an integer when possible, falling back to floating
/// point otherwise.
fn to_number(args: &[Value], line: Line) -> RunResult<Value> {
    let value = arg0(args, line)?;
    let text = value.to_string();
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| RuntimeError::BadNumberCoercion { value: text, line })
}

fn len(args: &[Value], line: Line) -> RunResult<Value> {
    match arg0(args, line)? {
        Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(RuntimeError::Other {
            message: format!("len() expects a string, found a {}", other.type_name()),
            line,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_number_prefers_integer() {
        let v = to_number(&[Value::String("42".into())], Line(1)).unwrap();
        assert_eq!(v, Value::Int(42));
    }

    #[test]
    fn to_number_falls_back_to_float() {
        let v = to_number(&[Value::String("3.5".into())], Line(1)).unwrap();
        assert_eq!(v, Value::Float(3.5));
    }

    #[test]
    fn to_number_rejects_garbage() {
        assert!(to_number(&[Value::String("abc".into())], Line(1)).is_err());
    }

    #[test]
    fn len_counts_chars() {
        let v = len(&[Value::String("hello".into())], Line(1)).unwrap();
        assert_eq!(v, Value::Int(5));
    }

    #[test]
    fn isalpha_checks_whole_string() {
        let v = call_builtin("isalpha", vec![Value::String("abc".into())], Line(1)).unwrap();
        assert_eq!(v, Value::Bool(true));
        let v = call_builtin("isalpha", vec![Value::String("ab1".into())], Line(1)).unwrap();
        assert_eq!(v, Value::Bool(false));
    }

    #[test]
    fn isnum_checks_whole_string() {
        let v = call_builtin("isnum", vec![Value::String("123".into())], Line(1)).unwrap();
        assert_eq!(v, Value::Bool(true));
        let v = call_builtin("isnum", vec![Value::String("12a".into())], Line(1)).unwrap();
        assert_eq!(v, Value::Bool(false));
    }
}
