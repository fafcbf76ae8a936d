use crate::error::{LispError, LispResult};
use crate::eval::Interp;
use crate::value::Value;

/// Install the bootstrap primitive set. Deliberately tiny: these two exist
/// to exercise the registration surface, not to be a standard library.
/// Hosts add their own through the same `define_primitive` call.
pub fn install(interp: &mut Interp) -> LispResult<()> {
    interp.define_primitive("+", num_add)?;
    interp.define_primitive("load", load)?;
    Ok(())
}

fn expect_number(val: Value) -> LispResult<i64> {
    val.as_number().ok_or(LispError::TypeMismatch {
        expected: "number",
        found: val.type_name(),
    })
}

/// (+ a b): integer addition over exactly two evaluated arguments.
/// Wraps on overflow.
fn num_add(interp: &mut Interp, args: Value) -> LispResult<Value> {
    let vals = interp.heap.list_to_vec(args).unwrap_or_default();
    if vals.len() != 2 {
        return Err(LispError::Arity {
            expected: 2,
            got: vals.len(),
        });
    }
    let a = expect_number(vals[0])?;
    let b = expect_number(vals[1])?;
    Ok(Value::Number(a.wrapping_add(b)))
}

/// (load "path"): open the file and push it atop the input port stack, so
/// subsequent reads pull its contents before resuming the current source.
/// Textual inclusion at the point of the call. Returns nil.
fn load(interp: &mut Interp, args: Value) -> LispResult<Value> {
    let vals = interp.heap.list_to_vec(args).unwrap_or_default();
    if vals.len() != 1 {
        return Err(LispError::Arity {
            expected: 1,
            got: vals.len(),
        });
    }
    let sid = vals[0].as_str().ok_or(LispError::TypeMismatch {
        expected: "string",
        found: vals[0].type_name(),
    })?;
    let path = interp.heap.str_text(sid).to_string();
    interp.ports.push_file(path)?;
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn interp() -> Interp {
        Interp::new(1 << 16).unwrap()
    }

    fn run(interp: &mut Interp, src: &str) -> LispResult<Value> {
        interp.ports.push_text(src);
        let mut last = Value::Nil;
        while let Some(form) = interp.read()? {
            last = interp.eval_top(form)?;
        }
        Ok(last)
    }

    #[test]
    fn addition_over_two_arguments() {
        let mut i = interp();
        assert_eq!(run(&mut i, "(+ 2 40)").unwrap(), Value::Number(42));
        assert_eq!(run(&mut i, "(+ -2 2)").unwrap(), Value::Number(0));
    }

    #[test]
    fn addition_checks_arity_and_types() {
        let mut i = interp();
        assert!(matches!(
            run(&mut i, "(+ 1)"),
            Err(LispError::Arity {
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            run(&mut i, "(+ 1 2 3)"),
            Err(LispError::Arity { .. })
        ));
        assert!(matches!(
            run(&mut i, "(+ 1 \"x\")"),
            Err(LispError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn load_includes_a_file_at_the_call_site() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "(def z 42)").unwrap();
        tmp.flush().unwrap();

        let mut i = interp();
        // The load runs first, the def is then read from the file, and
        // once the file is exhausted reading resumes with `z`.
        let src = format!("(load \"{}\") z", tmp.path().display());
        assert_eq!(run(&mut i, &src).unwrap(), Value::Number(42));
    }

    #[test]
    fn load_of_a_missing_file_is_an_io_error() {
        let mut i = interp();
        assert!(matches!(
            run(&mut i, "(load \"/no/such/slisp/file\")"),
            Err(LispError::Io(_))
        ));
    }

    #[test]
    fn load_requires_a_string() {
        let mut i = interp();
        assert!(matches!(
            run(&mut i, "(load 5)"),
            Err(LispError::TypeMismatch { .. })
        ));
    }
}
