//! slisp: a minimal embeddable Lisp runtime.
//!
//! The host owns the loop: call [`Interp::read`] to pull one S-expression
//! from the active port stack, hand it to [`Interp::eval_top`], and print
//! or inspect the result. The language core is five special forms
//! (`quote`, `if`, `def`, `set!`, `fn`) over a tagged value model with
//! lexically scoped closures; everything else is a host primitive
//! registered through [`Interp::define_primitive`] /
//! [`Interp::define_value`].
//!
//! ```no_run
//! use slisp::{Interp, printer};
//!
//! let mut interp = Interp::new(1 << 20)?;
//! interp.ports.push_text("(def x 2) (+ x 40)");
//! while let Some(form) = interp.read()? {
//!     let val = interp.eval_top(form)?;
//!     println!("{}", printer::print_val(val, &interp.heap, &interp.symbols));
//! }
//! # Ok::<(), slisp::LispError>(())
//! ```

pub mod env;
pub mod error;
pub mod eval;
pub mod heap;
pub mod port;
pub mod primitives;
pub mod printer;
pub mod reader;
pub mod symbol;
pub mod value;

pub use error::{LispError, LispResult};
pub use eval::{Interp, PrimFn, SetPolicy};
pub use value::Value;
