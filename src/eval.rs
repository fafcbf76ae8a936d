use crate::env;
use crate::error::{LispError, LispResult};
use crate::heap::Heap;
use crate::port::PortStack;
use crate::primitives;
use crate::reader::Reader;
use crate::symbol::{sym, SymbolTable};
use crate::value::{PairId, PrimId, SymbolId, Value};

/// A host-provided primitive: receives the already-evaluated argument list
/// and full access to the interpreter. Primitives never see unevaluated
/// argument trees, so only the built-in special forms can short-circuit.
pub type PrimFn = fn(&mut Interp, Value) -> LispResult<Value>;

struct PrimRecord {
    name: SymbolId,
    func: PrimFn,
}

/// What `set!` does when the name has no existing binding.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SetPolicy {
    /// Silently define a global, as the original language did.
    Permissive,
    /// Report an unbound-symbol error.
    Strict,
}

/// The interpreter. All state lives here (symbol table, heap, port stack,
/// primitive table, global environment) so independent instances can
/// coexist without shared fixtures. Evaluation recursion depth is
/// bounded by the native call stack; there is no trampoline.
pub struct Interp {
    pub heap: Heap,
    pub symbols: SymbolTable,
    pub ports: PortStack,
    prims: Vec<PrimRecord>,
    /// Anchor node of the global environment segment.
    globe: PairId,
    /// The current top-level chain: global tail plus top-level `def`s.
    env: Value,
    pub set_policy: SetPolicy,
}

impl Interp {
    /// Create an interpreter with the given cons-cell capacity, the
    /// keyword symbols interned, the two boolean singletons bound, and
    /// the bootstrap primitives (`+`, `load`) registered.
    pub fn new(heap_capacity: usize) -> LispResult<Self> {
        let mut heap = Heap::new(heap_capacity);
        let symbols = SymbolTable::new();
        let globe = env::new_anchor(&mut heap)?;

        let mut interp = Interp {
            heap,
            symbols,
            ports: PortStack::new(),
            prims: Vec::new(),
            globe,
            env: Value::Pair(globe),
            set_policy: SetPolicy::Permissive,
        };

        interp.define_value("true", Value::Bool(true))?;
        interp.define_value("false", Value::Bool(false))?;
        primitives::install(&mut interp)?;
        Ok(interp)
    }

    /// Bind a name to an arbitrary value in the global environment. Part
    /// of the extension surface: visible from every chain sharing the
    /// global tail, including already-captured closure environments.
    pub fn define_value(&mut self, name: &str, val: Value) -> LispResult<()> {
        let id = self.symbols.intern(name);
        env::define_global(&mut self.heap, self.globe, id, val)
    }

    /// Register a host primitive under a global name.
    pub fn define_primitive(&mut self, name: &str, func: PrimFn) -> LispResult<()> {
        let id = self.symbols.intern(name);
        let prim = PrimId(self.prims.len() as u32);
        self.prims.push(PrimRecord { name: id, func });
        env::define_global(&mut self.heap, self.globe, id, Value::Primitive(prim))
    }

    /// Name under which a primitive was registered.
    pub fn prim_name(&self, id: PrimId) -> SymbolId {
        self.prims[id.0 as usize].name
    }

    /// Read one value from the active port stack. Ok(None) at end of all
    /// input.
    pub fn read(&mut self) -> LispResult<Option<Value>> {
        Reader::new(&mut self.ports, &mut self.heap, &mut self.symbols).read()
    }

    /// The current top-level environment chain.
    pub fn global_env(&self) -> Value {
        self.env
    }

    /// Evaluate a top-level form. `def` extends the top-level chain, so
    /// the binding is visible to every later top-level form.
    pub fn eval_top(&mut self, expr: Value) -> LispResult<Value> {
        let mut chain = self.env;
        let result = self.eval(expr, &mut chain);
        self.env = chain;
        result
    }

    /// Evaluate one form against an environment chain. The chain is
    /// threaded by mutable reference so `def` can prepend bindings the
    /// caller keeps.
    pub fn eval(&mut self, expr: Value, chain: &mut Value) -> LispResult<Value> {
        match expr {
            Value::Symbol(id) => match env::lookup(&self.heap, *chain, id) {
                Some(bid) => Ok(self.heap.cdr(bid)),
                None => Err(LispError::Unbound(self.symbols.name(id).to_string())),
            },
            Value::Pair(pid) => {
                let head = self.heap.car(pid);
                let rest = self.heap.cdr(pid);
                if head == Value::Symbol(sym::QUOTE) {
                    self.heap.car_val(rest)
                } else if head == Value::Symbol(sym::FN) {
                    // Capture the current chain: lexical scoping. Parameter
                    // list and body are taken verbatim, unevaluated.
                    let params = self.heap.car_val(rest)?;
                    let body = self.heap.cdr_val(rest)?;
                    let id = self.heap.alloc_closure(params, body, *chain);
                    Ok(Value::Closure(id))
                } else if head == Value::Symbol(sym::DEF) {
                    let name = self.expect_symbol(self.heap.car_val(rest)?)?;
                    let form = self.heap.car_val(self.heap.cdr_val(rest)?)?;
                    let val = self.eval(form, chain)?;
                    *chain = env::extend(&mut self.heap, *chain, name, val)?;
                    Ok(val)
                } else if head == Value::Symbol(sym::SET) {
                    let name = self.expect_symbol(self.heap.car_val(rest)?)?;
                    let binding = env::lookup(&self.heap, *chain, name);
                    let form = self.heap.car_val(self.heap.cdr_val(rest)?)?;
                    let val = self.eval(form, chain)?;
                    match binding {
                        Some(bid) => self.heap.set_cdr(bid, val),
                        None => match self.set_policy {
                            SetPolicy::Permissive => {
                                env::define_global(&mut self.heap, self.globe, name, val)?
                            }
                            SetPolicy::Strict => {
                                return Err(LispError::Unbound(
                                    self.symbols.name(name).to_string(),
                                ))
                            }
                        },
                    }
                    Ok(val)
                } else if head == Value::Symbol(sym::IF) {
                    // Anything but the false singleton is truthy. Exactly
                    // one branch is evaluated.
                    let cond_form = self.heap.car_val(rest)?;
                    let branches = self.heap.cdr_val(rest)?;
                    let cond = self.eval(cond_form, chain)?;
                    if cond != Value::Bool(false) {
                        let then_form = self.heap.car_val(branches)?;
                        self.eval(then_form, chain)
                    } else {
                        let else_form = self.heap.car_val(self.heap.cdr_val(branches)?)?;
                        self.eval(else_form, chain)
                    }
                } else {
                    let func = self.eval(head, chain)?;
                    let args = self.eval_list(rest, chain)?;
                    self.apply(func, args)
                }
            }
            // Numbers, strings, booleans, primitives, closures, nil.
            _ => Ok(expr),
        }
    }

    /// Evaluate every element of a list left to right into a fresh list.
    /// The evaluation order is fixed and observable.
    fn eval_list(&mut self, list: Value, chain: &mut Value) -> LispResult<Value> {
        let mut evaluated = Vec::new();
        let mut current = list;
        loop {
            match current {
                Value::Nil => break,
                Value::Pair(id) => {
                    let form = self.heap.car(id);
                    let next = self.heap.cdr(id);
                    evaluated.push(self.eval(form, chain)?);
                    current = next;
                }
                other => {
                    return Err(LispError::TypeMismatch {
                        expected: "pair",
                        found: other.type_name(),
                    })
                }
            }
        }
        self.heap.list(&evaluated)
    }

    /// Apply a function value to an evaluated argument list.
    pub fn apply(&mut self, func: Value, args: Value) -> LispResult<Value> {
        match func {
            Value::Primitive(id) => {
                let f = self.prims[id.0 as usize].func;
                f(self, args)
            }
            Value::Closure(id) => {
                let closure = self.heap.closure(id);
                let (params, body, captured) = (closure.params, closure.body, closure.env);

                let plist = self.heap.list_to_vec(params).ok_or(LispError::TypeMismatch {
                    expected: "parameter list",
                    found: params.type_name(),
                })?;
                let alist = self.heap.list_to_vec(args).unwrap_or_default();
                if plist.len() != alist.len() {
                    return Err(LispError::Arity {
                        expected: plist.len(),
                        got: alist.len(),
                    });
                }

                // Bind parameters in order over the captured environment,
                // never the caller's.
                let mut frame = captured;
                for (&param, arg) in plist.iter().zip(alist) {
                    let name = self.expect_symbol(param)?;
                    frame = env::extend(&mut self.heap, frame, name, arg)?;
                }

                // Body forms run in sequence; the last one's value is the
                // result, nil for an empty body.
                let mut result = Value::Nil;
                let mut current = body;
                while let Value::Pair(bid) = current {
                    let form = self.heap.car(bid);
                    let next = self.heap.cdr(bid);
                    result = self.eval(form, &mut frame)?;
                    current = next;
                }
                Ok(result)
            }
            other => Err(LispError::NotCallable(other.type_name())),
        }
    }

    fn expect_symbol(&self, val: Value) -> LispResult<SymbolId> {
        val.as_symbol().ok_or(LispError::TypeMismatch {
            expected: "symbol",
            found: val.type_name(),
        })
    }
}
