//! Environment chains are ordinary heap data: a list of nodes whose car is
//! a (symbol . value) binding pair. Lookup scans front to back, so a more
//! recently prepended binding shadows an older one. Chains share structure;
//! `extend` never mutates its input, which is what lets every closure keep
//! the exact chain that was live at its definition.
//!
//! The global segment hangs off an anchor node whose car is nil. Lookup
//! skips it, and prepending to the anchor's cdr extends the global tail in
//! place, visible through every chain that ends in the anchor.

use crate::error::LispResult;
use crate::heap::Heap;
use crate::value::{PairId, SymbolId, Value};

/// Prepend one binding, returning the new chain head.
pub fn extend(heap: &mut Heap, env: Value, name: SymbolId, val: Value) -> LispResult<Value> {
    let binding = heap.cons(Value::Symbol(name), val)?;
    let node = heap.cons(Value::Pair(binding), env)?;
    Ok(Value::Pair(node))
}

/// Find the nearest binding pair for `name`, scanning front to back and
/// comparing symbol identity. Returns the binding cell so the caller can
/// read or rewrite its value slot.
pub fn lookup(heap: &Heap, env: Value, name: SymbolId) -> Option<PairId> {
    let mut current = env;
    while let Value::Pair(id) = current {
        if let Value::Pair(bid) = heap.car(id) {
            if heap.car(bid) == Value::Symbol(name) {
                return Some(bid);
            }
        }
        current = heap.cdr(id);
    }
    None
}

/// Allocate a fresh global anchor: a chain node with no binding in it.
pub fn new_anchor(heap: &mut Heap) -> LispResult<PairId> {
    heap.cons(Value::Nil, Value::Nil)
}

/// Prepend a binding to the global segment, in place through the anchor.
/// Every environment chain ending in the anchor sees the new binding.
pub fn define_global(
    heap: &mut Heap,
    anchor: PairId,
    name: SymbolId,
    val: Value,
) -> LispResult<()> {
    let binding = heap.cons(Value::Symbol(name), val)?;
    let node = heap.cons(Value::Pair(binding), heap.cdr(anchor))?;
    heap.set_cdr(anchor, Value::Pair(node));
    Ok(())
}
