use crate::error::{LispError, LispResult};
use crate::value::{ClosureId, PairId, StrId, Value};

/// A single cons cell in the arena. The two fields are the only mutable
/// slots in the value model; `set!` and list surgery rewrite them in place.
pub struct ConsCell {
    pub car: Value,
    pub cdr: Value,
}

/// A user-defined function: parameter list and body as read, plus the
/// environment chain in effect at definition time (lexical scoping).
pub struct Closure {
    pub params: Value,
    pub body: Value,
    pub env: Value,
}

/// The allocation arena. All compound runtime data lives here: cons cells,
/// string payloads, and closure records, each addressed by index handles.
///
/// Lifetime model: arena-per-interpreter. Nothing is freed individually;
/// every allocation lives until the owning interpreter is dropped. This is
/// the explicit replacement for the original's never-freed malloc values,
/// and it lets closures outlive their creating expression for free.
pub struct Heap {
    cells: Vec<ConsCell>,
    strings: Vec<String>,
    closures: Vec<Closure>,
    capacity: usize,
}

impl Heap {
    pub fn new(capacity: usize) -> Self {
        Heap {
            cells: Vec::new(),
            strings: Vec::new(),
            closures: Vec::new(),
            capacity,
        }
    }

    /// Allocate a new cons cell.
    /// Returns Err(HeapOverflow) if capacity is exceeded.
    pub fn cons(&mut self, car: Value, cdr: Value) -> LispResult<PairId> {
        if self.cells.len() >= self.capacity {
            return Err(LispError::HeapOverflow);
        }
        let id = PairId(self.cells.len() as u32);
        self.cells.push(ConsCell { car, cdr });
        Ok(id)
    }

    #[inline]
    pub fn car(&self, id: PairId) -> Value {
        self.cells[id.0 as usize].car
    }

    #[inline]
    pub fn cdr(&self, id: PairId) -> Value {
        self.cells[id.0 as usize].cdr
    }

    #[inline]
    pub fn set_car(&mut self, id: PairId, val: Value) {
        self.cells[id.0 as usize].car = val;
    }

    #[inline]
    pub fn set_cdr(&mut self, id: PairId, val: Value) {
        self.cells[id.0 as usize].cdr = val;
    }

    /// Car of a value: nil for nil, the car for a pair, TypeMismatch for
    /// any other atom.
    pub fn car_val(&self, val: Value) -> LispResult<Value> {
        match val {
            Value::Nil => Ok(Value::Nil),
            Value::Pair(id) => Ok(self.car(id)),
            other => Err(LispError::TypeMismatch {
                expected: "pair",
                found: other.type_name(),
            }),
        }
    }

    /// Cdr of a value, with the same nil convention as `car_val`.
    pub fn cdr_val(&self, val: Value) -> LispResult<Value> {
        match val {
            Value::Nil => Ok(Value::Nil),
            Value::Pair(id) => Ok(self.cdr(id)),
            other => Err(LispError::TypeMismatch {
                expected: "pair",
                found: other.type_name(),
            }),
        }
    }

    /// Build a proper list from a slice of values.
    pub fn list(&mut self, values: &[Value]) -> LispResult<Value> {
        let mut result = Value::Nil;
        for &val in values.iter().rev() {
            let pair = self.cons(val, result)?;
            result = Value::Pair(pair);
        }
        Ok(result)
    }

    /// Collect a proper list into a Vec. Returns None if the chain ends in
    /// a non-nil atom. Not cycle-safe; user code can tie a knot with set!.
    pub fn list_to_vec(&self, val: Value) -> Option<Vec<Value>> {
        let mut result = Vec::new();
        let mut current = val;
        loop {
            match current {
                Value::Nil => return Some(result),
                Value::Pair(id) => {
                    result.push(self.car(id));
                    current = self.cdr(id);
                }
                _ => return None,
            }
        }
    }

    /// Length of a proper-list prefix (stops at the first non-pair).
    pub fn list_len(&self, val: Value) -> usize {
        let mut n = 0;
        let mut current = val;
        while let Value::Pair(id) = current {
            n += 1;
            current = self.cdr(id);
        }
        n
    }

    /// Store an immutable string, returning its handle.
    pub fn alloc_str(&mut self, text: String) -> StrId {
        let id = StrId(self.strings.len() as u32);
        self.strings.push(text);
        id
    }

    pub fn str_text(&self, id: StrId) -> &str {
        &self.strings[id.0 as usize]
    }

    /// Store a closure record, returning its handle.
    pub fn alloc_closure(&mut self, params: Value, body: Value, env: Value) -> ClosureId {
        let id = ClosureId(self.closures.len() as u32);
        self.closures.push(Closure { params, body, env });
        id
    }

    pub fn closure(&self, id: ClosureId) -> &Closure {
        &self.closures[id.0 as usize]
    }

    /// Number of allocated cons cells.
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cons_car_cdr() {
        let mut heap = Heap::new(16);
        let id = heap.cons(Value::Number(1), Value::Number(2)).unwrap();
        assert_eq!(heap.car(id), Value::Number(1));
        assert_eq!(heap.cdr(id), Value::Number(2));
    }

    #[test]
    fn cells_are_mutable_in_place() {
        let mut heap = Heap::new(16);
        let id = heap.cons(Value::Nil, Value::Nil).unwrap();
        heap.set_car(id, Value::Number(7));
        heap.set_cdr(id, Value::Bool(true));
        assert_eq!(heap.car(id), Value::Number(7));
        assert_eq!(heap.cdr(id), Value::Bool(true));
    }

    #[test]
    fn list_builder_round_trips() {
        let mut heap = Heap::new(16);
        let vals = [Value::Number(1), Value::Number(2), Value::Number(3)];
        let list = heap.list(&vals).unwrap();
        assert_eq!(heap.list_to_vec(list).unwrap(), vals.to_vec());
        assert_eq!(heap.list_len(list), 3);
    }

    #[test]
    fn car_of_atom_is_type_mismatch() {
        let heap = Heap::new(16);
        assert!(matches!(
            heap.car_val(Value::Number(1)),
            Err(LispError::TypeMismatch { .. })
        ));
        assert_eq!(heap.car_val(Value::Nil).unwrap(), Value::Nil);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut heap = Heap::new(2);
        heap.cons(Value::Nil, Value::Nil).unwrap();
        heap.cons(Value::Nil, Value::Nil).unwrap();
        assert!(matches!(
            heap.cons(Value::Nil, Value::Nil),
            Err(LispError::HeapOverflow)
        ));
    }
}
