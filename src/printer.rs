use crate::heap::Heap;
use crate::symbol::SymbolTable;
use crate::value::Value;

/// Print a value to a string. Pure serialization: numbers and symbols
/// round-trip through the reader; strings print quoted but without escape
/// processing (mirroring the reader); functions print as opaque handles.
pub fn print_val(val: Value, heap: &Heap, symbols: &SymbolTable) -> String {
    let mut out = String::new();
    print_inner(val, heap, symbols, &mut out, 0);
    out
}

fn print_inner(val: Value, heap: &Heap, symbols: &SymbolTable, out: &mut String, depth: usize) {
    if depth > 1000 {
        out.push_str("...");
        return;
    }

    match val {
        Value::Nil => out.push_str("nil"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if b { "true" } else { "false" }),
        Value::Str(id) => {
            out.push('"');
            out.push_str(heap.str_text(id));
            out.push('"');
        }
        Value::Symbol(id) => out.push_str(symbols.name(id)),
        Value::Primitive(id) => out.push_str(&format!("<primitive:{}>", id.0)),
        Value::Closure(id) => out.push_str(&format!("<closure:{}>", id.0)),
        Value::Pair(id) => {
            out.push('(');
            print_inner(heap.car(id), heap, symbols, out, depth + 1);
            let mut current = heap.cdr(id);
            loop {
                match current {
                    Value::Nil => break,
                    Value::Pair(next) => {
                        out.push(' ');
                        print_inner(heap.car(next), heap, symbols, out, depth + 1);
                        current = heap.cdr(next);
                    }
                    atom => {
                        out.push_str(" . ");
                        print_inner(atom, heap, symbols, out, depth + 1);
                        break;
                    }
                }
            }
            out.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortStack;
    use crate::reader::Reader;

    fn fixture() -> (Heap, SymbolTable) {
        (Heap::new(4096), SymbolTable::new())
    }

    fn read_back(text: &str, heap: &mut Heap, symbols: &mut SymbolTable) -> Value {
        let mut ports = PortStack::new();
        ports.push_text(text);
        Reader::new(&mut ports, heap, symbols)
            .read()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn numbers_round_trip_through_the_reader() {
        let (mut heap, mut symbols) = fixture();
        for n in [0i64, 1, -1, 42, -42, i64::MAX, i64::MIN] {
            let text = print_val(Value::Number(n), &heap, &symbols);
            let back = read_back(&text, &mut heap, &mut symbols);
            assert_eq!(back, Value::Number(n), "round trip of {}", text);
        }
    }

    #[test]
    fn prints_atoms() {
        let (mut heap, mut symbols) = fixture();
        assert_eq!(print_val(Value::Nil, &heap, &symbols), "nil");
        assert_eq!(print_val(Value::Bool(true), &heap, &symbols), "true");
        assert_eq!(print_val(Value::Bool(false), &heap, &symbols), "false");
        let s = heap.alloc_str("hey".into());
        assert_eq!(print_val(Value::Str(s), &heap, &symbols), "\"hey\"");
        let id = symbols.intern("foo");
        assert_eq!(print_val(Value::Symbol(id), &heap, &symbols), "foo");
    }

    #[test]
    fn prints_proper_lists() {
        let (mut heap, symbols) = fixture();
        let list = heap
            .list(&[Value::Number(1), Value::Number(2), Value::Number(3)])
            .unwrap();
        assert_eq!(print_val(list, &heap, &symbols), "(1 2 3)");
    }

    #[test]
    fn prints_dotted_pairs() {
        let (mut heap, symbols) = fixture();
        let id = heap.cons(Value::Number(1), Value::Number(2)).unwrap();
        assert_eq!(print_val(Value::Pair(id), &heap, &symbols), "(1 . 2)");
    }

    #[test]
    fn prints_nested_lists() {
        let (mut heap, mut symbols) = fixture();
        let val = read_back("((1 2) three)", &mut heap, &mut symbols);
        assert_eq!(print_val(val, &heap, &symbols), "((1 2) three)");
    }
}
