use crate::error::{LispError, LispResult};
use crate::heap::Heap;
use crate::port::PortStack;
use crate::symbol::{sym, SymbolTable};
use crate::value::Value;

/// Reader: parses S-expression text from a port stack into heap values.
///
/// Grammar: optional-sign decimal integers (strtol-style base detection, so
/// a leading zero means octal), double-quoted strings with no escapes,
/// `'x` as sugar for `(quote x)`, parenthesized lists, and symbols as
/// maximal runs of non-delimiter characters. `[ ] { }` are reserved
/// delimiters with no production; meeting one (or a stray `)`) discards
/// input through the next newline and returns a Syntax error, leaving the
/// ports positioned so the caller can simply read again.
pub struct Reader<'a> {
    ports: &'a mut PortStack,
    heap: &'a mut Heap,
    symbols: &'a mut SymbolTable,
    /// Token accumulator, shared between the number and symbol scanners so
    /// a tentatively consumed sign can be re-parsed as a symbol prefix.
    tok: Vec<u8>,
}

impl<'a> Reader<'a> {
    pub fn new(ports: &'a mut PortStack, heap: &'a mut Heap, symbols: &'a mut SymbolTable) -> Self {
        Reader {
            ports,
            heap,
            symbols,
            tok: Vec::new(),
        }
    }

    /// Read one value. Ok(None) means every input source is exhausted:
    /// an ordinary end-of-stream, not an error, so an embedding host can
    /// decide for itself what to do.
    pub fn read(&mut self) -> LispResult<Option<Value>> {
        self.skip_whitespace()?;
        if self.ports.peek()?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.read_value()?))
    }

    /// Consume the peeked byte into the token buffer.
    fn take(&mut self) -> LispResult<()> {
        if let Some(b) = self.ports.next()? {
            self.tok.push(b);
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) -> LispResult<()> {
        while let Some(b) = self.ports.peek()? {
            if b.is_ascii_whitespace() {
                self.ports.next()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn is_delimiter(b: u8) -> bool {
        b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'\'' | b'"')
    }

    fn read_value(&mut self) -> LispResult<Value> {
        self.skip_whitespace()?;
        let Some(b) = self.ports.peek()? else {
            return Err(LispError::UnexpectedEof);
        };
        match b {
            b'0'..=b'9' | b'+' | b'-' => self.read_number(),
            b'"' => self.read_string(),
            b'\'' => self.read_quote(),
            b'(' => self.read_list(),
            b')' | b'[' | b']' | b'{' | b'}' => self.syntax_error(b),
            _ => self.read_symbol(),
        }
    }

    /// Read a numeric token. A leading sign is consumed tentatively; if no
    /// digit follows, the partial token continues as a symbol instead, so
    /// a bare `-` or `+` is a valid symbol while `-5` is a number.
    fn read_number(&mut self) -> LispResult<Value> {
        if matches!(self.ports.peek()?, Some(b'+') | Some(b'-')) {
            self.take()?;
        }
        if !matches!(self.ports.peek()?, Some(b) if b.is_ascii_digit()) {
            return self.read_symbol();
        }
        while matches!(self.ports.peek()?, Some(b) if b.is_ascii_digit()) {
            self.take()?;
        }
        let n = parse_int(&self.tok);
        self.tok.clear();
        Ok(Value::Number(n))
    }

    /// Read a symbol token, continuing whatever is already in the token
    /// buffer, and intern it.
    fn read_symbol(&mut self) -> LispResult<Value> {
        while let Some(b) = self.ports.peek()? {
            if Self::is_delimiter(b) {
                break;
            }
            self.take()?;
        }
        if self.tok.is_empty() {
            return Err(LispError::UnexpectedEof);
        }
        let name = String::from_utf8_lossy(&self.tok).into_owned();
        self.tok.clear();
        let id = self.symbols.intern(&name);
        Ok(Value::Symbol(id))
    }

    /// Read a string literal. No escape processing: `"` always closes the
    /// string, so embedded quotes are not representable.
    fn read_string(&mut self) -> LispResult<Value> {
        self.ports.next()?; // opening quote
        let mut bytes = Vec::new();
        loop {
            match self.ports.next()? {
                None => return Err(LispError::UnterminatedString),
                Some(b'"') => break,
                Some(b) => bytes.push(b),
            }
        }
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let id = self.heap.alloc_str(text);
        Ok(Value::Str(id))
    }

    /// 'x -> (quote x)
    fn read_quote(&mut self) -> LispResult<Value> {
        self.ports.next()?; // consume '\''
        let quoted = self.read_value()?;
        let inner = self.heap.cons(quoted, Value::Nil)?;
        let outer = self
            .heap
            .cons(Value::Symbol(sym::QUOTE), Value::Pair(inner))?;
        Ok(Value::Pair(outer))
    }

    /// Read a parenthesized list. Elements accumulate in a buffer and the
    /// chain is built back to front once the closing delimiter is seen,
    /// giving left-to-right order.
    fn read_list(&mut self) -> LispResult<Value> {
        self.ports.next()?; // consume '('
        let mut elements = Vec::new();
        loop {
            self.skip_whitespace()?;
            match self.ports.peek()? {
                None => return Err(LispError::UnexpectedEof),
                Some(b')') => {
                    self.ports.next()?;
                    break;
                }
                Some(_) => elements.push(self.read_value()?),
            }
        }
        let mut result = Value::Nil;
        for val in elements.into_iter().rev() {
            let pair = self.heap.cons(val, result)?;
            result = Value::Pair(pair);
        }
        Ok(result)
    }

    /// Resynchronize after an unexpected delimiter: discard input up to
    /// and including the next newline, then report. One bad line cannot
    /// damage the forms that follow it.
    fn syntax_error(&mut self, found: u8) -> LispResult<Value> {
        self.tok.clear();
        while let Some(b) = self.ports.next()? {
            if b == b'\n' {
                break;
            }
        }
        Err(LispError::Syntax(found as char))
    }
}

/// Parse a `[+-]?[0-9]+` token with strtol(_, _, 0) semantics: a leading
/// zero selects octal, parsing takes the longest valid prefix in the
/// detected base, and out-of-range values saturate.
fn parse_int(tok: &[u8]) -> i64 {
    let (neg, digits) = match tok.first() {
        Some(b'-') => (true, &tok[1..]),
        Some(b'+') => (false, &tok[1..]),
        _ => (false, tok),
    };
    let (radix, rest) = if digits.len() > 1 && digits[0] == b'0' {
        (8i64, &digits[1..])
    } else {
        (10i64, digits)
    };
    let mut val: i64 = 0;
    for &b in rest {
        let d = i64::from(b - b'0');
        if d >= radix {
            break;
        }
        val = match val.checked_mul(radix).and_then(|v| v.checked_add(d)) {
            Some(v) => v,
            None => return if neg { i64::MIN } else { i64::MAX },
        };
    }
    if neg {
        -val
    } else {
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        ports: PortStack,
        heap: Heap,
        symbols: SymbolTable,
    }

    impl Fixture {
        fn new(src: &str) -> Self {
            let mut ports = PortStack::new();
            ports.push_text(src);
            Fixture {
                ports,
                heap: Heap::new(4096),
                symbols: SymbolTable::new(),
            }
        }

        fn read(&mut self) -> LispResult<Option<Value>> {
            Reader::new(&mut self.ports, &mut self.heap, &mut self.symbols).read()
        }
    }

    fn read_one(src: &str) -> (Fixture, Value) {
        let mut fx = Fixture::new(src);
        let val = fx.read().unwrap().unwrap();
        (fx, val)
    }

    #[test]
    fn reads_a_positive_integer() {
        let (_, val) = read_one("123");
        assert_eq!(val, Value::Number(123));
    }

    #[test]
    fn reads_signed_integers() {
        assert_eq!(read_one("-5").1, Value::Number(-5));
        assert_eq!(read_one("+7").1, Value::Number(7));
    }

    #[test]
    fn bare_sign_is_a_symbol() {
        let (fx, val) = read_one("- ");
        let id = val.as_symbol().unwrap();
        assert_eq!(fx.symbols.name(id), "-");
        let (fx, val) = read_one("+");
        assert_eq!(fx.symbols.name(val.as_symbol().unwrap()), "+");
    }

    #[test]
    fn sign_prefix_continues_as_symbol() {
        let (fx, val) = read_one("-abc");
        assert_eq!(fx.symbols.name(val.as_symbol().unwrap()), "-abc");
    }

    #[test]
    fn leading_zero_reads_as_octal() {
        assert_eq!(read_one("010").1, Value::Number(8));
        assert_eq!(read_one("019").1, Value::Number(1));
        assert_eq!(read_one("0").1, Value::Number(0));
    }

    #[test]
    fn out_of_range_literal_saturates() {
        assert_eq!(read_one("99999999999999999999").1, Value::Number(i64::MAX));
        assert_eq!(read_one("-99999999999999999999").1, Value::Number(i64::MIN));
    }

    #[test]
    fn number_token_stops_at_first_non_digit() {
        let mut fx = Fixture::new("12ab");
        assert_eq!(fx.read().unwrap().unwrap(), Value::Number(12));
        let val = fx.read().unwrap().unwrap();
        assert_eq!(fx.symbols.name(val.as_symbol().unwrap()), "ab");
    }

    #[test]
    fn reads_a_symbol() {
        let (fx, val) = read_one("foo");
        assert_eq!(fx.symbols.name(val.as_symbol().unwrap()), "foo");
    }

    #[test]
    fn reads_an_empty_string() {
        let (fx, val) = read_one("\"\"");
        assert_eq!(fx.heap.str_text(val.as_str().unwrap()), "");
    }

    #[test]
    fn reads_string_contents_without_escapes() {
        let (fx, val) = read_one("\"hi \\there\"");
        assert_eq!(fx.heap.str_text(val.as_str().unwrap()), "hi \\there");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut fx = Fixture::new("\"oops");
        assert!(matches!(fx.read(), Err(LispError::UnterminatedString)));
    }

    #[test]
    fn reads_a_quoted_symbol() {
        let (fx, val) = read_one("'foo");
        let id = val.as_pair().unwrap();
        assert_eq!(fx.heap.car(id), Value::Symbol(sym::QUOTE));
        let rest = fx.heap.cdr(id).as_pair().unwrap();
        let inner = fx.heap.car(rest);
        assert_eq!(fx.symbols.name(inner.as_symbol().unwrap()), "foo");
        assert_eq!(fx.heap.cdr(rest), Value::Nil);
    }

    #[test]
    fn reads_a_list_in_order() {
        let (fx, val) = read_one("(1 2 3)");
        let items = fx.heap.list_to_vec(val).unwrap();
        assert_eq!(
            items,
            vec![Value::Number(1), Value::Number(2), Value::Number(3)]
        );
    }

    #[test]
    fn reads_nested_lists() {
        let (fx, val) = read_one("((1 2) three)");
        let items = fx.heap.list_to_vec(val).unwrap();
        assert_eq!(items.len(), 2);
        let inner = fx.heap.list_to_vec(items[0]).unwrap();
        assert_eq!(inner, vec![Value::Number(1), Value::Number(2)]);
        assert_eq!(fx.symbols.name(items[1].as_symbol().unwrap()), "three");
    }

    #[test]
    fn empty_list_is_nil() {
        assert_eq!(read_one("()").1, Value::Nil);
    }

    #[test]
    fn end_of_input_is_none() {
        let mut fx = Fixture::new("   \n\t ");
        assert!(fx.read().unwrap().is_none());
        let mut fx = Fixture::new("");
        assert!(fx.read().unwrap().is_none());
    }

    #[test]
    fn eof_inside_list_is_an_error() {
        let mut fx = Fixture::new("(1 2");
        assert!(matches!(fx.read(), Err(LispError::UnexpectedEof)));
    }

    #[test]
    fn syntax_error_resynchronizes_to_next_line() {
        let mut fx = Fixture::new("1 ] this line is ruined\n(2 3)");
        assert_eq!(fx.read().unwrap().unwrap(), Value::Number(1));
        assert!(matches!(fx.read(), Err(LispError::Syntax(']'))));
        let val = fx.read().unwrap().unwrap();
        let items = fx.heap.list_to_vec(val).unwrap();
        assert_eq!(items, vec![Value::Number(2), Value::Number(3)]);
    }

    #[test]
    fn stray_close_paren_is_a_syntax_error() {
        let mut fx = Fixture::new(") \nok");
        assert!(matches!(fx.read(), Err(LispError::Syntax(')'))));
        let val = fx.read().unwrap().unwrap();
        assert_eq!(fx.symbols.name(val.as_symbol().unwrap()), "ok");
    }

    #[test]
    fn reads_across_stacked_ports() {
        let mut fx = Fixture::new("2");
        fx.ports.push_text("1 ");
        assert_eq!(fx.read().unwrap().unwrap(), Value::Number(1));
        assert_eq!(fx.read().unwrap().unwrap(), Value::Number(2));
        assert!(fx.read().unwrap().is_none());
    }

    #[test]
    fn interning_through_reader_gives_identity() {
        let mut fx = Fixture::new("foo foo");
        let a = fx.read().unwrap().unwrap();
        let b = fx.read().unwrap().unwrap();
        assert_eq!(a, b);
    }
}
