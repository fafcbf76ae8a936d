use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::LispResult;

/// One character source: an in-memory text cursor, an open file, or the
/// process's stdin. Reading is byte-oriented; the grammar is ASCII-delimited
/// so multi-byte sequences pass through symbol and string tokens untouched.
enum SourceInner {
    Text { bytes: Vec<u8>, pos: usize },
    File { reader: BufReader<File> },
    Stdin { handle: io::Stdin },
}

struct Source {
    inner: SourceInner,
    /// One byte of lookahead, filled by `peek`.
    pending: Option<u8>,
}

impl Source {
    /// Pull the next raw byte from the underlying source, None at its end.
    fn fill(&mut self) -> io::Result<Option<u8>> {
        match &mut self.inner {
            SourceInner::Text { bytes, pos } => {
                if *pos < bytes.len() {
                    let b = bytes[*pos];
                    *pos += 1;
                    Ok(Some(b))
                } else {
                    Ok(None)
                }
            }
            SourceInner::File { reader } => {
                let mut buf = [0u8; 1];
                match reader.read(&mut buf)? {
                    0 => Ok(None),
                    _ => Ok(Some(buf[0])),
                }
            }
            SourceInner::Stdin { handle } => {
                let mut buf = [0u8; 1];
                match handle.read(&mut buf)? {
                    0 => Ok(None),
                    _ => Ok(Some(buf[0])),
                }
            }
        }
    }
}

/// A stack of character sources. Reading always pulls from the top;
/// exhausting a source pops it (dropping the handle closes a file) and
/// resumes the source beneath. Pushing a file on top of whatever is being
/// read gives `load` the semantics of textual inclusion at the call site.
pub struct PortStack {
    stack: Vec<Source>,
}

impl PortStack {
    pub fn new() -> Self {
        PortStack { stack: Vec::new() }
    }

    /// Push an in-memory text source on top of the stack.
    pub fn push_text(&mut self, text: &str) {
        self.stack.push(Source {
            inner: SourceInner::Text {
                bytes: text.as_bytes().to_vec(),
                pos: 0,
            },
            pending: None,
        });
    }

    /// Open a file and push it on top of the stack.
    pub fn push_file(&mut self, path: impl AsRef<Path>) -> LispResult<()> {
        let file = File::open(path)?;
        self.stack.push(Source {
            inner: SourceInner::File {
                reader: BufReader::new(file),
            },
            pending: None,
        });
        Ok(())
    }

    /// Push the process's stdin on top of the stack.
    pub fn push_stdin(&mut self) {
        self.stack.push(Source {
            inner: SourceInner::Stdin {
                handle: io::stdin(),
            },
            pending: None,
        });
    }

    /// Look at the next byte without consuming it. Exhausted sources are
    /// popped on the way; Ok(None) means every source has run dry.
    pub fn peek(&mut self) -> LispResult<Option<u8>> {
        loop {
            let Some(src) = self.stack.last_mut() else {
                return Ok(None);
            };
            if let Some(b) = src.pending {
                return Ok(Some(b));
            }
            match src.fill()? {
                Some(b) => {
                    src.pending = Some(b);
                    return Ok(Some(b));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    /// Consume and return the next byte, falling through exhausted sources.
    pub fn next(&mut self) -> LispResult<Option<u8>> {
        let b = self.peek()?;
        if b.is_some() {
            if let Some(src) = self.stack.last_mut() {
                src.pending = None;
            }
        }
        Ok(b)
    }

    /// Number of sources currently stacked.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for PortStack {
    fn default() -> Self {
        PortStack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn text_source_peek_then_next() {
        let mut ports = PortStack::new();
        ports.push_text("ab");
        assert_eq!(ports.peek().unwrap(), Some(b'a'));
        assert_eq!(ports.peek().unwrap(), Some(b'a'));
        assert_eq!(ports.next().unwrap(), Some(b'a'));
        assert_eq!(ports.next().unwrap(), Some(b'b'));
        assert_eq!(ports.next().unwrap(), None);
    }

    #[test]
    fn exhausted_source_falls_through() {
        let mut ports = PortStack::new();
        ports.push_text("under");
        ports.push_text("top");
        let mut out = Vec::new();
        while let Some(b) = ports.next().unwrap() {
            out.push(b);
        }
        assert_eq!(out, b"topunder");
        assert_eq!(ports.depth(), 0);
    }

    #[test]
    fn file_source_reads_and_pops() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "xy").unwrap();
        let mut ports = PortStack::new();
        ports.push_text("z");
        ports.push_file(tmp.path()).unwrap();
        assert_eq!(ports.next().unwrap(), Some(b'x'));
        assert_eq!(ports.next().unwrap(), Some(b'y'));
        // File exhausted: reading resumes from the source beneath.
        assert_eq!(ports.next().unwrap(), Some(b'z'));
        assert_eq!(ports.next().unwrap(), None);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut ports = PortStack::new();
        assert!(ports.push_file("/no/such/file/anywhere").is_err());
    }
}
