use std::collections::HashMap;

use crate::value::SymbolId;

/// Interned symbol table. Each unique name maps to a unique SymbolId, so
/// symbol equality is id equality rather than text comparison. The table
/// is append-only and lives as long as its interpreter.
pub struct SymbolTable {
    name_to_id: HashMap<String, SymbolId>,
    id_to_name: Vec<String>,
}

/// Well-known symbol ids, pre-interned at startup.
/// These must match the order of interning in SymbolTable::new().
pub mod sym {
    use crate::value::SymbolId;

    pub const QUOTE: SymbolId = SymbolId(0);
    pub const IF: SymbolId = SymbolId(1);
    pub const DEF: SymbolId = SymbolId(2);
    pub const SET: SymbolId = SymbolId(3);
    pub const FN: SymbolId = SymbolId(4);
    pub const TRUE: SymbolId = SymbolId(5);
    pub const FALSE: SymbolId = SymbolId(6);
    pub const PLUS: SymbolId = SymbolId(7);
    pub const LOAD: SymbolId = SymbolId(8);
}

impl SymbolTable {
    /// Create a new table with the special-form keywords and bootstrap
    /// names pre-interned. The order MUST match the `sym` module above.
    pub fn new() -> Self {
        let names = ["quote", "if", "def", "set!", "fn", "true", "false", "+", "load"];

        let mut name_to_id = HashMap::new();
        let mut id_to_name = Vec::new();

        for (i, name) in names.iter().enumerate() {
            let id = SymbolId(i as u32);
            name_to_id.insert(name.to_string(), id);
            id_to_name.push(name.to_string());
        }

        SymbolTable {
            name_to_id,
            id_to_name,
        }
    }

    /// Intern a symbol name. Returns the existing id if already interned,
    /// or creates a new one.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = SymbolId(self.id_to_name.len() as u32);
        self.name_to_id.insert(name.to_string(), id);
        self.id_to_name.push(name.to_string());
        id
    }

    /// Look up a symbol name by its id.
    pub fn name(&self, id: SymbolId) -> &str {
        &self.id_to_name[id.0 as usize]
    }

    /// Look up a symbol id by name, without interning.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.name_to_id.get(name).copied()
    }

    /// Total number of interned symbols.
    pub fn count(&self) -> usize {
        self.id_to_name.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
