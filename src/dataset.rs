//! Named collections of sets, parameters and variables, as exchanged with GAMS
use std::collections::HashMap;

use crate::key::Key;
use crate::util::is_valid_identifier;

/// Level, marginal, bounds and scale of one variable record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableRecord {
    /// current (initial or solved) value
    pub level: f64,
    /// reduced cost
    pub marginal: f64,
    /// -INFINITY if there is no lower bound
    pub lower: f64,
    /// INFINITY if there is no upper bound
    pub upper: f64,
    /// scaling factor
    pub scale: f64,
}

impl VariableRecord {
    /// A record with the given bounds and initial level
    pub fn new(lower: f64, upper: f64, level: f64) -> Self {
        VariableRecord {
            level,
            marginal: 0.0,
            lower,
            upper,
            scale: 1.0,
        }
    }

    /// A record whose bounds and level are all `value`
    pub fn fixed(value: f64) -> Self {
        VariableRecord::new(value, value, value)
    }

    /// Whether the bounds pin the variable to its level
    pub fn is_fixed(&self) -> bool {
        self.lower == self.upper && self.upper == self.level
    }
}

/// Records of a symbol, in insertion order, looked up by key
#[derive(Debug, Clone)]
pub struct Records<T> {
    entries: Vec<(Key, T)>,
    index: HashMap<Vec<String>, usize>,
}

impl<T> Default for Records<T> {
    fn default() -> Self {
        Records {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Records<T> {
    /// Append a record. Returns the rejected key if it is already present.
    pub fn insert(&mut self, key: Key, value: T) -> Result<(), Key> {
        let folded = key.folded();
        if self.index.contains_key(&folded) {
            return Err(key);
        }
        self.index.insert(folded, self.entries.len());
        self.entries.push((key, value));
        Ok(())
    }

    /// Find the record for `key`; labels match case-insensitively
    pub fn get(&self, key: &Key) -> Option<&T> {
        self.index
            .get(&key.folded())
            .map(|&idx| &self.entries[idx].1)
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &T)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no records
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The records of a symbol, by symbol type
#[derive(Debug, Clone)]
pub enum SymbolData {
    /// set elements
    Set(Records<()>),
    /// numeric values
    Parameter(Records<f64>),
    /// variable levels and bounds
    Variable(Records<VariableRecord>),
}

/// The type of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// set
    Set,
    /// parameter
    Parameter,
    /// variable
    Variable,
}

impl SymbolKind {
    /// Keyword that declares a symbol of this kind in GAMS
    pub fn keyword(self) -> &'static str {
        match self {
            SymbolKind::Set => "Set",
            SymbolKind::Parameter => "Parameter",
            SymbolKind::Variable => "Variable",
        }
    }
}

/// A named collection of records sharing one dimension
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    dim: usize,
    data: SymbolData,
}

impl Symbol {
    /// Symbol name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of labels in each key
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Symbol type
    pub fn kind(&self) -> SymbolKind {
        match self.data {
            SymbolData::Set(_) => SymbolKind::Set,
            SymbolData::Parameter(_) => SymbolKind::Parameter,
            SymbolData::Variable(_) => SymbolKind::Variable,
        }
    }

    /// All records
    pub fn data(&self) -> &SymbolData {
        &self.data
    }

    /// Number of records
    pub fn len(&self) -> usize {
        match &self.data {
            SymbolData::Set(r) => r.len(),
            SymbolData::Parameter(r) => r.len(),
            SymbolData::Variable(r) => r.len(),
        }
    }

    /// Whether the symbol has no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The records if this is a variable
    pub fn as_variable(&self) -> Option<&Records<VariableRecord>> {
        match &self.data {
            SymbolData::Variable(r) => Some(r),
            _ => None,
        }
    }

    /// The values if this is a parameter
    pub fn as_parameter(&self) -> Option<&Records<f64>> {
        match &self.data {
            SymbolData::Parameter(r) => Some(r),
            _ => None,
        }
    }

    /// The elements if this is a set
    pub fn as_set(&self) -> Option<&Records<()>> {
        match &self.data {
            SymbolData::Set(r) => Some(r),
            _ => None,
        }
    }

    fn check_dim(&self, key: &Key) -> Result<(), DatasetError> {
        if key.dim() != self.dim {
            return Err(DatasetError::Dimension {
                symbol: self.name.clone(),
                expected: self.dim,
                key: key.clone(),
            });
        }
        key.validate().map_err(|reason| DatasetError::Label {
            symbol: self.name.clone(),
            reason,
        })
    }

    fn check_kind(&self, expected: SymbolKind) -> Result<(), DatasetError> {
        if self.kind() == expected {
            Ok(())
        } else {
            Err(DatasetError::WrongKind {
                symbol: self.name.clone(),
                expected,
                found: self.kind(),
            })
        }
    }

    /// Add a set element
    pub fn add_element(&mut self, key: Key) -> Result<(), DatasetError> {
        self.check_kind(SymbolKind::Set)?;
        self.check_dim(&key)?;
        match &mut self.data {
            SymbolData::Set(r) => insert_record(&self.name, r, key, ()),
            _ => Ok(()),
        }
    }

    /// Add a parameter value
    pub fn add_value(&mut self, key: Key, value: f64) -> Result<(), DatasetError> {
        self.check_kind(SymbolKind::Parameter)?;
        self.check_dim(&key)?;
        match &mut self.data {
            SymbolData::Parameter(r) => insert_record(&self.name, r, key, value),
            _ => Ok(()),
        }
    }

    /// Add a variable record
    pub fn add_variable_record(
        &mut self,
        key: Key,
        record: VariableRecord,
    ) -> Result<(), DatasetError> {
        self.check_kind(SymbolKind::Variable)?;
        self.check_dim(&key)?;
        match &mut self.data {
            SymbolData::Variable(r) => insert_record(&self.name, r, key, record),
            _ => Ok(()),
        }
    }
}

fn insert_record<T>(
    symbol: &str,
    records: &mut Records<T>,
    key: Key,
    value: T,
) -> Result<(), DatasetError> {
    records
        .insert(key, value)
        .map_err(|key| DatasetError::DuplicateRecord {
            symbol: symbol.to_string(),
            key,
        })
}

/// Errors raised while filling a dataset
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// the name is not a GAMS identifier
    #[error("'{0}' is not a valid GAMS identifier")]
    InvalidName(String),
    /// a symbol of that name exists already
    #[error("symbol '{0}' is already declared")]
    DuplicateSymbol(String),
    /// the key width differs from the symbol dimension
    #[error("key {key} of '{symbol}' should have {expected} labels")]
    Dimension {
        /// symbol name
        symbol: String,
        /// symbol dimension
        expected: usize,
        /// offending key
        key: Key,
    },
    /// the key contains a label GAMS cannot represent
    #[error("bad label in '{symbol}': {reason}")]
    Label {
        /// symbol name
        symbol: String,
        /// what is wrong
        reason: String,
    },
    /// two records share a key
    #[error("'{symbol}' already has a record {key}")]
    DuplicateRecord {
        /// symbol name
        symbol: String,
        /// repeated key
        key: Key,
    },
    /// a record of the wrong type was added
    #[error("'{symbol}' is a {found:?}, not a {expected:?}")]
    WrongKind {
        /// symbol name
        symbol: String,
        /// type the record belongs to
        expected: SymbolKind,
        /// type of the symbol
        found: SymbolKind,
    },
}

/// A named, ordered collection of symbols
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// An empty dataset
    pub fn new(name: impl Into<String>) -> Dataset {
        Dataset {
            name: name.into(),
            symbols: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Dataset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a new empty symbol and return it for filling.
    /// Names are compared case-insensitively.
    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        dim: usize,
    ) -> Result<&mut Symbol, DatasetError> {
        if !is_valid_identifier(name) {
            return Err(DatasetError::InvalidName(name.to_string()));
        }
        let folded = name.to_ascii_lowercase();
        if self.index.contains_key(&folded) {
            return Err(DatasetError::DuplicateSymbol(name.to_string()));
        }
        let data = match kind {
            SymbolKind::Set => SymbolData::Set(Records::default()),
            SymbolKind::Parameter => SymbolData::Parameter(Records::default()),
            SymbolKind::Variable => SymbolData::Variable(Records::default()),
        };
        let idx = self.symbols.len();
        self.index.insert(folded, idx);
        self.symbols.push(Symbol {
            name: name.to_string(),
            dim,
            data,
        });
        Ok(&mut self.symbols[idx])
    }

    /// Whether a symbol of that name exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Look up a symbol by name
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&idx| &self.symbols[idx])
    }

    /// Look up a variable by name
    pub fn variable(&self, name: &str) -> Option<&Records<VariableRecord>> {
        self.get(name).and_then(Symbol::as_variable)
    }

    /// Symbols in declaration order
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the dataset has no symbols
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Remove a symbol that was declared but could not be filled
    pub(crate) fn undeclare(&mut self, name: &str) {
        if let Some(idx) = self.index.remove(&name.to_ascii_lowercase()) {
            self.symbols.remove(idx);
            for slot in self.index.values_mut() {
                if *slot > idx {
                    *slot -= 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_names_are_case_insensitive() {
        let mut ds = Dataset::new("data");
        ds.declare("Cost", SymbolKind::Parameter, 1).unwrap();
        assert_eq!(
            ds.declare("cost", SymbolKind::Set, 1).unwrap_err(),
            DatasetError::DuplicateSymbol("cost".to_string())
        );
        assert_eq!(ds.get("COST").unwrap().name(), "Cost");
    }

    #[test]
    fn rejects_records_of_another_width() {
        let mut ds = Dataset::new("data");
        let set = ds.declare("ij", SymbolKind::Set, 2).unwrap();
        set.add_element(Key::from(["a", "x"])).unwrap();
        assert!(matches!(
            set.add_element(Key::from("b")),
            Err(DatasetError::Dimension { expected: 2, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let mut ds = Dataset::new("data");
        let p = ds.declare("p", SymbolKind::Parameter, 1).unwrap();
        p.add_value("a".into(), 1.).unwrap();
        assert!(matches!(
            p.add_value("A".into(), 2.),
            Err(DatasetError::DuplicateRecord { .. })
        ));
        assert_eq!(p.as_parameter().unwrap().get(&"a".into()), Some(&1.));
    }

    #[test]
    fn rejects_records_of_another_kind() {
        let mut ds = Dataset::new("data");
        let s = ds.declare("s", SymbolKind::Set, 1).unwrap();
        assert!(matches!(
            s.add_value("a".into(), 1.),
            Err(DatasetError::WrongKind { found: SymbolKind::Set, .. })
        ));
    }

    #[test]
    fn undeclare_keeps_lookup_consistent() {
        let mut ds = Dataset::new("data");
        ds.declare("a", SymbolKind::Set, 1).unwrap();
        ds.declare("b", SymbolKind::Set, 1).unwrap();
        ds.declare("c", SymbolKind::Set, 1).unwrap();
        ds.undeclare("b");
        assert!(!ds.contains("b"));
        assert_eq!(ds.get("c").unwrap().name(), "c");
        let names: Vec<_> = ds.symbols().map(Symbol::name).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn recognizes_fixed_records() {
        assert!(VariableRecord::fixed(3.).is_fixed());
        assert!(!VariableRecord::new(0., 3., 3.).is_fixed());
    }
}
