//! Parsers for the text GAMS tools print: `gdxdump` symbol tables and CSV
//! dumps, and the model status lines of listing files.
use std::io::Read;

use crate::dataset::{Dataset, SymbolKind, VariableRecord};
use crate::error::SolveError;
use crate::key::Key;
use crate::solvers::Status;
use crate::util::parse_number;

/// One row of `gdxdump <file> symbols`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    /// symbol name
    pub name: String,
    /// dimension
    pub dim: usize,
    /// type as printed: `Set`, `Par`, `Var`, `Equ` or `Alias`
    pub kind: String,
}

impl SymbolEntry {
    /// Whether the symbol is a variable
    pub fn is_variable(&self) -> bool {
        self.kind.eq_ignore_ascii_case("Var")
    }
}

/// Parse the symbol table printed by `gdxdump <file> symbols`.
///
/// Rows start with the symbol number; the header and any other line are skipped.
pub fn parse_symbol_list(text: &str) -> Vec<SymbolEntry> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            fields.next()?.parse::<usize>().ok()?;
            let name = fields.next()?.to_string();
            let dim = fields.next()?.parse().ok()?;
            let kind = fields.next()?.to_string();
            Some(SymbolEntry { name, dim, kind })
        })
        .collect()
}

/// Column positions in a variable dump
struct Columns {
    dim: usize,
    level: usize,
    marginal: Option<usize>,
    lower: usize,
    upper: usize,
    scale: Option<usize>,
}

impl Columns {
    fn from_header(header: &csv::StringRecord) -> Result<Columns, SolveError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|column| column.trim().eq_ignore_ascii_case(name))
        };
        let missing =
            |name: &str| SolveError::MalformedOutput(format!("no '{}' column in variable dump", name));
        let level = find("Level").ok_or_else(|| missing("Level"))?;
        Ok(Columns {
            dim: level,
            level,
            marginal: find("Marginal"),
            lower: find("Lower").ok_or_else(|| missing("Lower"))?,
            upper: find("Upper").ok_or_else(|| missing("Upper"))?,
            scale: find("Scale"),
        })
    }
}

/// Read the output of `gdxdump <file> symb=<name> format=csv CSVAllFields`
/// and add the variable to `dataset`.
///
/// The key labels come first, followed by the `Level`, `Marginal`, `Lower`,
/// `Upper` and `Scale` columns. An empty dump declares a variable with no
/// records and dimension `dim`.
pub fn read_variable_csv<R: Read>(
    dataset: &mut Dataset,
    name: &str,
    dim: usize,
    reader: R,
) -> Result<(), SolveError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);
    let header = csv_reader
        .headers()
        .map_err(|e| SolveError::MalformedOutput(format!("variable {}: {}", name, e)))?
        .clone();
    let columns = if header.is_empty() {
        None
    } else {
        let columns = Columns::from_header(&header)?;
        if columns.dim != dim {
            return Err(SolveError::MalformedOutput(format!(
                "variable {} has dimension {} but its dump has {} key columns",
                name, dim, columns.dim
            )));
        }
        Some(columns)
    };
    let symbol = dataset
        .declare(name, SymbolKind::Variable, dim)
        .map_err(|e| SolveError::MalformedOutput(e.to_string()))?;
    let columns = match columns {
        Some(c) => c,
        None => return Ok(()),
    };
    for row in csv_reader.records() {
        let row = row.map_err(|e| SolveError::MalformedOutput(format!("variable {}: {}", name, e)))?;
        let number = |idx: usize| -> Result<f64, SolveError> {
            let field = row.get(idx).unwrap_or("");
            parse_number(field).ok_or_else(|| {
                SolveError::MalformedOutput(format!("variable {}: bad number {:?}", name, field))
            })
        };
        let optional = |idx: Option<usize>, default: f64| idx.map_or(Ok(default), |i| number(i));
        let record = VariableRecord {
            level: number(columns.level)?,
            marginal: optional(columns.marginal, 0.0)?,
            lower: number(columns.lower)?,
            upper: number(columns.upper)?,
            scale: optional(columns.scale, 1.0)?,
        };
        let key = Key::new(row.iter().take(columns.dim));
        symbol
            .add_variable_record(key, record)
            .map_err(|e| SolveError::MalformedOutput(e.to_string()))?;
    }
    Ok(())
}

/// Find the status of the last solve in a listing file.
///
/// GAMS reports it in a line like `**** MODEL STATUS      1 Optimal`.
pub fn parse_model_status(listing: &str) -> Option<Status> {
    listing
        .lines()
        .filter_map(|line| {
            let rest = line.trim_start().strip_prefix("**** MODEL STATUS")?;
            let code = rest.split_whitespace().next()?.parse().ok()?;
            Status::from_code(code)
        })
        .last()
}
