//! Write datasets as GAMS source, so that GAMS can compile them to GDX
//!
use std::fmt;
use std::fmt::Formatter;
use std::io::prelude::*;
use std::io::Result;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::dataset::{Dataset, Symbol, SymbolData};
use crate::key::Key;
use crate::util::format_number;

/// Implemented by types that can be written as GAMS source
pub trait WriteToGmsFormat {
    /// Write the object to the given formatter as GAMS statements
    fn to_gms_format(&self, f: &mut Formatter) -> fmt::Result;

    /// Return an object whose [fmt::Display] implementation is the GAMS source
    fn display_gms(&self) -> DisplayedGms<'_, Self>
    where
        Self: Sized,
    {
        DisplayedGms(self)
    }
}

impl<'a, T: WriteToGmsFormat> WriteToGmsFormat for &'a T {
    fn to_gms_format(&self, f: &mut Formatter) -> fmt::Result {
        (*self).to_gms_format(f)
    }
}

/// An object whose `Display` implementation outputs GAMS source
pub struct DisplayedGms<'a, T>(&'a T);

impl<'a, T: WriteToGmsFormat> fmt::Display for DisplayedGms<'a, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.to_gms_format(f)
    }
}

impl WriteToGmsFormat for Symbol {
    fn to_gms_format(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {}", self.kind().keyword(), self.name())?;
        if self.dim() > 0 {
            let domain = vec!["*"; self.dim()].join(",");
            write!(f, "({})", domain)?;
        }
        if self.is_empty() {
            return writeln!(f, ";");
        }
        writeln!(f, " /")?;
        match self.data() {
            SymbolData::Set(records) => {
                for key in records.keys() {
                    writeln!(f, "  {}", key)?;
                }
            }
            SymbolData::Parameter(records) => {
                for (key, value) in records.iter() {
                    write!(f, "  ")?;
                    if key.dim() > 0 {
                        write!(f, "{} ", key)?;
                    }
                    writeln!(f, "{}", format_number(*value))?;
                }
            }
            SymbolData::Variable(records) => {
                for (key, record) in records.iter() {
                    write_attribute(f, key, "lo", record.lower)?;
                    write_attribute(f, key, "up", record.upper)?;
                    write_attribute(f, key, "l", record.level)?;
                }
            }
        }
        writeln!(f, "/;")
    }
}

fn write_attribute(f: &mut Formatter, key: &Key, attribute: &str, value: f64) -> fmt::Result {
    if key.dim() > 0 {
        writeln!(f, "  {}.{} {}", key, attribute, format_number(value))
    } else {
        writeln!(f, "  {} {}", attribute, format_number(value))
    }
}

impl WriteToGmsFormat for Dataset {
    fn to_gms_format(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "* {}", self.name())?;
        writeln!(f, "$offListing")?;
        for symbol in self.symbols() {
            writeln!(f)?;
            symbol.to_gms_format(f)?;
        }
        Ok(())
    }
}

impl Dataset {
    /// Write the dataset to a temporary `.gms` file in `dir`
    pub fn to_tmp_file(&self, dir: &Path) -> Result<NamedTempFile> {
        let mut f = tempfile::Builder::new()
            .prefix(self.name())
            .suffix(".gms")
            .tempfile_in(dir)?;
        write!(f, "{}", self.display_gms())?;
        f.flush()?;
        Ok(f)
    }

    /// Write the dataset to `path` as GAMS source
    pub fn to_gms_file(&self, path: &Path) -> Result<()> {
        let mut f = std::fs::File::create(path)?;
        write!(f, "{}", self.display_gms())?;
        f.flush()
    }
}
