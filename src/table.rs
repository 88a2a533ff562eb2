//! Tabular input: a header row plus field-named records, kept in file order.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{ConvertError, ConvertResult};

/// One input row. Values are raw strings, addressed by header position.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    headers: Rc<[String]>,
    values: Vec<String>,
}

impl Record {
    /// Value at a header position obtained from [`Table::column_positions`].
    pub fn value(&self, position: usize) -> &str {
        &self.values[position]
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        let position = self.headers.iter().position(|h| h == column)?;
        Some(self.value(position))
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    origin: PathBuf,
    headers: Rc<[String]>,
    records: Vec<Record>,
}

impl Table {
    pub fn open(path: &Path) -> ConvertResult<Table> {
        let file = File::open(path).map_err(|e| ConvertError::file_access(path, e))?;
        Table::from_reader(file, path)
    }

    /// Read a table from any reader. `origin` is only used to name the source
    /// in errors.
    pub fn from_reader<R: Read>(reader: R, origin: impl Into<PathBuf>) -> ConvertResult<Table> {
        let origin = origin.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let header_record = reader
            .headers()
            .map_err(|e| ConvertError::from_csv(&origin, e))?
            .clone();
        if header_record.is_empty() {
            return Err(ConvertError::parse(&origin, "missing header row"));
        }

        let mut seen = HashSet::new();
        for name in header_record.iter() {
            if !seen.insert(name) {
                return Err(ConvertError::parse(
                    &origin,
                    format!("duplicate column {:?} in header", name),
                ));
            }
        }
        let headers: Rc<[String]> = header_record.iter().map(str::to_string).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|e| ConvertError::from_csv(&origin, e))?;
            records.push(Record {
                headers: Rc::clone(&headers),
                values: row.iter().map(str::to_string).collect(),
            });
        }

        Ok(Table {
            origin,
            headers,
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve column names to header positions, failing on the first name
    /// the header does not contain.
    pub fn column_positions(&self, columns: &[String]) -> ConvertResult<Vec<usize>> {
        columns
            .iter()
            .map(|column| {
                self.headers
                    .iter()
                    .position(|h| h == column)
                    .ok_or_else(|| {
                        ConvertError::parse(
                            &self.origin,
                            format!("column {:?} not found in header", column),
                        )
                    })
            })
            .collect()
    }
}
