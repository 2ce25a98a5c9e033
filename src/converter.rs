//! Turns a comma-delimited sales export into the JSON sales store.
//!
//! Header names are compacted to camelCase (`Unit Price` becomes `unitPrice`)
//! and every value that reads as a finite number is stored as a JSON number.

use std::{
    fs::{self, File},
    io::{BufReader, Read, Write},
    path::Path,
};

use crate::errors::StoreError;
use anyhow::Result;
use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Number, Value};
use tracing::info;

/// Drops every whitespace character and lowercases the first letter.
pub fn camel_case_header(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut chars = compact.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Integers stay integers, other finite numbers become floats and
/// everything else is kept as text.
pub fn coerce_value(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    match raw.parse::<f64>() {
        Ok(float) if float.is_finite() => Number::from_f64(float)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

/// Converts delimited text read from `reader` and writes the JSON array to
/// `writer`. Returns the number of rows converted.
///
/// Rows shorter than the header simply omit the trailing keys; extra
/// trailing values are ignored.
pub fn convert<R: Read, W: Write>(reader: R, writer: W) -> Result<usize, StoreError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(camel_case_header).collect();
    if headers.iter().all(String::is_empty) {
        return Err(StoreError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let entry: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.clone(), coerce_value(value)))
            .collect();
        rows.push(Value::Object(entry));
    }

    serde_json::to_writer(writer, &rows).map_err(StoreError::Encode)?;
    Ok(rows.len())
}

/// File-to-file wrapper around [`convert`]. The output file is only
/// touched once the whole input converted cleanly.
pub fn convert_file(input: &Path, output: &Path) -> Result<usize> {
    let source = File::open(input).map_err(|source| StoreError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let mut converted = Vec::new();
    let rows = convert(BufReader::new(source), &mut converted)?;
    fs::write(output, &converted).map_err(|source| StoreError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    info!(
        input = %input.display(),
        output = %output.display(),
        rows,
        "converted delimited sales data"
    );
    Ok(rows)
}
