use crate::traits::ReportWrite;
use anyhow::Result;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Stdout, Write};

pub struct CsvReportWriter<W: Write> {
    writer: Writer<W>,
}

impl CsvReportWriter<Stdout> {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }
}

impl<W: Write> CsvReportWriter<W> {
    pub fn from_writer(out: W) -> Self {
        CsvReportWriter {
            writer: WriterBuilder::new().from_writer(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> Result<W> {
        Ok(self.writer.into_inner().map_err(|err| err.into_error())?)
    }
}

impl<W: Write> ReportWrite for CsvReportWriter<W> {
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        Ok(self.writer.serialize(record)?)
    }

    fn write_header(&mut self, columns: &[&str]) -> Result<()> {
        Ok(self.writer.write_record(columns)?)
    }

    fn finish(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }
}

/// Collects rows and prints them as one pretty JSON array on `finish`.
pub struct JsonReportWriter<W: Write> {
    out: W,
    rows: Vec<Value>,
}

impl JsonReportWriter<Stdout> {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }
}

impl<W: Write> JsonReportWriter<W> {
    pub fn from_writer(out: W) -> Self {
        JsonReportWriter {
            out,
            rows: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportWrite for JsonReportWriter<W> {
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        self.rows.push(serde_json::to_value(record)?);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, &self.rows)?;
        writeln!(self.out)?;
        self.rows.clear();
        Ok(self.out.flush()?)
    }
}
