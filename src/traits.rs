use anyhow::Result;
use serde::Serialize;

use crate::models::SaleRecord;

/// ReportWrite trait provides a method to write one row of a report.
pub trait ReportWrite {
    /// Writes a row to the report.
    ///
    /// # Arguments
    /// * `record` - The row to write, anything Serializable.
    ///
    /// # Returns
    /// A Result indicating success or failure.
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()>;

    /// Writes the column names of a report that has no rows. Formats that
    /// need no header ignore it.
    fn write_header(&mut self, _columns: &[&str]) -> Result<()> {
        Ok(())
    }

    /// Flushes whatever the writer buffered. Called once per report.
    fn finish(&mut self) -> Result<()>;
}

/// ReportExport trait provides a method to export a computed report.
pub trait ReportExport {
    /// Exports every row of the report.
    ///
    /// # Arguments
    /// * `writer` - The writer to send the rows to.
    ///
    /// # Returns
    /// A Result indicating success or failure.
    fn export(&self, writer: &mut impl ReportWrite) -> Result<()>;
}

/// SaleSource trait provides a method to load the sales records.
pub trait SaleSource {
    /// Loads a fresh copy of every sale record.
    ///
    /// # Returns
    /// The records in source order, or the load/parse failure.
    fn load(&self) -> Result<Vec<SaleRecord>>;
}
