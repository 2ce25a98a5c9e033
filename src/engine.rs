use crate::{
    analytics,
    models::{
        MonthlyOrderStats, MonthlyPopularItem, MonthlyRevenueItem, MonthlySaleTotal, SaleRecord,
        SaleTotal,
    },
    traits::{ReportExport, ReportWrite, SaleSource},
};
use anyhow::Result;
use serde::Serialize;
use tracing::info;

/// One analytics question asked of the sales store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Total,
    Monthly { year: i32, month: u32 },
    Popular,
    Revenue,
    OrderStats { item: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Total(SaleTotal),
    Monthly(MonthlySaleTotal),
    Popular(Vec<MonthlyPopularItem>),
    Revenue(Vec<MonthlyRevenueItem>),
    OrderStats(Vec<MonthlyOrderStats>),
}

impl QueryOutcome {
    pub fn compute(query: &Query, records: &[SaleRecord]) -> Self {
        match query {
            Query::Total => QueryOutcome::Total(SaleTotal::new(analytics::total_sale(records))),
            Query::Monthly { year, month } => QueryOutcome::Monthly(MonthlySaleTotal::new(
                *year,
                *month,
                analytics::monthly_sale(records, *year, *month),
            )),
            Query::Popular => QueryOutcome::Popular(analytics::popular_items(records)),
            Query::Revenue => QueryOutcome::Revenue(analytics::revenue_items(records)),
            Query::OrderStats { item } => {
                QueryOutcome::OrderStats(analytics::order_stats(records, item))
            }
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            QueryOutcome::Total(_) | QueryOutcome::Monthly(_) => 1,
            QueryOutcome::Popular(rows) => rows.len(),
            QueryOutcome::Revenue(rows) => rows.len(),
            QueryOutcome::OrderStats(rows) => rows.len(),
        }
    }
}

impl ReportExport for QueryOutcome {
    fn export(&self, writer: &mut impl ReportWrite) -> Result<()> {
        match self {
            QueryOutcome::Total(total) => writer.write_record(total)?,
            QueryOutcome::Monthly(total) => writer.write_record(total)?,
            QueryOutcome::Popular(rows) => {
                export_rows(writer, rows, &MonthlyPopularItem::COLUMNS)?
            }
            QueryOutcome::Revenue(rows) => {
                export_rows(writer, rows, &MonthlyRevenueItem::COLUMNS)?
            }
            QueryOutcome::OrderStats(rows) => {
                export_rows(writer, rows, &MonthlyOrderStats::COLUMNS)?
            }
        }
        Ok(())
    }
}

fn export_rows<T: Serialize>(
    writer: &mut impl ReportWrite,
    rows: &[T],
    columns: &[&str],
) -> Result<()> {
    if rows.is_empty() {
        return writer.write_header(columns);
    }
    for row in rows {
        writer.write_record(row)?;
    }
    Ok(())
}

pub struct Engine<W, S> {
    writer: W,
    source: S,
}

impl<W, S> Engine<W, S>
where
    W: ReportWrite,
    S: SaleSource,
{
    pub fn new(writer: W, source: S) -> Self {
        Self { writer, source }
    }

    /// Loads a fresh copy of the store, answers `query` and writes the report.
    /// Nothing is written if loading fails.
    pub fn run(&mut self, query: &Query) -> Result<QueryOutcome> {
        let records = self.source.load()?;
        let outcome = QueryOutcome::compute(query, &records);

        info!(
            ?query,
            records = records.len(),
            rows = outcome.rows(),
            "answered sales query"
        );

        outcome.export(&mut self.writer)?;
        self.writer.finish()?;

        Ok(outcome)
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.writer
    }
}
