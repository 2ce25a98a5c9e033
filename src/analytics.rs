//! Monthly aggregation over a loaded set of sales.
//!
//! Every reducer works on a borrowed slice and keeps no state between calls.
//! Month buckets are visited in chronological order.

use std::{cmp::Reverse, collections::BTreeMap};

use crate::models::{
    MonthKey, MonthlyOrderStats, MonthlyPopularItem, MonthlyRevenueItem, SaleRecord,
};
use rust_decimal::prelude::*;
use tracing::debug;

/// Splits the records into calendar-month buckets. Records inside a bucket
/// keep their source order.
pub fn group_by_month(records: &[SaleRecord]) -> BTreeMap<MonthKey, Vec<&SaleRecord>> {
    let mut buckets: BTreeMap<MonthKey, Vec<&SaleRecord>> = BTreeMap::new();
    for record in records {
        buckets.entry(record.month_key()).or_default().push(record);
    }
    buckets
}

/// Sum of `totalPrice` over every record.
pub fn total_sale(records: &[SaleRecord]) -> Decimal {
    records.iter().map(SaleRecord::total_price).sum()
}

/// Sum of `totalPrice` over the records sold in `year`/`month`, where `month`
/// is one-based. Months outside 1..=12 match nothing.
pub fn monthly_sale(records: &[SaleRecord], year: i32, month: u32) -> Decimal {
    let Some(month0) = month.checked_sub(1) else {
        return Decimal::ZERO;
    };

    records
        .iter()
        .filter(|record| {
            let key = record.month_key();
            key.year() == year && key.month0() == month0
        })
        .map(SaleRecord::total_price)
        .sum()
}

/// The single sale with the largest quantity in each month.
///
/// Ties go to the sale that appears first in the source.
pub fn popular_items(records: &[SaleRecord]) -> Vec<MonthlyPopularItem> {
    group_by_month(records)
        .into_iter()
        .filter_map(|(key, mut sales)| {
            // stable: equal quantities keep source order
            sales.sort_by_key(|sale| Reverse(sale.quantity()));
            sales
                .first()
                .map(|top| MonthlyPopularItem::new(key, top.sku().as_str(), top.quantity()))
        })
        .collect()
}

/// The item with the highest summed revenue in each month.
///
/// An item must strictly beat the running maximum, which starts at zero, so
/// the first item seen wins a tie and a month whose items all earned nothing
/// yields no row.
pub fn revenue_items(records: &[SaleRecord]) -> Vec<MonthlyRevenueItem> {
    group_by_month(records)
        .into_iter()
        .filter_map(|(key, sales)| {
            let winner = top_revenue_item(&sales);
            if winner.is_none() {
                debug!(year = key.year(), month = key.month(), "no revenue winner, skipping month");
            }
            winner.map(|(sku, revenue)| MonthlyRevenueItem::new(key, sku, revenue))
        })
        .collect()
}

fn top_revenue_item<'a>(sales: &[&'a SaleRecord]) -> Option<(&'a str, Decimal)> {
    // discovery order matters for the tie-break
    let mut per_item: Vec<(&'a str, Decimal)> = Vec::new();
    for &sale in sales {
        let sku = sale.sku().as_str();
        match per_item.iter_mut().find(|(seen, _)| *seen == sku) {
            Some((_, revenue)) => *revenue += sale.total_price(),
            None => per_item.push((sku, sale.total_price())),
        }
    }

    let mut best: Option<(&'a str, Decimal)> = None;
    let mut max_revenue = Decimal::ZERO;
    for (sku, revenue) in per_item {
        if revenue > max_revenue {
            max_revenue = revenue;
            best = Some((sku, revenue));
        }
    }
    best
}

/// Min, max and mean quantity per sale of `item` in each month.
///
/// Every month present in the records gets a row, including months where the
/// item was not sold at all.
pub fn order_stats(records: &[SaleRecord], item: &str) -> Vec<MonthlyOrderStats> {
    group_by_month(records)
        .into_iter()
        .map(|(key, sales)| {
            let quantities: Vec<u32> = sales
                .iter()
                .filter(|sale| sale.sku() == item)
                .map(|sale| sale.quantity())
                .collect();
            MonthlyOrderStats::from_quantities(key, &quantities)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn sale(sku: &str, date: &str, quantity: u32, total: Decimal) -> SaleRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let unit = if quantity == 0 {
            total
        } else {
            total / Decimal::from(quantity)
        };
        SaleRecord::new(sku, date, unit, quantity, total)
    }

    fn sample() -> Vec<SaleRecord> {
        vec![
            sale("Cake Fudge", "2019-03-02", 2, dec!(300)),
            sale("Death by Chocolate", "2019-01-01", 5, dec!(900)),
            sale("Cake Fudge", "2019-01-05", 1, dec!(150)),
            sale("Death by Chocolate", "2019-01-20", 3, dec!(540)),
            sale("Almond Fudge", "2019-02-14", 4, dec!(200)),
            sale("Death by Chocolate", "2020-01-07", 1, dec!(180)),
        ]
    }

    #[test]
    fn test_total_sale_sums_every_record() {
        assert_eq!(total_sale(&sample()), dec!(2270));
    }

    #[test]
    fn test_total_sale_of_nothing_is_zero() {
        assert_eq!(total_sale(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_sale_filters_by_year_and_month() {
        let records = sample();
        assert_eq!(monthly_sale(&records, 2019, 1), dec!(1590));
        assert_eq!(monthly_sale(&records, 2019, 2), dec!(200));
        assert_eq!(monthly_sale(&records, 2020, 1), dec!(180));
    }

    #[test]
    fn test_monthly_sale_without_matches_is_zero() {
        let records = sample();
        assert_eq!(monthly_sale(&records, 2019, 7), Decimal::ZERO);
        assert_eq!(monthly_sale(&records, 2018, 1), Decimal::ZERO);
        assert_eq!(monthly_sale(&records, 2019, 0), Decimal::ZERO);
        assert_eq!(monthly_sale(&records, 2019, 13), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_sales_add_up_to_total() {
        let records = sample();
        let by_month: Decimal = group_by_month(&records)
            .keys()
            .map(|key| monthly_sale(&records, key.year(), key.month()))
            .sum();
        assert_eq!(by_month, total_sale(&records));
    }

    #[test]
    fn test_group_by_month_is_chronological_and_stable() {
        let records = sample();
        let buckets = group_by_month(&records);

        let keys: Vec<(i32, u32)> = buckets.keys().map(|k| (k.year(), k.month())).collect();
        assert_eq!(keys, vec![(2019, 1), (2019, 2), (2019, 3), (2020, 1)]);

        let january: Vec<&str> = buckets
            .values()
            .next()
            .unwrap()
            .iter()
            .map(|s| s.sku().as_str())
            .collect();
        assert_eq!(january, vec!["Death by Chocolate", "Cake Fudge", "Death by Chocolate"]);
    }

    #[test]
    fn test_outputs_have_one_row_per_month() {
        let records = sample();
        let months = group_by_month(&records).len();

        let popular = popular_items(&records);
        let unique: HashSet<(i32, u32)> = popular.iter().map(|p| (p.year(), p.month())).collect();
        assert_eq!(popular.len(), months);
        assert_eq!(unique.len(), months);

        assert_eq!(revenue_items(&records).len(), months);
        assert_eq!(order_stats(&records, "Cake Fudge").len(), months);
    }

    #[test]
    fn test_popular_items_picks_largest_quantity() {
        let popular = popular_items(&sample());
        let january = &popular[0];
        assert_eq!((january.year(), january.month()), (2019, 1));
        assert_eq!(january.item(), "Death by Chocolate");
        assert_eq!(january.quantity_sold(), 5);

        let march = &popular[2];
        assert_eq!((march.year(), march.month()), (2019, 3));
        assert_eq!(march.item(), "Cake Fudge");
        assert_eq!(march.quantity_sold(), 2);
    }

    #[test]
    fn test_popular_items_tie_goes_to_first_in_source() {
        let records = vec![
            sale("A", "2019-05-01", 3, dec!(30)),
            sale("B", "2019-05-02", 7, dec!(70)),
            sale("C", "2019-05-03", 7, dec!(70)),
            sale("D", "2019-05-04", 2, dec!(20)),
        ];

        let popular = popular_items(&records);
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].quantity_sold(), 7);
        assert_eq!(popular[0].item(), "B");
        assert_eq!(popular[0].month(), 5);
    }

    #[test]
    fn test_revenue_items_sums_per_item() {
        let revenue = revenue_items(&sample());
        let january = &revenue[0];
        assert_eq!((january.year(), january.month()), (2019, 1));
        assert_eq!(january.item(), "Death by Chocolate");
        assert_eq!(january.revenue(), dec!(1440));
    }

    #[test]
    fn test_revenue_items_tie_goes_to_first_seen() {
        let records = vec![
            sale("A", "2019-06-01", 1, dec!(100)),
            sale("B", "2019-06-02", 1, dec!(150)),
            sale("C", "2019-06-03", 1, dec!(150)),
        ];

        let revenue = revenue_items(&records);
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].item(), "B");
        assert_eq!(revenue[0].revenue(), dec!(150));
    }

    #[test]
    fn test_revenue_items_later_sales_can_overtake() {
        let records = vec![
            sale("A", "2019-06-01", 1, dec!(100)),
            sale("B", "2019-06-02", 1, dec!(150)),
            sale("A", "2019-06-03", 1, dec!(60)),
        ];

        let revenue = revenue_items(&records);
        assert_eq!(revenue[0].item(), "A");
        assert_eq!(revenue[0].revenue(), dec!(160));
    }

    #[test]
    fn test_revenue_items_skips_month_without_earnings() {
        let records = vec![
            sale("Free Sample", "2019-04-01", 3, dec!(0)),
            sale("A", "2019-05-01", 1, dec!(10)),
        ];

        let revenue = revenue_items(&records);
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].month(), 5);
    }

    #[test]
    fn test_order_stats_for_item() {
        let stats = order_stats(&sample(), "Death by Chocolate");
        assert_eq!(stats.len(), 4);

        let january = &stats[0];
        assert_eq!((january.year(), january.month()), (2019, 1));
        assert_eq!(january.min_orders(), 3);
        assert_eq!(january.max_orders(), 5);
        assert_eq!(january.avg_orders(), Some(dec!(4)));

        let last = &stats[3];
        assert_eq!((last.year(), last.month()), (2020, 1));
        assert_eq!(last.avg_orders(), Some(dec!(1)));
    }

    #[test]
    fn test_order_stats_keeps_months_without_the_item() {
        let stats = order_stats(&sample(), "Death by Chocolate");

        let february = &stats[1];
        assert_eq!((february.year(), february.month()), (2019, 2));
        assert_eq!(february.min_orders(), 0);
        assert_eq!(february.max_orders(), 0);
        assert_eq!(february.avg_orders(), None);
    }

    #[test]
    fn test_order_stats_matches_item_exactly() {
        let stats = order_stats(&sample(), "death by chocolate");
        assert!(stats.iter().all(|s| s.avg_orders().is_none()));
    }

    #[test]
    fn test_reducers_on_empty_input() {
        assert!(popular_items(&[]).is_empty());
        assert!(revenue_items(&[]).is_empty());
        assert!(order_stats(&[], "A").is_empty());
    }
}
