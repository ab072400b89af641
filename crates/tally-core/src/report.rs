//! # Reconciliation Report
//!
//! Per-product discrepancy lines and store-wide totals.
//!
//! ```text
//! name            storefront  warehouse(ctn)  registered  discrepancy
//! Marlboro Gold           15               3          50            5  shortage
//! Esse Change              0               0           0            0  balanced
//! ─────────────────────────────────────────────────────────────────────
//! 2 products · 1 balanced · 1 shortage · 0 overage · net +5
//! ```

use serde::Serialize;

use crate::product::{DiscrepancyStatus, Product, ProductId};

/// One row of the reconciliation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub id: ProductId,
    pub name: String,
    pub storefront_units: u32,
    pub warehouse_cartons: u32,
    pub registered_units: u32,
    pub discrepancy: i64,
    pub status: DiscrepancyStatus,
}

impl From<&Product> for ReportLine {
    fn from(p: &Product) -> Self {
        ReportLine {
            id: p.id(),
            name: p.name().to_string(),
            storefront_units: p.storefront_units(),
            warehouse_cartons: p.warehouse_cartons(),
            registered_units: p.registered_units(),
            discrepancy: p.discrepancy(),
            status: p.discrepancy_status(),
        }
    }
}

/// Store-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub product_count: usize,
    pub balanced: usize,
    pub shortages: usize,
    pub overages: usize,
    pub storefront_units: u64,
    pub warehouse_units: u64,
    pub registered_units: u64,
    /// Sum of every product's discrepancy.
    pub net_discrepancy: i64,
}

impl InventorySummary {
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a Product>,
    {
        products
            .into_iter()
            .fold(InventorySummary::default(), |mut acc, p| {
                acc.product_count += 1;
                match p.discrepancy_status() {
                    DiscrepancyStatus::Balanced => acc.balanced += 1,
                    DiscrepancyStatus::Shortage => acc.shortages += 1,
                    DiscrepancyStatus::Overage => acc.overages += 1,
                }
                acc.storefront_units += u64::from(p.storefront_units());
                acc.warehouse_units += u64::from(p.warehouse_units());
                acc.registered_units += u64::from(p.registered_units());
                acc.net_discrepancy += p.discrepancy();
                acc
            })
    }

    /// True when no product has a discrepancy.
    pub fn is_reconciled(&self) -> bool {
        self.shortages == 0 && self.overages == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_statuses() {
        let mut short = Product::new("A".to_string(), "1".to_string(), 1);
        short.set_registered_units(50);
        short.set_storefront_units(15);
        short.set_warehouse_cartons(3);

        let mut over = Product::new("B".to_string(), "2".to_string(), 2);
        over.set_storefront_units(4);

        let even = Product::new("C".to_string(), "3".to_string(), 3);

        let summary = InventorySummary::from_products([&short, &over, &even]);
        assert_eq!(summary.product_count, 3);
        assert_eq!(summary.balanced, 1);
        assert_eq!(summary.shortages, 1);
        assert_eq!(summary.overages, 1);
        assert_eq!(summary.warehouse_units, 30);
        assert_eq!(summary.net_discrepancy, 5 - 4);
        assert!(!summary.is_reconciled());
    }

    #[test]
    fn test_empty_summary_is_reconciled() {
        let summary = InventorySummary::from_products(std::iter::empty::<&Product>());
        assert_eq!(summary, InventorySummary::default());
        assert!(summary.is_reconciled());
    }

    #[test]
    fn test_report_line_uses_cartons() {
        let mut p = Product::new("Esse Change".to_string(), "8801116034192".to_string(), 1);
        p.set_warehouse_cartons(7);
        let line = ReportLine::from(&p);
        assert_eq!(line.warehouse_cartons, 7);
        assert_eq!(line.discrepancy, -70);
        assert_eq!(line.status, DiscrepancyStatus::Overage);
    }
}
