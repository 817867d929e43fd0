//! Statistics page and dashboard figures.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::Ledger;
use crate::domain::aggregates::{OrderStatus, Product, Sale};
use crate::domain::value_objects::Money;

pub const TOP_PRODUCTS: usize = 5;
pub const RECENT_SALES: usize = 5;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to { Self { from, to } } else { Self { from: to, to: from } }
    }

    /// The last `days` days ending with `today`.
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        Self::new(today - Duration::days(days.max(1) - 1), today)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        (self.from..=self.to).contains(&day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_income: Money,
    pub total_expenses: Money,
    /// May go negative, so it is not `Money`.
    pub net_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySales {
    pub week_start: NaiveDate,
    pub label: String,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub product_count: usize,
    pub sales_today: Money,
    pub low_stock: Vec<Product>,
    pub expiring_soon: Vec<Product>,
    pub recent_sales: Vec<Sale>,
}

impl Ledger {
    /// Income from sales against spending on completed orders placed in the range.
    pub fn financial_summary(&self, range: DateRange) -> FinancialSummary {
        let total_income: Money = self.sales_in(range).iter().map(Sale::total_price).sum();
        let total_expenses: Money = self
            .orders()
            .iter()
            .filter(|o| o.status() == OrderStatus::Completed && range.contains(o.date().date_naive()))
            .map(|o| o.total())
            .sum();
        FinancialSummary { total_income, total_expenses, net_profit: total_income.amount() - total_expenses.amount() }
    }

    /// Best sellers by units, ties in the order they were first seen.
    pub fn top_products(&self, range: DateRange) -> Vec<TopProduct> {
        let mut tally: Vec<TopProduct> = vec![];
        for sale in self.sales_in(range) {
            match tally.iter_mut().find(|t| t.product_id == sale.product_id()) {
                Some(t) => t.quantity = t.quantity.saturating_add(sale.quantity()),
                None => tally.push(TopProduct { product_id: sale.product_id().into(), name: sale.product_name().into(), quantity: sale.quantity() }),
            }
        }
        tally.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        tally.truncate(TOP_PRODUCTS);
        tally
    }

    /// Sales totals per week, weeks starting on Monday.
    pub fn weekly_sales(&self, range: DateRange) -> Vec<WeeklySales> {
        let mut weeks: BTreeMap<NaiveDate, Money> = BTreeMap::new();
        for sale in self.sales_in(range) {
            let day = sale.date().date_naive();
            let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
            let total = weeks.entry(monday).or_insert(Money::ZERO);
            *total = total.add(&sale.total_price());
        }
        weeks
            .into_iter()
            .map(|(week_start, total)| WeeklySales { week_start, label: format!("Sem {}", week_start.iso_week().week()), total })
            .collect()
    }

    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        let sales = self.sales();
        Dashboard {
            product_count: self.stores.products.count(),
            sales_today: sales.iter().filter(|s| s.date().date_naive() == today).map(Sale::total_price).sum(),
            low_stock: self.low_stock_products(),
            expiring_soon: self.expiring_products(today),
            recent_sales: sales.into_iter().take(RECENT_SALES).collect(),
        }
    }

    fn sales_in(&self, range: DateRange) -> Vec<Sale> {
        self.sales_between(range.from, range.to)
    }
}
