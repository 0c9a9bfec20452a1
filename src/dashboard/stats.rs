use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Timelike, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use super::filters::{filter_by_date, local_date, partition_active_cancelled, DateFilter};
use crate::domain::{Category, Order, PaymentMethod, Product};

const TOP_PRODUCT_LIMIT: usize = 10;

/// Headline numbers of the dashboard. Revenue figures never include cancelled orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_orders: usize,
    pub total_products: usize,
    pub total_categories: usize,
    pub today_orders: usize,
    pub total_revenue: u64,
    pub cash_revenue: u64,
    pub transfer_revenue: u64,
    /// Rounded down to whole đồng.
    pub average_order_value: u64,
    pub cancelled_orders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub revenue: u64,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u64,
    pub revenue: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaymentSplit {
    pub cash: u64,
    pub transfer: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HourlyBucket {
    pub hour: u32,
    pub orders: usize,
    pub revenue: u64,
}

/// Orders and revenue for a calendar bucket. `key` is the Sunday that starts a
/// week, or `YYYY-MM` for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodBucket {
    pub key: String,
    pub orders: usize,
    pub revenue: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySales {
    pub category_id: String,
    pub category_name: String,
    pub quantity: u64,
}

/// Everything the dashboard screen shows for one reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardReport {
    pub summary: DashboardSummary,
    pub daily: Vec<DailyPoint>,
    pub top_products: Vec<ProductSales>,
    pub payment: PaymentSplit,
    pub hourly: Vec<HourlyBucket>,
    pub weekly: Vec<PeriodBucket>,
    pub monthly: Vec<PeriodBucket>,
    pub peak_hour: Option<u32>,
    pub best_category: Option<CategorySales>,
}

/// Builds the full report. Cancelled orders are dropped before the date filter
/// and only show up in `cancelled_orders`.
#[instrument(skip_all, fields(orders = orders.len(), ?filter))]
pub fn build_report(
    orders: &[Order],
    products: &[Product],
    categories: &[Category],
    filter: DateFilter,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> DashboardReport {
    let (active, cancelled) = partition_active_cancelled(orders);
    let in_window = filter_by_date(active, filter, now, offset);

    let payment = payment_split(&in_window);
    let total_revenue = revenue(&in_window);
    let today = local_date(now, offset);
    let summary = DashboardSummary {
        total_orders: in_window.len(),
        total_products: products.len(),
        total_categories: categories.len(),
        today_orders: in_window
            .iter()
            .filter(|order| local_date(order.created_at, offset) == today)
            .count(),
        total_revenue,
        cash_revenue: payment.cash,
        transfer_revenue: payment.transfer,
        average_order_value: average(total_revenue, in_window.len()),
        cancelled_orders: cancelled.len(),
    };
    debug!(total_revenue, "Dashboard summary computed");

    DashboardReport {
        summary,
        daily: daily_series(&in_window, offset),
        top_products: top_products(&in_window),
        payment,
        hourly: hourly_buckets(&in_window, offset),
        weekly: weekly_buckets(&in_window, offset),
        monthly: monthly_buckets(&in_window, offset),
        peak_hour: peak_hour(&in_window, offset),
        best_category: best_category(&in_window, products, categories),
    }
}

pub fn revenue(orders: &[&Order]) -> u64 {
    orders.iter().map(|order| order.total_price).sum()
}

fn average(total: u64, count: usize) -> u64 {
    match count {
        0 => 0,
        n => total / n as u64,
    }
}

/// Revenue and order count per local day, oldest first.
pub fn daily_series(orders: &[&Order], offset: FixedOffset) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, (usize, u64)> = BTreeMap::new();
    for order in orders {
        let day = days.entry(local_date(order.created_at, offset)).or_default();
        day.0 += 1;
        day.1 += order.total_price;
    }
    days.into_iter()
        .map(|(date, (orders, revenue))| DailyPoint { date, revenue, orders })
        .collect()
}

/// Best sellers by base revenue (`unit price × quantity`, without upsize or toppings).
pub fn top_products(orders: &[&Order]) -> Vec<ProductSales> {
    let mut sales: HashMap<&str, ProductSales> = HashMap::new();
    for item in orders.iter().flat_map(|order| &order.items) {
        let entry = sales.entry(item.product_id.as_str()).or_insert_with(|| ProductSales {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: 0,
            revenue: 0,
        });
        entry.quantity += u64::from(item.quantity);
        entry.revenue += item.base_revenue();
    }
    let mut ranked: Vec<_> = sales.into_values().collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.product_id.cmp(&b.product_id)));
    ranked.truncate(TOP_PRODUCT_LIMIT);
    ranked
}

pub fn payment_split(orders: &[&Order]) -> PaymentSplit {
    orders.iter().fold(PaymentSplit::default(), |mut split, order| {
        split.cash += order.source_payment.amount(PaymentMethod::Cash);
        split.transfer += order.source_payment.amount(PaymentMethod::Transfer);
        split
    })
}

/// One bucket per local hour 0..=23, empty hours included.
pub fn hourly_buckets(orders: &[&Order], offset: FixedOffset) -> Vec<HourlyBucket> {
    let mut buckets: Vec<HourlyBucket> = (0..24)
        .map(|hour| HourlyBucket {
            hour,
            ..HourlyBucket::default()
        })
        .collect();
    for order in orders {
        let hour = order.created_at.with_timezone(&offset).hour() as usize;
        buckets[hour].orders += 1;
        buckets[hour].revenue += order.total_price;
    }
    buckets
}

pub fn weekly_buckets(orders: &[&Order], offset: FixedOffset) -> Vec<PeriodBucket> {
    period_buckets(orders, |order| {
        let date = local_date(order.created_at, offset);
        let sunday = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
        sunday.format("%Y-%m-%d").to_string()
    })
}

pub fn monthly_buckets(orders: &[&Order], offset: FixedOffset) -> Vec<PeriodBucket> {
    period_buckets(orders, |order| {
        local_date(order.created_at, offset).format("%Y-%m").to_string()
    })
}

// Keys are zero-padded ISO dates, so string order is calendar order.
fn period_buckets(orders: &[&Order], key_of: impl Fn(&Order) -> String) -> Vec<PeriodBucket> {
    let mut buckets: BTreeMap<String, (usize, u64)> = BTreeMap::new();
    for order in orders {
        let bucket = buckets.entry(key_of(order)).or_default();
        bucket.0 += 1;
        bucket.1 += order.total_price;
    }
    buckets
        .into_iter()
        .map(|(key, (orders, revenue))| PeriodBucket { key, orders, revenue })
        .collect()
}

/// Local hour with the most orders; the earliest such hour on a tie.
pub fn peak_hour(orders: &[&Order], offset: FixedOffset) -> Option<u32> {
    hourly_buckets(orders, offset)
        .into_iter()
        .filter(|bucket| bucket.orders > 0)
        .fold(None, |best: Option<HourlyBucket>, bucket| match best {
            Some(current) if current.orders >= bucket.orders => Some(current),
            _ => Some(bucket),
        })
        .map(|bucket| bucket.hour)
}

/// Category selling the most units. Items are joined to categories through the
/// current product list, so items of deleted products are not counted.
/// Ties go to the category listed first.
pub fn best_category(orders: &[&Order], products: &[Product], categories: &[Category]) -> Option<CategorySales> {
    let category_of: HashMap<&str, &str> = products
        .iter()
        .map(|product| (product.id.as_str(), product.category_id.as_str()))
        .collect();
    let mut quantities: HashMap<&str, u64> = HashMap::new();
    for item in orders.iter().flat_map(|order| &order.items) {
        if let Some(category_id) = category_of.get(item.product_id.as_str()) {
            *quantities.entry(*category_id).or_default() += u64::from(item.quantity);
        }
    }

    categories
        .iter()
        .filter_map(|category| {
            quantities.get(category.id.as_str()).map(|&quantity| CategorySales {
                category_id: category.id.clone(),
                category_name: category.name.clone(),
                quantity,
            })
        })
        .fold(None, |best: Option<CategorySales>, candidate| match best {
            Some(current) if current.quantity >= candidate.quantity => Some(current),
            _ => Some(candidate),
        })
}
