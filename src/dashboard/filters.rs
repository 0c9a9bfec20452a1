use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Order, OrderStatus};

/// Calendar date of an instant in the shop's offset.
pub fn local_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

/// Tabs of the admin order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderFilter {
    #[default]
    All,
    Pending,
    Preparing,
    Completed,
    /// Neither completed nor cancelled.
    Incomplete,
    Cancelled,
    /// Created on the current local day.
    Today,
}

impl OrderFilter {
    pub fn matches(self, order: &Order, now: DateTime<Utc>, offset: FixedOffset) -> bool {
        match self {
            Self::All => true,
            Self::Pending => order.status == OrderStatus::Pending,
            Self::Preparing => order.status == OrderStatus::Preparing,
            Self::Completed => order.status == OrderStatus::Completed,
            Self::Incomplete => !order.status.is_terminal() && !order.is_cancelled,
            Self::Cancelled => order.is_void(),
            Self::Today => local_date(order.created_at, offset) == local_date(now, offset),
        }
    }
}

/// Orders matching a tab, in their original order.
pub fn filter_orders(orders: &[Order], filter: OrderFilter, now: DateTime<Utc>, offset: FixedOffset) -> Vec<&Order> {
    orders
        .iter()
        .filter(|order| filter.matches(order, now, offset))
        .collect()
}

pub fn filter_by_status(orders: &[Order], status: OrderStatus) -> Vec<&Order> {
    orders.iter().filter(|order| order.status == status).collect()
}

/// Splits orders into (active, cancelled). Either cancellation marker counts.
pub fn partition_active_cancelled(orders: &[Order]) -> (Vec<&Order>, Vec<&Order>) {
    let (cancelled, active): (Vec<&Order>, Vec<&Order>) = orders.iter().partition(|order| order.is_void());
    (active, cancelled)
}

/// Reporting window of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    Last7Days,
    Last30Days,
    Last90Days,
    All,
    /// Whole local days, both ends included.
    Custom { start: NaiveDate, end: NaiveDate },
}

impl DateFilter {
    /// Rolling windows reach back exactly N days from `now`.
    pub fn contains(self, created_at: DateTime<Utc>, now: DateTime<Utc>, offset: FixedOffset) -> bool {
        match self {
            Self::Last7Days => created_at >= now - Duration::days(7),
            Self::Last30Days => created_at >= now - Duration::days(30),
            Self::Last90Days => created_at >= now - Duration::days(90),
            Self::All => true,
            Self::Custom { start, end } => {
                let date = local_date(created_at, offset);
                start <= date && date <= end
            }
        }
    }
}

pub fn filter_by_date<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    filter: DateFilter,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<&'a Order> {
    orders
        .into_iter()
        .filter(|order| filter.contains(order.created_at, now, offset))
        .collect()
}
