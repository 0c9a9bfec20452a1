use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{IceLevel, SugarLevel};

/// Order status. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Text recorded in the timeline when an order enters this status.
    pub fn description(self) -> &'static str {
        match self {
            Self::Pending => "Đơn hàng đã được tạo",
            Self::Preparing => "Nhà bếp đang chuẩn bị",
            Self::Completed => "Đơn hàng đã hoàn thành",
            Self::Cancelled => "Đơn hàng đã bị hủy",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Who performed a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Kitchen,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staff => f.write_str("staff"),
            Self::Kitchen => f.write_str("kitchen"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

/// Amount received per payment method. Absent keys were not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourcePayment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer: Option<u64>,
}

impl SourcePayment {
    /// Sum of both methods; `None` if it does not fit in a `u64`.
    pub fn total(&self) -> Option<u64> {
        self.cash.unwrap_or(0).checked_add(self.transfer.unwrap_or(0))
    }

    pub fn amount(&self, method: PaymentMethod) -> u64 {
        match method {
            PaymentMethod::Cash => self.cash.unwrap_or(0),
            PaymentMethod::Transfer => self.transfer.unwrap_or(0),
        }
    }
}

/// Audit record of one status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub actor: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CustomerType {
    #[default]
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "walkin")]
    WalkIn,
}

/// Topping as frozen into an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTopping {
    pub id: u32,
    pub name: String,
    pub quantity: u32,
    pub price: u64,
}

/// Immutable snapshot of a cart line taken at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    #[serde(rename = "price")]
    pub unit_price: u64,
    #[serde(rename = "isUpsize")]
    pub is_upsize: bool,
    #[serde(rename = "sugarLevel")]
    pub sugar_level: SugarLevel,
    #[serde(rename = "iceLevel")]
    pub ice_level: IceLevel,
    pub note: String,
    pub toppings: Vec<OrderTopping>,
    pub customer_type: CustomerType,
}

impl OrderItem {
    /// `unit_price * quantity`, the figure used for per-product revenue.
    pub fn base_revenue(&self) -> u64 {
        self.unit_price * u64::from(self.quantity)
    }
}

/// A submitted order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "order_id")]
    pub id: String,
    #[serde(rename = "table_number")]
    pub table_label: String,
    pub items: Vec<OrderItem>,
    pub total_price: u64,
    #[serde(rename = "sourcePayment")]
    pub source_payment: SourcePayment,
    #[serde(rename = "isCancelled")]
    pub is_cancelled: bool,
    pub status: OrderStatus,
    #[serde(rename = "time_line")]
    pub timeline: Vec<TimelineEntry>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Cancelled by either the legacy flag or the status field.
    pub fn is_void(&self) -> bool {
        self.is_cancelled || self.status == OrderStatus::Cancelled
    }

    pub fn last_entry(&self) -> Option<&TimelineEntry> {
        self.timeline.last()
    }
}

/// Order creation payload produced by the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCreate {
    #[serde(rename = "table_number")]
    pub table_label: String,
    pub items: Vec<OrderItem>,
    pub total_price: u64,
    #[serde(rename = "sourcePayment")]
    pub source_payment: SourcePayment,
    #[serde(rename = "isCancelled")]
    pub is_cancelled: bool,
    pub status: OrderStatus,
    #[serde(rename = "time_line")]
    pub timeline: Vec<TimelineEntry>,
}

/// The only fields that may change after an order is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPatch {
    pub status: OrderStatus,
    #[serde(rename = "isCancelled")]
    pub is_cancelled: bool,
    #[serde(rename = "time_line")]
    pub timeline: Vec<TimelineEntry>,
}

impl From<&Order> for OrderPatch {
    fn from(order: &Order) -> Self {
        Self {
            status: order.status,
            is_cancelled: order.is_cancelled,
            timeline: order.timeline.clone(),
        }
    }
}
