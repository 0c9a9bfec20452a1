use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderPatch, OrderStatus, TimelineEntry};

impl Entity for Order {
    type Id = String;
    type CreatePayload = OrderCreate;
    type Patch = OrderPatch;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Order from a lifecycle-built payload.
    ///
    /// # Notes
    /// The store re-checks the payload invariants rather than trusting the
    /// caller: non-empty items, balanced payment, and a timeline that ends in
    /// the current status.
    fn from_create(id: String, created_at: DateTime<Utc>, payload: OrderCreate) -> Result<Self, String> {
        if payload.items.is_empty() {
            return Err("Order has no items".to_string());
        }
        if payload.source_payment.total() != Some(payload.total_price) {
            return Err(format!(
                "Payment {:?} does not match total {}",
                payload.source_payment,
                payload.total_price
            ));
        }
        check_timeline(&payload.timeline, payload.status)?;

        Ok(Self {
            id,
            table_label: payload.table_label,
            items: payload.items,
            total_price: payload.total_price,
            source_payment: payload.source_payment,
            is_cancelled: payload.is_cancelled,
            status: payload.status,
            timeline: payload.timeline,
            created_at,
        })
    }

    /// Timeline length grows by one per status change, so it orders revisions.
    fn revision(&self) -> u64 {
        self.timeline.len() as u64
    }

    /// Applies a status change written by the order client.
    ///
    /// Items, totals and payment are not part of [`OrderPatch`] and so can
    /// never change here. Concurrent writers are last-write-wins.
    fn on_update(&mut self, patch: OrderPatch) -> Result<(), String> {
        check_timeline(&patch.timeline, patch.status)?;
        self.status = patch.status;
        self.is_cancelled = patch.is_cancelled;
        self.timeline = patch.timeline;
        Ok(())
    }

    fn on_delete(&self) -> Result<(), String> {
        Err("Orders cannot be deleted".to_string())
    }
}

fn check_timeline(timeline: &[TimelineEntry], status: OrderStatus) -> Result<(), String> {
    match timeline.last() {
        None => Err("Order timeline is empty".to_string()),
        Some(last) if last.status != status => Err(format!(
            "Timeline ends in {} but status is {}",
            last.status, status
        )),
        Some(_) if timeline.windows(2).any(|pair| pair[1].timestamp < pair[0].timestamp) => {
            Err("Timeline timestamps go backwards".to_string())
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_clock;
    use crate::clock::Clock;
    use crate::domain::{CustomerType, IceLevel, OrderItem, Role, SourcePayment, SugarLevel};

    fn payload() -> OrderCreate {
        OrderCreate {
            table_label: "4".to_string(),
            items: vec![OrderItem {
                product_id: "p1".to_string(),
                product_name: "Bạc xỉu".to_string(),
                quantity: 1,
                unit_price: 25_000,
                is_upsize: false,
                sugar_level: SugarLevel::NormalSugar,
                ice_level: IceLevel::LessIce,
                note: String::new(),
                toppings: Vec::new(),
                customer_type: CustomerType::Table,
            }],
            total_price: 25_000,
            source_payment: SourcePayment {
                cash: Some(25_000),
                transfer: None,
            },
            is_cancelled: false,
            status: OrderStatus::Pending,
            timeline: vec![TimelineEntry {
                status: OrderStatus::Pending,
                timestamp: test_clock().now(),
                description: OrderStatus::Pending.description().to_string(),
                actor: Role::Staff,
            }],
        }
    }

    #[test]
    fn store_rejects_unbalanced_payment() {
        let mut bad = payload();
        bad.source_payment.cash = Some(20_000);
        assert!(Order::from_create("o1".into(), test_clock().now(), bad).is_err());
    }

    #[test]
    fn store_rejects_wrapping_payment() {
        let mut bad = payload();
        bad.source_payment = SourcePayment {
            cash: Some(u64::MAX),
            transfer: Some(25_001),
        };
        assert!(Order::from_create("o1".into(), test_clock().now(), bad).is_err());
    }

    #[test]
    fn store_rejects_timeline_out_of_sync() {
        let mut bad = payload();
        bad.status = OrderStatus::Preparing;
        assert!(Order::from_create("o1".into(), test_clock().now(), bad).is_err());

        let mut empty = payload();
        empty.timeline.clear();
        assert!(Order::from_create("o1".into(), test_clock().now(), empty).is_err());
    }

    #[test]
    fn orders_are_not_deletable() {
        let order = Order::from_create("o1".into(), test_clock().now(), payload()).unwrap();
        assert_eq!(order.revision(), 1);
        assert!(order.on_delete().is_err());
    }
}
