use holodeck_core::{Order, OrderId, Timestamp};
use std::collections::VecDeque;

/// Orders waiting out the simulated network latency
///
/// With a constant latency, due times are non-decreasing in submission
/// order, so a FIFO is enough.
#[derive(Debug, Clone, Default)]
pub struct InflightQueue {
    orders: VecDeque<(Timestamp, Order)>,
}

impl InflightQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `order` until `due`
    pub fn push(&mut self, due: Timestamp, order: Order) {
        self.orders.push_back((due, order));
    }

    /// Remove and return every order due at or before `now`, oldest first
    pub fn pop_due(&mut self, now: Timestamp) -> Vec<Order> {
        let mut due = Vec::new();
        while let Some((at, _)) = self.orders.front() {
            if *at > now {
                break;
            }
            if let Some((_, order)) = self.orders.pop_front() {
                due.push(order);
            }
        }
        due
    }

    pub fn cancel(&mut self, id: OrderId) -> Option<Order> {
        let index = self.orders.iter().position(|(_, order)| order.id == id)?;
        self.orders.remove(index).map(|(_, order)| order)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().map(|(_, order)| order)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use holodeck_core::Side;
    use rust_decimal_macros::dec;

    fn order(id: u64) -> Order {
        let mut order = Order::market(Side::Buy, dec!(1));
        order.accept(OrderId(id), Utc.timestamp_opt(0, 0).unwrap());
        order
    }

    #[test]
    fn test_pop_due_respects_time_and_order() {
        let t0 = Utc.timestamp_opt(0, 0).unwrap();
        let mut queue = InflightQueue::new();
        queue.push(t0 + Duration::milliseconds(50), order(1));
        queue.push(t0 + Duration::milliseconds(50), order(2));
        queue.push(t0 + Duration::milliseconds(80), order(3));

        assert!(queue.pop_due(t0 + Duration::milliseconds(49)).is_empty());

        let due = queue.pop_due(t0 + Duration::milliseconds(50));
        let ids: Vec<_> = due.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![OrderId(1), OrderId(2)]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_cancel_removes_order() {
        let t0 = Utc.timestamp_opt(0, 0).unwrap();
        let mut queue = InflightQueue::new();
        queue.push(t0, order(1));
        queue.push(t0, order(2));

        assert_eq!(queue.cancel(OrderId(1)).map(|o| o.id), Some(OrderId(1)));
        assert!(queue.cancel(OrderId(9)).is_none());
        assert_eq!(queue.iter().count(), 1);
    }
}
