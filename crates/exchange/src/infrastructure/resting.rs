use holodeck_core::{Order, OrderId, Timestamp};

/// A working limit order and its DAY expiry, if any
#[derive(Debug, Clone, PartialEq)]
pub struct RestingOrder {
    pub order: Order,
    pub expires_at: Option<Timestamp>,
}

impl RestingOrder {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.order.time_in_force.is_expired(now, self.expires_at)
    }
}

/// Resting limit orders in insertion order
///
/// Insertion order is the tiebreak when several orders become
/// marketable on the same tick.
#[derive(Debug, Clone, Default)]
pub struct RestingBook {
    orders: Vec<RestingOrder>,
}

impl RestingBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: Order, expires_at: Option<Timestamp>) {
        self.orders.push(RestingOrder { order, expires_at });
    }

    pub fn remove(&mut self, id: OrderId) -> Option<RestingOrder> {
        let index = self.orders.iter().position(|r| r.order.id == id)?;
        Some(self.orders.remove(index))
    }

    /// Remove and return orders whose DAY session has ended
    pub fn take_expired(&mut self, now: Timestamp) -> Vec<RestingOrder> {
        let (expired, live): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.orders).into_iter().partition(|r| r.is_expired(now));
        self.orders = live;
        expired
    }

    /// Take every order out, leaving the book empty
    pub fn drain(&mut self) -> Vec<RestingOrder> {
        std::mem::take(&mut self.orders)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().map(|r| &r.order).find(|o| o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestingOrder> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
