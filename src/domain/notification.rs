//! Synchronous price-change notification bus.
//!
//! Subscribers are called in subscription order, one at a time, on the
//! caller's thread. There is no queue and no replay: a subscriber only sees
//! changes published while it is registered.

use rust_decimal::Decimal;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type Handler = Box<dyn FnMut(&str, Decimal) -> Result<(), HandlerError> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Outcome of one publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: Vec<SubscriptionId>,
}

impl DeliveryReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Default)]
pub struct NotificationBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Handler)>,
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&str, Decimal) -> Result<(), HandlerError> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers `(symbol, price)` to every subscriber. A handler that errors or
    /// panics is logged and skipped; the rest still receive the event.
    pub(crate) fn publish(&mut self, symbol: &str, price: Decimal) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for (id, handler) in self.subscribers.iter_mut() {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(symbol, price))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    warn!(subscription = %id, symbol, error = %e, "price handler failed");
                    report.failed.push(*id);
                }
                Err(payload) => {
                    warn!(
                        subscription = %id,
                        symbol,
                        panic = panic_message(payload.as_ref()),
                        "price handler panicked"
                    );
                    report.failed.push(*id);
                }
            }
        }
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
