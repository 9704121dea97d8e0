//! Explicit waits on elements.

mod conditions;
mod element_waiter;
mod poller;

pub use crate::common::config::ElementPoller;
pub use conditions::{handle_errors, ElementPredicate};
pub use element_waiter::{ElementWaitable, ElementWaiter};
pub use poller::ElementPollerTicker;
