//! Lifecycle event bus.
//!
//! [`EventBus`] is the in-process publish/subscribe hub for [`MediaEvent`]s,
//! fanning state changes out to UI and notification collaborators. Delivery
//! order per item is FIFO relative to the operation sequence that produced
//! it; no ordering is guaranteed across distinct items.

pub mod bus;

pub use bus::{EventBus, MediaEvent};
