//! Bus errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BusError {
    /// A subscriber could not process an event; the bus keeps delivering
    #[error("subscriber '{name}' failed: {reason}")]
    SubscriberFailed { name: String, reason: String },
}
