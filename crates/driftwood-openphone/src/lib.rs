//! driftwood-openphone
//!
//! Rate-limited, retrying client for the OpenPhone messaging API: send a
//! text, then poll until the carrier reports a terminal delivery status.

pub mod client;
pub mod error;
pub mod phone;
pub mod retry;
pub mod types;

pub use client::{OpenPhoneClient, OpenPhoneConfig};
pub use error::DeliveryError;
pub use phone::normalize_phone_number;
pub use retry::Backoff;
pub use types::{MessageStatus, SentMessage};
