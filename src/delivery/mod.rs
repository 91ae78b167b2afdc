mod payload;
mod webhook;

pub use payload::{Delivery, PayloadFormat};
pub use webhook::{DeliveryOutcome, WebhookSink};
