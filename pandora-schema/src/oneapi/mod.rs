mod channel;

pub use channel::{OneApiChannel, OneApiEnvelope};
