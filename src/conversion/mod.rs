// Conversion requests against the local backend
pub mod dispatcher;
pub mod indicator;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::{ConversionDispatcher, ConversionError};
pub use indicator::BusyIndicator;
pub use service::{ConversionService, HttpConversionService, ServiceReply, TransportError};
