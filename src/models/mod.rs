// Data models (structs)
pub mod backend;
pub mod conversion;
pub mod readiness;
pub mod session;
pub mod settings;

pub use backend::*;
pub use conversion::*;
pub use readiness::*;
pub use session::*;
pub use settings::*;
