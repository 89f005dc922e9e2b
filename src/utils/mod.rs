pub mod error;
pub mod format;
pub mod logger;
pub mod signals;
pub mod system;
pub mod time;
pub mod validation;
