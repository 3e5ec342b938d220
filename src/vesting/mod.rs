//! Vesting module - reward grants and linear unlock

mod grant;
mod registry;

pub use grant::*;
pub use registry::*;
