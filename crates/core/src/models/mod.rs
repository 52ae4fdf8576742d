//! Data models for UnitKo

mod archive;
mod billing;
mod landlord;
mod property;
mod subscription;
mod tenant;

pub use archive::*;
pub use billing::*;
pub use landlord::*;
pub use property::*;
pub use subscription::*;
pub use tenant::*;
