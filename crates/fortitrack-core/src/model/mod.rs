// ── Domain model ──

pub mod device;
pub mod event;
pub mod mac;

pub use device::{AttrValue, Device};
pub use event::RegistryEvent;
pub use mac::MacAddress;
