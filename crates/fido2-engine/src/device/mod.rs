pub mod adapter;
pub mod locator;
pub mod raw;

pub use adapter::{DeviceAdapter, GetAssertionCall, MakeCredentialCall, ProbeOutcome};
pub use locator::{DeviceLocator, DeviceOpener};
pub use raw::{Probe, RawDevice};
