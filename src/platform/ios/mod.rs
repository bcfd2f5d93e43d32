//! iOS Picture-in-Picture adapter.

pub mod asset;
pub mod host;
pub mod pip;
pub mod queue;

#[cfg(target_os = "ios")]
mod ffi;
#[cfg(target_os = "ios")]
mod objc_host;

pub use host::{LabelSpec, PipHost};
pub use pip::PipOverlay;
pub use queue::{post_host_event, EventScheduler};

#[cfg(target_os = "ios")]
pub use objc_host::ObjcPipHost;
#[cfg(target_os = "ios")]
pub use queue::MainQueueScheduler;
