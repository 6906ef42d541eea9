//! Collaborator traits
//!
//! These traits define the interface between the coordinator and the
//! platform: the companion link, the framebuffer and the wake lock.

pub mod link;
pub mod panel;
pub mod wakelock;

pub use link::{CompanionLink, TransportError};
pub use panel::{FramebufferError, PrepareOutcome, QuickDraw};
pub use wakelock::WakeLock;
