//! Workspace facade crate.
//!
//! This crate exists so host applications can depend on `msc-workspace` and
//! enable the documented feature flags without wiring each workspace crate
//! individually. The `player` feature pulls in the playback core and its
//! collaborators; `desktop-shims` adds the desktop/emulator bridge
//! implementations used by integration hosts and examples.

#[cfg(feature = "player")]
pub use core_library as library;
#[cfg(feature = "player")]
pub use core_playback as playback;
#[cfg(feature = "player")]
pub use core_runtime as runtime;
#[cfg(feature = "player")]
pub use core_sync as sync;

pub use bridge_traits as bridge;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop as desktop;
