//! Pipeline state with no OS dependencies.
//!
//! Each sub-module owns one piece of per-session state (or a pure snapshot)
//! and talks to the platform only through a small trait, so everything here
//! compiles and tests on any host:
//!
//! - **`device`** – handle → identifier cache ([`device::DevicePathSource`]).
//! - **`toggle`** – lock-key snapshots ([`toggle::LockKeyProbe`]).
//! - **`motion`** – relative-delta accumulation and publish throttling.
//! - **`focus`** – foreground-process transitions and the release denylist.

pub mod device;
pub mod focus;
pub mod motion;
pub mod toggle;
