//! Application layer use cases for the input provider.
//!
//! Use cases in this layer orchestrate the core pipeline state and talk to the
//! outside world only through traits, so the platform adapters in
//! `infrastructure` can be swapped for mocks in tests.
//!
//! # Sub-modules
//!
//! - **`dispatch_input`** – The Input Event Hub.  Receives every raw record
//!   from the native pump and publishes normalized events to subscribers.
//!   This runs on every keystroke and every mouse report.
//!
//! - **`focus_monitor`** – Polls the foreground process and triggers a
//!   release-all when a process that swallows key-ups takes focus.
//!
//! - **`held_input`** – Tracks which keys and buttons are down and releases
//!   them on request.
//!
//! - **`manage_devices`** – Binds stable device identifiers to configured
//!   devices and answers the hub's device lookups.

pub mod dispatch_input;
pub mod focus_monitor;
pub mod held_input;
pub mod manage_devices;
