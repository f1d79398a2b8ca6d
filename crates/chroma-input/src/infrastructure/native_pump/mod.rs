//! Native message pump: the hook that feeds raw records into the hub.
//!
//! On Windows this is a message-only window whose window procedure is
//! subclassed and registered for raw keyboard and mouse input.  Every
//! `WM_INPUT` message is decoded into a [`RawInputRecord`] and handed to the
//! installed callback; all messages, handled or not, are then forwarded to the
//! original window procedure.
//!
//! # Testability
//!
//! The [`NativeMessagePump`] trait lets tests drive the hub with synthetic
//! records through [`mock::MockMessagePump`] without a Windows message loop.

use chroma_input_core::RawInputRecord;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Callback invoked once per decoded raw record.
pub type NativeCallback = Box<dyn Fn(RawInputRecord) + Send + Sync>;

/// Error type for pump installation and removal.
#[derive(Debug, thiserror::Error)]
pub enum NativeHookError {
    #[error("failed to create message window: {0}")]
    WindowCreation(String),
    #[error("failed to subclass window procedure: {0}")]
    Subclass(String),
    #[error("failed to register raw input devices: {0}")]
    Registration(String),
    #[error("failed to restore window procedure: {0}")]
    Restore(String),
    #[error("a callback is already installed")]
    AlreadyInstalled,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting the platform hook.
///
/// The production implementation uses raw input on Windows; tests use
/// [`mock::MockMessagePump`].
pub trait NativeMessagePump: Send + Sync {
    /// Installs `callback` and starts delivering records to it.
    fn install(&self, callback: NativeCallback) -> Result<(), NativeHookError>;
    /// Removes the callback and restores the original message handling.
    ///
    /// Calling this when nothing is installed is a no-op.
    fn uninstall(&self) -> Result<(), NativeHookError>;
    fn is_installed(&self) -> bool;
}
