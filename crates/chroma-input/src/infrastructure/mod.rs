//! Infrastructure layer for the input provider.
//!
//! Contains OS-facing adapters: the native message pump, platform probes and
//! file-system storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `chroma_input_core`.  The application layer only reaches it through the
//! `NativeMessagePump` trait.

pub mod native_pump;
pub mod platform;
pub mod storage;
