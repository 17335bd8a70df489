//! Test support utilities.
//!
//! Fakes shared by the integration tests: an in-memory environment that
//! records how it was used, and a clonable writer that captures log output.

pub mod env;
pub mod logging;

pub use env::{EnvCall, RecordingEnv};
pub use logging::CaptureBuffer;
