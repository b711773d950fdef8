//! vmtranscode: virtual machine definitions across three models
//!
//! A VM or data volume is held as declarative attribute state, exchanged with
//! the control plane as a vendor REST object, and stored in the cluster as a
//! KubeVirt/CDI custom resource. [`convert`] moves values between the three in
//! every direction.

// Declared first so `string_enum!` is in scope for every module below
#[macro_use]
pub mod enums;

pub mod codec;
pub mod config;
pub mod convert;
pub mod crd;
pub mod error;
pub mod state;
pub mod transport;
pub mod union;

pub use config::TranscodeConfig;
pub use error::{ConvertError, Result};
