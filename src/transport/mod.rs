//! Transport model: the vendor REST objects exchanged with the control plane
//!
//! Field names are lowerCamelCase. Every optional scalar is an `Option` so
//! that "absent" and "explicit zero" stay distinguishable; lists and maps are
//! empty when absent and are omitted on the wire.

pub mod data_volume;
pub mod domain;
pub mod metadata;
pub mod scheduling;
pub mod vm;
pub mod volume;

pub use data_volume::{
    VmAddVolumeEntity, VmAddVolumeOptions, VmDataVolumeSpec, VmDataVolumeTemplateSpec,
};
pub use domain::{Marker, VmDomainSpec};
pub use metadata::VmObjectMeta;
pub use vm::{ClusterVirtualMachine, VmInstanceSpec, VmSpec, VmStatus};
