//! Platform model: KubeVirt and CDI custom resources

pub mod data_volume;
pub mod domain;
pub mod virtual_machine;
pub mod volume;

pub use data_volume::{DataVolume, DataVolumeSpec, DataVolumeStatus, DataVolumeTemplateSpec};
pub use virtual_machine::{
    VirtualMachine, VirtualMachineInstanceSpec, VirtualMachineSpec, VirtualMachineStatus,
};

#[cfg(test)]
#[path = "crd_test.rs"]
mod tests;
