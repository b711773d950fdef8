//! Top-level transcoders
//!
//! Every resource moves between three models:
//!
//! - declarative: flat snake_case attribute state ([`crate::state`])
//! - transport: the vendor REST shape ([`crate::transport`])
//! - platform: KubeVirt and CDI custom resources ([`crate::crd`])
//!
//! [`declarative`] maps declarative <-> transport and [`platform`] maps
//! transport <-> platform. The declarative <-> platform directions compose the
//! two through the transport model.

pub mod bridge;
pub mod declarative;
pub mod platform;

use crate::config::TranscodeConfig;
use crate::crd::{DataVolume, VirtualMachine};
use crate::error::Result;
use crate::state::{StateReader, StateWriter};
use crate::transport::{ClusterVirtualMachine, VmAddVolumeEntity, VmAddVolumeOptions};

pub use bridge::bridge;

/// Declarative state -> transport VM
pub fn declarative_vm_to_transport<R: StateReader + ?Sized>(
    state: &R,
    config: &TranscodeConfig,
) -> Result<ClusterVirtualMachine> {
    declarative::expand_vm(state, config)
}

/// Transport VM -> declarative state
pub fn transport_vm_to_declarative<W: StateWriter + ?Sized>(
    vm: &ClusterVirtualMachine,
    state: &mut W,
    config: &TranscodeConfig,
) -> Result<()> {
    declarative::flatten_vm(vm, state, config)
}

pub fn transport_vm_to_platform(vm: &ClusterVirtualMachine) -> Result<VirtualMachine> {
    platform::vm_to_platform(vm)
}

pub fn platform_vm_to_transport(vm: &VirtualMachine) -> Result<ClusterVirtualMachine> {
    platform::vm_to_transport(vm)
}

/// Declarative state -> platform VM, through the transport model
pub fn declarative_vm_to_platform<R: StateReader + ?Sized>(
    state: &R,
    config: &TranscodeConfig,
) -> Result<VirtualMachine> {
    platform::vm_to_platform(&declarative::expand_vm(state, config)?)
}

/// Platform VM -> declarative state, through the transport model
///
/// `state` is untouched when either leg fails.
pub fn platform_vm_to_declarative<W: StateWriter + ?Sized>(
    vm: &VirtualMachine,
    state: &mut W,
    config: &TranscodeConfig,
) -> Result<()> {
    declarative::flatten_vm(&platform::vm_to_transport(vm)?, state, config)
}

/// Declarative state -> transport add-volume request
pub fn declarative_dv_to_transport<R: StateReader + ?Sized>(
    state: &R,
    config: &TranscodeConfig,
) -> Result<VmAddVolumeEntity> {
    declarative::expand_data_volume(state, config)
}

pub fn transport_dv_to_declarative<W: StateWriter + ?Sized>(
    entity: &VmAddVolumeEntity,
    state: &mut W,
    config: &TranscodeConfig,
) -> Result<()> {
    declarative::flatten_data_volume(entity, state, config)
}

pub fn transport_dv_to_platform(entity: &VmAddVolumeEntity) -> Result<DataVolume> {
    platform::data_volume_to_platform(entity)
}

/// Platform data volume -> transport add-volume request
///
/// The platform resource has no add-volume options, so callers pass the ones
/// they want attached.
pub fn platform_dv_to_transport(
    dv: &DataVolume,
    options: Option<VmAddVolumeOptions>,
) -> Result<VmAddVolumeEntity> {
    platform::data_volume_to_transport(dv, options)
}

pub fn declarative_dv_to_platform<R: StateReader + ?Sized>(
    state: &R,
    config: &TranscodeConfig,
) -> Result<DataVolume> {
    platform::data_volume_to_platform(&declarative::expand_data_volume(state, config)?)
}

/// Platform data volume -> declarative state
///
/// Add-volume options are not part of the platform resource and are left
/// unset.
pub fn platform_dv_to_declarative<W: StateWriter + ?Sized>(
    dv: &DataVolume,
    state: &mut W,
    config: &TranscodeConfig,
) -> Result<()> {
    let entity = platform::data_volume_to_transport(dv, None)?;
    declarative::flatten_data_volume(&entity, state, config)
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
