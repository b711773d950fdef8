//! Domain and device mapping

use super::{map_list, non_empty, required};
use crate::codec::{from_quantity_map, narrow_opt, to_quantity, to_quantity_map};
use crate::crd::domain::*;
use crate::error::{ConvertError, Result, ResultExt};
use crate::transport::domain::*;
use crate::union;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Secure boot value used when an EFI bootloader leaves it unset
pub const DEFAULT_EFI_SECURE_BOOT: bool = false;

pub fn domain_to_platform(domain: &VmDomainSpec) -> Result<DomainSpec> {
    Ok(DomainSpec {
        resources: domain.resources.as_ref().map(resources_to_platform).transpose().for_field("resources")?,
        cpu: domain.cpu.as_ref().map(cpu_to_platform).transpose().for_field("cpu")?,
        memory: domain.memory.as_ref().map(memory_to_platform).transpose().for_field("memory")?,
        machine: domain.machine.as_ref().map(|m| Machine { type_: m.type_.clone() }),
        firmware: domain.firmware.as_ref().map(firmware_to_platform).transpose().for_field("firmware")?,
        features: domain.features.as_ref().map(features_to_platform),
        clock: domain.clock.as_ref().map(clock_to_platform).transpose().for_field("clock")?,
        chassis: domain.chassis.as_ref().map(chassis_to_platform),
        launch_security: domain.launch_security.as_ref().map(|security| LaunchSecurity {
            sev: security.sev.map(|_| Sev {}),
        }),
        io_threads_policy: domain
            .io_threads_policy
            .as_deref()
            .map(IoThreadsPolicy::parse)
            .transpose()
            .for_field("ioThreadsPolicy")?,
        devices: domain
            .devices
            .as_ref()
            .map(devices_to_platform)
            .transpose()
            .for_field("devices")?
            .unwrap_or_default(),
    })
}

pub fn domain_to_transport(domain: &DomainSpec) -> Result<VmDomainSpec> {
    Ok(VmDomainSpec {
        resources: domain.resources.as_ref().map(resources_to_transport),
        cpu: domain.cpu.as_ref().map(cpu_to_transport),
        memory: domain.memory.as_ref().map(memory_to_transport),
        machine: domain.machine.as_ref().map(|m| VmMachine { type_: m.type_.clone() }),
        firmware: domain.firmware.as_ref().map(firmware_to_transport).transpose().for_field("firmware")?,
        features: domain.features.as_ref().map(features_to_transport),
        clock: domain.clock.as_ref().map(clock_to_transport).transpose().for_field("clock")?,
        chassis: domain.chassis.as_ref().map(chassis_to_transport),
        launch_security: domain.launch_security.as_ref().map(|security| VmLaunchSecurity {
            sev: security.sev.as_ref().map(|_| Marker {}),
        }),
        io_threads_policy: domain.io_threads_policy.map(|policy| policy.to_string()),
        devices: (domain.devices != Devices::default())
            .then(|| devices_to_transport(&domain.devices))
            .transpose()
            .for_field("devices")?,
    })
}

fn resources_to_platform(resources: &VmResourceRequirements) -> Result<ResourceRequirements> {
    Ok(ResourceRequirements {
        requests: non_empty_quantities(&resources.requests).for_field("requests")?,
        limits: non_empty_quantities(&resources.limits).for_field("limits")?,
        overcommit_guest_overhead: resources.overcommit_guest_overhead,
    })
}

fn non_empty_quantities(
    values: &BTreeMap<String, String>,
) -> Result<Option<BTreeMap<String, Quantity>>> {
    if values.is_empty() {
        return Ok(None);
    }
    to_quantity_map(values).map(Some)
}

fn resources_to_transport(resources: &ResourceRequirements) -> VmResourceRequirements {
    VmResourceRequirements {
        requests: resources.requests.as_ref().map(from_quantity_map).unwrap_or_default(),
        limits: resources.limits.as_ref().map(from_quantity_map).unwrap_or_default(),
        overcommit_guest_overhead: resources.overcommit_guest_overhead,
    }
}

fn cpu_to_platform(cpu: &VmCpu) -> Result<Cpu> {
    Ok(Cpu {
        cores: narrow_opt(cpu.cores, "cores")?,
        sockets: narrow_opt(cpu.sockets, "sockets")?,
        threads: narrow_opt(cpu.threads, "threads")?,
        model: cpu.model.clone(),
        dedicated_cpu_placement: cpu.dedicated_cpu_placement,
    })
}

fn cpu_to_transport(cpu: &Cpu) -> VmCpu {
    VmCpu {
        cores: cpu.cores.map(i64::from),
        sockets: cpu.sockets.map(i64::from),
        threads: cpu.threads.map(i64::from),
        model: cpu.model.clone(),
        dedicated_cpu_placement: cpu.dedicated_cpu_placement,
    }
}

fn memory_to_platform(memory: &VmMemory) -> Result<Memory> {
    Ok(Memory {
        guest: memory.guest.as_deref().map(|g| to_quantity("guest", g)).transpose()?,
        hugepages: memory.hugepages.as_ref().map(|h| Hugepages {
            page_size: h.page_size.clone(),
        }),
    })
}

fn memory_to_transport(memory: &Memory) -> VmMemory {
    VmMemory {
        guest: memory.guest.as_ref().map(|q| q.0.clone()),
        hugepages: memory.hugepages.as_ref().map(|h| VmHugepages {
            page_size: h.page_size.clone(),
        }),
    }
}

fn firmware_to_platform(firmware: &VmFirmware) -> Result<Firmware> {
    let bootloader = match &firmware.bootloader {
        None => None,
        Some(loader) => {
            let selected = union::pick(
                "bootloader",
                [
                    ("bios", loader.bios.as_ref().map(|b| Bootloader {
                        bios: Some(Bios { use_serial: b.use_serial }),
                        efi: None,
                    })),
                    ("efi", loader.efi.as_ref().map(|e| Bootloader {
                        bios: None,
                        efi: Some(Efi {
                            secure_boot: Some(e.secure_boot.unwrap_or(DEFAULT_EFI_SECURE_BOOT)),
                            persistent: e.persistent,
                        }),
                    })),
                ],
            )?;
            // A declared bootloader with no branch stays present
            Some(selected.map(|(_, b)| b).unwrap_or_default())
        }
    };

    Ok(Firmware {
        uuid: firmware.uuid.clone(),
        serial: firmware.serial.clone(),
        bootloader,
    })
}

fn firmware_to_transport(firmware: &Firmware) -> Result<VmFirmware> {
    let bootloader = match &firmware.bootloader {
        None => None,
        Some(loader) => {
            union::variant("bootloader", [("bios", loader.bios.is_some()), ("efi", loader.efi.is_some())])?;
            Some(VmBootloader {
                bios: loader.bios.as_ref().map(|b| VmBios { use_serial: b.use_serial }),
                efi: loader.efi.as_ref().map(|e| VmEfi {
                    secure_boot: e.secure_boot,
                    persistent: e.persistent,
                }),
            })
        }
    };

    Ok(VmFirmware {
        uuid: firmware.uuid.clone(),
        serial: firmware.serial.clone(),
        bootloader,
    })
}

fn features_to_platform(features: &VmFeatures) -> Features {
    Features {
        acpi: features.acpi.as_ref().map(|f| FeatureState { enabled: f.enabled }),
        apic: features.apic.as_ref().map(|f| FeatureApic {
            enabled: f.enabled,
            end_of_interrupt: f.end_of_interrupt,
        }),
        smm: features.smm.as_ref().map(|f| FeatureState { enabled: f.enabled }),
    }
}

fn features_to_transport(features: &Features) -> VmFeatures {
    VmFeatures {
        acpi: features.acpi.as_ref().map(|f| VmFeatureState { enabled: f.enabled }),
        apic: features.apic.as_ref().map(|f| VmFeatureApic {
            enabled: f.enabled,
            end_of_interrupt: f.end_of_interrupt,
        }),
        smm: features.smm.as_ref().map(|f| VmFeatureState { enabled: f.enabled }),
    }
}

fn clock_to_platform(clock: &VmClock) -> Result<Clock> {
    union::variant(
        "clock_offset",
        [("utc", clock.utc.is_some()), ("timezone", clock.timezone.is_some())],
    )?;
    Ok(Clock {
        timezone: clock.timezone.clone(),
        utc: clock.utc.as_ref().map(|utc| ClockOffsetUtc {
            offset_seconds: utc.offset_seconds,
        }),
        timer: clock.timer.as_ref().map(|timer| Timer {
            hpet: timer.hpet.as_ref().map(|t| TickTimer {
                present: t.present,
                tick_policy: t.tick_policy.clone(),
            }),
            kvm: timer.kvm.as_ref().map(|t| TimerState { present: t.present }),
            pit: timer.pit.as_ref().map(|t| TickTimer {
                present: t.present,
                tick_policy: t.tick_policy.clone(),
            }),
            rtc: timer.rtc.as_ref().map(|t| RtcTimer {
                present: t.present,
                tick_policy: t.tick_policy.clone(),
                track: t.track.clone(),
            }),
            hyperv: timer.hyperv.as_ref().map(|t| TimerState { present: t.present }),
        }),
    })
}

fn clock_to_transport(clock: &Clock) -> Result<VmClock> {
    union::variant(
        "clock_offset",
        [("utc", clock.utc.is_some()), ("timezone", clock.timezone.is_some())],
    )?;
    Ok(VmClock {
        timezone: clock.timezone.clone(),
        utc: clock.utc.as_ref().map(|utc| VmClockUtc {
            offset_seconds: utc.offset_seconds,
        }),
        timer: clock.timer.as_ref().map(|timer| VmTimer {
            hpet: timer.hpet.as_ref().map(|t| VmTickTimer {
                present: t.present,
                tick_policy: t.tick_policy.clone(),
            }),
            kvm: timer.kvm.as_ref().map(|t| VmTimerState { present: t.present }),
            pit: timer.pit.as_ref().map(|t| VmTickTimer {
                present: t.present,
                tick_policy: t.tick_policy.clone(),
            }),
            rtc: timer.rtc.as_ref().map(|t| VmRtcTimer {
                present: t.present,
                tick_policy: t.tick_policy.clone(),
                track: t.track.clone(),
            }),
            hyperv: timer.hyperv.as_ref().map(|t| VmTimerState { present: t.present }),
        }),
    })
}

fn chassis_to_platform(chassis: &VmChassis) -> Chassis {
    Chassis {
        manufacturer: chassis.manufacturer.clone(),
        version: chassis.version.clone(),
        serial: chassis.serial.clone(),
        asset: chassis.asset.clone(),
        sku: chassis.sku.clone(),
    }
}

fn chassis_to_transport(chassis: &Chassis) -> VmChassis {
    VmChassis {
        manufacturer: chassis.manufacturer.clone(),
        version: chassis.version.clone(),
        serial: chassis.serial.clone(),
        asset: chassis.asset.clone(),
        sku: chassis.sku.clone(),
    }
}

pub fn devices_to_platform(devices: &VmDevices) -> Result<Devices> {
    Ok(Devices {
        disks: non_empty(&map_list("disks", &devices.disks, disk_to_platform)?),
        interfaces: non_empty(&map_list("interfaces", &devices.interfaces, interface_to_platform)?),
        gpus: non_empty(&map_list("gpus", &devices.gpus, gpu_to_platform)?),
        host_devices: non_empty(&map_list("hostDevices", &devices.host_devices, host_device_to_platform)?),
        inputs: non_empty(&map_list("inputs", &devices.inputs, input_to_platform)?),
        autoattach_pod_interface: devices.autoattach_pod_interface,
        autoattach_graphics_device: devices.autoattach_graphics_device,
        network_interface_multiqueue: devices.network_interface_multiqueue,
    })
}

pub fn devices_to_transport(devices: &Devices) -> Result<VmDevices> {
    Ok(VmDevices {
        disks: map_list("disks", devices.disks.as_deref().unwrap_or_default(), disk_to_transport)?,
        interfaces: map_list(
            "interfaces",
            devices.interfaces.as_deref().unwrap_or_default(),
            interface_to_transport,
        )?,
        gpus: devices.gpus.iter().flatten().map(gpu_to_transport).collect(),
        host_devices: devices
            .host_devices
            .iter()
            .flatten()
            .map(|device| VmHostDevice {
                name: Some(device.name.clone()),
                device_name: Some(device.device_name.clone()),
                tag: device.tag.clone(),
            })
            .collect(),
        inputs: devices
            .inputs
            .iter()
            .flatten()
            .map(|input| VmInput {
                name: Some(input.name.clone()),
                type_: Some(input.type_.to_string()),
                bus: input.bus.map(|bus| bus.to_string()),
            })
            .collect(),
        autoattach_pod_interface: devices.autoattach_pod_interface,
        autoattach_graphics_device: devices.autoattach_graphics_device,
        network_interface_multiqueue: devices.network_interface_multiqueue,
    })
}

fn gpu_to_platform(gpu: &VmGpu) -> Result<Gpu> {
    Ok(Gpu {
        name: required(&gpu.name, "name")?,
        device_name: required(&gpu.device_name, "deviceName")?,
        tag: gpu.tag.clone(),
        virtual_gpu_options: gpu.virtual_gpu_options.as_ref().map(|options| VgpuOptions {
            display: options.display.as_ref().map(|display| VgpuDisplay {
                enabled: display.enabled,
                ram_fb: display.ram_fb.as_ref().map(|f| FeatureState { enabled: f.enabled }),
            }),
        }),
    })
}

fn gpu_to_transport(gpu: &Gpu) -> VmGpu {
    VmGpu {
        name: Some(gpu.name.clone()),
        device_name: Some(gpu.device_name.clone()),
        tag: gpu.tag.clone(),
        virtual_gpu_options: gpu.virtual_gpu_options.as_ref().map(|options| VmVgpuOptions {
            display: options.display.as_ref().map(|display| VmVgpuDisplay {
                enabled: display.enabled,
                ram_fb: display.ram_fb.as_ref().map(|f| VmFeatureState { enabled: f.enabled }),
            }),
        }),
    }
}

fn host_device_to_platform(device: &VmHostDevice) -> Result<HostDevice> {
    Ok(HostDevice {
        name: required(&device.name, "name")?,
        device_name: required(&device.device_name, "deviceName")?,
        tag: device.tag.clone(),
    })
}

fn input_to_platform(input: &VmInput) -> Result<Input> {
    Ok(Input {
        name: required(&input.name, "name")?,
        type_: InputType::parse(&required(&input.type_, "type")?).for_field("type")?,
        bus: input.bus.as_deref().map(InputBus::parse).transpose().for_field("bus")?,
    })
}

fn parse_bus(bus: &Option<String>) -> Result<Option<DiskBus>> {
    bus.as_deref().map(DiskBus::parse).transpose()
}

fn disk_to_platform(disk: &VmDisk) -> Result<Disk> {
    let device = union::map_variant(
        "disk_device",
        [
            (
                "disk",
                disk.disk.as_ref().map(|t| -> Result<DiskDevice> {
                    Ok(DiskDevice {
                        disk: Some(DiskTarget {
                            bus: parse_bus(&t.bus)?,
                            read_only: t.read_only,
                            pci_address: t.pci_address.clone(),
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "lun",
                disk.lun.as_ref().map(|t| -> Result<DiskDevice> {
                    Ok(DiskDevice {
                        lun: Some(LunTarget {
                            bus: parse_bus(&t.bus)?,
                            read_only: t.read_only,
                            reservation: t.reservation,
                        }),
                        ..Default::default()
                    })
                }),
            ),
            (
                "cdrom",
                disk.cdrom.as_ref().map(|t| -> Result<DiskDevice> {
                    Ok(DiskDevice {
                        cdrom: Some(CdRomTarget {
                            bus: parse_bus(&t.bus)?,
                            read_only: t.read_only,
                            tray: t.tray.clone(),
                        }),
                        ..Default::default()
                    })
                }),
            ),
        ],
    )?;

    Ok(Disk {
        name: required(&disk.name, "name")?,
        device: device.unwrap_or_default(),
        boot_order: narrow_opt(disk.boot_order, "bootOrder")?,
        serial: disk.serial.clone(),
        dedicated_io_thread: disk.dedicated_io_thread,
    })
}

fn disk_to_transport(disk: &Disk) -> Result<VmDisk> {
    let device = &disk.device;
    union::variant(
        "disk_device",
        [
            ("disk", device.disk.is_some()),
            ("lun", device.lun.is_some()),
            ("cdrom", device.cdrom.is_some()),
        ],
    )?;

    Ok(VmDisk {
        name: Some(disk.name.clone()),
        disk: device.disk.as_ref().map(|t| VmDiskTarget {
            bus: t.bus.map(|b| b.to_string()),
            read_only: t.read_only,
            pci_address: t.pci_address.clone(),
        }),
        lun: device.lun.as_ref().map(|t| VmLunTarget {
            bus: t.bus.map(|b| b.to_string()),
            read_only: t.read_only,
            reservation: t.reservation,
        }),
        cdrom: device.cdrom.as_ref().map(|t| VmCdRomTarget {
            bus: t.bus.map(|b| b.to_string()),
            read_only: t.read_only,
            tray: t.tray.clone(),
        }),
        boot_order: narrow_opt(disk.boot_order, "bootOrder")?,
        serial: disk.serial.clone(),
        dedicated_io_thread: disk.dedicated_io_thread,
    })
}

fn binding_to_platform(iface: &VmInterface) -> Result<InterfaceBindingMethod> {
    let selected = union::variant(
        "interface_binding_method",
        [
            ("bridge", iface.bridge.is_some()),
            ("slirp", iface.slirp.is_some()),
            ("masquerade", iface.masquerade.is_some()),
            ("sriov", iface.sriov.is_some()),
            ("passt", iface.passt.is_some()),
            ("macvtap", iface.macvtap.is_some()),
        ],
    )?;

    let mut binding = InterfaceBindingMethod::default();
    match selected {
        Some("bridge") => binding.bridge = Some(InterfaceBridge {}),
        Some("slirp") => binding.slirp = Some(InterfaceSlirp {}),
        Some("masquerade") => binding.masquerade = Some(InterfaceMasquerade {}),
        Some("sriov") => binding.sriov = Some(InterfaceSriov {}),
        Some("passt") => binding.passt = Some(InterfacePasst {}),
        Some("macvtap") => binding.macvtap = Some(InterfaceMacvtap {}),
        _ => {}
    }
    Ok(binding)
}

fn interface_to_platform(iface: &VmInterface) -> Result<Interface> {
    Ok(Interface {
        name: required(&iface.name, "name")?,
        model: iface.model.clone(),
        binding: binding_to_platform(iface)?,
        ports: non_empty(&map_list("ports", &iface.ports, |p| {
            Ok(Port {
                name: p.name.clone(),
                protocol: p.protocol.clone(),
                port: p.port.ok_or_else(|| ConvertError::MissingField("port".to_string()))?,
            })
        })?),
        mac_address: iface.mac_address.clone(),
        boot_order: narrow_opt(iface.boot_order, "bootOrder")?,
        pci_address: iface.pci_address.clone(),
        acpi_index: iface.acpi_index,
        tag: iface.tag.clone(),
    })
}

fn interface_to_transport(iface: &Interface) -> Result<VmInterface> {
    let binding = &iface.binding;
    union::variant(
        "interface_binding_method",
        [
            ("bridge", binding.bridge.is_some()),
            ("slirp", binding.slirp.is_some()),
            ("masquerade", binding.masquerade.is_some()),
            ("sriov", binding.sriov.is_some()),
            ("passt", binding.passt.is_some()),
            ("macvtap", binding.macvtap.is_some()),
        ],
    )?;

    Ok(VmInterface {
        name: Some(iface.name.clone()),
        model: iface.model.clone(),
        bridge: binding.bridge.as_ref().map(|_| Marker {}),
        slirp: binding.slirp.as_ref().map(|_| Marker {}),
        masquerade: binding.masquerade.as_ref().map(|_| Marker {}),
        sriov: binding.sriov.as_ref().map(|_| Marker {}),
        passt: binding.passt.as_ref().map(|_| Marker {}),
        macvtap: binding.macvtap.as_ref().map(|_| Marker {}),
        ports: iface
            .ports
            .iter()
            .flatten()
            .map(|p| VmPort {
                name: p.name.clone(),
                protocol: p.protocol.clone(),
                port: Some(p.port),
            })
            .collect(),
        mac_address: iface.mac_address.clone(),
        boot_order: narrow_opt(iface.boot_order, "bootOrder")?,
        pci_address: iface.pci_address.clone(),
        acpi_index: iface.acpi_index,
        tag: iface.tag.clone(),
    })
}
