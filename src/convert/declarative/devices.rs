//! Disks, network interfaces and passthrough devices

use super::{expand_block, expand_blocks, flatten_opt, int_ok_field, try_flatten_list};
use crate::crd::domain::{InputBus, InputType};
use crate::enums::BindingMethod;
use crate::error::{ConvertError, Result, ResultExt};
use crate::state::{Attr, AttrMap, Fields, MapBuilder};
use crate::transport::domain::*;
use crate::union;

/// Build the transport device list from the flat `disk`, `interface`, `gpu`,
/// `host_device`, `input` and `autoattach_pod_interface` keys
pub fn expand_devices(fields: &Fields<'_>) -> Result<Option<VmDevices>> {
    let devices = VmDevices {
        disks: expand_blocks(fields, "disk", expand_disk)?,
        interfaces: expand_blocks(fields, "interface", expand_interface)?,
        gpus: expand_blocks(fields, "gpu", expand_gpu)?,
        host_devices: expand_blocks(fields, "host_device", |device| {
            Ok(VmHostDevice {
                name: device.string("name")?,
                device_name: device.string("device_name")?,
                tag: device.string("tag")?,
            })
        })?,
        inputs: expand_blocks(fields, "input", expand_input)?,
        autoattach_pod_interface: fields.bool("autoattach_pod_interface")?,
        ..Default::default()
    };
    Ok((devices != VmDevices::default()).then_some(devices))
}

pub fn expand_disk(fields: &Fields<'_>) -> Result<VmDisk> {
    let mut disk = VmDisk {
        name: fields.string("name")?,
        boot_order: int_ok_field(fields, "boot_order")?,
        serial: fields.string("serial")?,
        dedicated_io_thread: fields.bool("dedicated_io_thread")?,
        ..Default::default()
    };

    if let Some(device) = fields.block("disk_device")? {
        expand_disk_device(&device, &mut disk).for_field("disk_device")?;
    }
    Ok(disk)
}

fn expand_disk_device(fields: &Fields<'_>, disk: &mut VmDisk) -> Result<()> {
    let target = fields.block("disk")?;
    let lun = fields.block("lun")?;
    let cdrom = fields.block("cdrom")?;

    union::variant(
        "disk_device",
        [
            ("disk", target.is_some()),
            ("lun", lun.is_some()),
            ("cdrom", cdrom.is_some()),
        ],
    )?;

    if let Some(target) = target {
        disk.disk = Some(VmDiskTarget {
            bus: target.string("bus")?,
            read_only: target.bool("read_only")?,
            pci_address: target.string("pci_address")?,
        });
    }
    if let Some(lun) = lun {
        disk.lun = Some(VmLunTarget {
            bus: lun.string("bus")?,
            read_only: lun.bool("read_only")?,
            reservation: lun.bool("reservation")?,
        });
    }
    if let Some(cdrom) = cdrom {
        disk.cdrom = Some(VmCdRomTarget {
            bus: cdrom.string("bus")?,
            read_only: cdrom.bool("read_only")?,
            tray: cdrom.string("tray")?,
        });
    }
    Ok(())
}

pub fn flatten_disk(disk: &VmDisk) -> Result<AttrMap> {
    union::variant(
        "disk_device",
        [
            ("disk", disk.disk.is_some()),
            ("lun", disk.lun.is_some()),
            ("cdrom", disk.cdrom.is_some()),
        ],
    )?;

    let device = if let Some(target) = &disk.disk {
        Some(MapBuilder::new().block(
            "disk",
            Some(
                MapBuilder::new()
                    .str("bus", target.bus.as_deref())
                    .bool("read_only", target.read_only)
                    .str("pci_address", target.pci_address.as_deref())
                    .build(),
            ),
        ))
    } else if let Some(lun) = &disk.lun {
        Some(MapBuilder::new().block(
            "lun",
            Some(
                MapBuilder::new()
                    .str("bus", lun.bus.as_deref())
                    .bool("read_only", lun.read_only)
                    .bool("reservation", lun.reservation)
                    .build(),
            ),
        ))
    } else {
        disk.cdrom.as_ref().map(|cdrom| {
            MapBuilder::new().block(
                "cdrom",
                Some(
                    MapBuilder::new()
                        .str("bus", cdrom.bus.as_deref())
                        .bool("read_only", cdrom.read_only)
                        .str("tray", cdrom.tray.as_deref())
                        .build(),
                ),
            )
        })
    };

    Ok(MapBuilder::new()
        .str("name", disk.name.as_deref())
        .str("serial", disk.serial.as_deref())
        .int("boot_order", disk.boot_order.filter(|order| *order > 0))
        .bool("dedicated_io_thread", disk.dedicated_io_thread)
        .block("disk_device", device.map(MapBuilder::build))
        .build())
}

pub fn expand_interface(fields: &Fields<'_>) -> Result<VmInterface> {
    let mut interface = VmInterface {
        name: fields.string("name")?,
        model: fields.string("model")?,
        mac_address: fields.string("mac_address")?,
        boot_order: int_ok_field(fields, "boot_order")?,
        pci_address: fields.string("pci_address")?,
        acpi_index: int_ok_field(fields, "acpi_index")?,
        tag: fields.string("tag")?,
        ports: expand_blocks(fields, "ports", expand_port)?,
        ..Default::default()
    };

    let method = fields
        .str("interface_binding_method")?
        .map(BindingMethod::parse)
        .transpose()
        .for_field("interface_binding_method")?;
    let marker = Some(Marker {});
    match method {
        None => {}
        Some(BindingMethod::Bridge) => interface.bridge = marker,
        Some(BindingMethod::Slirp) => interface.slirp = marker,
        Some(BindingMethod::Masquerade) => interface.masquerade = marker,
        Some(BindingMethod::Sriov) => interface.sriov = marker,
        Some(BindingMethod::Passt) => interface.passt = marker,
        Some(BindingMethod::Macvtap) => interface.macvtap = marker,
    }
    Ok(interface)
}

fn expand_port(fields: &Fields<'_>) -> Result<VmPort> {
    let port = int_ok_field(fields, "port")?;
    if port.is_none() {
        return Err(ConvertError::MissingField("port".to_string()));
    }
    Ok(VmPort {
        name: fields.string("name")?,
        protocol: fields.string("protocol")?,
        port,
    })
}

fn binding_method(interface: &VmInterface) -> Result<Option<BindingMethod>> {
    let selected = union::variant(
        "interface_binding_method",
        [
            ("bridge", interface.bridge.is_some()),
            ("slirp", interface.slirp.is_some()),
            ("masquerade", interface.masquerade.is_some()),
            ("sriov", interface.sriov.is_some()),
            ("passt", interface.passt.is_some()),
            ("macvtap", interface.macvtap.is_some()),
        ],
    )?;
    Ok(selected.map(|name| match name {
        "bridge" => BindingMethod::Bridge,
        "slirp" => BindingMethod::Slirp,
        "masquerade" => BindingMethod::Masquerade,
        "sriov" => BindingMethod::Sriov,
        "passt" => BindingMethod::Passt,
        _ => BindingMethod::Macvtap,
    }))
}

pub fn flatten_interface(interface: &VmInterface) -> Result<AttrMap> {
    let ports = interface
        .ports
        .iter()
        .map(|port| {
            MapBuilder::new()
                .str("name", port.name.as_deref())
                .str("protocol", port.protocol.as_deref())
                .int("port", port.port)
                .build()
        })
        .collect();

    Ok(MapBuilder::new()
        .str("name", interface.name.as_deref())
        .str("model", interface.model.as_deref())
        .str(
            "interface_binding_method",
            binding_method(interface)?.map(|method| method.as_str()),
        )
        .str("mac_address", interface.mac_address.as_deref())
        .int("boot_order", interface.boot_order.filter(|order| *order > 0))
        .str("pci_address", interface.pci_address.as_deref())
        .int("acpi_index", interface.acpi_index)
        .str("tag", interface.tag.as_deref())
        .blocks("ports", ports)
        .build())
}

fn expand_gpu(fields: &Fields<'_>) -> Result<VmGpu> {
    Ok(VmGpu {
        name: fields.string("name")?,
        device_name: fields.string("device_name")?,
        tag: fields.string("tag")?,
        virtual_gpu_options: expand_block(fields, "virtual_gpu_options", |options| {
            Ok(VmVgpuOptions {
                display: expand_block(options, "display", |display| {
                    Ok(VmVgpuDisplay {
                        enabled: display.bool("enabled")?,
                        ram_fb: expand_block(display, "ram_fb", |ram_fb| {
                            Ok(VmFeatureState {
                                enabled: ram_fb.bool("enabled")?,
                            })
                        })?,
                    })
                })?,
            })
        })?,
    })
}

fn flatten_gpu(gpu: &VmGpu) -> AttrMap {
    let options = gpu.virtual_gpu_options.as_ref().map(|options| {
        MapBuilder::new()
            .block(
                "display",
                flatten_opt(options.display.as_ref(), |display| {
                    MapBuilder::new()
                        .bool("enabled", display.enabled)
                        .block(
                            "ram_fb",
                            flatten_opt(display.ram_fb.as_ref(), |ram_fb| {
                                MapBuilder::new().bool("enabled", ram_fb.enabled).build()
                            }),
                        )
                        .build()
                }),
            )
            .build()
    });

    MapBuilder::new()
        .str("name", gpu.name.as_deref())
        .str("device_name", gpu.device_name.as_deref())
        .str("tag", gpu.tag.as_deref())
        .block("virtual_gpu_options", options)
        .build()
}

fn flatten_host_device(device: &VmHostDevice) -> AttrMap {
    MapBuilder::new()
        .str("name", device.name.as_deref())
        .str("device_name", device.device_name.as_deref())
        .str("tag", device.tag.as_deref())
        .build()
}

fn expand_input(fields: &Fields<'_>) -> Result<VmInput> {
    let type_ = fields.string("type")?;
    if let Some(type_) = &type_ {
        InputType::parse(type_).for_field("type")?;
    }
    let bus = fields.string("bus")?;
    if let Some(bus) = &bus {
        InputBus::parse(bus).for_field("bus")?;
    }
    Ok(VmInput {
        name: fields.string("name")?,
        type_,
        bus,
    })
}

fn flatten_input(input: &VmInput) -> AttrMap {
    MapBuilder::new()
        .str("name", input.name.as_deref())
        .str("type", input.type_.as_deref())
        .str("bus", input.bus.as_deref())
        .build()
}

/// Flatten devices back onto the flat VM keys
pub fn flatten_devices(devices: &VmDevices) -> Result<Vec<(&'static str, Attr)>> {
    let mut out = Vec::new();
    let disks = try_flatten_list(&devices.disks, "disk", flatten_disk)?;
    if !disks.is_empty() {
        out.push(("disk", Attr::blocks(disks)));
    }
    let interfaces = try_flatten_list(&devices.interfaces, "interface", flatten_interface)?;
    if !interfaces.is_empty() {
        out.push(("interface", Attr::blocks(interfaces)));
    }
    let gpus: Vec<AttrMap> = devices.gpus.iter().map(flatten_gpu).collect();
    if !gpus.is_empty() {
        out.push(("gpu", Attr::blocks(gpus)));
    }
    let host_devices: Vec<AttrMap> = devices.host_devices.iter().map(flatten_host_device).collect();
    if !host_devices.is_empty() {
        out.push(("host_device", Attr::blocks(host_devices)));
    }
    let inputs: Vec<AttrMap> = devices.inputs.iter().map(flatten_input).collect();
    if !inputs.is_empty() {
        out.push(("input", Attr::blocks(inputs)));
    }
    if let Some(autoattach) = devices.autoattach_pod_interface {
        out.push(("autoattach_pod_interface", autoattach.into()));
    }
    Ok(out)
}
