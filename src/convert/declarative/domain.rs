//! CPU, memory, resources, firmware and features

use super::{expand_block, flatten_opt, int_field};
use crate::codec::{parse_bytes, to_quantity_map};
use crate::crd::domain::IoThreadsPolicy;
use crate::error::{Result, ResultExt};
use crate::state::{AttrMap, Fields, MapBuilder};
use crate::transport::domain::*;
use crate::union;

pub fn expand_cpu(fields: &Fields<'_>) -> Result<VmCpu> {
    Ok(VmCpu {
        cores: fields.int_ok("cores")?,
        sockets: fields.int_ok("sockets")?,
        threads: fields.int_ok("threads")?,
        model: fields.string("model")?,
        dedicated_cpu_placement: fields.bool("dedicated_cpu_placement")?,
    })
}

pub fn flatten_cpu(cpu: &VmCpu) -> AttrMap {
    MapBuilder::new()
        .int("cores", cpu.cores)
        .int("sockets", cpu.sockets)
        .int("threads", cpu.threads)
        .str("model", cpu.model.as_deref())
        .bool("dedicated_cpu_placement", cpu.dedicated_cpu_placement)
        .build()
}

pub fn expand_memory(fields: &Fields<'_>) -> Result<VmMemory> {
    let guest = fields.string("guest")?;
    if let Some(guest) = &guest {
        parse_bytes("guest", guest)?;
    }

    Ok(VmMemory {
        guest,
        hugepages: fields
            .string("hugepages")?
            .map(|page_size| VmHugepages {
                page_size: Some(page_size),
            }),
    })
}

pub fn flatten_memory(memory: &VmMemory) -> AttrMap {
    MapBuilder::new()
        .str("guest", memory.guest.as_deref())
        .str(
            "hugepages",
            memory.hugepages.as_ref().and_then(|h| h.page_size.as_deref()),
        )
        .build()
}

pub fn expand_resources(fields: &Fields<'_>) -> Result<VmResourceRequirements> {
    let requests = fields.string_map("requests")?;
    let limits = fields.string_map("limits")?;
    to_quantity_map(&requests).for_field("requests")?;
    to_quantity_map(&limits).for_field("limits")?;

    Ok(VmResourceRequirements {
        requests,
        limits,
        overcommit_guest_overhead: fields.bool("over_commit_guest_overhead")?,
    })
}

pub fn flatten_resources(resources: &VmResourceRequirements) -> AttrMap {
    MapBuilder::new()
        .string_map("requests", &resources.requests)
        .string_map("limits", &resources.limits)
        .set(
            "over_commit_guest_overhead",
            resources.overcommit_guest_overhead.unwrap_or(false),
        )
        .build()
}

pub fn expand_firmware(fields: &Fields<'_>) -> Result<VmFirmware> {
    Ok(VmFirmware {
        uuid: fields.string("uuid")?,
        serial: fields.string("serial")?,
        bootloader: expand_block(fields, "bootloader", expand_bootloader)?,
    })
}

fn expand_bootloader(fields: &Fields<'_>) -> Result<VmBootloader> {
    let bios = fields.block("bios")?;
    let efi = fields.block("efi")?;
    let selected = union::map_variant(
        "bootloader",
        [
            (
                "bios",
                bios.map(|b| -> Result<VmBootloader> {
                    Ok(VmBootloader {
                        bios: Some(VmBios {
                            use_serial: b.bool("use_serial")?,
                        }),
                        efi: None,
                    })
                }),
            ),
            (
                "efi",
                efi.map(|e| -> Result<VmBootloader> {
                    Ok(VmBootloader {
                        bios: None,
                        efi: Some(VmEfi {
                            secure_boot: e.bool("secure_boot")?,
                            persistent: e.bool("persistent")?,
                        }),
                    })
                }),
            ),
        ],
    )?;
    Ok(selected.unwrap_or_default())
}

pub fn flatten_firmware(firmware: &VmFirmware) -> Result<AttrMap> {
    let bootloader = match &firmware.bootloader {
        None => None,
        Some(loader) => {
            union::variant(
                "bootloader",
                [("bios", loader.bios.is_some()), ("efi", loader.efi.is_some())],
            )?;
            Some(
                MapBuilder::new()
                    .block(
                        "bios",
                        flatten_opt(loader.bios.as_ref(), |b| {
                            MapBuilder::new().bool("use_serial", b.use_serial).build()
                        }),
                    )
                    .block(
                        "efi",
                        flatten_opt(loader.efi.as_ref(), |e| {
                            MapBuilder::new()
                                .bool("secure_boot", e.secure_boot)
                                .bool("persistent", e.persistent)
                                .build()
                        }),
                    )
                    .build(),
            )
        }
    };

    Ok(MapBuilder::new()
        .str("uuid", firmware.uuid.as_deref())
        .str("serial", firmware.serial.as_deref())
        .block("bootloader", bootloader)
        .build())
}

fn expand_feature_state(fields: &Fields<'_>) -> Result<VmFeatureState> {
    Ok(VmFeatureState {
        enabled: fields.bool("enabled")?,
    })
}

fn flatten_feature_state(state: &VmFeatureState) -> AttrMap {
    MapBuilder::new()
        .set("enabled", state.enabled.unwrap_or(false))
        .build()
}

pub fn expand_features(fields: &Fields<'_>) -> Result<VmFeatures> {
    Ok(VmFeatures {
        acpi: expand_block(fields, "acpi", expand_feature_state)?,
        apic: expand_block(fields, "apic", |apic| {
            Ok(VmFeatureApic {
                enabled: apic.bool("enabled")?,
                end_of_interrupt: apic.bool("end_of_interrupt")?,
            })
        })?,
        smm: expand_block(fields, "smm", expand_feature_state)?,
    })
}

pub fn flatten_features(features: &VmFeatures) -> AttrMap {
    MapBuilder::new()
        .block("acpi", flatten_opt(features.acpi.as_ref(), flatten_feature_state))
        .block(
            "apic",
            flatten_opt(features.apic.as_ref(), |apic| {
                MapBuilder::new()
                    .set("enabled", apic.enabled.unwrap_or(false))
                    .bool("end_of_interrupt", apic.end_of_interrupt)
                    .build()
            }),
        )
        .block("smm", flatten_opt(features.smm.as_ref(), flatten_feature_state))
        .build()
}

pub fn expand_clock(fields: &Fields<'_>) -> Result<VmClock> {
    let timezone = fields.string("timezone")?;
    let utc = expand_block(fields, "utc", |utc| {
        Ok(VmClockUtc {
            offset_seconds: int_field(utc, "offset_seconds")?,
        })
    })?;
    union::variant(
        "clock_offset",
        [("utc", utc.is_some()), ("timezone", timezone.is_some())],
    )?;

    Ok(VmClock {
        timezone,
        utc,
        timer: expand_block(fields, "timer", expand_timer)?,
    })
}

fn expand_timer_state(fields: &Fields<'_>) -> Result<VmTimerState> {
    Ok(VmTimerState {
        present: fields.bool("present")?,
    })
}

fn expand_tick_timer(fields: &Fields<'_>) -> Result<VmTickTimer> {
    Ok(VmTickTimer {
        present: fields.bool("present")?,
        tick_policy: fields.string("tick_policy")?,
    })
}

fn expand_timer(fields: &Fields<'_>) -> Result<VmTimer> {
    Ok(VmTimer {
        hpet: expand_block(fields, "hpet", expand_tick_timer)?,
        kvm: expand_block(fields, "kvm", expand_timer_state)?,
        pit: expand_block(fields, "pit", expand_tick_timer)?,
        rtc: expand_block(fields, "rtc", |rtc| {
            Ok(VmRtcTimer {
                present: rtc.bool("present")?,
                tick_policy: rtc.string("tick_policy")?,
                track: rtc.string("track")?,
            })
        })?,
        hyperv: expand_block(fields, "hyperv", expand_timer_state)?,
    })
}

fn flatten_timer_state(state: &VmTimerState) -> AttrMap {
    MapBuilder::new().bool("present", state.present).build()
}

fn flatten_tick_timer(timer: &VmTickTimer) -> AttrMap {
    MapBuilder::new()
        .bool("present", timer.present)
        .str("tick_policy", timer.tick_policy.as_deref())
        .build()
}

pub fn flatten_clock(clock: &VmClock) -> Result<AttrMap> {
    union::variant(
        "clock_offset",
        [("utc", clock.utc.is_some()), ("timezone", clock.timezone.is_some())],
    )?;

    let timer = clock.timer.as_ref().map(|timer| {
        MapBuilder::new()
            .block("hpet", flatten_opt(timer.hpet.as_ref(), flatten_tick_timer))
            .block("kvm", flatten_opt(timer.kvm.as_ref(), flatten_timer_state))
            .block("pit", flatten_opt(timer.pit.as_ref(), flatten_tick_timer))
            .block(
                "rtc",
                flatten_opt(timer.rtc.as_ref(), |rtc| {
                    MapBuilder::new()
                        .bool("present", rtc.present)
                        .str("tick_policy", rtc.tick_policy.as_deref())
                        .str("track", rtc.track.as_deref())
                        .build()
                }),
            )
            .block("hyperv", flatten_opt(timer.hyperv.as_ref(), flatten_timer_state))
            .build()
    });

    Ok(MapBuilder::new()
        .str("timezone", clock.timezone.as_deref())
        .block(
            "utc",
            flatten_opt(clock.utc.as_ref(), |utc| {
                MapBuilder::new().int("offset_seconds", utc.offset_seconds).build()
            }),
        )
        .block("timer", timer)
        .build())
}

pub fn expand_chassis(fields: &Fields<'_>) -> Result<VmChassis> {
    Ok(VmChassis {
        manufacturer: fields.string("manufacturer")?,
        version: fields.string("version")?,
        serial: fields.string("serial")?,
        asset: fields.string("asset")?,
        sku: fields.string("sku")?,
    })
}

pub fn flatten_chassis(chassis: &VmChassis) -> AttrMap {
    MapBuilder::new()
        .str("manufacturer", chassis.manufacturer.as_deref())
        .str("version", chassis.version.as_deref())
        .str("serial", chassis.serial.as_deref())
        .str("asset", chassis.asset.as_deref())
        .str("sku", chassis.sku.as_deref())
        .build()
}

pub fn expand_launch_security(fields: &Fields<'_>) -> Result<VmLaunchSecurity> {
    Ok(VmLaunchSecurity {
        sev: fields.block("sev")?.map(|_| Marker {}),
    })
}

pub fn flatten_launch_security(security: &VmLaunchSecurity) -> AttrMap {
    MapBuilder::new()
        .block("sev", security.sev.map(|_| AttrMap::new()))
        .build()
}

pub fn expand_io_threads_policy(fields: &Fields<'_>) -> Result<Option<String>> {
    let policy = fields.string("io_threads_policy")?;
    if let Some(policy) = &policy {
        IoThreadsPolicy::parse(policy).for_field("io_threads_policy")?;
    }
    Ok(policy)
}
