//! Volumes and networks
//!
//! Declaratively the volume source union lives in a nested `volume_source`
//! block and the network source in `network_source`; both are flattened onto
//! the transport object.

use super::{expand_block, expand_blocks, flatten_opt, int_field};
use crate::codec::to_quantity;
use crate::enums::HostDiskType;
use crate::error::{Result, ResultExt};
use crate::state::{AttrMap, Fields, MapBuilder};
use crate::transport::domain::Marker;
use crate::transport::volume::*;
use crate::union;

pub fn expand_volume(fields: &Fields<'_>) -> Result<VmVolume> {
    let mut volume = VmVolume {
        name: fields.string("name")?,
        ..Default::default()
    };
    if let Some(source) = fields.block("volume_source")? {
        expand_volume_source(&source, &mut volume).for_field("volume_source")?;
    }
    Ok(volume)
}

const VOLUME_SOURCES: [&str; 15] = [
    "data_volume",
    "container_disk",
    "cloud_init_no_cloud",
    "cloud_init_config_drive",
    "persistent_volume_claim",
    "empty_disk",
    "host_disk",
    "config_map",
    "ephemeral",
    "service_account",
    "sysprep",
    "secret",
    "downward_api",
    "downward_metrics",
    "memory_dump",
];

fn expand_volume_source(fields: &Fields<'_>, volume: &mut VmVolume) -> Result<()> {
    let present = VOLUME_SOURCES
        .iter()
        .map(|name| Ok((*name, fields.block(name)?.is_some())))
        .collect::<Result<Vec<_>>>()?;
    union::variant("volume_source", present)?;

    volume.data_volume = expand_block(fields, "data_volume", |dv| {
        Ok(VmDataVolumeRef {
            name: dv.string("name")?,
            hotpluggable: dv.bool("hotpluggable")?,
        })
    })?;
    volume.container_disk = expand_block(fields, "container_disk", |disk| {
        Ok(VmContainerDisk {
            image: disk.string("image_url")?,
            image_pull_secret: disk.string("image_pull_secret")?,
            image_pull_policy: disk.string("image_pull_policy")?,
            path: disk.string("path")?,
        })
    })?;
    volume.cloud_init_no_cloud = expand_block(fields, "cloud_init_no_cloud", expand_cloud_init)?;
    volume.cloud_init_config_drive =
        expand_block(fields, "cloud_init_config_drive", expand_cloud_init)?;
    volume.persistent_volume_claim = expand_block(fields, "persistent_volume_claim", |pvc| {
        Ok(VmPvcSource {
            claim_name: pvc.string("claim_name")?,
            read_only: pvc.bool("read_only")?,
            hotpluggable: pvc.bool("hotpluggable")?,
        })
    })?;
    volume.empty_disk = expand_block(fields, "empty_disk", |disk| {
        let capacity = disk.string("capacity")?;
        if let Some(capacity) = &capacity {
            to_quantity("capacity", capacity)?;
        }
        Ok(VmEmptyDisk { capacity })
    })?;
    volume.host_disk = expand_block(fields, "host_disk", expand_host_disk)?;
    volume.config_map = expand_block(fields, "config_map", |cm| {
        Ok(VmConfigMapSource {
            name: cm.string("name")?,
            optional: cm.bool("optional")?,
            volume_label: cm.string("volume_label")?,
        })
    })?;
    volume.ephemeral = expand_block(fields, "ephemeral", |eph| {
        Ok(VmEphemeral {
            persistent_volume_claim: expand_block(eph, "persistent_volume_claim", |pvc| {
                Ok(VmClaimReference {
                    claim_name: pvc.string("claim_name")?,
                    read_only: pvc.bool("read_only")?,
                })
            })?,
        })
    })?;
    volume.service_account = expand_block(fields, "service_account", |sa| {
        Ok(VmServiceAccount {
            service_account_name: sa.string("service_account_name")?,
        })
    })?;
    volume.sysprep = expand_block(fields, "sysprep", |sysprep| {
        union::variant(
            "sysprep",
            [
                ("config_map", sysprep.block("config_map")?.is_some()),
                ("secret", sysprep.block("secret")?.is_some()),
            ],
        )?;
        Ok(VmSysprep {
            config_map: expand_block(sysprep, "config_map", expand_local_ref)?,
            secret: expand_block(sysprep, "secret", expand_local_ref)?,
        })
    })?;
    volume.secret = expand_block(fields, "secret", |secret| {
        Ok(VmSecretSource {
            secret_name: secret.string("secret_name")?,
            optional: secret.bool("optional")?,
            volume_label: secret.string("volume_label")?,
        })
    })?;
    volume.downward_api = expand_block(fields, "downward_api", |api| {
        Ok(VmDownwardApi {
            fields: expand_blocks(api, "field", expand_downward_file)?,
            volume_label: api.string("volume_label")?,
        })
    })?;
    volume.downward_metrics = fields.block("downward_metrics")?.map(|_| Marker {});
    volume.memory_dump = expand_block(fields, "memory_dump", |dump| {
        Ok(VmPvcSource {
            claim_name: dump.string("claim_name")?,
            read_only: dump.bool("read_only")?,
            hotpluggable: dump.bool("hotpluggable")?,
        })
    })?;
    Ok(())
}

fn expand_downward_file(fields: &Fields<'_>) -> Result<VmDownwardApiFile> {
    Ok(VmDownwardApiFile {
        path: fields.string("path")?,
        field_ref: expand_block(fields, "field_ref", |r| {
            Ok(VmObjectFieldSelector {
                field_path: r.string("field_path")?,
                api_version: r.string("api_version")?,
            })
        })?,
        resource_field_ref: expand_block(fields, "resource_field_ref", |r| {
            let divisor = r.string("divisor")?;
            if let Some(divisor) = &divisor {
                to_quantity("divisor", divisor)?;
            }
            Ok(VmResourceFieldSelector {
                container_name: r.string("container_name")?,
                resource: r.string("resource")?,
                divisor,
            })
        })?,
        mode: int_field(fields, "mode")?,
    })
}

fn flatten_downward_file(file: &VmDownwardApiFile) -> AttrMap {
    MapBuilder::new()
        .str("path", file.path.as_deref())
        .block(
            "field_ref",
            flatten_opt(file.field_ref.as_ref(), |r| {
                MapBuilder::new()
                    .str("field_path", r.field_path.as_deref())
                    .str("api_version", r.api_version.as_deref())
                    .build()
            }),
        )
        .block(
            "resource_field_ref",
            flatten_opt(file.resource_field_ref.as_ref(), |r| {
                MapBuilder::new()
                    .str("container_name", r.container_name.as_deref())
                    .str("resource", r.resource.as_deref())
                    .str("divisor", r.divisor.as_deref())
                    .build()
            }),
        )
        .int("mode", file.mode)
        .build()
}

fn expand_host_disk(fields: &Fields<'_>) -> Result<VmHostDisk> {
    let type_ = fields.string("type")?;
    if let Some(type_) = &type_ {
        HostDiskType::parse(type_).for_field("type")?;
    }
    Ok(VmHostDisk {
        path: fields.string("path")?,
        type_,
        capacity: fields.string("capacity")?,
        shared: fields.bool("shared")?,
    })
}

fn expand_local_ref(fields: &Fields<'_>) -> Result<VmLocalObjectReference> {
    Ok(VmLocalObjectReference {
        name: fields.string("name")?,
    })
}

fn expand_cloud_init(fields: &Fields<'_>) -> Result<VmCloudInit> {
    Ok(VmCloudInit {
        user_data_secret_ref: expand_block(fields, "user_data_secret_ref", expand_local_ref)?,
        user_data_base64: fields.string("user_data_base64")?,
        user_data: fields.string("user_data")?,
        network_data_secret_ref: expand_block(fields, "network_data_secret_ref", expand_local_ref)?,
        network_data_base64: fields.string("network_data_base64")?,
        network_data: fields.string("network_data")?,
    })
}

fn flatten_local_ref(reference: &VmLocalObjectReference) -> AttrMap {
    MapBuilder::new().str("name", reference.name.as_deref()).build()
}

fn flatten_cloud_init(cloud_init: &VmCloudInit) -> AttrMap {
    MapBuilder::new()
        .block(
            "user_data_secret_ref",
            flatten_opt(cloud_init.user_data_secret_ref.as_ref(), flatten_local_ref),
        )
        .str("user_data_base64", cloud_init.user_data_base64.as_deref())
        .str("user_data", cloud_init.user_data.as_deref())
        .block(
            "network_data_secret_ref",
            flatten_opt(cloud_init.network_data_secret_ref.as_ref(), flatten_local_ref),
        )
        .str("network_data_base64", cloud_init.network_data_base64.as_deref())
        .str("network_data", cloud_init.network_data.as_deref())
        .build()
}

pub fn flatten_volume(volume: &VmVolume) -> Result<AttrMap> {
    let selected = union::variant(
        "volume_source",
        [
            ("data_volume", volume.data_volume.is_some()),
            ("container_disk", volume.container_disk.is_some()),
            ("cloud_init_no_cloud", volume.cloud_init_no_cloud.is_some()),
            ("cloud_init_config_drive", volume.cloud_init_config_drive.is_some()),
            ("persistent_volume_claim", volume.persistent_volume_claim.is_some()),
            ("empty_disk", volume.empty_disk.is_some()),
            ("host_disk", volume.host_disk.is_some()),
            ("config_map", volume.config_map.is_some()),
            ("ephemeral", volume.ephemeral.is_some()),
            ("service_account", volume.service_account.is_some()),
            ("sysprep", volume.sysprep.is_some()),
            ("secret", volume.secret.is_some()),
            ("downward_api", volume.downward_api.is_some()),
            ("downward_metrics", volume.downward_metrics.is_some()),
            ("memory_dump", volume.memory_dump.is_some()),
        ],
    )?;

    let source = selected.map(|_| {
        MapBuilder::new()
            .block(
                "data_volume",
                flatten_opt(volume.data_volume.as_ref(), |dv| {
                    MapBuilder::new()
                        .str("name", dv.name.as_deref())
                        .bool("hotpluggable", dv.hotpluggable)
                        .build()
                }),
            )
            .block(
                "container_disk",
                flatten_opt(volume.container_disk.as_ref(), |disk| {
                    MapBuilder::new()
                        .str("image_url", disk.image.as_deref())
                        .str("image_pull_secret", disk.image_pull_secret.as_deref())
                        .str("image_pull_policy", disk.image_pull_policy.as_deref())
                        .str("path", disk.path.as_deref())
                        .build()
                }),
            )
            .block(
                "cloud_init_no_cloud",
                flatten_opt(volume.cloud_init_no_cloud.as_ref(), flatten_cloud_init),
            )
            .block(
                "cloud_init_config_drive",
                flatten_opt(volume.cloud_init_config_drive.as_ref(), flatten_cloud_init),
            )
            .block(
                "persistent_volume_claim",
                flatten_opt(volume.persistent_volume_claim.as_ref(), |pvc| {
                    MapBuilder::new()
                        .str("claim_name", pvc.claim_name.as_deref())
                        .bool("read_only", pvc.read_only)
                        .bool("hotpluggable", pvc.hotpluggable)
                        .build()
                }),
            )
            .block(
                "empty_disk",
                flatten_opt(volume.empty_disk.as_ref(), |disk| {
                    MapBuilder::new()
                        .str("capacity", disk.capacity.as_deref())
                        .build()
                }),
            )
            .block(
                "host_disk",
                flatten_opt(volume.host_disk.as_ref(), |disk| {
                    MapBuilder::new()
                        .str("path", disk.path.as_deref())
                        .str("type", disk.type_.as_deref())
                        .str("capacity", disk.capacity.as_deref())
                        .bool("shared", disk.shared)
                        .build()
                }),
            )
            .block(
                "config_map",
                flatten_opt(volume.config_map.as_ref(), |cm| {
                    MapBuilder::new()
                        .str("name", cm.name.as_deref())
                        .bool("optional", cm.optional)
                        .str("volume_label", cm.volume_label.as_deref())
                        .build()
                }),
            )
            .block(
                "ephemeral",
                flatten_opt(volume.ephemeral.as_ref(), |eph| {
                    MapBuilder::new()
                        .block(
                            "persistent_volume_claim",
                            flatten_opt(eph.persistent_volume_claim.as_ref(), |pvc| {
                                MapBuilder::new()
                                    .str("claim_name", pvc.claim_name.as_deref())
                                    .bool("read_only", pvc.read_only)
                                    .build()
                            }),
                        )
                        .build()
                }),
            )
            .block(
                "service_account",
                flatten_opt(volume.service_account.as_ref(), |sa| {
                    MapBuilder::new()
                        .str("service_account_name", sa.service_account_name.as_deref())
                        .build()
                }),
            )
            .block(
                "sysprep",
                flatten_opt(volume.sysprep.as_ref(), |sysprep| {
                    MapBuilder::new()
                        .block("config_map", flatten_opt(sysprep.config_map.as_ref(), flatten_local_ref))
                        .block("secret", flatten_opt(sysprep.secret.as_ref(), flatten_local_ref))
                        .build()
                }),
            )
            .block(
                "secret",
                flatten_opt(volume.secret.as_ref(), |secret| {
                    MapBuilder::new()
                        .str("secret_name", secret.secret_name.as_deref())
                        .bool("optional", secret.optional)
                        .str("volume_label", secret.volume_label.as_deref())
                        .build()
                }),
            )
            .block(
                "downward_api",
                flatten_opt(volume.downward_api.as_ref(), |api| {
                    MapBuilder::new()
                        .blocks("field", api.fields.iter().map(flatten_downward_file).collect())
                        .str("volume_label", api.volume_label.as_deref())
                        .build()
                }),
            )
            .block("downward_metrics", volume.downward_metrics.map(|_| AttrMap::new()))
            .block(
                "memory_dump",
                flatten_opt(volume.memory_dump.as_ref(), |dump| {
                    MapBuilder::new()
                        .str("claim_name", dump.claim_name.as_deref())
                        .bool("read_only", dump.read_only)
                        .bool("hotpluggable", dump.hotpluggable)
                        .build()
                }),
            )
            .build()
    });

    Ok(MapBuilder::new()
        .str("name", volume.name.as_deref())
        .block("volume_source", source)
        .build())
}

pub fn expand_network(fields: &Fields<'_>) -> Result<VmNetwork> {
    let mut network = VmNetwork {
        name: fields.string("name")?,
        ..Default::default()
    };
    if let Some(source) = fields.block("network_source")? {
        let pod = source.block("pod")?;
        let multus = source.block("multus")?;
        union::variant(
            "network_source",
            [("pod", pod.is_some()), ("multus", multus.is_some())],
        )?;
        network.pod = pod
            .map(|pod| -> Result<VmPodNetwork> {
                Ok(VmPodNetwork {
                    vm_network_cidr: pod.string("vm_network_cidr")?,
                    vm_ipv6_network_cidr: pod.string("vm_ipv6_network_cidr")?,
                })
            })
            .transpose()
            .for_field("network_source")?;
        network.multus = multus
            .map(|multus| -> Result<VmMultusNetwork> {
                Ok(VmMultusNetwork {
                    network_name: multus.string("network_name")?,
                    default: multus.bool("default")?,
                })
            })
            .transpose()
            .for_field("network_source")?;
    }
    Ok(network)
}

pub fn flatten_network(network: &VmNetwork) -> Result<AttrMap> {
    let selected = union::variant(
        "network_source",
        [("pod", network.pod.is_some()), ("multus", network.multus.is_some())],
    )?;
    let source = selected.map(|_| {
        MapBuilder::new()
            .block(
                "pod",
                flatten_opt(network.pod.as_ref(), |pod| {
                    MapBuilder::new()
                        .str("vm_network_cidr", pod.vm_network_cidr.as_deref())
                        .str("vm_ipv6_network_cidr", pod.vm_ipv6_network_cidr.as_deref())
                        .build()
                }),
            )
            .block(
                "multus",
                flatten_opt(network.multus.as_ref(), |multus| {
                    MapBuilder::new()
                        .str("network_name", multus.network_name.as_deref())
                        .bool("default", multus.default)
                        .build()
                }),
            )
            .build()
    });

    Ok(MapBuilder::new()
        .str("name", network.name.as_deref())
        .block("network_source", source)
        .build())
}
