//! Volume and network mapping

use super::{map_list, non_empty, required};
use crate::codec::to_quantity;
use crate::crd::volume::*;
use crate::enums::HostDiskType;
use crate::error::{ConvertError, Result};
use crate::transport::domain::Marker;
use crate::transport::volume::*;
use crate::union;
use k8s_openapi::api::core::v1::{DownwardAPIVolumeFile, ObjectFieldSelector, ResourceFieldSelector};

const VOLUME_SOURCE: &str = "volume_source";
const NETWORK_SOURCE: &str = "network_source";

fn local_ref_to_platform(reference: &VmLocalObjectReference) -> Result<LocalObjectReference> {
    Ok(LocalObjectReference {
        name: required(&reference.name, "name")?,
    })
}

fn local_ref_to_transport(reference: &LocalObjectReference) -> VmLocalObjectReference {
    VmLocalObjectReference {
        name: Some(reference.name.clone()),
    }
}

fn cloud_init_to_platform(source: &VmCloudInit) -> Result<CloudInitSource> {
    Ok(CloudInitSource {
        user_data_secret_ref: source
            .user_data_secret_ref
            .as_ref()
            .map(local_ref_to_platform)
            .transpose()?,
        user_data_base64: source.user_data_base64.clone(),
        user_data: source.user_data.clone(),
        network_data_secret_ref: source
            .network_data_secret_ref
            .as_ref()
            .map(local_ref_to_platform)
            .transpose()?,
        network_data_base64: source.network_data_base64.clone(),
        network_data: source.network_data.clone(),
    })
}

fn cloud_init_to_transport(source: &CloudInitSource) -> VmCloudInit {
    VmCloudInit {
        user_data_secret_ref: source.user_data_secret_ref.as_ref().map(local_ref_to_transport),
        user_data_base64: source.user_data_base64.clone(),
        user_data: source.user_data.clone(),
        network_data_secret_ref: source.network_data_secret_ref.as_ref().map(local_ref_to_transport),
        network_data_base64: source.network_data_base64.clone(),
        network_data: source.network_data.clone(),
    }
}

fn downward_file_to_platform(file: &VmDownwardApiFile) -> Result<DownwardAPIVolumeFile> {
    Ok(DownwardAPIVolumeFile {
        path: required(&file.path, "path")?,
        mode: file.mode,
        field_ref: file
            .field_ref
            .as_ref()
            .map(|r| -> Result<ObjectFieldSelector> {
                Ok(ObjectFieldSelector {
                    field_path: required(&r.field_path, "fieldPath")?,
                    api_version: r.api_version.clone(),
                })
            })
            .transpose()
            .map_err(|e| e.in_field("fieldRef"))?,
        resource_field_ref: file
            .resource_field_ref
            .as_ref()
            .map(|r| -> Result<ResourceFieldSelector> {
                Ok(ResourceFieldSelector {
                    resource: required(&r.resource, "resource")?,
                    container_name: r.container_name.clone(),
                    divisor: r.divisor.as_deref().map(|d| to_quantity("divisor", d)).transpose()?,
                })
            })
            .transpose()
            .map_err(|e| e.in_field("resourceFieldRef"))?,
    })
}

fn downward_file_to_transport(file: &DownwardAPIVolumeFile) -> VmDownwardApiFile {
    VmDownwardApiFile {
        path: Some(file.path.clone()),
        field_ref: file.field_ref.as_ref().map(|r| VmObjectFieldSelector {
            field_path: Some(r.field_path.clone()),
            api_version: r.api_version.clone(),
        }),
        resource_field_ref: file.resource_field_ref.as_ref().map(|r| VmResourceFieldSelector {
            container_name: r.container_name.clone(),
            resource: Some(r.resource.clone()),
            divisor: r.divisor.as_ref().map(|q| q.0.clone()),
        }),
        mode: file.mode,
    }
}

fn memory_dump_to_platform(dump: &VmPvcSource) -> Result<PersistentVolumeClaimVolumeSource> {
    Ok(PersistentVolumeClaimVolumeSource {
        claim_name: required(&dump.claim_name, "claimName")?,
        read_only: dump.read_only,
        hotpluggable: dump.hotpluggable,
    })
}

fn pvc_to_transport(pvc: &PersistentVolumeClaimVolumeSource) -> VmPvcSource {
    VmPvcSource {
        claim_name: Some(pvc.claim_name.clone()),
        read_only: pvc.read_only,
        hotpluggable: pvc.hotpluggable,
    }
}

fn source<F>(fill: F) -> VolumeSource
where
    F: FnOnce(&mut VolumeSource),
{
    let mut source = VolumeSource::default();
    fill(&mut source);
    source
}

pub fn volume_to_platform(volume: &VmVolume) -> Result<Volume> {
    let selected = union::map_variant(
        VOLUME_SOURCE,
        [
            (
                "data_volume",
                volume.data_volume.as_ref().map(|dv| -> Result<VolumeSource> {
                    let name = required(&dv.name, "name")?;
                    Ok(source(|s| {
                        s.data_volume = Some(DataVolumeVolumeSource {
                            name,
                            hotpluggable: dv.hotpluggable,
                        })
                    }))
                }),
            ),
            (
                "container_disk",
                volume.container_disk.as_ref().map(|cd| -> Result<VolumeSource> {
                    let image = required(&cd.image, "image")?;
                    Ok(source(|s| {
                        s.container_disk = Some(ContainerDiskSource {
                            image,
                            image_pull_secret: cd.image_pull_secret.clone(),
                            image_pull_policy: cd.image_pull_policy.clone(),
                            path: cd.path.clone(),
                        })
                    }))
                }),
            ),
            (
                "cloud_init_no_cloud",
                volume.cloud_init_no_cloud.as_ref().map(|ci| -> Result<VolumeSource> {
                    let ci = cloud_init_to_platform(ci)?;
                    Ok(source(|s| s.cloud_init_no_cloud = Some(ci)))
                }),
            ),
            (
                "cloud_init_config_drive",
                volume.cloud_init_config_drive.as_ref().map(|ci| -> Result<VolumeSource> {
                    let ci = cloud_init_to_platform(ci)?;
                    Ok(source(|s| s.cloud_init_config_drive = Some(ci)))
                }),
            ),
            (
                "persistent_volume_claim",
                volume.persistent_volume_claim.as_ref().map(|pvc| -> Result<VolumeSource> {
                    let claim_name = required(&pvc.claim_name, "claimName")?;
                    Ok(source(|s| {
                        s.persistent_volume_claim = Some(PersistentVolumeClaimVolumeSource {
                            claim_name,
                            read_only: pvc.read_only,
                            hotpluggable: pvc.hotpluggable,
                        })
                    }))
                }),
            ),
            (
                "empty_disk",
                volume.empty_disk.as_ref().map(|ed| -> Result<VolumeSource> {
                    let capacity = required(&ed.capacity, "capacity")?;
                    let capacity = to_quantity("capacity", &capacity)?;
                    Ok(source(|s| s.empty_disk = Some(EmptyDiskSource { capacity })))
                }),
            ),
            (
                "host_disk",
                volume.host_disk.as_ref().map(|hd| -> Result<VolumeSource> {
                    let path = required(&hd.path, "path")?;
                    let type_ = HostDiskType::parse(&required(&hd.type_, "type")?)?;
                    let capacity = hd
                        .capacity
                        .as_deref()
                        .map(|c| to_quantity("capacity", c))
                        .transpose()?;
                    Ok(source(|s| {
                        s.host_disk = Some(HostDisk {
                            path,
                            type_: type_.to_string(),
                            capacity,
                            shared: hd.shared,
                        })
                    }))
                }),
            ),
            (
                "config_map",
                volume.config_map.as_ref().map(|cm| -> Result<VolumeSource> {
                    let name = required(&cm.name, "name")?;
                    Ok(source(|s| {
                        s.config_map = Some(ConfigMapVolumeSource {
                            name,
                            optional: cm.optional,
                            volume_label: cm.volume_label.clone(),
                        })
                    }))
                }),
            ),
            (
                "ephemeral",
                volume.ephemeral.as_ref().map(|eph| -> Result<VolumeSource> {
                    let claim = eph
                        .persistent_volume_claim
                        .as_ref()
                        .map(|c| -> Result<ClaimReference> {
                            Ok(ClaimReference {
                                claim_name: required(&c.claim_name, "claimName")?,
                                read_only: c.read_only,
                            })
                        })
                        .transpose()?;
                    Ok(source(|s| {
                        s.ephemeral = Some(EphemeralVolumeSource {
                            persistent_volume_claim: claim,
                        })
                    }))
                }),
            ),
            (
                "service_account",
                volume.service_account.as_ref().map(|sa| -> Result<VolumeSource> {
                    let service_account_name =
                        required(&sa.service_account_name, "serviceAccountName")?;
                    Ok(source(|s| {
                        s.service_account = Some(ServiceAccountVolumeSource {
                            service_account_name,
                        })
                    }))
                }),
            ),
            (
                "sysprep",
                volume.sysprep.as_ref().map(|sp| -> Result<VolumeSource> {
                    let sysprep = SysprepSource {
                        config_map: sp.config_map.as_ref().map(local_ref_to_platform).transpose()?,
                        secret: sp.secret.as_ref().map(local_ref_to_platform).transpose()?,
                    };
                    Ok(source(|s| s.sysprep = Some(sysprep)))
                }),
            ),
            (
                "secret",
                volume.secret.as_ref().map(|secret| -> Result<VolumeSource> {
                    let secret_name = required(&secret.secret_name, "secretName")?;
                    Ok(source(|s| {
                        s.secret = Some(SecretVolumeSource {
                            secret_name,
                            optional: secret.optional,
                            volume_label: secret.volume_label.clone(),
                        })
                    }))
                }),
            ),
            (
                "downward_api",
                volume.downward_api.as_ref().map(|api| -> Result<VolumeSource> {
                    let fields = map_list("fields", &api.fields, downward_file_to_platform)?;
                    Ok(source(|s| {
                        s.downward_api = Some(DownwardApiVolumeSource {
                            fields: non_empty(&fields),
                            volume_label: api.volume_label.clone(),
                        })
                    }))
                }),
            ),
            (
                "downward_metrics",
                volume.downward_metrics.as_ref().map(|_| -> Result<VolumeSource> {
                    Ok(source(|s| s.downward_metrics = Some(DownwardMetricsVolumeSource {})))
                }),
            ),
            (
                "memory_dump",
                volume.memory_dump.as_ref().map(|dump| -> Result<VolumeSource> {
                    let dump = memory_dump_to_platform(dump)?;
                    Ok(source(|s| s.memory_dump = Some(dump)))
                }),
            ),
        ],
    )?;

    Ok(Volume {
        name: required(&volume.name, "name")?,
        source: selected.unwrap_or_default(),
    })
}

pub fn volume_to_transport(volume: &Volume) -> Result<VmVolume> {
    let s = &volume.source;
    union::variant(
        VOLUME_SOURCE,
        [
            ("data_volume", s.data_volume.is_some()),
            ("container_disk", s.container_disk.is_some()),
            ("cloud_init_no_cloud", s.cloud_init_no_cloud.is_some()),
            ("cloud_init_config_drive", s.cloud_init_config_drive.is_some()),
            ("persistent_volume_claim", s.persistent_volume_claim.is_some()),
            ("empty_disk", s.empty_disk.is_some()),
            ("host_disk", s.host_disk.is_some()),
            ("config_map", s.config_map.is_some()),
            ("ephemeral", s.ephemeral.is_some()),
            ("service_account", s.service_account.is_some()),
            ("sysprep", s.sysprep.is_some()),
            ("secret", s.secret.is_some()),
            ("downward_api", s.downward_api.is_some()),
            ("downward_metrics", s.downward_metrics.is_some()),
            ("memory_dump", s.memory_dump.is_some()),
        ],
    )?;

    Ok(VmVolume {
        name: Some(volume.name.clone()),
        data_volume: s.data_volume.as_ref().map(|dv| VmDataVolumeRef {
            name: Some(dv.name.clone()),
            hotpluggable: dv.hotpluggable,
        }),
        container_disk: s.container_disk.as_ref().map(|cd| VmContainerDisk {
            image: Some(cd.image.clone()),
            image_pull_secret: cd.image_pull_secret.clone(),
            image_pull_policy: cd.image_pull_policy.clone(),
            path: cd.path.clone(),
        }),
        cloud_init_no_cloud: s.cloud_init_no_cloud.as_ref().map(cloud_init_to_transport),
        cloud_init_config_drive: s.cloud_init_config_drive.as_ref().map(cloud_init_to_transport),
        persistent_volume_claim: s.persistent_volume_claim.as_ref().map(pvc_to_transport),
        empty_disk: s.empty_disk.as_ref().map(|ed| VmEmptyDisk {
            capacity: Some(ed.capacity.0.clone()),
        }),
        host_disk: s
            .host_disk
            .as_ref()
            .map(|hd| -> Result<VmHostDisk> {
                Ok(VmHostDisk {
                    path: Some(hd.path.clone()),
                    type_: Some(HostDiskType::parse(&hd.type_)?.to_string()),
                    capacity: hd.capacity.as_ref().map(|q| q.0.clone()),
                    shared: hd.shared,
                })
            })
            .transpose()
            .map_err(|e| e.in_field("host_disk"))?,
        config_map: s.config_map.as_ref().map(|cm| VmConfigMapSource {
            name: Some(cm.name.clone()),
            optional: cm.optional,
            volume_label: cm.volume_label.clone(),
        }),
        ephemeral: s.ephemeral.as_ref().map(|eph| VmEphemeral {
            persistent_volume_claim: eph.persistent_volume_claim.as_ref().map(|c| VmClaimReference {
                claim_name: Some(c.claim_name.clone()),
                read_only: c.read_only,
            }),
        }),
        service_account: s.service_account.as_ref().map(|sa| VmServiceAccount {
            service_account_name: Some(sa.service_account_name.clone()),
        }),
        sysprep: s.sysprep.as_ref().map(|sp| VmSysprep {
            config_map: sp.config_map.as_ref().map(local_ref_to_transport),
            secret: sp.secret.as_ref().map(local_ref_to_transport),
        }),
        secret: s.secret.as_ref().map(|secret| VmSecretSource {
            secret_name: Some(secret.secret_name.clone()),
            optional: secret.optional,
            volume_label: secret.volume_label.clone(),
        }),
        downward_api: s.downward_api.as_ref().map(|api| VmDownwardApi {
            fields: api.fields.iter().flatten().map(downward_file_to_transport).collect(),
            volume_label: api.volume_label.clone(),
        }),
        downward_metrics: s.downward_metrics.as_ref().map(|_| Marker {}),
        memory_dump: s.memory_dump.as_ref().map(pvc_to_transport),
    })
}

pub fn network_to_platform(network: &VmNetwork) -> Result<Network> {
    let selected = union::map_variant(
        NETWORK_SOURCE,
        [
            (
                "pod",
                network.pod.as_ref().map(|pod| -> Result<NetworkSource> {
                    Ok(NetworkSource {
                        pod: Some(PodNetwork {
                            vm_network_cidr: pod.vm_network_cidr.clone(),
                            vm_ipv6_network_cidr: pod.vm_ipv6_network_cidr.clone(),
                        }),
                        multus: None,
                    })
                }),
            ),
            (
                "multus",
                network.multus.as_ref().map(|multus| -> Result<NetworkSource> {
                    Ok(NetworkSource {
                        pod: None,
                        multus: Some(MultusNetwork {
                            network_name: required(&multus.network_name, "networkName")?,
                            default: multus.default,
                        }),
                    })
                }),
            ),
        ],
    )?;

    Ok(Network {
        name: required(&network.name, "name")?,
        source: selected.ok_or_else(|| ConvertError::MissingField(NETWORK_SOURCE.to_string()))?,
    })
}

pub fn network_to_transport(network: &Network) -> Result<VmNetwork> {
    let source = &network.source;
    union::variant(
        NETWORK_SOURCE,
        [("pod", source.pod.is_some()), ("multus", source.multus.is_some())],
    )?;

    Ok(VmNetwork {
        name: Some(network.name.clone()),
        pod: source.pod.as_ref().map(|pod| VmPodNetwork {
            vm_network_cidr: pod.vm_network_cidr.clone(),
            vm_ipv6_network_cidr: pod.vm_ipv6_network_cidr.clone(),
        }),
        multus: source.multus.as_ref().map(|multus| VmMultusNetwork {
            network_name: Some(multus.network_name.clone()),
            default: multus.default,
        }),
    })
}
