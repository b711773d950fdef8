//! String-valued enums
//!
//! The platform types several string fields as enums; the declarative and
//! transport models keep them as plain strings and validate on the way in.
//! [`string_enum!`] generates the enum, its serde names, `as_str`, `parse`
//! and `Display`.

/// Declare a string-valued enum with a fixed set of accepted names
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            serde::Serialize,
            serde::Deserialize,
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            schemars::JsonSchema,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every accepted name, in declaration order
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }

            pub fn parse(value: &str) -> $crate::error::Result<Self> {
                match value {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err($crate::error::ConvertError::InvalidEnum {
                        field: $field.to_string(),
                        value: value.to_string(),
                        allowed: Self::NAMES,
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// Persistent volume mode
    VolumeMode, "volume mode", {
        Block => "Block",
        Filesystem => "Filesystem",
    }
);

string_enum!(
    /// Persistent volume access mode
    AccessMode, "access mode", {
        ReadWriteOnce => "ReadWriteOnce",
        ReadOnlyMany => "ReadOnlyMany",
        ReadWriteMany => "ReadWriteMany",
        ReadWriteOncePod => "ReadWriteOncePod",
    }
);

string_enum!(
    /// Operator of a label-selector requirement
    LabelSelectorOperator, "label selector operator", {
        In => "In",
        NotIn => "NotIn",
        Exists => "Exists",
        DoesNotExist => "DoesNotExist",
    }
);

string_enum!(
    /// Operator of a node-selector requirement
    NodeSelectorOperator, "node selector operator", {
        In => "In",
        NotIn => "NotIn",
        Exists => "Exists",
        DoesNotExist => "DoesNotExist",
        Gt => "Gt",
        Lt => "Lt",
    }
);

string_enum!(
    TolerationOperator, "toleration operator", {
        Exists => "Exists",
        Equal => "Equal",
    }
);

string_enum!(
    TolerationEffect, "toleration effect", {
        NoSchedule => "NoSchedule",
        PreferNoSchedule => "PreferNoSchedule",
        NoExecute => "NoExecute",
    }
);

string_enum!(
    /// How a host disk image is provisioned
    HostDiskType, "host disk type", {
        Disk => "Disk",
        DiskOrCreate => "DiskOrCreate",
    }
);

string_enum!(
    /// Declarative names of the interface binding methods
    BindingMethod, "interface binding method", {
        Bridge => "InterfaceBridge",
        Slirp => "InterfaceSlirp",
        Masquerade => "InterfaceMasquerade",
        Sriov => "InterfaceSRIOV",
        Passt => "InterfacePasst",
        Macvtap => "InterfaceMacvtap",
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    #[test]
    fn test_parse_and_display() {
        assert_eq!(VolumeMode::parse("Block").unwrap(), VolumeMode::Block);
        assert_eq!(VolumeMode::Filesystem.to_string(), "Filesystem");
        assert_eq!(BindingMethod::parse("InterfaceSRIOV").unwrap(), BindingMethod::Sriov);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = VolumeMode::parse("Raw").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidEnum { ref field, ref value, .. } if field == "volume mode" && value == "Raw"
        ));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&BindingMethod::Masquerade).unwrap();
        assert_eq!(json, "\"InterfaceMasquerade\"");
        let parsed: NodeSelectorOperator = serde_json::from_str("\"Gt\"").unwrap();
        assert_eq!(parsed, NodeSelectorOperator::Gt);
    }
}
