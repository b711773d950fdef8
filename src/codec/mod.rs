//! Primitive codecs shared by every transcoder
//!
//! Each codec converts a single scalar or collection type and never loses
//! information for in-range input. Out-of-range input is an error.

pub mod chunks;
pub mod maps;
pub mod narrow;
pub mod port;
pub mod quantity;
pub mod timestamp;

pub use chunks::{decode_chunks, encode_chunks};
pub use maps::{filter_reserved, from_quantity_map, to_quantity_map};
pub use narrow::{narrow, narrow_opt, IntKind};
pub use port::{port_from_string, port_to_string};
pub use quantity::{parse_bytes, to_quantity};
pub use timestamp::{from_k8s_time, to_k8s_time, validate_rfc3339};
