//! Declarative model: attribute trees and the persisted state handle

pub mod attr;
pub mod resource_data;

pub use attr::{hash_attr, normalize, Attr, AttrMap, AttrSet, Fields, MapBuilder};
pub use resource_data::{ResourceData, StagedState, StateReader, StateWriter};
