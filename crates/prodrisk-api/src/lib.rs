//! # prodrisk-api: typed access to engine attributes
//!
//! Everything the facade needs from the engine goes through the [`Engine`]
//! trait. On top of it this crate marshals raw engine data to and from the
//! host value model in `prodrisk-core`:
//!
//! - [`get_attribute_value`] / [`set_attribute`] dispatch on the attribute's
//!   [`Datatype`](prodrisk_core::Datatype)
//! - [`get_xyt_attribute`] reads time-windowed curve series
//! - [`get_attribute_info`] / [`get_object_info`] read catalogue metadata
//! - [`get_time_resolution`] reads the horizon and its native time grid
//!
//! [`MemoryEngine`] is a complete in-process engine.

pub mod engine;
pub mod horizon;
pub mod info;
pub mod memory;
pub mod reader;
pub mod writer;
pub mod xyt;

pub use engine::{AttributeKey, Engine};
pub use horizon::{get_time_resolution, TimeResolution};
pub use info::{get_attribute_info, get_object_info, Info};
pub use memory::MemoryEngine;
pub use reader::get_attribute_value;
pub use writer::{hour_offsets, set_attribute};
pub use xyt::{get_xyt_attribute, step_duration, XytWindow};
