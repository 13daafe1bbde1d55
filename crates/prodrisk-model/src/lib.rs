//! # prodrisk-model: navigable proxies over the engine catalogue
//!
//! The engine's schema is only known at runtime. [`ModelBuilder`] takes a
//! snapshot of it and exposes four levels of lookup:
//!
//! ```ignore
//! let model = ModelBuilder::new(engine, &[])?;
//! let max_prod = model.get("plant")?.get("Plant1")?.attribute("max_prod")?;
//! max_prod.set(120.0)?;
//! assert_eq!(max_prod.get()?, Some(Value::Double(120.0)));
//! ```
//!
//! Every lookup of a name outside the snapshot fails with an error for which
//! [`ProdriskError::is_not_found`](prodrisk_core::ProdriskError::is_not_found)
//! holds. Object and attribute proxies are cached, so repeated lookups return
//! the same `Rc`. The snapshot is only extended through
//! [`ObjectTypeProxy::add_object`]; [`ModelBuilder::update`] rebuilds it.

mod attribute;
mod builder;
mod object;

pub use attribute::AttributeProxy;
pub use builder::{ModelBuilder, ObjectTypeProxy};
pub use object::{Direction, ObjectProxy};
