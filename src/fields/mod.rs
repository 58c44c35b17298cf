//! Form fields a wizard page can render.

pub mod registry;

pub use registry::{ComponentContract, FieldContract, FieldKind, FieldRegistry, DATE_FORMAT};
