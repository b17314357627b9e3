//! Request handlers, one module per resource.

pub mod items;
pub mod settings;
