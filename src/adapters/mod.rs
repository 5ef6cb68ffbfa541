// Adapters layer: concrete collaborators the dispatcher talks to through ports.

pub mod builtin;
pub mod module_loader;
