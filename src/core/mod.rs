pub mod caller;
pub mod capability;
pub mod context;
pub mod dispatcher;
pub mod keymap;
pub mod parser;
pub mod pool;
pub mod registry;
pub mod structure;

pub use crate::domain::model::{CallOutcome, CallRequest, ModuleConfig, OutputFormat, RequestFields, SafeZone};
pub use crate::domain::ports::{Capability, CapabilityResolver, ModuleConfigLoader};
pub use crate::utils::error::Result;
