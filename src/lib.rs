pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::builtin::register_builtins;
pub use adapters::module_loader::TomlModuleLoader;
pub use config::toml_config::DispatchConfig;
pub use crate::core::caller::CallMode;
pub use crate::core::capability::CapabilityRegistry;
pub use crate::core::context::{CycleContext, CycleOutput};
pub use crate::core::dispatcher::Dispatcher;
pub use domain::model::{CallRequest, ModuleConfig, OutputFormat, RequestFields, SafeZone, UploadedFile};
pub use domain::ports::{Capability, CapabilityResolver, ModuleConfigLoader};
pub use utils::error::{DispatchError, Result};
