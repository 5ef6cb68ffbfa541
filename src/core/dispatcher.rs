use crate::core::caller::{CallMode, Caller};
use crate::core::context::{CycleContext, CycleOutput};
use crate::domain::model::{OutputFormat, RequestFields};
use crate::domain::ports::{CapabilityResolver, ModuleConfigLoader};
use std::sync::Arc;
use std::time::Instant;

/// 調度器：解析指令、依序呼叫模組與目標、收集結果
///
/// A `Dispatcher` holds no per-request state and can be shared between
/// threads. Every call to [`Dispatcher::run`] builds a fresh [`CycleContext`].
pub struct Dispatcher {
    resolver: Arc<dyn CapabilityResolver>,
    loader: Option<Arc<dyn ModuleConfigLoader>>,
    caller: Box<dyn Caller>,
    default_format: OutputFormat,
}

impl Dispatcher {
    pub fn new(resolver: impl CapabilityResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
            loader: None,
            caller: CallMode::default().caller(),
            default_format: OutputFormat::default(),
        }
    }

    /// Without a loader, modules run with no configuration.
    pub fn with_loader(mut self, loader: impl ModuleConfigLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn with_mode(mut self, mode: CallMode) -> Self {
        self.caller = mode.caller();
        self
    }

    pub fn with_default_format(mut self, format: OutputFormat) -> Self {
        self.default_format = format;
        self
    }

    pub fn mode(&self) -> CallMode {
        self.caller.mode()
    }

    /// Runs one full cycle. Never fails; failures live in the result pool.
    pub fn run(&self, fields: RequestFields) -> CycleOutput {
        let mut cycle = CycleContext::from_request(fields, self.default_format);
        self.run_cycle(&mut cycle);
        cycle.into_output()
    }

    pub fn run_cycle(&self, cycle: &mut CycleContext) {
        if cycle.is_empty_request() {
            tracing::debug!("Empty request, nothing to dispatch");
            return;
        }

        let start_time = Instant::now();
        cycle.rebuild_struct();

        let modules: Vec<(String, Vec<String>)> = cycle
            .registry
            .modules()
            .map(|(module, targets)| (module.to_string(), targets.to_vec()))
            .collect();

        for (module, targets) in &modules {
            if let Some(loader) = &self.loader {
                cycle.load_module(module, loader.as_ref());
            }

            for target in targets {
                match self.resolver.resolve(target) {
                    Some(capability) => {
                        self.caller
                            .call_target(module, target, capability.as_ref(), cycle)
                    }
                    None => tracing::debug!("⏭️ Skipping unknown target: {}", target),
                }
            }
        }

        tracing::info!(
            "✅ Dispatch cycle done ({:?} mode): {} modules, {} results, {:?}",
            self.mode(),
            modules.len(),
            cycle.pool.len(),
            start_time.elapsed()
        );
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mode", &self.mode())
            .field("default_format", &self.default_format)
            .field("has_loader", &self.loader.is_some())
            .finish()
    }
}
