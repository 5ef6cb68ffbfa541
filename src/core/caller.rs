//! Per-target invocation strategies.
//!
//! Both strategies run `init` ahead of every other method of a target and
//! record failures as data instead of aborting the cycle.

use crate::core::context::CycleContext;
use crate::domain::model::{CallOutcome, CallRequest};
use crate::domain::ports::Capability;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub const BOOTSTRAP_METHOD: &str = "init";
pub const SECURE_FAILURE_MARKER: &str = "Secure Call Failed: ";
pub const INSECURE_FAILURE_MARKER: &str = "Insecure Call Failed: ";

/// 呼叫模式，週期開始前全域決定一次
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallMode {
    #[default]
    Secure,
    Insecure,
}

impl CallMode {
    pub fn caller(self) -> Box<dyn Caller> {
        match self {
            CallMode::Secure => Box::new(SecureCaller),
            CallMode::Insecure => Box::new(InsecureCaller),
        }
    }
}

pub trait Caller: Send + Sync {
    fn mode(&self) -> CallMode;

    fn call_target(&self, module: &str, target: &str, capability: &dyn Capability, cycle: &mut CycleContext);
}

/// Enforces the safe-zone declaration and the field-presence policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureCaller;

impl Caller for SecureCaller {
    fn mode(&self) -> CallMode {
        CallMode::Secure
    }

    fn call_target(&self, module: &str, target: &str, capability: &dyn Capability, cycle: &mut CycleContext) {
        let exported = capability.methods();
        let zone = capability.safe_zone();
        let requested = cycle.registry.methods();

        // exported ∩ safe zone ∩ (requested, or the whole safe zone)
        let mut candidates: Vec<String> = if requested.is_empty() {
            zone.methods()
                .filter(|method| exported.contains(method))
                .map(str::to_string)
                .collect()
        } else {
            requested
                .iter()
                .filter(|method| zone.declares(method) && exported.contains(&method.as_str()))
                .cloned()
                .collect()
        };
        init_first(&mut candidates);
        tracing::debug!("🔐 {} candidates: {:?}", target, candidates);

        bootstrap(module, target, capability, &candidates, SECURE_FAILURE_MARKER, cycle);

        for method in &candidates {
            let required = zone.required(method).unwrap_or(&[]);
            let missing = cycle.structure.missing(required);
            if !missing.is_empty() {
                tracing::debug!("🚫 {}/{} denied, missing fields: {:?}", target, method, missing);
                continue;
            }
            invoke(module, target, method, capability, SECURE_FAILURE_MARKER, cycle);
        }
    }
}

/// Calls only explicitly requested methods, with no field checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct InsecureCaller;

impl Caller for InsecureCaller {
    fn mode(&self) -> CallMode {
        CallMode::Insecure
    }

    fn call_target(&self, module: &str, target: &str, capability: &dyn Capability, cycle: &mut CycleContext) {
        let requested = cycle.registry.methods();
        if requested.is_empty() {
            tracing::debug!("{} skipped: insecure mode needs explicit methods", target);
            return;
        }

        let exported = capability.methods();
        let mut candidates: Vec<String> = requested
            .iter()
            .filter(|method| exported.contains(&method.as_str()))
            .cloned()
            .collect();
        init_first(&mut candidates);

        bootstrap(module, target, capability, &candidates, INSECURE_FAILURE_MARKER, cycle);

        for method in &candidates {
            invoke(module, target, method, capability, INSECURE_FAILURE_MARKER, cycle);
        }
    }
}

/// A candidate `init` still goes through the policy, but ahead of the others.
fn init_first(candidates: &mut Vec<String>) {
    if let Some(position) = candidates.iter().position(|m| m == BOOTSTRAP_METHOD) {
        let init = candidates.remove(position);
        candidates.insert(0, init);
    }
}

/// `init` 在其他方法之前執行，不檢查權限
fn bootstrap(
    module: &str,
    target: &str,
    capability: &dyn Capability,
    candidates: &[String],
    failure_marker: &str,
    cycle: &mut CycleContext,
) {
    if capability.methods().contains(&BOOTSTRAP_METHOD)
        && !candidates.iter().any(|m| m == BOOTSTRAP_METHOD)
    {
        invoke(module, target, BOOTSTRAP_METHOD, capability, failure_marker, cycle);
    }
}

/// Runs one method, catching errors and panics, and records the outcome.
fn invoke(
    module: &str,
    target: &str,
    method: &str,
    capability: &dyn Capability,
    failure_marker: &str,
    cycle: &mut CycleContext,
) {
    let key = format!("{}/{}", target, method);
    if !cycle.begin_invocation(&key) {
        tracing::debug!("{} already ran this cycle", key);
        return;
    }

    let request = CallRequest {
        target,
        method,
        fields: &cycle.fields,
        config: cycle.module_config(module),
    };
    let outcome = match catch_unwind(AssertUnwindSafe(|| capability.call(method, &request))) {
        Ok(Ok(Value::Null)) => CallOutcome::Empty,
        Ok(Ok(value)) => CallOutcome::Returned(value),
        Ok(Err(e)) => CallOutcome::Failed(e.to_string()),
        Err(panic) => CallOutcome::Failed(panic_message(panic.as_ref())),
    };
    tracing::debug!("📞 {} -> {:?}", key, outcome);

    cycle.record(&key, outcome, failure_marker);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}
