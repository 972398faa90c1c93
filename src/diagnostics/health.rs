//! Per-component health, surfaced on `/health`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{OnceLock, RwLock};
use std::time::Instant;

pub const MODEL_COMPONENT: &str = "model";
pub const STORE_COMPONENT: &str = "store";
pub const GATEWAY_COMPONENT: &str = "gateway";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComponentStatus {
    Starting,
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub updated_at: DateTime<Utc>,
    pub last_ok: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Errors since the last `ok`.
    pub consecutive_errors: u32,
}

impl ComponentHealth {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            status: ComponentStatus::Starting,
            updated_at: now,
            last_ok: None,
            last_error: None,
            consecutive_errors: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// `ok` unless some component is in error.
    pub status: &'static str,
    pub version: &'static str,
    pub pid: u32,
    pub updated_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub components: BTreeMap<String, ComponentHealth>,
}

pub struct HealthRegistry {
    started_at: Instant,
    components: RwLock<BTreeMap<String, ComponentHealth>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            components: RwLock::new(BTreeMap::new()),
        }
    }

    fn update(&self, component: &str, apply: impl FnOnce(&mut ComponentHealth, DateTime<Utc>)) {
        let Ok(mut components) = self.components.write() else {
            return;
        };
        let now = Utc::now();
        let entry = components
            .entry(component.to_string())
            .or_insert_with(|| ComponentHealth::new(now));
        apply(entry, now);
        entry.updated_at = now;
    }

    pub fn starting(&self, component: &str) {
        self.update(component, |entry, _| entry.status = ComponentStatus::Starting);
    }

    pub fn ok(&self, component: &str) {
        self.update(component, |entry, now| {
            entry.status = ComponentStatus::Ok;
            entry.last_ok = Some(now);
            entry.last_error = None;
            entry.consecutive_errors = 0;
        });
    }

    pub fn error(&self, component: &str, message: String) {
        self.update(component, |entry, _| {
            entry.status = ComponentStatus::Error;
            entry.last_error = Some(message);
            entry.consecutive_errors = entry.consecutive_errors.saturating_add(1);
        });
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        let components = self
            .components
            .read()
            .map_or_else(|_| BTreeMap::new(), |components| components.clone());
        let degraded = components
            .values()
            .any(|c| c.status == ComponentStatus::Error);

        HealthSnapshot {
            status: if degraded { "degraded" } else { "ok" },
            version: env!("CARGO_PKG_VERSION"),
            pid: std::process::id(),
            updated_at: Utc::now(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            components,
        }
    }
}

static REGISTRY: OnceLock<HealthRegistry> = OnceLock::new();

fn global() -> &'static HealthRegistry {
    REGISTRY.get_or_init(HealthRegistry::new)
}

pub fn mark_component_starting(component: &str) {
    global().starting(component);
}

pub fn mark_component_ok(component: &str) {
    global().ok(component);
}

#[allow(clippy::needless_pass_by_value)]
pub fn mark_component_error(component: &str, error: impl ToString) {
    global().error(component, error.to_string());
}

pub fn snapshot() -> HealthSnapshot {
    global().snapshot()
}

pub fn snapshot_json() -> serde_json::Value {
    serde_json::to_value(snapshot()).unwrap_or_else(|_| {
        serde_json::json!({
            "status": "error",
            "message": "failed to serialize health snapshot"
        })
    })
}
