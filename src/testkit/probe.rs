//! Scripted readiness probe.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::port::outbound::probe::{ProbeStatus, ReadinessProbe};

/// Pops the next scripted status per check, then repeats `fallback`.
pub struct ScriptedProbe {
    script: Mutex<VecDeque<ProbeStatus>>,
    fallback: ProbeStatus,
    checks: AtomicUsize,
    endpoints: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    /// Every check reports `status`.
    pub fn always(status: ProbeStatus) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: status,
            checks: AtomicUsize::new(0),
            endpoints: Mutex::new(Vec::new()),
        }
    }

    /// Models become available on the first check.
    pub fn ready() -> Self {
        Self::always(ProbeStatus::Available)
    }

    /// Models never become available.
    pub fn never() -> Self {
        Self::always(ProbeStatus::Pending)
    }

    /// Report `script` in order before falling back to `Available`.
    pub fn scripted(script: Vec<ProbeStatus>) -> Self {
        let probe = Self::ready();
        *probe.script.lock() = script.into();
        probe
    }

    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// Status endpoints probed so far.
    pub fn endpoints(&self) -> Vec<String> {
        self.endpoints.lock().clone()
    }
}

#[async_trait]
impl ReadinessProbe for ScriptedProbe {
    async fn check(&self, status_endpoint: &str) -> ProbeStatus {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.endpoints.lock().push(status_endpoint.to_string());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
