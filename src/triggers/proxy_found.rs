use super::{missing_reference, Trigger, TriggerKind};
use crate::scene::{ProxyHandle, QueryState};

/// Waits for an externally tracked proxy to report that it is tracking
#[derive(Debug)]
pub struct ProxyFoundTrigger {
    proxy: Option<ProxyHandle>,
}

impl ProxyFoundTrigger {
    pub fn new(proxy: Option<ProxyHandle>) -> Self {
        Self { proxy }
    }
}

impl Trigger for ProxyFoundTrigger {
    fn reset_trigger(&mut self) -> bool {
        if self.proxy.is_none() {
            missing_reference(self.kind(), "proxy");
            return false;
        }

        !self.check()
    }

    fn check(&self) -> bool {
        self.proxy
            .as_ref()
            .is_some_and(|p| p.query_state().contains(QueryState::TRACKING))
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::ProxyFound
    }
}
