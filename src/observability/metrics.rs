use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::models::request::{Priority, RequestStatus};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub requests_created_total: IntCounterVec,
    pub transitions_total: IntCounterVec,
    pub requests_by_status: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests_created_total = IntCounterVec::new(
            Opts::new("requests_created_total", "Total delivery requests created by priority"),
            &["priority"],
        )
        .expect("valid requests_created_total metric");

        let transitions_total = IntCounterVec::new(
            Opts::new(
                "transitions_total",
                "Status transitions attempted by transition and outcome",
            ),
            &["transition", "outcome"],
        )
        .expect("valid transitions_total metric");

        let requests_by_status = IntGaugeVec::new(
            Opts::new("requests_by_status", "Current number of requests in each status"),
            &["status"],
        )
        .expect("valid requests_by_status metric");

        registry
            .register(Box::new(requests_created_total.clone()))
            .expect("register requests_created_total");
        registry
            .register(Box::new(transitions_total.clone()))
            .expect("register transitions_total");
        registry
            .register(Box::new(requests_by_status.clone()))
            .expect("register requests_by_status");

        for status in RequestStatus::ALL {
            requests_by_status.with_label_values(&[status.as_str()]).set(0);
        }

        Self {
            registry,
            requests_created_total,
            transitions_total,
            requests_by_status,
        }
    }

    pub fn record_created(&self, priority: Priority, status: RequestStatus) {
        self.requests_created_total
            .with_label_values(&[priority.as_str()])
            .inc();
        self.requests_by_status
            .with_label_values(&[status.as_str()])
            .inc();
    }

    pub fn record_transition(&self, transition: &str, from: RequestStatus, to: RequestStatus) {
        self.transitions_total
            .with_label_values(&[transition, "success"])
            .inc();
        self.requests_by_status
            .with_label_values(&[from.as_str()])
            .dec();
        self.requests_by_status
            .with_label_values(&[to.as_str()])
            .inc();
    }

    pub fn record_rejected(&self, transition: &str) {
        self.transitions_total
            .with_label_values(&[transition, "rejected"])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
