// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::models::RelationKind;

/// Service counters exposed on `/metrics`
pub struct Metrics {
    registry: Registry,
    relation_writes: IntCounterVec,
    auth_attempts: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let relation_writes = IntCounterVec::new(
            Opts::new("tuiter_relation_writes_total", "Like, dislike and bookmark writes"),
            &["relation", "outcome"],
        )?;
        let auth_attempts = IntCounterVec::new(
            Opts::new("tuiter_auth_attempts_total", "Signup and login attempts"),
            &["action", "outcome"],
        )?;

        registry.register(Box::new(relation_writes.clone()))?;
        registry.register(Box::new(auth_attempts.clone()))?;

        Ok(Self {
            registry,
            relation_writes,
            auth_attempts,
        })
    }

    pub fn record_relation(&self, kind: RelationKind, outcome: &str) {
        self.relation_writes
            .with_label_values(&[kind.as_str(), outcome])
            .inc();
    }

    pub fn record_auth(&self, action: &str, outcome: &str) {
        self.auth_attempts.with_label_values(&[action, outcome]).inc();
    }

    /// Prometheus text exposition of every registered metric
    pub fn render(&self) -> Result<String> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
