//! Workload Driver
//!
//! Runs the schedule -> build -> send -> trace -> pace loop. Exactly one request
//! is in flight at a time. Transport failures are traced and the loop moves on
//! to the next command; nothing is retried.

use super::error::{ClientError, render_error_chain};
use super::request::{RequestDescriptor, build_request};
use super::scheduler::{Command, CommandScheduler};
use crate::config::ClientSettings;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Counters kept across the lifetime of a driver.
#[derive(Debug, Clone, Default)]
pub struct WorkloadStats {
    pub commands: HashMap<Command, u64>,
    /// Responses received, whatever their status.
    pub responses: u64,
    /// Responses with a non-2xx status.
    pub error_responses: u64,
    pub transport_failures: u64,
}

impl WorkloadStats {
    pub fn issued(&self, command: Command) -> u64 {
        self.commands.get(&command).copied().unwrap_or(0)
    }

    pub fn total_issued(&self) -> u64 {
        self.commands.values().sum()
    }
}

/// Result of a single loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Response { status: u16 },
    TransportFailed,
    Cancelled,
}

pub struct WorkloadDriver {
    http_client: reqwest::Client,
    base_url: String,
    max_delay: Duration,
    scheduler: CommandScheduler,
    rng: StdRng,
    stats: WorkloadStats,
}

impl WorkloadDriver {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// Same as `new` with a caller-provided random source.
    pub fn with_rng(settings: &ClientSettings, rng: StdRng) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            max_delay: settings.max_delay,
            scheduler: CommandScheduler::new(),
            rng,
            stats: WorkloadStats::default(),
        })
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &CommandScheduler {
        &self.scheduler
    }

    /// Runs `limit` iterations, or forever when `limit` is `None`. Stops early on cancellation.
    pub async fn run_iterations(
        &mut self,
        limit: Option<u64>,
        cancel: CancellationToken,
    ) -> WorkloadStats {
        tracing::info!("REST API random test client. API url: {}", self.base_url);

        let mut iteration = 0u64;
        while limit.is_none_or(|limit| iteration < limit) {
            if cancel.is_cancelled() {
                break;
            }
            if self.step(&cancel).await == StepOutcome::Cancelled {
                break;
            }
            iteration += 1;
            if limit == Some(iteration) {
                break;
            }

            if !self.pace(&cancel).await {
                break;
            }
        }

        tracing::info!(
            "Workload stopped after {} commands: {} responses ({} errors), {} transport failures",
            self.stats.total_issued(),
            self.stats.responses,
            self.stats.error_responses,
            self.stats.transport_failures
        );
        self.stats.clone()
    }

    /// Schedules, builds and sends one command and traces the response.
    pub async fn step(&mut self, cancel: &CancellationToken) -> StepOutcome {
        let scheduled = self.scheduler.next_command(&mut self.rng);
        let command = scheduled.command;
        tracing::info!("Processing command {}", command);
        *self.stats.commands.entry(command).or_insert(0) += 1;

        let request = build_request(command, scheduled.known_id.as_deref(), &self.base_url);
        tracing::info!("{} {}", request.method, request.url);

        let result = tokio::select! {
            _ = cancel.cancelled() => return StepOutcome::Cancelled,
            result = self.send(&request) => result,
        };

        match result {
            Ok((status, body)) => {
                tracing::info!(
                    "RESPONSE ({} {}): {} {}",
                    request.method,
                    request.url,
                    status,
                    body
                );
                self.stats.responses += 1;
                if !status.is_success() {
                    self.stats.error_responses += 1;
                }
                StepOutcome::Response {
                    status: status.as_u16(),
                }
            }
            Err(e) => {
                let error = anyhow::Error::from(e);
                tracing::error!(
                    "Failed to process command {}: {}",
                    command,
                    render_error_chain(&error)
                );
                self.stats.transport_failures += 1;
                StepOutcome::TransportFailed
            }
        }
    }

    async fn send(
        &self,
        request: &RequestDescriptor,
    ) -> Result<(reqwest::StatusCode, String), ClientError> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), request.url.as_str());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Sleeps a random duration in `[0, max_delay)`. Returns `false` if cancelled meanwhile.
    async fn pace(&mut self, cancel: &CancellationToken) -> bool {
        let max_ms = self.max_delay.as_millis() as u64;
        if max_ms == 0 {
            return !cancel.is_cancelled();
        }

        let delay = Duration::from_millis(self.rng.gen_range(0..max_ms));
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}
