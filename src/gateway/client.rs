//! Forwarding client for the upstream agent services.
//!
//! The gateway performs exactly one upstream attempt per client request,
//! bounded by the configured timeout; retries do not exist at this layer.

use crate::agents::AgentKind;
use crate::config::GatewayConfig;
use serde_json::Value;

/// Raw upstream reply; the status is kept numeric so the gateway can pass
/// it through untouched.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The agent could not be reached at all: connection failure, timeout, or
/// a transport error while reading the reply.
#[derive(Debug, thiserror::Error)]
#[error("Error connecting to {agent} Agent: {detail}")]
pub struct UpstreamUnreachable {
    pub agent: &'static str,
    pub detail: String,
}

/// Client holding the per-agent upstream addresses.
pub struct ForwardClient {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl ForwardClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Forward a parsed payload to one agent and return its raw reply.
    pub async fn forward(
        &self,
        kind: AgentKind,
        payload: &Value,
    ) -> Result<UpstreamReply, UpstreamUnreachable> {
        let url = format!("{}{}", self.config.upstream_base(kind), kind.agent_path());

        let response = self
            .client
            .post(&url)
            .json(payload)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| UpstreamUnreachable {
                agent: kind.display_name(),
                detail: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamUnreachable {
                agent: kind.display_name(),
                detail: e.to_string(),
            })?
            .to_vec();

        Ok(UpstreamReply { status, body })
    }
}
