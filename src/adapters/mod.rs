//! Adapter interfaces for external systems.
//!
//! Adapters give a single interface to whatever generative text service is
//! configured: a local command fed on stdin, or an HTTP endpoint.

pub mod command;
pub mod http;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

pub use command::CommandGenerator;
pub use http::HttpGenerator;

/// Output from a generation call
#[derive(Debug, Clone)]
pub struct GeneratorOutput {
    /// The text returned by the service
    pub content: String,

    /// Tokens used (if the service reports them)
    pub tokens_used: Option<u64>,
}

impl GeneratorOutput {
    /// Create output with just content
    pub fn new(content: String) -> Self {
        Self {
            content,
            tokens_used: None,
        }
    }
}

/// Trait for generative text services
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable generator name
    fn name(&self) -> &str;

    /// Send a prompt and wait for the full response
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<GeneratorOutput>;

    /// Check the service can be reached
    async fn health_check(&self) -> Result<()>;
}
