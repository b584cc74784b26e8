//! Subprocess generator.
//!
//! Runs a local model CLI (e.g. `ollama run llama3.2`), writes the prompt to
//! its stdin and reads the response from stdout.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::{GeneratorOutput, TextGenerator};

/// Generator backed by a local command
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    /// Create a generator from a program and its arguments
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv list (`["ollama", "run", "llama3.2"]`)
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .context("Generator command must not be empty")?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    async fn run(&self, prompt: &str, step_timeout: Duration) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn generator '{}'", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .context("Failed to write prompt to generator stdin")?;
            // Drop stdin to signal EOF
        }

        let output = timeout(step_timeout, child.wait_with_output())
            .await
            .with_context(|| {
                format!(
                    "Generator '{}' timed out after {:?}",
                    self.program, step_timeout
                )
            })?
            .with_context(|| format!("Failed to wait for generator '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "Generator '{}' failed with exit code {}: {}",
                self.program,
                exit_code,
                stderr.trim()
            );
        }

        String::from_utf8(output.stdout).context("Generator output is not valid UTF-8")
    }
}

#[async_trait]
impl TextGenerator for CommandGenerator {
    fn name(&self) -> &str {
        &self.program
    }

    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<GeneratorOutput> {
        let content = self.run(prompt, timeout).await?;
        Ok(GeneratorOutput::new(content))
    }

    async fn health_check(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("--help")
            .output()
            .await
            .with_context(|| format!("Failed to run generator '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Generator health check failed: {}", stderr);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_argv() {
        let argv = vec!["ollama".to_string(), "run".to_string(), "llama3.2".to_string()];
        let generator = CommandGenerator::from_argv(&argv).unwrap();
        assert_eq!(generator.name(), "ollama");
        assert_eq!(generator.args, vec!["run", "llama3.2"]);

        assert!(CommandGenerator::from_argv(&[]).is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let generator = CommandGenerator::new("/nonexistent/tasktrack-model", Vec::new());
        let result = generator.generate("hello", Duration::from_secs(1)).await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_prompt_round_trips_through_stdin() {
        let generator = CommandGenerator::new("cat", Vec::new());
        let output = generator
            .generate("[{\"title\":\"x\"}]", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.content, "[{\"title\":\"x\"}]");
    }
}
