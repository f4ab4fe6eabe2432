use std::path::Path;

use anyhow::Context;
use ovc_engine::RepoContext;
use ovc_types::{Address, Capability, RepoId};
use serde::{Deserialize, Serialize};

/// CLI configuration, stored as TOML next to the working directory.
///
/// `init` writes the created repository and capability back into the
/// `[target]` table so subsequent commands know what they operate on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Blob store publisher endpoint (uploads).
    pub publisher: String,
    /// Blob store aggregator endpoint (reads).
    pub aggregator: String,
    /// Ledger RPC endpoint.
    pub rpc: String,
    /// Author address, hex.
    pub author: String,
    /// Requested blob retention, in storage epochs.
    #[serde(default = "default_retention")]
    pub retention_epochs: u64,
    /// The repository this checkout targets, written by `init`.
    pub target: Option<TargetConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Repository id, hex.
    pub repo: String,
    /// Write capability id, hex.
    pub capability: String,
}

fn default_retention() -> u64 {
    ovc_engine::DEFAULT_RETENTION_EPOCHS
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            publisher: "http://127.0.0.1:31415".into(),
            aggregator: "http://127.0.0.1:31416".into(),
            rpc: "http://127.0.0.1:9000".into(),
            author: Address::null().to_hex(),
            retention_epochs: default_retention(),
            target: None,
        }
    }
}

impl CliConfig {
    /// Read configuration from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write configuration to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let raw = toml::to_string_pretty(self).context("serializing configuration")?;
        std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// The configured author address.
    pub fn author(&self) -> anyhow::Result<Address> {
        Address::from_hex(&self.author).context("author address in configuration")
    }

    /// The targeted repository context, if `init` has run.
    pub fn repo_context(&self) -> anyhow::Result<RepoContext> {
        let target = self
            .target
            .as_ref()
            .context("no repository targeted; run `ovc init <name>` first")?;
        Ok(RepoContext::new(
            RepoId::from_hex(&target.repo).context("repo id in configuration")?,
            Capability::from_hex(&target.capability).context("capability in configuration")?,
        ))
    }

    /// Record the repository created by `init`.
    pub fn set_target(&mut self, ctx: &RepoContext) {
        self.target = Some(TargetConfig {
            repo: ctx.repo_id.to_hex(),
            capability: ctx.capability.to_hex(),
        });
    }
}
