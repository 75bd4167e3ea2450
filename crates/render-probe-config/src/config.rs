// crates/render-probe-config/src/config.rs
// ============================================================================
// Module: Harness Configuration
// Description: TOML configuration model for render-probe runs.
// Purpose: Resolve, parse, and validate harness configuration fail-closed.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration resolution order is explicit path, then the
//! `RENDER_PROBE_CONFIG` environment variable, then `render-probe.toml` in the
//! working directory. An explicitly requested file must exist; when nothing is
//! requested and the default file is absent, built-in defaults apply (the
//! in-process simulator fixture, which needs no bundle). Every section
//! validates its own fields; validation cascades and stops at the first
//! violation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default configuration file name resolved from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "render-probe.toml";

/// Environment variable naming an alternate configuration file.
pub const CONFIG_PATH_ENV: &str = "RENDER_PROBE_CONFIG";

/// Maximum accepted configuration file size in bytes.
const MAX_CONFIG_BYTES: u64 = 1024 * 1024;

/// Maximum accepted configuration path length in bytes.
const MAX_CONFIG_PATH_LEN: usize = 4096;

/// Maximum accepted length of one path component in bytes.
const MAX_PATH_COMPONENT_LEN: usize = 255;

/// Minimum accepted timeout in milliseconds (probe and startup alike).
const MIN_TIMEOUT_MS: u64 = 100;

/// Maximum accepted timeout in milliseconds (probe and startup alike).
const MAX_TIMEOUT_MS: u64 = 300_000;

/// Maximum accepted concurrent probe executions.
const MAX_CONCURRENCY: usize = 64;

/// Minimum accepted diagnostic body capture size in bytes.
const MIN_CAPTURE_BODY_BYTES: usize = 1024;

/// Maximum accepted diagnostic body capture size in bytes.
const MAX_CAPTURE_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Maximum accepted binding name length in bytes.
const MAX_BINDING_NAME_LEN: usize = 64;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or validating harness configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The configuration file is not valid TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The configuration violates a documented constraint.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Bundle Section
// ============================================================================

/// Bundle artifact under test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    /// Worker script path; required by the process fixture.
    #[serde(default)]
    pub script: Option<PathBuf>,
    /// Static asset directory served alongside the script.
    #[serde(default)]
    pub assets: Option<PathBuf>,
    /// Display label for reports; defaults to the script file name.
    #[serde(default)]
    pub name: Option<String>,
}

impl BundleConfig {
    /// Validates the bundle section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(script) = &self.script
            && script.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid("bundle script path is empty".to_string()));
        }
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(ConfigError::Invalid("bundle name is empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Runtime Section
// ============================================================================

/// One runtime binding declared by the bundle.
///
/// Binding semantics belong to the runtime; the harness passes declarations
/// through verbatim and only checks that names are usable identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Binding name as the bundle references it.
    pub name: String,
    /// Runtime-defined binding kind label.
    pub kind: String,
}

/// Runtime invocation serving the bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Argv template; placeholders `{script}`, `{assets}`, `{addr}`, and
    /// `{port}` are substituted at spawn time.
    #[serde(default)]
    pub command: Vec<String>,
    /// Environment variables set for the runtime process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Runtime compatibility date, passed through verbatim.
    #[serde(default)]
    pub compatibility_date: Option<String>,
    /// Runtime compatibility flags, passed through verbatim.
    #[serde(default)]
    pub compatibility_flags: Vec<String>,
    /// Bindings the bundle declares.
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

impl RuntimeConfig {
    /// Validates the runtime section.
    fn validate(&self) -> Result<(), ConfigError> {
        for arg in &self.command {
            if arg.is_empty() {
                return Err(ConfigError::Invalid(
                    "runtime command contains an empty argument".to_string(),
                ));
            }
        }
        for key in self.env.keys() {
            if key.is_empty() {
                return Err(ConfigError::Invalid(
                    "runtime env contains an empty variable name".to_string(),
                ));
            }
        }
        let mut seen: Vec<&str> = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            validate_binding_name(&binding.name)?;
            if binding.kind.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "binding {} has an empty kind",
                    binding.name
                )));
            }
            if seen.contains(&binding.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate binding name: {}",
                    binding.name
                )));
            }
            seen.push(binding.name.as_str());
        }
        Ok(())
    }
}

/// Validates one binding name as an identifier.
fn validate_binding_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Invalid("binding name is empty".to_string()));
    }
    if name.len() > MAX_BINDING_NAME_LEN {
        return Err(ConfigError::Invalid(format!(
            "binding name exceeds {MAX_BINDING_NAME_LEN} bytes: {name}"
        )));
    }
    let mut chars = name.chars();
    let leading_ok = chars.next().is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !leading_ok || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(ConfigError::Invalid(format!("binding name is not an identifier: {name}")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Harness Section
// ============================================================================

/// Fixture strategy selecting how the endpoint is provisioned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    /// Spawn the configured runtime command around the bundle.
    Process,
    /// Attach to an already-running deployment at `base_url`.
    Remote,
    /// Serve the in-process simulator worker.
    #[default]
    Sim,
}

/// Audit sink configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Whether lifecycle events are emitted at all.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional file sink path; stderr JSONL when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

/// Returns the default audit enablement.
const fn default_audit_enabled() -> bool {
    true
}

/// Harness tunables and fixture selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessSection {
    /// Fixture strategy for this run.
    #[serde(default)]
    pub fixture: FixtureKind,
    /// Base URL of the deployment; required by the remote fixture.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Whole-probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Fixture startup deadline in milliseconds.
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
    /// Maximum probes executing at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Maximum body bytes retained per captured response snapshot.
    #[serde(default = "default_capture_body_bytes")]
    pub capture_body_bytes: usize,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            fixture: FixtureKind::default(),
            base_url: None,
            probe_timeout_ms: default_probe_timeout_ms(),
            startup_timeout_ms: default_startup_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            capture_body_bytes: default_capture_body_bytes(),
            audit: AuditConfig::default(),
        }
    }
}

/// Returns the default per-probe timeout in milliseconds.
const fn default_probe_timeout_ms() -> u64 {
    10_000
}

/// Returns the default startup deadline in milliseconds.
const fn default_startup_timeout_ms() -> u64 {
    15_000
}

/// Returns the default probe concurrency cap.
const fn default_max_concurrency() -> usize {
    4
}

/// Returns the default diagnostic body capture size in bytes.
const fn default_capture_body_bytes() -> usize {
    64 * 1024
}

impl HarnessSection {
    /// Validates the harness section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout("probe_timeout_ms", self.probe_timeout_ms)?;
        validate_timeout("startup_timeout_ms", self.startup_timeout_ms)?;
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Invalid(format!(
                "max_concurrency {} outside 1..={MAX_CONCURRENCY}",
                self.max_concurrency
            )));
        }
        if self.capture_body_bytes < MIN_CAPTURE_BODY_BYTES
            || self.capture_body_bytes > MAX_CAPTURE_BODY_BYTES
        {
            return Err(ConfigError::Invalid(format!(
                "capture_body_bytes {} outside {MIN_CAPTURE_BODY_BYTES}..={MAX_CAPTURE_BODY_BYTES}",
                self.capture_body_bytes
            )));
        }
        if let Some(base_url) = &self.base_url {
            validate_base_url(base_url)?;
        }
        Ok(())
    }
}

/// Validates one timeout field against the shared bounds.
fn validate_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{field} {value} outside {MIN_TIMEOUT_MS}..={MAX_TIMEOUT_MS}"
        )));
    }
    Ok(())
}

/// Validates a base URL as absolute http or https.
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(base_url)
        .map_err(|err| ConfigError::Invalid(format!("base_url is not a valid url: {err}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::Invalid(format!(
            "base_url scheme must be http or https: {base_url}"
        )));
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::Invalid(format!("base_url has no host: {base_url}")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Complete harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Bundle artifact under test.
    #[serde(default)]
    pub bundle: BundleConfig,
    /// Runtime invocation serving the bundle.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Harness tunables and fixture selection.
    #[serde(default)]
    pub harness: HarnessSection,
}

impl HarnessConfig {
    /// Loads configuration from an explicit path, the environment override,
    /// or the default file, in that order.
    ///
    /// A missing file is an error when it was explicitly requested; when
    /// nothing names a file and the default is absent, built-in defaults
    /// apply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the file cannot be read, is not valid
    /// UTF-8 TOML, exceeds the size limit, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => match std::env::var(CONFIG_PATH_ENV) {
                Ok(from_env) => Some(PathBuf::from(from_env)),
                Err(_) => {
                    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                    if default.exists() {
                        Some(default)
                    } else {
                        None
                    }
                }
            },
        };
        let Some(file) = resolved else {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        };
        let config = Self::load_file(&file)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses one configuration file with input guards.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        validate_config_path(path)?;
        let metadata = fs::metadata(path).map_err(|err| {
            ConfigError::Io(format!("config file {} unreadable: {err}", path.display()))
        })?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Invalid(format!(
                "config file exceeds size limit of {MAX_CONFIG_BYTES} bytes"
            )));
        }
        let raw = fs::read(path).map_err(|err| {
            ConfigError::Io(format!("config file {} unreadable: {err}", path.display()))
        })?;
        let text = String::from_utf8(raw)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates every section fail-closed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bundle.validate()?;
        self.runtime.validate()?;
        self.harness.validate()?;
        match self.harness.fixture {
            FixtureKind::Process => {
                if self.bundle.script.is_none() {
                    return Err(ConfigError::Invalid(
                        "process fixture requires bundle.script".to_string(),
                    ));
                }
                if self.runtime.command.is_empty() {
                    return Err(ConfigError::Invalid(
                        "process fixture requires runtime.command".to_string(),
                    ));
                }
            }
            FixtureKind::Remote => {
                if self.harness.base_url.is_none() {
                    return Err(ConfigError::Invalid(
                        "remote fixture requires harness.base_url".to_string(),
                    ));
                }
            }
            FixtureKind::Sim => {}
        }
        Ok(())
    }
}

/// Validates configuration path shape before touching the filesystem.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    let raw = path.as_os_str();
    if raw.len() > MAX_CONFIG_PATH_LEN {
        return Err(ConfigError::Invalid(format!(
            "config path exceeds max length of {MAX_CONFIG_PATH_LEN} bytes"
        )));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LEN {
            return Err(ConfigError::Invalid(format!(
                "config path component too long (max {MAX_PATH_COMPONENT_LEN} bytes)"
            )));
        }
    }
    Ok(())
}
