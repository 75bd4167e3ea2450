// crates/render-probe-fixture/src/process.rs
// ============================================================================
// Module: Process Provisioner
// Description: Spawns the configured runtime command around a worker bundle.
// Purpose: Provision a real runtime process and guarantee its teardown.
// Dependencies: render-probe-core, tokio, crate::readiness
// ============================================================================

//! ## Overview
//! The process provisioner treats the runtime invocation as an argv template:
//! `{script}`, `{assets}`, `{addr}`, and `{port}` are substituted from the
//! bundle configuration and an OS-assigned loopback port before spawning.
//! Readiness is any HTTP answer on the base URL before the startup deadline.
//! Teardown kills and reaps the child; a last-resort `Drop` does the same so
//! no runtime process leaks across runs, even on abort. Captured child stderr
//! is folded into startup failures for diagnosis.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Read;
use std::net::TcpListener as StdTcpListener;
use std::path::PathBuf;
use std::process::Child;
use std::process::Command;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use render_probe_core::Endpoint;
use render_probe_core::FixtureProvisioner;
use render_probe_core::ProvisionError;
use render_probe_core::ProvisionedFixture;

use crate::readiness::wait_for_http;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum captured stderr bytes folded into a startup failure.
const MAX_STDERR_CAPTURE: usize = 4096;

// ============================================================================
// SECTION: Specification
// ============================================================================

/// Everything needed to spawn one runtime process around a bundle.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// Argv template; element zero is the program.
    pub command: Vec<String>,
    /// Environment variables set for the child.
    pub env: BTreeMap<String, String>,
    /// Worker script path substituted for `{script}`.
    pub script: PathBuf,
    /// Asset directory substituted for `{assets}`; empty when absent.
    pub assets: Option<PathBuf>,
    /// Deadline for the endpoint to answer HTTP.
    pub startup_timeout: Duration,
}

// ============================================================================
// SECTION: Provisioner
// ============================================================================

/// Provisions endpoints by spawning the configured runtime command.
#[derive(Debug, Clone)]
pub struct ProcessProvisioner {
    /// Spawn specification applied per acquisition.
    spec: ProcessSpec,
}

impl ProcessProvisioner {
    /// Creates a provisioner from a spawn specification.
    #[must_use]
    pub const fn new(spec: ProcessSpec) -> Self {
        Self {
            spec,
        }
    }
}

#[async_trait]
impl FixtureProvisioner for ProcessProvisioner {
    fn kind(&self) -> &'static str {
        "process"
    }

    async fn acquire(&self) -> Result<Box<dyn ProvisionedFixture>, ProvisionError> {
        let Some((program, args)) = self.spec.command.split_first() else {
            return Err(ProvisionError::Config("runtime command is empty".to_string()));
        };
        let port = allocate_loopback_port()?;
        let addr = format!("127.0.0.1:{port}");
        let endpoint = Endpoint::new(format!("http://{addr}"));
        let substituted: Vec<String> =
            args.iter().map(|arg| self.substitute(arg, &addr, port)).collect();
        let program = self.substitute(program, &addr, port);
        let mut child = Command::new(&program)
            .args(&substituted)
            .envs(&self.spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ProvisionError::Spawn(format!("{program}: {err}")))?;
        match wait_for_http(&endpoint, self.spec.startup_timeout).await {
            Ok(()) => Ok(Box::new(ProcessFixture {
                endpoint,
                child: Some(child),
            })),
            Err(ProvisionError::Startup {
                elapsed_ms,
                detail,
            }) => {
                let stderr_tail = reap_with_stderr(&mut child);
                Err(ProvisionError::Startup {
                    elapsed_ms,
                    detail: if stderr_tail.is_empty() {
                        detail
                    } else {
                        format!("{detail}; child stderr: {stderr_tail}")
                    },
                })
            }
            Err(other) => {
                let _ = reap_with_stderr(&mut child);
                Err(other)
            }
        }
    }
}

impl ProcessProvisioner {
    /// Applies the argv placeholder substitutions.
    fn substitute(&self, arg: &str, addr: &str, port: u16) -> String {
        let assets = self
            .spec
            .assets
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        arg.replace("{script}", &self.spec.script.display().to_string())
            .replace("{assets}", &assets)
            .replace("{addr}", addr)
            .replace("{port}", &port.to_string())
    }
}

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Live fixture wrapping a spawned runtime process.
struct ProcessFixture {
    /// Endpoint the child serves.
    endpoint: Endpoint,
    /// Child process; `None` once reaped.
    child: Option<Child>,
}

#[async_trait]
impl ProvisionedFixture for ProcessFixture {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn shutdown(mut self: Box<Self>) -> Result<(), ProvisionError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        child.kill().map_err(|err| ProvisionError::Io(format!("kill failed: {err}")))?;
        child.wait().map_err(|err| ProvisionError::Io(format!("reap failed: {err}")))?;
        Ok(())
    }
}

impl Drop for ProcessFixture {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reserves an OS-assigned loopback port.
///
/// The listener is dropped before the runtime binds; the interval is short
/// enough that collisions are not a practical concern for test runs.
fn allocate_loopback_port() -> Result<u16, ProvisionError> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| ProvisionError::Io(format!("port allocation failed: {err}")))?;
    let port = listener
        .local_addr()
        .map_err(|err| ProvisionError::Io(format!("port allocation failed: {err}")))?
        .port();
    Ok(port)
}

/// Kills and reaps a child, returning a bounded stderr tail.
fn reap_with_stderr(child: &mut Child) -> String {
    let _ = child.kill();
    let mut tail = String::new();
    if let Some(mut stderr) = child.stderr.take() {
        let mut raw = Vec::new();
        let _ = stderr.read_to_end(&mut raw);
        if raw.len() > MAX_STDERR_CAPTURE {
            raw.truncate(MAX_STDERR_CAPTURE);
        }
        tail = String::from_utf8_lossy(&raw).trim().to_string();
    }
    let _ = child.wait();
    tail
}
