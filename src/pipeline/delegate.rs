//! External process delegate: hand a whole job to another converter.
//!
//! The executable is invoked as `program [args…] <input> <output>` and must
//! write a `.pptx` to `<output>`. Its exit status and the presence of a
//! readable deck are the only signals trusted; whatever it prints is logged
//! and otherwise ignored.
//!
//! Guarantees, whatever the outcome:
//!
//! - at most `max_concurrent` children run at once (semaphore permit held for
//!   the lifetime of the child)
//! - a child that outlives `timeout` is killed (`kill_on_drop`)
//! - the input file is released once the child has exited

use crate::config::DelegateConfig;
use crate::error::ConversionError;
use crate::pipeline::build::count_slides;
use crate::storage::StorageArea;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Longest stderr excerpt written to the log.
const STDERR_LOG_LIMIT: usize = 2000;

/// A bounded pool of external converter runs.
#[derive(Debug, Clone)]
pub struct Delegate {
    config: DelegateConfig,
    permits: Arc<Semaphore>,
}

impl Delegate {
    pub fn new(config: DelegateConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent));
        Self { config, permits }
    }

    pub fn config(&self) -> &DelegateConfig {
        &self.config
    }

    /// Runs currently holding a permit.
    pub fn running(&self) -> usize {
        self.config.max_concurrent - self.permits.available_permits()
    }

    /// Convert `input` into `output` with the external program.
    ///
    /// Returns the slide count of the produced deck. `input` is released
    /// through `storage` before this returns, on every path.
    pub async fn run(
        &self,
        storage: &StorageArea,
        input: &Path,
        output: &Path,
    ) -> Result<usize, ConversionError> {
        let result = self.invoke(input, output).await;
        storage.discard(input).await;
        result?;

        let deck = output.to_path_buf();
        tokio::task::spawn_blocking(move || count_slides(&deck))
            .await
            .map_err(|e| ConversionError::build(format!("output check aborted ({e})")))?
    }

    async fn invoke(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ConversionError::build("external converter pool is closed"))?;

        let program = self.config.program.display().to_string();
        debug!("Running external converter {}", program);

        let child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ConversionError::build(format!("cannot start external converter ({e})")))?;

        // Dropping the future on timeout drops the child, which kills it.
        let out = match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(Ok(out)) => out,
            Ok(Err(e)) => {
                return Err(ConversionError::build(format!(
                    "lost track of external converter ({e})"
                )))
            }
            Err(_) => {
                warn!(
                    "External converter {} killed after {:?}",
                    program, self.config.timeout
                );
                return Err(ConversionError::build(format!(
                    "external converter timed out after {}s",
                    self.config.timeout.as_secs_f32()
                )));
            }
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let excerpt: String = stderr.chars().take(STDERR_LOG_LIMIT).collect();
            warn!(
                "External converter {} failed ({}): {}",
                program,
                out.status,
                excerpt.trim()
            );
            return Err(ConversionError::build(format!(
                "external converter failed ({})",
                out.status
            )));
        }

        match tokio::fs::metadata(output).await {
            Ok(m) if m.is_file() && m.len() > 0 => Ok(()),
            _ => Err(ConversionError::build(
                "external converter produced no output",
            )),
        }
    }
}
