//! The external solver seam.
//!
//! The reconstruction core never talks to the numerical wave solver
//! directly; it hands an [`ExchangeData`] payload to a
//! [`ReconstructionEngine`]. The production implementation,
//! [`MatlabEngine`], drives a MATLAB/k-Wave binary through file-based IPC;
//! tests inject a fake engine instead.

use std::path::{Path, PathBuf};
use std::process::Command;

use ndarray::ArrayD;
use thiserror::Error;

use sonolux_core::types::fields;

use crate::exchange::{output_path_for, read_solver_output, write_exchange, ExchangeData};

/// Errors from an external solver invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error during solver exchange: {0}")]
    Io(#[from] std::io::Error),

    #[error("Exchange encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Failed to launch solver binary {binary}: {source}")]
    Launch {
        binary: PathBuf,
        source: std::io::Error,
    },

    #[error("Solver exited with status {code:?}")]
    SolverFailed { code: Option<i32> },

    #[error("Solver output is missing the '{field}' field")]
    MissingOutputField { field: String },
}

/// An external numerical engine that can run one time-reversal solve.
pub trait ReconstructionEngine {
    /// Run the solver on the assembled exchange payload and return the
    /// reconstructed image. Failures are fatal for the reconstruction
    /// stage; no retry is attempted.
    fn submit(&self, exchange: &ExchangeData) -> Result<ArrayD<f64>, EngineError>;
}

/// Drives a MATLAB/k-Wave time-reversal solve as a blocking subprocess.
///
/// The exchange file is written, the working directory is switched to the
/// simulation directory for the duration of the call (and restored
/// afterwards, also on error), and the binary is invoked with a generated
/// command script selecting the 2D or 3D routine. On success both exchange
/// files are deleted; on failure they are left in place for inspection.
///
/// The working-directory switch is process-wide: at most one `submit` may
/// be in flight per process. The call blocks without a timeout until the
/// subprocess exits.
#[derive(Debug, Clone)]
pub struct MatlabEngine {
    /// The solver executable.
    pub binary_path: PathBuf,
    /// Directory containing the time-reversal scripts.
    pub script_dir: PathBuf,
    /// Working directory for the solver run.
    pub simulation_dir: PathBuf,
    /// Where the exchange file is written. A relative path is anchored at
    /// the simulation directory, since the solver resolves it after the
    /// working-directory switch.
    pub exchange_path: PathBuf,
}

impl MatlabEngine {
    /// The absolute exchange path as both the writer and the solver see it.
    /// Must stay absolute: the exchange file is written before the
    /// working-directory switch, but the solver (and the output read-back)
    /// resolve the path after it.
    fn resolved_exchange_path(&self) -> Result<PathBuf, std::io::Error> {
        let path = if self.exchange_path.is_absolute() {
            self.exchange_path.clone()
        } else {
            self.simulation_dir.join(&self.exchange_path)
        };
        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }
}

impl ReconstructionEngine for MatlabEngine {
    fn submit(&self, exchange: &ExchangeData) -> Result<ArrayD<f64>, EngineError> {
        let exchange_path = self.resolved_exchange_path()?;
        write_exchange(exchange, &exchange_path)?;

        let routine = if exchange.params.three_dimensional {
            "time_reversal_3D"
        } else {
            "time_reversal_2D"
        };
        let script = format!(
            "addpath('{}');{}('{}');exit;",
            self.script_dir.display(),
            routine,
            exchange_path.display()
        );

        let _cwd = WorkingDirGuard::enter(&self.simulation_dir)?;

        log::info!(
            "Invoking time-reversal solver: {} -r \"{script}\"",
            self.binary_path.display()
        );
        let status = Command::new(&self.binary_path)
            .args(["-nodisplay", "-nosplash", "-automation", "-wait", "-r"])
            .arg(&script)
            .status()
            .map_err(|source| EngineError::Launch {
                binary: self.binary_path.clone(),
                source,
            })?;

        if !status.success() {
            // Exchange files are left behind for debugging a failed solve.
            return Err(EngineError::SolverFailed {
                code: status.code(),
            });
        }

        let output_path = output_path_for(&exchange_path);
        let mut output = read_solver_output(&output_path)?;
        let image = output
            .remove(fields::RECONSTRUCTED_DATA)
            .ok_or_else(|| EngineError::MissingOutputField {
                field: fields::RECONSTRUCTED_DATA.to_string(),
            })?;

        std::fs::remove_file(&exchange_path)?;
        std::fs::remove_file(&output_path)?;

        Ok(image)
    }
}

/// Scoped working-directory switch; the previous directory is restored on
/// drop, including on the error path.
struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    fn enter(dir: &Path) -> Result<Self, std::io::Error> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        Ok(Self { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(err) = std::env::set_current_dir(&self.previous) {
            log::error!(
                "Could not restore working directory {}: {err}",
                self.previous.display()
            );
        }
    }
}
