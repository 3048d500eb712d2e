use std::process::{Child, Command, Output, Stdio};

use ambassador::delegatable_trait;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::tool::{Tool, ToolPaths};

/// Runs the SDK tools. [`RealRuntime`] spawns actual processes; tests swap in
/// fakes that replay recorded tool output.
#[delegatable_trait]
pub trait Runtime {
    /// Run `tool` to completion with stdout and stderr captured.
    fn output(&self, tool: Tool, args: &[String]) -> Result<Output>;

    /// Start `tool` without waiting for it. Stdout and stderr are piped.
    fn spawn(&self, tool: Tool, args: &[String]) -> Result<Child>;
}

#[derive(Debug, Default)]
pub struct RealRuntime {
    paths: ToolPaths,
}

impl RealRuntime {
    pub fn new(paths: ToolPaths) -> RealRuntime {
        RealRuntime { paths }
    }

    fn command(&self, tool: Tool, args: &[String]) -> Command {
        let mut cmd = Command::new(self.paths.get(tool));
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Runtime for RealRuntime {
    #[instrument(skip(self))]
    fn output(&self, tool: Tool, args: &[String]) -> Result<Output> {
        let output = self.command(tool, args)
            .spawn()
            .map_err(|e| launch_error(tool, e))?
            .wait_with_output()?;
        debug!(%tool, status = ?output.status, stdout_len = output.stdout.len());
        Ok(output)
    }

    #[instrument(skip(self))]
    fn spawn(&self, tool: Tool, args: &[String]) -> Result<Child> {
        let child = self.command(tool, args)
            .spawn()
            .map_err(|e| launch_error(tool, e))?;
        debug!(%tool, pid = child.id());
        Ok(child)
    }
}

/// A spawn failure means the executable itself could not be run.
pub(crate) fn launch_error(tool: Tool, source: std::io::Error) -> Error {
    Error::ToolNotFound { tool, source }
}
