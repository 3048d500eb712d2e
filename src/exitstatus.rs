use std::process::Output;

use tracing::warn;

use crate::error::{Error, Result};
use crate::tool::Tool;

pub(crate) trait OutputExt {
    /// Fails with [`Error::CommandFailed`] unless the tool exited successfully.
    /// Stderr from a successful run is only logged.
    fn exit_ok_(&self, tool: Tool) -> Result<()>;

    fn stdout_text(&self) -> String;

    fn stderr_text(&self) -> String;
}

impl OutputExt for Output {
    fn exit_ok_(&self, tool: Tool) -> Result<()> {
        let stderr = self.stderr_text();
        if self.status.success() {
            if !stderr.trim().is_empty() {
                warn!(%tool, stderr = %stderr.trim());
            }
            Ok(())
        } else {
            Err(Error::CommandFailed {
                tool,
                code: self.status.code(),
                stderr: stderr.trim().to_owned(),
            })
        }
    }

    fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
