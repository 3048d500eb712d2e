use std::time::Duration;

use thiserror::Error;

use crate::tool::Tool;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not run {tool}: {source}")]
    ToolNotFound {
        tool: Tool,
        #[source]
        source: std::io::Error,
    },
    /// The tool ran but exited unsuccessfully. `stderr` is whatever it printed.
    #[error("{tool} failed with {}: {stderr}", describe_code(.code))]
    CommandFailed {
        tool: Tool,
        code: Option<i32>,
        stderr: String,
    },
    #[error("emulator for {avd} did not exit within {timeout:?}")]
    LaunchTimeout { avd: String, timeout: Duration },
    #[error("emulator for {0} is already running")]
    AlreadyRunning(String),
    #[error("invalid emulator config {config:?}")]
    InvalidConfig {
        config: String,
        #[source]
        source: shell_words::ParseError,
    },
    #[error("no AVD named {0}")]
    AvdNotFound(String),
    #[error("{serial} did not finish booting")]
    BootTimeout {
        serial: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status code {}", code),
        None => "no status code".to_string(),
    }
}
