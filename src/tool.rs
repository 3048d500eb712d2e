use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// One of the three SDK executables this crate drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    AvdManager,
    Emulator,
    Adb,
}

impl Tool {
    /// Executable name looked up on `PATH` when no explicit path is configured.
    pub fn program(self) -> &'static str {
        match self {
            Tool::AvdManager => "avdmanager",
            Tool::Emulator => "emulator",
            Tool::Adb => "adb",
        }
    }
}

impl Display for Tool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

/// Where to find each tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    avdmanager: PathBuf,
    emulator: PathBuf,
    adb: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> ToolPaths {
        ToolPaths {
            avdmanager: PathBuf::from(Tool::AvdManager.program()),
            emulator: PathBuf::from(Tool::Emulator.program()),
            adb: PathBuf::from(Tool::Adb.program()),
        }
    }
}

impl ToolPaths {
    /// Paths of the tools inside an SDK installation rooted at `sdk_root`.
    pub fn from_sdk_root(sdk_root: impl AsRef<Path>) -> ToolPaths {
        let root = sdk_root.as_ref();
        let exe = |path: PathBuf| {
            if cfg!(windows) {
                path.with_extension("exe")
            } else {
                path
            }
        };
        let avdmanager = root.join("cmdline-tools").join("latest").join("bin").join("avdmanager");
        ToolPaths {
            avdmanager: if cfg!(windows) {
                avdmanager.with_extension("bat")
            } else {
                avdmanager
            },
            emulator: exe(root.join("emulator").join("emulator")),
            adb: exe(root.join("platform-tools").join("adb")),
        }
    }

    pub fn with(mut self, tool: Tool, path: impl AsRef<Path>) -> ToolPaths {
        let path = path.as_ref().to_path_buf();
        match tool {
            Tool::AvdManager => self.avdmanager = path,
            Tool::Emulator => self.emulator = path,
            Tool::Adb => self.adb = path,
        }
        self
    }

    pub fn get(&self, tool: Tool) -> &Path {
        match tool {
            Tool::AvdManager => &self.avdmanager,
            Tool::Emulator => &self.emulator,
            Tool::Adb => &self.adb,
        }
    }
}
