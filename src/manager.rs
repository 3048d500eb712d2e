use std::fmt::Debug;
use std::process::{Child, Output};

use ambassador::Delegate;
use tracing::{debug, info, instrument};

use crate::adb;
use crate::avd::{Avd, CreateAvd};
use crate::device::Device;
use crate::emulator::{self, StartOptions};
use crate::error::{Error, Result};
use crate::exitstatus::OutputExt;
use crate::runtime::{RealRuntime, Runtime};
use crate::target::Target;
use crate::tool::{Tool, ToolPaths};

/// Entry point for listing, creating, and running AVDs.
#[derive(Debug, Delegate)]
#[delegate(Runtime, target = "runtime")]
pub struct AvdManager<R: Runtime + Debug> {
    runtime: R,
}

impl AvdManager<RealRuntime> {
    /// Uses the tools found on `PATH`.
    pub fn from_path() -> AvdManager<RealRuntime> {
        AvdManager::new(RealRuntime::default())
    }

    pub fn with_paths(paths: ToolPaths) -> AvdManager<RealRuntime> {
        AvdManager::new(RealRuntime::new(paths))
    }
}

impl<R: Runtime + Debug> AvdManager<R> {
    pub fn new(runtime: R) -> AvdManager<R> {
        AvdManager { runtime }
    }

    fn avdmanager(&self, args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let output = self.output(Tool::AvdManager, &args)?;
        output.exit_ok_(Tool::AvdManager)?;
        Ok(output.stdout_text())
    }

    #[instrument]
    pub fn targets(&self) -> Result<Vec<Target>> {
        let targets = Target::parse_list(&self.avdmanager(&["list", "target"])?);
        debug!(count = targets.len());
        Ok(targets)
    }

    #[instrument]
    pub fn devices(&self) -> Result<Vec<Device>> {
        let devices = Device::parse_list(&self.avdmanager(&["list", "device"])?);
        debug!(count = devices.len());
        Ok(devices)
    }

    /// Lists AVDs. Lists devices first so each AVD's device can be resolved.
    #[instrument]
    pub fn avds(&self) -> Result<Vec<Avd>> {
        let devices = self.devices()?;
        let avds = Avd::parse_list(&self.avdmanager(&["list", "avd"])?, &devices);
        debug!(count = avds.len());
        Ok(avds)
    }

    pub fn avd(&self, name: &str) -> Result<Option<Avd>> {
        Ok(self.avds()?.into_iter().find(|avd| avd.name == name))
    }

    #[instrument]
    pub fn create(&self, options: &CreateAvd) -> Result<Avd> {
        self.output(Tool::AvdManager, &options.to_args())?
            .exit_ok_(Tool::AvdManager)?;
        info!(avd = %options.name, "created");
        self.avd(&options.name)?
            .ok_or_else(|| Error::AvdNotFound(options.name.clone()))
    }

    #[instrument(skip(avd), fields(avd = %avd.name))]
    pub fn delete(&self, avd: &Avd) -> Result<()> {
        self.avdmanager(&["delete", "avd", "-n", &avd.name])?;
        info!("deleted");
        Ok(())
    }

    /// Renames `avd`, updating its name and path on success.
    #[instrument(skip(avd), fields(avd = %avd.name))]
    pub fn rename(&self, avd: &mut Avd, new_name: &str) -> Result<()> {
        self.avdmanager(&["move", "avd", "-n", &avd.name, "-r", new_name])?;
        avd.renamed(new_name);
        info!(path = ?avd.path, "renamed");
        Ok(())
    }

    /// Launches the emulator for `avd` and keeps its process in `avd`.
    #[instrument(skip(avd), fields(avd = %avd.name))]
    pub fn start<'a>(&self, avd: &'a mut Avd, options: &StartOptions) -> Result<&'a mut Child> {
        if avd.process.is_running()? {
            return Err(Error::AlreadyRunning(avd.name.clone()));
        }
        avd.process = emulator::launch(&self.runtime, &avd.name, options)?;
        match avd.process.child_mut() {
            Some(child) => Ok(child),
            None => unreachable!("launch always yields a process"),
        }
    }

    /// Asks the emulator on console `port` to shut down, whether or not this
    /// crate started it.
    pub fn stop(&self, port: u16) -> Result<()> {
        adb::emu_kill(&self.runtime, port)
    }

    /// Blocks until the emulator on `port` reports it has finished booting.
    pub fn wait_for_boot(&self, port: u16) -> Result<()> {
        adb::wait_for_boot(&self.runtime, port)
    }
}
