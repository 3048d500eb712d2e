use std::mem;
use std::path::{Path, PathBuf};
use std::process::Child;

use tracing::warn;

use crate::device::{resolve_device, Device};
use crate::emulator::ProcessState;
use crate::error::Result;
use crate::parser::{joined, parse_sections, Section};

/// A virtual device from `avdmanager list avd`, plus the emulator process
/// started for it, if any.
#[derive(Debug)]
pub struct Avd {
    pub name: String,
    /// `None` when the listed device matches no known device profile.
    pub device: Option<Device>,
    pub path: Option<PathBuf>,
    pub target: Option<String>,
    pub skin: Option<String>,
    pub sdcard: Option<String>,
    pub based_on: Option<String>,
    pub abi: Option<String>,
    /// Why avdmanager could not load this AVD.
    pub error: Option<String>,
    pub(crate) process: ProcessState,
}

impl Avd {
    /// Parses a listing, resolving each AVD's device against `catalog`.
    pub(crate) fn parse_list(text: &str, catalog: &[Device]) -> Vec<Avd> {
        parse_sections(text, || AvdDraft::new(catalog))
    }

    pub fn state(&self) -> &ProcessState {
        &self.process
    }

    pub fn process(&self) -> Option<&Child> {
        self.process.child()
    }

    /// Force-kills the emulator this AVD started and waits for it to exit.
    /// Returns `false` without doing anything if no emulator is tracked.
    /// Prefer [`AvdManager::stop`](crate::AvdManager::stop) for a clean shutdown.
    pub fn kill(&mut self) -> Result<bool> {
        self.process.kill()
    }

    pub(crate) fn renamed(&mut self, new_name: &str) {
        self.name = new_name.to_owned();
        if let Some(path) = &self.path {
            let parent = path.parent().unwrap_or_else(|| Path::new(""));
            self.path = Some(parent.join(format!("{}.avd", new_name)));
        }
    }
}

/// Equal when the listed fields match and both are in the same process state.
impl PartialEq for Avd {
    fn eq(&self, other: &Avd) -> bool {
        self.name == other.name
            && self.device == other.device
            && self.path == other.path
            && self.target == other.target
            && self.skin == other.skin
            && self.sdcard == other.sdcard
            && self.based_on == other.based_on
            && self.abi == other.abi
            && self.error == other.error
            && mem::discriminant(&self.process) == mem::discriminant(&other.process)
    }
}

#[derive(Default)]
struct AvdDraft<'a> {
    catalog: &'a [Device],
    name: Option<String>,
    device: Option<Device>,
    path: Option<PathBuf>,
    target: Option<String>,
    skin: Option<String>,
    sdcard: Option<String>,
    based_on: Option<String>,
    abi: Option<String>,
    error: Option<String>,
}

impl<'a> AvdDraft<'a> {
    fn new(catalog: &'a [Device]) -> AvdDraft<'a> {
        AvdDraft { catalog, ..AvdDraft::default() }
    }
}

impl Section for AvdDraft<'_> {
    type Record = Avd;
    const SEPARATOR: &'static str = "---------";

    fn field(&mut self, key: &str, segments: &[&str]) {
        match key {
            "NAME" => self.name = Some(joined(segments)),
            "DEVICE" => {
                let label = joined(segments);
                self.device = resolve_device(&label, self.catalog);
                if self.device.is_none() {
                    warn!(device = %label, "no matching device profile");
                }
            }
            "PATH" => self.path = Some(PathBuf::from(joined(segments))),
            "TARGET" => self.target = Some(joined(segments)),
            "SKIN" => self.skin = Some(joined(segments)),
            "SDCARD" => self.sdcard = Some(joined(segments)),
            // Based on: Android 12L (Sv2) Tag/ABI: google_apis/x86_64
            "BASED ON" => {
                self.based_on = Some(segments[0].replace("Tag/ABI", "").trim().to_owned());
                let abi = joined(&segments[1..]);
                if !abi.is_empty() {
                    self.abi = Some(abi);
                }
            }
            "TAG/ABI" => self.abi = Some(joined(segments)),
            "ERROR" => self.error = Some(joined(segments)),
            _ => {}
        }
    }

    fn finish(self) -> Option<Avd> {
        Some(Avd {
            name: self.name?,
            device: self.device,
            path: self.path,
            target: self.target,
            skin: self.skin,
            sdcard: self.sdcard,
            based_on: self.based_on,
            abi: self.abi,
            error: self.error,
            process: ProcessState::NotStarted,
        })
    }
}

/// Arguments for `avdmanager create avd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAvd {
    pub name: String,
    /// System image package, e.g. `system-images;android-30;google_apis;x86`.
    pub package: String,
    pub device: u32,
    /// Overwrite an existing AVD with the same name.
    pub force: bool,
    /// Size of a new sdcard, or path to an existing image.
    pub sdcard: Option<String>,
    pub tag: Option<String>,
    pub skin: Option<String>,
    pub abi: Option<String>,
    /// Directory for the AVD's files.
    pub path: Option<PathBuf>,
}

impl CreateAvd {
    pub fn new(name: impl Into<String>, package: impl Into<String>, device: &Device) -> CreateAvd {
        CreateAvd {
            name: name.into(),
            package: package.into(),
            device: device.id,
            force: false,
            sdcard: None,
            tag: None,
            skin: None,
            abi: None,
            path: None,
        }
    }

    pub fn force(mut self, force: bool) -> CreateAvd {
        self.force = force;
        self
    }

    pub fn sdcard(mut self, sdcard: impl Into<String>) -> CreateAvd {
        self.sdcard = Some(sdcard.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> CreateAvd {
        self.tag = Some(tag.into());
        self
    }

    pub fn skin(mut self, skin: impl Into<String>) -> CreateAvd {
        self.skin = Some(skin.into());
        self
    }

    pub fn abi(mut self, abi: impl Into<String>) -> CreateAvd {
        self.abi = Some(abi.into());
        self
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> CreateAvd {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub(crate) fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "create".into(),
            "avd".into(),
            "-n".into(),
            self.name.clone(),
            "--package".into(),
            self.package.clone(),
            "--device".into(),
            self.device.to_string(),
        ];
        let optional = [
            ("--sdcard", self.sdcard.clone()),
            ("--tag", self.tag.clone()),
            ("--skin", self.skin.clone()),
            ("--abi", self.abi.clone()),
            ("--path", self.path.as_ref().map(|path| path.display().to_string())),
        ];
        for (flag, value) in optional.iter() {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.clone());
            }
        }
        if self.force {
            args.push("--force".into());
        }
        args
    }
}
