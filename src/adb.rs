use std::time::Duration;

use anyhow::anyhow;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::exitstatus::OutputExt;
use crate::runtime::Runtime;
use crate::tool::Tool;

const BOOT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const BOOT_POLL_ATTEMPTS: usize = 60;

/// Serial adb uses for the emulator listening on `port`.
pub(crate) fn emulator_serial(port: u16) -> String {
    format!("emulator-{}", port)
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

/// `adb -s emulator-<port> emu kill`
#[instrument(skip(runtime))]
pub(crate) fn emu_kill<R: Runtime>(runtime: &R, port: u16) -> Result<()> {
    let serial = emulator_serial(port);
    runtime
        .output(Tool::Adb, &args(&["-s", &serial, "emu", "kill"]))?
        .exit_ok_(Tool::Adb)
}

pub(crate) fn shell_getprop<R: Runtime>(runtime: &R, serial: &str, name: &str) -> Result<String> {
    let output = runtime.output(Tool::Adb, &args(&["-s", serial, "shell", "getprop", name]))?;
    output.exit_ok_(Tool::Adb)?;
    Ok(output.stdout_text().trim().to_owned())
}

#[instrument(skip(runtime))]
pub(crate) fn wait_for_boot<R: Runtime>(runtime: &R, port: u16) -> Result<()> {
    let delays = || std::iter::repeat(BOOT_POLL_INTERVAL).take(BOOT_POLL_ATTEMPTS);
    poll_boot(runtime, &emulator_serial(port), delays)
}

fn poll_boot<R, I, D>(runtime: &R, serial: &str, delays: D) -> Result<()>
where
    R: Runtime,
    I: IntoIterator<Item = Duration>,
    D: Fn() -> I,
{
    for (prop, expected_value) in [
        ("init.svc.bootanim", "stopped"),
        ("sys.boot_completed", "1"),
    ] {
        retry::<_, _, _, anyhow::Error, _>(delays(), || {
            debug!("reading prop {}", prop);
            let value = shell_getprop(runtime, serial, prop)?;
            debug!(prop = %prop, value = %value);
            if value != expected_value {
                Err(anyhow!(
                    "expected prop {} = {} but was {:?}",
                    prop,
                    expected_value,
                    value
                ))?;
            }
            Ok(())
        })
        .map_err(|source| Error::BootTimeout {
            serial: serial.to_owned(),
            source: source.context(format!("timed out waiting for prop {}", prop)),
        })?;
    }

    Ok(())
}

// Wrapper to not have to unwrap internal error
// https://github.com/jimmycuadra/retry/issues/38
fn retry<I, O, R, E, OR>(iterable: I, mut operation: O) -> std::result::Result<R, E>
where
    I: IntoIterator<Item = Duration>,
    O: FnMut() -> OR,
    OR: Into<retry::OperationResult<R, E>>,
{
    match retry::retry_with_index(iterable, |_| operation()) {
        Ok(value) => Ok(value),
        Err(e) => match e {
            retry::Error::Operation { error, .. } => Err(error),
            retry::Error::Internal(_) => unreachable!(),
        },
    }
}
