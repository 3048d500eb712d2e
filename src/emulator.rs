use std::io::{BufRead, BufReader, Read};
use std::process::Child;
use std::thread;
use std::time::Duration;

use process_control::{ChildExt, Control};
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tool::Tool;

/// How long a detached start waits before assuming the emulator is up.
pub const DETACH_GRACE: Duration = Duration::from_secs(1);

/// Console port of the first emulator instance, `emulator-5554`.
pub const DEFAULT_CONSOLE_PORT: u16 = 5554;

/// The emulator process owned by an [`Avd`](crate::Avd).
#[derive(Debug)]
pub enum ProcessState {
    NotStarted,
    /// Started in the foreground. The process has exited by the time
    /// `start` returns.
    Attached(Child),
    /// Started in the background; still booting, running, or exited on its
    /// own since.
    Detached(Child),
    Killed,
}

impl ProcessState {
    pub fn child(&self) -> Option<&Child> {
        match self {
            ProcessState::Attached(child) | ProcessState::Detached(child) => Some(child),
            ProcessState::NotStarted | ProcessState::Killed => None,
        }
    }

    pub(crate) fn child_mut(&mut self) -> Option<&mut Child> {
        match self {
            ProcessState::Attached(child) | ProcessState::Detached(child) => Some(child),
            ProcessState::NotStarted | ProcessState::Killed => None,
        }
    }

    /// True while a detached emulator has not exited.
    pub(crate) fn is_running(&mut self) -> Result<bool> {
        match self {
            ProcessState::Detached(child) => Ok(child.try_wait()?.is_none()),
            _ => Ok(false),
        }
    }

    /// Force-kills and reaps the tracked process. `Ok(false)` if there is none.
    pub(crate) fn kill(&mut self) -> Result<bool> {
        let child = match self.child_mut() {
            Some(child) => child,
            None => return Ok(false),
        };

        match child.try_wait()? {
            Some(status) => debug!(pid = child.id(), ?status, "already exited"),
            None => {
                child.kill()?;
                let status = child.wait()?;
                debug!(pid = child.id(), ?status, "killed");
            }
        }

        *self = ProcessState::Killed;
        Ok(true)
    }
}

/// How to launch the emulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Return after [`DETACH_GRACE`] instead of waiting for the emulator to exit.
    pub detach: bool,
    /// Extra emulator arguments, split like a shell would.
    pub config: String,
    /// Only for attached starts: give up and terminate after this long.
    pub attach_timeout: Option<Duration>,
}

impl StartOptions {
    pub fn attached() -> StartOptions {
        StartOptions::default()
    }

    pub fn detached() -> StartOptions {
        StartOptions { detach: true, ..StartOptions::default() }
    }

    pub fn config(mut self, config: impl Into<String>) -> StartOptions {
        self.config = config.into();
        self
    }

    pub fn attach_timeout(mut self, timeout: Duration) -> StartOptions {
        self.attach_timeout = Some(timeout);
        self
    }
}

pub(crate) fn emulator_args(avd: &str, config: &str) -> Result<Vec<String>> {
    let mut args = vec!["-avd".to_string(), avd.to_string()];
    let extra = shell_words::split(config).map_err(|source| Error::InvalidConfig {
        config: config.to_owned(),
        source,
    })?;
    args.extend(extra);
    Ok(args)
}

#[instrument(skip(runtime))]
pub(crate) fn launch<R: Runtime>(runtime: &R, avd: &str, options: &StartOptions) -> Result<ProcessState> {
    let args = emulator_args(avd, &options.config)?;
    let mut child = runtime.spawn(Tool::Emulator, &args)?;
    forward_output(&mut child, avd);

    if options.detach {
        match child.controlled().time_limit(DETACH_GRACE).wait()? {
            Some(status) => info!(avd, ?status, "emulator exited during startup"),
            None => info!(avd, pid = child.id(), "emulator running in background"),
        }
        return Ok(ProcessState::Detached(child));
    }

    match options.attach_timeout {
        None => {
            let status = child.wait()?;
            info!(avd, ?status, "emulator exited");
        }
        Some(timeout) => match child.controlled().time_limit(timeout).terminate_for_timeout().wait()? {
            Some(status) => info!(avd, ?status, "emulator exited"),
            None => {
                match child.wait() {
                    Ok(status) => debug!(avd, ?status, "terminated after timeout"),
                    Err(e) => debug!(avd, error = %e, "could not reap after timeout"),
                }
                return Err(Error::LaunchTimeout { avd: avd.to_owned(), timeout });
            }
        },
    }
    Ok(ProcessState::Attached(child))
}

/// Moves the emulator's pipes onto threads that log each line, so a chatty
/// emulator never stalls on a full pipe.
fn forward_output(child: &mut Child, avd: &str) {
    if let Some(stdout) = child.stdout.take() {
        forward(stdout, avd, "stdout");
    }
    if let Some(stderr) = child.stderr.take() {
        forward(stderr, avd, "stderr");
    }
}

fn forward<S: Read + Send + 'static>(stream: S, avd: &str, name: &'static str) {
    let avd = avd.to_owned();
    let spawned = thread::Builder::new()
        .name(format!("emulator-{}", name))
        .spawn(move || {
            for line in BufReader::new(stream).split(b'\n') {
                match line {
                    Ok(line) => debug!(avd = %avd, stream = name, "{}", String::from_utf8_lossy(&line).trim_end()),
                    Err(_) => break,
                }
            }
        });
    if let Err(e) = spawned {
        warn!(stream = name, error = %e, "could not forward emulator output");
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use try_block::try_block;

    use crate::debug_log;
    use crate::emulator::{emulator_args, launch, ProcessState, StartOptions};
    use crate::error::Error;
    use crate::runtime::fake::FakeRuntimeBuilder;
    use crate::tool::Tool;

    type Result<T = ()> = anyhow::Result<T>;

    #[test]
    fn splits_config_like_a_shell() -> Result {
        let args = emulator_args("Pixel_6", "-gpu host -prop 'persist.sys.language=en US' -no-audio")?;

        assert_eq!(args, vec![
            "-avd", "Pixel_6", "-gpu", "host", "-prop", "persist.sys.language=en US", "-no-audio",
        ]);
        Ok(())
    }

    #[test]
    fn empty_config_adds_nothing() -> Result {
        assert_eq!(emulator_args("Pixel_6", "")?, vec!["-avd", "Pixel_6"]);
        Ok(())
    }

    #[test]
    fn unbalanced_quote_is_invalid_config() {
        let result = emulator_args("Pixel_6", "-prop 'oops");

        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn detached_start_returns_while_emulator_runs() -> Result {
        debug_log();
        let runtime = FakeRuntimeBuilder::default().emulator("sleep 5").build()?;

        let started = Instant::now();
        let mut state = launch(&runtime, "Pixel_6", &StartOptions::detached())?;
        let elapsed = started.elapsed();
        let running = state.is_running();
        let result: Result = try_block! {
            assert!(elapsed < Duration::from_secs(3));
            assert!(matches!(state, ProcessState::Detached(_)));
            assert!(running?);
            Ok(())
        };
        assert!(state.kill()?);
        result?;

        assert_eq!(runtime.spawned(), vec![(Tool::Emulator, vec!["-avd".to_string(), "Pixel_6".to_string()])]);
        Ok(())
    }

    #[test]
    fn detached_start_accepts_early_exit() -> Result {
        let runtime = FakeRuntimeBuilder::default().emulator("exit 3").build()?;

        let mut state = launch(&runtime, "Pixel_6", &StartOptions::detached())?;

        assert!(matches!(state, ProcessState::Detached(_)));
        assert!(!state.is_running()?);
        Ok(())
    }

    #[test]
    fn attached_start_waits_for_exit() -> Result {
        let runtime = FakeRuntimeBuilder::default().emulator("sleep 0.2").build()?;

        let mut state = launch(&runtime, "Pixel_6", &StartOptions::attached())?;

        match &mut state {
            ProcessState::Attached(child) => assert!(child.try_wait()?.is_some()),
            other => panic!("expected Attached, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn attached_start_survives_lots_of_output() -> Result {
        // well past a pipe buffer on both streams
        let runtime = FakeRuntimeBuilder::default()
            .emulator("i=0; while [ $i -lt 4000 ]; do echo 'emulator: INFO: some boot chatter line'; echo warn >&2; i=$((i+1)); done")
            .build()?;

        let state = launch(&runtime, "Pixel_6", &StartOptions::attached().attach_timeout(Duration::from_secs(20)))?;

        assert!(matches!(state, ProcessState::Attached(_)));
        Ok(())
    }

    #[test]
    fn attached_timeout_is_an_error() -> Result {
        let runtime = FakeRuntimeBuilder::default().emulator("sleep 5").build()?;

        let started = Instant::now();
        let result = launch(&runtime, "Pixel_6", &StartOptions::attached().attach_timeout(Duration::from_millis(200)));

        assert!(matches!(result, Err(Error::LaunchTimeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(3));
        Ok(())
    }

    #[test]
    fn kill_without_process_is_a_no_op() -> Result {
        let mut state = ProcessState::NotStarted;
        assert!(!state.kill()?);

        let mut state = ProcessState::Killed;
        assert!(!state.kill()?);
        Ok(())
    }

    #[test]
    fn kill_clears_the_process() -> Result {
        let runtime = FakeRuntimeBuilder::default().emulator("sleep 5").build()?;
        let mut state = launch(&runtime, "Pixel_6", &StartOptions::detached())?;

        assert!(state.kill()?);
        assert!(matches!(state, ProcessState::Killed));
        assert!(state.child().is_none());
        assert!(!state.kill()?);
        Ok(())
    }
}
