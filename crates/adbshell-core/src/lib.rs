// adbshell-core: command dispatch, saved devices and process plumbing
// shared by the adbshell binary.

pub mod command;
pub mod device_count;
pub mod error;
pub mod model;
pub mod probe;
pub mod registry;
pub mod reporter;
pub mod runner;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Dispatcher, ShellCommand, WSA_PORT};
pub use device_count::{CountChange, DeviceCount};
pub use error::CoreError;
pub use model::{ConfigFlags, FlagKey, SavedDevice, parse_flag_value};
pub use registry::{AddOutcome, DeviceRegistry};
pub use reporter::{PresenceFiles, Reporter, ReporterConfig, probe_once};
pub use runner::{
    CommandRunner, Interpreter, Invocation, OutcomeClassifier, ProcessRunner, RunOutcome,
    SuccessDetection,
};
