pub mod clock;
pub mod commands;
pub mod config;
pub mod date_format;
pub mod error;
pub mod header;
pub mod logging;
pub mod ordering;
pub mod sequencer;
pub mod settings;
pub mod vault;
pub mod workspace;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use commands::{ActionOutcome, CommandRegistry, MenuAction, Target};
pub use date_format::DateFormat;
pub use error::{Result, SequencerError};
pub use header::HeaderFormat;
pub use ordering::Note;
pub use sequencer::{CreateOutcome, Sequencer};
pub use settings::{JsonFileStore, Settings, SettingsPanel, SettingsStore};
pub use vault::{FsVault, Vault};
#[cfg(any(test, feature = "test-helpers"))]
pub use vault::MemoryVault;
pub use workspace::{ConsoleWorkspace, Workspace};
