pub mod client;
pub mod core;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use client::{ClientFactory, StorageClient};
pub use self::core::command_loop::{Action, CommandLoop};
pub use self::core::console::{Console, ConsoleError, MenuGroup};
pub use self::core::errors::{ClientError, Error, Result, StoreError};
pub use self::core::probe::{HealthProbe, ProbeEvent, ProbeResult, ProbeTiming};
pub use self::core::session::{ActiveSession, SessionManager};
pub use storage::profile::{Profile, ProfileForm};
pub use storage::store::ProfileStore;
