// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod clock;
pub mod engine;
pub mod error;
pub mod history;
pub mod input;
pub mod logging;
pub mod mode;
pub mod random;
pub mod runtime;
pub mod scheduler;
pub mod sensitivity;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod target;
pub mod util;

pub use engine::{SessionEngine, ShotOutcome};
pub use error::{EngineError, StoreError};
pub use mode::GameMode;
pub use session::SessionState;
pub use settings::GameSettings;
pub use storage::Storage;
