pub mod config;
pub mod credentials;
pub mod error;
pub mod keys;
pub mod logging;
pub mod registry;
pub mod service;

pub use config::AppConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{CoreError, ServiceError};
pub use keys::TrackerKeys;
pub use registry::{Tracker, TrackerRegistry};
pub use service::{PushOutcome, TrackerService};
