//! Transport settings: an optional JSON file, validated into immutable
//! [`TransportSettings`](validated::TransportSettings).

pub mod error;
pub mod file;
pub mod validated;
pub mod validator;

pub use error::SettingsError;
pub use file::SettingsFile;
pub use validated::{TransportSettings, TransportSettingsBuilder};
pub use validator::SettingsValidator;
