pub mod core;
pub mod manifest;
pub mod orchestration;
pub mod registry;
pub mod security;

pub use self::core::{CONFIG_FILE, ForkConfig, ForkIdentity, RepublishError, UpstreamConfig};
pub use self::manifest::{ForkManifest, UpstreamManifest};
pub use self::orchestration::{RepublishOptions, RepublishReport, Republisher};
pub use self::registry::NpmRegistry;
pub use self::security::{CommandError, CommandRunner, TokenManager};
