pub mod package_json;
pub mod readme;

pub use package_json::{ForkManifest, UpstreamManifest, validate_package_name};
pub use readme::{apply_fork_notice, fork_notice, prepend_fork_notice};
