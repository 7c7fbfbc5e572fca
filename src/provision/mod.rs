//! Host bootstrap for the science group: accounts, membership and the
//! shared directory.

pub mod error;
pub mod executor;
pub mod host;
pub mod manifest;
pub mod privileges;
pub mod provisioner;
pub mod system;

#[cfg(test)]
mod fake;

pub use error::ProvisionError;
pub use host::MembershipMode;
pub use manifest::Manifest;
pub use provisioner::{Provisioner, RunSummary};
pub use system::SystemHost;
