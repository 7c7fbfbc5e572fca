//! Capabilities the provisioner needs from the host.
//!
//! `system` implements them against the real identity database and
//! filesystem; tests use an in-memory fake.

use std::path::Path;

use super::error::Result;

/// How `usermod` applies the supplementary group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MembershipMode {
    /// `usermod -a -G`: add the group, keep the user's other supplementary groups.
    #[default]
    Append,
    /// `usermod -G`: replace the supplementary list with exactly this group.
    Exact,
}

pub trait IdentityLookup {
    fn user_exists(&self, name: &str) -> Result<bool>;
    fn group_exists(&self, name: &str) -> Result<bool>;
}

pub trait IdentityManager {
    fn create_user(&self, name: &str) -> Result<()>;
    fn create_group(&self, name: &str) -> Result<()>;
    fn set_membership(&self, user: &str, group: &str, mode: MembershipMode) -> Result<()>;
}

pub trait HostFilesystem {
    /// True only when `path` exists and is a directory.
    fn directory_exists(&self, path: &Path) -> bool;
    /// Creates `path` and any missing parents with `mode`.
    fn create_directory(&self, path: &Path, mode: u32) -> Result<()>;
    /// Changes the owning group, leaving the owning user alone.
    fn set_group(&self, path: &Path, group: &str) -> Result<()>;
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()>;
}
