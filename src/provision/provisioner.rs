use std::path::Path;

use crate::ui::prelude::*;

use super::error::Result;
use super::host::{HostFilesystem, IdentityLookup, IdentityManager, MembershipMode};
use super::manifest::Manifest;

/// What a run changed. Existing users, group and directory are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub users_created: Vec<String>,
    pub group_created: bool,
    pub memberships_applied: usize,
    pub directory_created: bool,
}

/// Drives the check-then-act sequence against a host.
///
/// Every step re-queries the host; nothing is cached between steps, so
/// running twice converges on the same state.
pub struct Provisioner<'a> {
    lookup: &'a dyn IdentityLookup,
    manager: &'a dyn IdentityManager,
    fs: &'a dyn HostFilesystem,
    diag: &'a dyn Diagnostics,
    membership_mode: MembershipMode,
}

impl<'a> Provisioner<'a> {
    pub fn new<H>(host: &'a H, diag: &'a dyn Diagnostics) -> Self
    where
        H: IdentityLookup + IdentityManager + HostFilesystem,
    {
        Self {
            lookup: host,
            manager: host,
            fs: host,
            diag,
            membership_mode: MembershipMode::default(),
        }
    }

    pub fn with_membership_mode(mut self, mode: MembershipMode) -> Self {
        self.membership_mode = mode;
        self
    }

    /// Users, then the group, then memberships, then the directory. Stops at
    /// the first failure; steps already done stay done.
    pub fn run(&self, manifest: &Manifest) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        self.diag
            .info("provision.start", "Starting user management operations");

        for user in manifest.users {
            if self.ensure_user(user)? {
                summary.users_created.push(user.to_string());
            }
        }

        summary.group_created = self.ensure_group(manifest.group)?;

        for user in manifest.users {
            self.ensure_membership(user, manifest.group)?;
            summary.memberships_applied += 1;
        }

        summary.directory_created =
            self.ensure_directory(manifest.directory_path(), manifest.group, manifest.mode)?;

        Ok(summary)
    }

    /// Returns whether the user had to be created.
    pub fn ensure_user(&self, name: &str) -> Result<bool> {
        let exists = self
            .lookup
            .user_exists(name)
            .inspect_err(|err| self.diag.error("provision.user.lookup", &err.to_string()))?;
        if exists {
            self.diag.info(
                "provision.user.skip",
                &format!("User {} already exists, skipping creation", name),
            );
            return Ok(false);
        }

        self.diag
            .info("provision.user.create", &format!("Creating user {}", name));
        if let Err(err) = self.manager.create_user(name) {
            self.diag.error(
                "provision.user.create",
                &format!("Failed to create user {}: {}", name, err),
            );
            return Err(err);
        }
        self.diag.info(
            "provision.user.create",
            &format!("User {} created successfully", name),
        );
        Ok(true)
    }

    /// Returns whether the group had to be created.
    pub fn ensure_group(&self, name: &str) -> Result<bool> {
        let exists = self
            .lookup
            .group_exists(name)
            .inspect_err(|err| self.diag.error("provision.group.lookup", &err.to_string()))?;
        if exists {
            self.diag.info(
                "provision.group.skip",
                &format!("Group {} already exists, skipping creation", name),
            );
            return Ok(false);
        }

        self.diag
            .info("provision.group.create", &format!("Creating group {}", name));
        if let Err(err) = self.manager.create_group(name) {
            self.diag.error(
                "provision.group.create",
                &format!("Failed to create group {}: {}", name, err),
            );
            return Err(err);
        }
        self.diag.info(
            "provision.group.create",
            &format!("Group {} created successfully", name),
        );
        Ok(true)
    }

    /// Applied on every run regardless of current membership.
    pub fn ensure_membership(&self, user: &str, group: &str) -> Result<()> {
        self.diag.debug(
            "provision.membership",
            &format!(
                "Applying group {} to user {} ({:?})",
                group, user, self.membership_mode
            ),
        );
        if let Err(err) = self
            .manager
            .set_membership(user, group, self.membership_mode)
        {
            self.diag.error(
                "provision.membership",
                &format!("Failed to add user {} to group {}: {}", user, group, err),
            );
            return Err(err);
        }
        self.diag.info(
            "provision.membership",
            &format!("Added user {} to group {}", user, group),
        );
        Ok(())
    }

    /// Creates the directory if needed, then always re-applies group and mode.
    /// Returns whether the directory had to be created.
    pub fn ensure_directory(&self, path: &Path, group: &str, mode: u32) -> Result<bool> {
        let created = if self.fs.directory_exists(path) {
            self.diag.info(
                "provision.directory.skip",
                &format!("Directory {} already exists", path.display()),
            );
            false
        } else {
            self.diag.info(
                "provision.directory.create",
                &format!("Creating directory {}", path.display()),
            );
            if let Err(err) = self.fs.create_directory(path, mode) {
                self.diag.error(
                    "provision.directory.create",
                    &format!("Failed to create directory {}: {}", path.display(), err),
                );
                return Err(err);
            }
            true
        };

        let applied = self
            .fs
            .set_group(path, group)
            .and_then(|()| self.fs.set_mode(path, mode));
        if let Err(err) = applied {
            self.diag.error(
                "provision.directory.permissions",
                &format!(
                    "Failed to set ownership/permissions for {}: {}",
                    path.display(),
                    err
                ),
            );
            return Err(err);
        }
        self.diag.info(
            "provision.directory.permissions",
            &format!(
                "Successfully set ownership and permissions for {}",
                path.display()
            ),
        );

        Ok(created)
    }
}
