use std::fs::{self, DirBuilder, Permissions};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::Path;
use std::process::Command;

use nix::unistd::{Group, User};

use crate::ui::prelude::*;

use super::error::{EntityKind, ProvisionError, Result};
use super::executor::CommandExecutor;
use super::host::{HostFilesystem, IdentityLookup, IdentityManager, MembershipMode};

/// The real host: passwd/group lookups through libc, mutations through
/// `useradd`, `groupadd`, `usermod` and the filesystem.
#[derive(Clone, Copy)]
pub struct SystemHost<'a> {
    executor: CommandExecutor<'a>,
}

impl<'a> SystemHost<'a> {
    pub fn new(dry_run: bool, diag: &'a dyn Diagnostics) -> Self {
        Self {
            executor: CommandExecutor::new(dry_run, diag),
        }
    }

    fn dry_run(&self) -> bool {
        self.executor.dry_run
    }
}

impl IdentityLookup for SystemHost<'_> {
    fn user_exists(&self, name: &str) -> Result<bool> {
        User::from_name(name)
            .map(|entry| entry.is_some())
            .map_err(|source| ProvisionError::Lookup {
                kind: EntityKind::User,
                name: name.to_string(),
                source,
            })
    }

    fn group_exists(&self, name: &str) -> Result<bool> {
        Group::from_name(name)
            .map(|entry| entry.is_some())
            .map_err(|source| ProvisionError::Lookup {
                kind: EntityKind::Group,
                name: name.to_string(),
                source,
            })
    }
}

impl IdentityManager for SystemHost<'_> {
    fn create_user(&self, name: &str) -> Result<()> {
        self.executor.run(Command::new("useradd").arg(name))
    }

    fn create_group(&self, name: &str) -> Result<()> {
        self.executor.run(Command::new("groupadd").arg(name))
    }

    fn set_membership(&self, user: &str, group: &str, mode: MembershipMode) -> Result<()> {
        self.executor.run(&mut membership_command(user, group, mode))
    }
}

pub fn membership_command(user: &str, group: &str, mode: MembershipMode) -> Command {
    let mut command = Command::new("usermod");
    if mode == MembershipMode::Append {
        command.arg("-a");
    }
    command.arg("-G").arg(group).arg(user);
    command
}

impl HostFilesystem for SystemHost<'_> {
    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_directory(&self, path: &Path, mode: u32) -> Result<()> {
        if self.dry_run() {
            self.executor
                .report_dry_run(&format!("mkdir -p -m {:o} {}", mode, path.display()));
            return Ok(());
        }
        DirBuilder::new()
            .recursive(true)
            .mode(mode)
            .create(path)
            .map_err(|source| ProvisionError::filesystem(path, "create directory", source))
    }

    fn set_group(&self, path: &Path, group: &str) -> Result<()> {
        if self.dry_run() {
            self.executor
                .report_dry_run(&format!("chgrp {} {}", group, path.display()));
            return Ok(());
        }
        let gid = Group::from_name(group)
            .map_err(|source| ProvisionError::Lookup {
                kind: EntityKind::Group,
                name: group.to_string(),
                source,
            })?
            .ok_or_else(|| ProvisionError::UnknownGroup(group.to_string()))?
            .gid;

        nix::unistd::chown(path, None, Some(gid))
            .map_err(|errno| ProvisionError::filesystem(path, "change group of", errno.into()))
    }

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        if self.dry_run() {
            self.executor
                .report_dry_run(&format!("chmod {:o} {}", mode, path.display()));
            return Ok(());
        }
        fs::set_permissions(path, Permissions::from_mode(mode))
            .map_err(|source| ProvisionError::filesystem(path, "change mode of", source))
    }
}
