//! In-memory host for exercising the provisioner without root.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use super::error::{EntityKind, ProvisionError, Result};
use super::executor::args_of;
use super::host::{HostFilesystem, IdentityLookup, IdentityManager, MembershipMode};
use super::system::membership_command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateUser(String),
    CreateGroup(String),
    SetMembership(String, String, MembershipMode),
    CreateDirectory(PathBuf, u32),
    SetGroup(PathBuf, String),
    SetMode(PathBuf, u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeDir {
    pub group: Option<String>,
    pub mode: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostState {
    users: BTreeSet<String>,
    groups: BTreeSet<String>,
    memberships: BTreeMap<String, BTreeSet<String>>,
    directories: BTreeMap<PathBuf, FakeDir>,
    files: BTreeSet<PathBuf>,
}

#[derive(Debug, Default)]
struct Failures {
    users: BTreeSet<String>,
    groups: BTreeSet<String>,
    memberships: BTreeSet<String>,
    lookups: BTreeSet<String>,
    chmod: bool,
}

#[derive(Debug, Default)]
pub struct FakeHost {
    state: RefCell<HostState>,
    calls: RefCell<Vec<Call>>,
    failures: Failures,
}

fn tool_failure(program: &str, args: &[&str], code: i32) -> ProvisionError {
    ProvisionError::Tool {
        program: program.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        code: Some(code),
    }
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(self, names: &[&str]) -> Self {
        self.state
            .borrow_mut()
            .users
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_groups(self, names: &[&str]) -> Self {
        self.state
            .borrow_mut()
            .groups
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_membership(self, user: &str, group: &str) -> Self {
        self.state
            .borrow_mut()
            .memberships
            .entry(user.to_string())
            .or_default()
            .insert(group.to_string());
        self
    }

    pub fn with_directory(self, path: &str, group: &str, mode: u32) -> Self {
        self.state.borrow_mut().directories.insert(
            PathBuf::from(path),
            FakeDir {
                group: Some(group.to_string()),
                mode,
            },
        );
        self
    }

    pub fn with_file(self, path: &str) -> Self {
        self.state.borrow_mut().files.insert(PathBuf::from(path));
        self
    }

    pub fn failing_user(mut self, name: &str) -> Self {
        self.failures.users.insert(name.to_string());
        self
    }

    pub fn failing_group(mut self, name: &str) -> Self {
        self.failures.groups.insert(name.to_string());
        self
    }

    pub fn failing_membership(mut self, user: &str) -> Self {
        self.failures.memberships.insert(user.to_string());
        self
    }

    pub fn broken_lookup(mut self, name: &str) -> Self {
        self.failures.lookups.insert(name.to_string());
        self
    }

    pub fn failing_chmod(mut self) -> Self {
        self.failures.chmod = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn state(&self) -> HostState {
        self.state.borrow().clone()
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.state.borrow().users.contains(name)
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.state.borrow().groups.contains(name)
    }

    pub fn is_member(&self, user: &str, group: &str) -> bool {
        self.state
            .borrow()
            .memberships
            .get(user)
            .is_some_and(|groups| groups.contains(group))
    }

    pub fn directory(&self, path: &str) -> Option<FakeDir> {
        self.state.borrow().directories.get(Path::new(path)).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn lookup(&self, kind: EntityKind, name: &str) -> Result<()> {
        if self.failures.lookups.contains(name) {
            return Err(ProvisionError::Lookup {
                kind,
                name: name.to_string(),
                source: nix::errno::Errno::EIO,
            });
        }
        Ok(())
    }
}

impl IdentityLookup for FakeHost {
    fn user_exists(&self, name: &str) -> Result<bool> {
        self.lookup(EntityKind::User, name)?;
        Ok(self.has_user(name))
    }

    fn group_exists(&self, name: &str) -> Result<bool> {
        self.lookup(EntityKind::Group, name)?;
        Ok(self.has_group(name))
    }
}

impl IdentityManager for FakeHost {
    fn create_user(&self, name: &str) -> Result<()> {
        self.record(Call::CreateUser(name.to_string()));
        let mut state = self.state.borrow_mut();
        // useradd exits 9 for a duplicate name
        if self.failures.users.contains(name) || state.users.contains(name) {
            return Err(tool_failure("useradd", &[name], 9));
        }
        state.users.insert(name.to_string());
        Ok(())
    }

    fn create_group(&self, name: &str) -> Result<()> {
        self.record(Call::CreateGroup(name.to_string()));
        let mut state = self.state.borrow_mut();
        if self.failures.groups.contains(name) || state.groups.contains(name) {
            return Err(tool_failure("groupadd", &[name], 9));
        }
        state.groups.insert(name.to_string());
        Ok(())
    }

    fn set_membership(&self, user: &str, group: &str, mode: MembershipMode) -> Result<()> {
        self.record(Call::SetMembership(
            user.to_string(),
            group.to_string(),
            mode,
        ));
        let mut state = self.state.borrow_mut();
        if self.failures.memberships.contains(user)
            || !state.users.contains(user)
            || !state.groups.contains(group)
        {
            return Err(ProvisionError::Tool {
                program: "usermod".to_string(),
                args: args_of(&membership_command(user, group, mode)),
                code: Some(6),
            });
        }
        let groups = state.memberships.entry(user.to_string()).or_default();
        if mode == MembershipMode::Exact {
            groups.clear();
        }
        groups.insert(group.to_string());
        Ok(())
    }
}

impl HostFilesystem for FakeHost {
    fn directory_exists(&self, path: &Path) -> bool {
        self.state.borrow().directories.contains_key(path)
    }

    fn create_directory(&self, path: &Path, mode: u32) -> Result<()> {
        self.record(Call::CreateDirectory(path.to_path_buf(), mode));
        let mut state = self.state.borrow_mut();
        if state.files.contains(path) {
            return Err(ProvisionError::filesystem(
                path,
                "create directory",
                io::Error::from(io::ErrorKind::AlreadyExists),
            ));
        }
        state
            .directories
            .entry(path.to_path_buf())
            .or_insert(FakeDir { group: None, mode });
        Ok(())
    }

    fn set_group(&self, path: &Path, group: &str) -> Result<()> {
        self.record(Call::SetGroup(path.to_path_buf(), group.to_string()));
        let mut state = self.state.borrow_mut();
        if !state.groups.contains(group) {
            return Err(ProvisionError::UnknownGroup(group.to_string()));
        }
        let dir = state.directories.get_mut(path).ok_or_else(|| {
            ProvisionError::filesystem(
                path,
                "change group of",
                io::Error::from(io::ErrorKind::NotFound),
            )
        })?;
        dir.group = Some(group.to_string());
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        self.record(Call::SetMode(path.to_path_buf(), mode));
        let mut state = self.state.borrow_mut();
        let dir = state.directories.get_mut(path);
        match dir {
            Some(dir) if !self.failures.chmod => {
                dir.mode = mode;
                Ok(())
            }
            Some(_) => Err(ProvisionError::filesystem(
                path,
                "change mode of",
                io::Error::from(io::ErrorKind::PermissionDenied),
            )),
            None => Err(ProvisionError::filesystem(
                path,
                "change mode of",
                io::Error::from(io::ErrorKind::NotFound),
            )),
        }
    }
}
