use std::path::Path;

/// The accounts and shared directory a host should end up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Manifest {
    pub users: &'static [&'static str],
    pub group: &'static str,
    pub directory: &'static str,
    pub mode: u32,
}

impl Manifest {
    pub const SCIENCE: Manifest = Manifest {
        users: &["alpha", "beta", "gamma"],
        group: "science",
        directory: "/opt/science_dir",
        mode: 0o770,
    };

    pub fn directory_path(&self) -> &Path {
        Path::new(self.directory)
    }
}
