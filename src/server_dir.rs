use std::path::{Path, PathBuf};

/// Name of the working directory created beneath the user's home directory.
pub const SERVER_DIR_NAME: &str = "gca-server";

/// Manages the `~/gca-server/` directory layout.
///
/// The GCA server keeps all of its state under this directory. The supervisor
/// only needs the root and its own settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDir {
    root: PathBuf,
}

impl ServerDir {
    /// Create a new ServerDir referencing the given root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The working directory for a given home directory.
    pub fn under_home(home: &Path) -> Self {
        Self::new(home.join(SERVER_DIR_NAME))
    }

    /// The root directory (e.g. `/home/alice/gca-server`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the optional supervisor settings file.
    pub fn supervisor_config(&self) -> PathBuf {
        self.root.join("supervisor.toml")
    }

    /// Create the directory tree.
    /// Returns Ok(true) if the root was created, Ok(false) if it already existed.
    pub fn init(&self) -> std::io::Result<bool> {
        let created = !self.root.exists();
        std::fs::create_dir_all(&self.root)?;
        Ok(created)
    }
}
