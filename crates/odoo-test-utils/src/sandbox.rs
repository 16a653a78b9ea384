//! Throwaway directory for running the migration binary against fixture
//! modules.
//!
//! Everything lives under an `assert_fs::TempDir` and is cleaned up on drop.
//!
//! ## Quick example
//! ```no_run
//! use odoo_test_utils::Sandbox;
//!
//! let mut sb = Sandbox::new();
//! sb.write("my_module/__manifest__.py", "{\n    'name': 'X',\n}\n");
//!
//! let output = sb.snapshot_run("odoo-migrate", ["-i", "14.0", "-t", "15.0"]);
//! println!("{output}");
//! ```

use assert_fs::TempDir;
use duct::Expression;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Sandbox {
    _root: TempDir,
    default_cwd: PathBuf,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        // Resolve symlinks (macOS /var -> /private/var) so paths printed by
        // the binary can be filtered out.
        let default_cwd = fs::canonicalize(root.path()).expect("canonicalize sandbox root");
        Self {
            _root: root,
            default_cwd,
        }
    }

    /// Absolute path to the sandbox root.
    pub fn root_path(&self) -> &Path {
        &self.default_cwd
    }

    /// Write/overwrite a file relative to the sandbox root.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.root_path().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Read a file relative to the sandbox root.
    pub fn read<P: AsRef<Path>>(&self, rel: P) -> String {
        fs::read_to_string(self.root_path().join(rel)).expect("read file")
    }

    pub fn exists<P: AsRef<Path>>(&self, rel: P) -> bool {
        self.root_path().join(rel).exists()
    }

    /// Build a `duct::Expression` for a cargo binary, running in the sandbox
    /// root with colors disabled.
    pub fn cmd<I>(&self, program: &str, args: I) -> Expression
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let cargo_bin_path = assert_cmd::cargo::cargo_bin(program);
        let args: Vec<_> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();
        duct::cmd(cargo_bin_path, args)
            .dir(&self.default_cwd)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
    }

    /// Run a cargo binary and return stdout. Errors if it exits non-zero.
    pub fn run<I>(&self, program: &str, args: I) -> Result<String, String>
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        self.cmd(program, args)
            .read()
            .map_err(|e| format!("command failed: {e}"))
    }

    /// Run a cargo binary regardless of its exit status and render exit
    /// code, stdout and stderr as one string, with the sandbox path replaced
    /// by `<ROOT>`.
    pub fn snapshot_run<I>(&self, program: &str, args: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let output = self
            .cmd(program, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .expect("spawn command");

        let root = self.root_path().to_string_lossy().into_owned();
        let clean = |bytes: &[u8]| String::from_utf8_lossy(bytes).replace(&root, "<ROOT>");
        format!(
            "Exit Code: {}\n\n--- STDOUT ---\n{}\n--- STDERR ---\n{}",
            output.status.code().unwrap_or(-1),
            clean(&output.stdout),
            clean(&output.stderr),
        )
    }
}
