// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed manifest and a fluent builder so each
// integration test can set up an isolated environment without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use gpgfile::cli::GlobalOpts;
use gpgfile::commands::CommandSetup;
use gpgfile::compiler::{self, CompiledActionSet};
use gpgfile::config::Manifest;
use gpgfile::error::ConfigError;
use gpgfile::logging::Logger;

/// File name of the manifest written into every test directory.
pub const MANIFEST: &str = "gpgfile.toml";

/// An isolated test directory backed by a [`tempfile::TempDir`].
///
/// Holds a manifest and, for apply tests, the files it manages. The
/// directory is deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory containing the manifest and managed files.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a new context with an empty manifest.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::write(root.path().join(MANIFEST), "").expect("write manifest");
        Self { root }
    }

    /// Path to the temp directory.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Path of `name` inside the temp directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Path to the manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.path(MANIFEST)
    }

    /// Load the manifest.
    pub fn load_manifest(&self) -> Manifest {
        Manifest::load(&self.manifest_path()).expect("load manifest")
    }

    /// Load and compile the manifest.
    pub fn compile(&self) -> Result<Vec<CompiledActionSet>, ConfigError> {
        compiler::compile_manifest(&self.load_manifest())
    }

    /// Load and compile the manifest the way the CLI does.
    pub fn setup(&self, global: &GlobalOpts) -> anyhow::Result<CommandSetup> {
        CommandSetup::load(global, self.manifest_path(), &Logger::new())
    }
}

/// Fluent builder for [`IntegrationTestContext`].
///
/// Appends TOML to the manifest piece by piece so individual tests only
/// spell out what they care about.
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
    manifest: String,
}

impl TestContextBuilder {
    /// Begin building a new context with an empty manifest.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
            manifest: String::new(),
        }
    }

    /// Append raw TOML to the manifest.
    pub fn with_toml(mut self, toml: &str) -> Self {
        self.manifest.push_str(toml);
        self.manifest.push('\n');
        self
    }

    /// Append a `[[gpgfile]]` declaration for `<tempdir>/<name>` with inline
    /// `content` and any extra `key = value` lines.
    pub fn with_local_file(self, name: &str, content: &str, extra: &str) -> Self {
        let path = self.ctx.path(name);
        let toml = format!(
            "[[gpgfile]]\npath = {:?}\ncontent = {content:?}\n{extra}",
            path.to_string_lossy()
        );
        self.with_toml(&toml)
    }

    /// Append a `[[gpgfile]]` declaration for `<tempdir>/<name>` whose
    /// encrypted content is fetched from `source`.
    pub fn with_local_source(self, name: &str, source: &str, extra: &str) -> Self {
        let path = self.ctx.path(name);
        let toml = format!(
            "[[gpgfile]]\npath = {:?}\nsource = {source:?}\n{extra}",
            path.to_string_lossy()
        );
        self.with_toml(&toml)
    }

    /// Path of `name` inside the temp directory being built.
    pub fn path(&self, name: &str) -> PathBuf {
        self.ctx.path(name)
    }

    /// Create `name` inside the temp directory with `content`.
    pub fn with_existing_file(self, name: &str, content: &str) -> Self {
        let path = self.ctx.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, content).expect("write existing file");
        self
    }

    /// Finish building, write the manifest and return the context.
    pub fn build(self) -> IntegrationTestContext {
        std::fs::write(self.ctx.manifest_path(), &self.manifest).expect("write manifest");
        self.ctx
    }
}
