use std::path::PathBuf;
use std::process::{Command, Output};

// Test helper types and methods shared by the CLI and e2e test files.
// Not every helper is used by every test file, so dead-code warnings
// are suppressed to keep CI clean.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: tempfile::TempDir,
    pub cache_dir: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let cache_dir = temp_dir.path().join("cache");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_ghrun"));

        Self {
            _temp_dir: temp_dir,
            cache_dir,
            bin_path,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("GHRUN_CACHE_DIR", &self.cache_dir);
        // Isolate HOME and XDG dirs so tests never touch a real cache
        cmd.env("HOME", self._temp_dir.path());
        cmd.env("XDG_CACHE_HOME", self._temp_dir.path().join("xdg-cache"));
        cmd
    }
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        if self.status.success() {
            panic!(
                "Command unexpectedly succeeded\nstdout: {}\nstderr: {}",
                self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert against combined stdout+stderr; log lines and clap
    /// errors land on different streams.
    pub fn assert_output_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text) || self.stderr.contains(text),
            "Neither stream contained '{}'\nstdout: {}\nstderr: {}",
            text,
            self.stdout,
            self.stderr
        );
        self
    }
}
