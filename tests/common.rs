use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// Not every test binary uses every helper.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub bin_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub bin_path: PathBuf,
    pub api_url: Option<String>,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let bin_dir = temp_dir.path().join("bin");
        let lib_dir = temp_dir.path().join("lib");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_oi-installer"));

        Self {
            _temp_dir: temp_dir,
            bin_dir,
            lib_dir,
            bin_path,
            api_url: None,
        }
    }

    /// Point the installer at a fake API instead of GitHub.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("OI_BIN_DIR", &self.bin_dir);
        cmd.env("OI_LIB_DIR", &self.lib_dir);
        cmd.env("HOME", self._temp_dir.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("GITHUB_TOKEN");
        cmd.env_remove("RUST_LOG");
        // keeps the anyhow report free of stack traces
        cmd.env_remove("RUST_BACKTRACE");
        cmd.env_remove("RUST_LIB_BACKTRACE");
        match &self.api_url {
            Some(url) => cmd.env("OI_API_URL", url),
            None => cmd.env_remove("OI_API_URL"),
        };
        cmd
    }

    pub fn payload_dir(&self) -> PathBuf {
        self.lib_dir.join("oi")
    }

    pub fn entry_point(&self) -> PathBuf {
        self.bin_dir.join("oi")
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

    pub fn assert_exit_code(&self, code: i32) -> &Self {
        assert_eq!(
            self.status.code(),
            Some(code),
            "Unexpected exit status\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
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

    pub fn assert_stdout_not_contains(&self, text: &str) -> &Self {
        assert!(
            !self.stdout.contains(text),
            "Stdout unexpectedly contained '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }
}
