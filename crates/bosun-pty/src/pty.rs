use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};

/// Errors from PTY operations.
#[derive(Debug)]
pub enum PtyError {
    SpawnFailed(String),
    IoError(std::io::Error),
    ResizeFailed(String),
}

impl std::fmt::Display for PtyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PtyError::SpawnFailed(msg) => write!(f, "PTY spawn failed: {msg}"),
            PtyError::IoError(err) => write!(f, "PTY I/O error: {err}"),
            PtyError::ResizeFailed(msg) => write!(f, "PTY resize failed: {msg}"),
        }
    }
}

impl std::error::Error for PtyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PtyError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PtyError {
    fn from(err: std::io::Error) -> Self {
        PtyError::IoError(err)
    }
}

/// Owns a portable-pty child process, master pair, reader, and writer.
pub struct PtyHandle {
    master: Box<dyn MasterPty + Send>,
    reader: Box<dyn Read + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
    shell: String,
    cwd: PathBuf,
}

impl PtyHandle {
    /// Spawn a new PTY running a login shell with the given dimensions.
    ///
    /// `shell` falls back to the user's default (`$SHELL`, then `/bin/sh`)
    /// and `cwd` to the home directory. The child inherits the parent's
    /// environment with terminal-specific overrides applied, and runs as a
    /// login shell so the user's profile is loaded.
    pub fn spawn(
        shell: Option<&str>,
        cwd: Option<&Path>,
        rows: u16,
        cols: u16,
    ) -> Result<Self, PtyError> {
        let pty_system = native_pty_system();

        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| PtyError::SpawnFailed(format!("failed to open PTY: {e}")))?;

        let shell_path = match shell {
            Some(s) => s.to_string(),
            None => default_shell(),
        };
        let working_dir = match cwd {
            Some(dir) => dir.to_path_buf(),
            None => default_working_dir(),
        };

        let mut cmd = CommandBuilder::new(&shell_path);
        cmd.arg("-l");
        cmd.cwd(&working_dir);
        for (key, value) in std::env::vars() {
            cmd.env(key, value);
        }
        cmd.env("TERM", "xterm-256color");
        cmd.env("COLORTERM", "truecolor");

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| PtyError::SpawnFailed(format!("failed to spawn command: {e}")))?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| PtyError::SpawnFailed(format!("failed to clone reader: {e}")))?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| PtyError::SpawnFailed(format!("failed to take writer: {e}")))?;

        Ok(Self {
            master: pair.master,
            reader,
            writer,
            child,
            shell: shell_path,
            cwd: working_dir,
        })
    }

    /// Shell path the child is actually running.
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Working directory the child was started in.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resize the PTY to new dimensions.
    pub fn resize(&self, rows: u16, cols: u16) -> Result<(), PtyError> {
        self.master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| PtyError::ResizeFailed(format!("{e}")))
    }

    /// Write bytes to the PTY master (user input -> shell).
    pub fn write(&mut self, data: &[u8]) -> Result<(), PtyError> {
        self.writer.write_all(data)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Try to read available bytes from the PTY master (shell output -> us).
    ///
    /// This is a blocking read; callers should invoke it from a dedicated
    /// I/O thread, or extract the reader with [`PtyHandle::take_reader`].
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, PtyError> {
        let n = self.reader.read(buf)?;
        Ok(n)
    }

    /// Extract the PTY reader for use in a dedicated I/O thread.
    ///
    /// After calling this, [`PtyHandle::read`] returns EOF; the returned
    /// reader is the only way to observe the shell's output.
    pub fn take_reader(&mut self) -> Box<dyn Read + Send> {
        std::mem::replace(&mut self.reader, Box::new(std::io::empty()))
    }

    /// Check if the child process is still alive.
    pub fn is_alive(&mut self) -> bool {
        self.try_wait().is_none()
    }

    /// Get the child process exit status if it has exited.
    ///
    /// Returns `None` if the process is still running.
    pub fn try_wait(&mut self) -> Option<u32> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.exit_code()),
            _ => None,
        }
    }

    /// Kill the child process. The PTY pair is released when the handle
    /// drops.
    pub fn kill(&mut self) -> Result<(), PtyError> {
        self.child.kill()?;
        Ok(())
    }
}

/// Returns the user's default shell, falling back to `/bin/sh`.
fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

/// Returns the user's home directory, falling back to `/`.
fn default_working_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_spawn_pty() {
        let handle = PtyHandle::spawn(Some("/bin/sh"), None, 24, 80);
        assert!(handle.is_ok(), "Failed to spawn PTY: {:?}", handle.err());
        let mut handle = handle.unwrap();
        assert!(handle.is_alive());
        assert_eq!(handle.shell(), "/bin/sh");
    }

    #[test]
    fn test_write_read_echo() {
        let mut handle = PtyHandle::spawn(Some("/bin/sh"), None, 24, 80).unwrap();

        // Write a command that echoes a known string.
        handle.write(b"echo BOSUN_PTY_OK\n").unwrap();

        // Give the shell time to process.
        thread::sleep(Duration::from_millis(500));

        let mut output = Vec::new();
        let mut buf = [0u8; 4096];

        // Read in a loop with a timeout to collect all available output.
        let deadline = std::time::Instant::now() + Duration::from_secs(3);
        loop {
            if std::time::Instant::now() > deadline {
                break;
            }
            match handle.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    output.extend_from_slice(&buf[..n]);
                    let text = String::from_utf8_lossy(&output);
                    if text.contains("BOSUN_PTY_OK") {
                        break;
                    }
                }
                Err(_) => break,
            }
        }

        let text = String::from_utf8_lossy(&output);
        assert!(
            text.contains("BOSUN_PTY_OK"),
            "Expected output to contain BOSUN_PTY_OK, got: {text}"
        );
    }

    #[test]
    fn test_spawn_with_cwd() {
        let mut handle = PtyHandle::spawn(Some("/bin/sh"), Some(Path::new("/tmp")), 24, 80).unwrap();
        assert_eq!(handle.cwd(), Path::new("/tmp"));

        handle.write(b"pwd\n").unwrap();
        thread::sleep(Duration::from_millis(500));

        let mut output = Vec::new();
        let mut buf = [0u8; 4096];
        let deadline = std::time::Instant::now() + Duration::from_secs(3);
        loop {
            if std::time::Instant::now() > deadline {
                break;
            }
            match handle.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    output.extend_from_slice(&buf[..n]);
                    if String::from_utf8_lossy(&output).contains("/tmp") {
                        break;
                    }
                }
                Err(_) => break,
            }
        }

        let text = String::from_utf8_lossy(&output);
        assert!(text.contains("/tmp"), "Expected pwd output, got: {text}");
    }

    #[test]
    fn test_resize() {
        let handle = PtyHandle::spawn(Some("/bin/sh"), None, 24, 80).unwrap();
        let result = handle.resize(40, 120);
        assert!(result.is_ok(), "Resize failed: {:?}", result.err());
    }

    #[test]
    fn test_default_shell_detection() {
        let shell = default_shell();
        assert!(!shell.is_empty(), "Default shell should not be empty");
        assert!(
            shell.starts_with('/'),
            "Default shell should be an absolute path, got: {shell}"
        );
    }
}
