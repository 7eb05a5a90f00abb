//! Thin wrapper over `std::process::Command` for VCS executables.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::error::{io_err, ScmError};

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `binary args...` to completion. A non-zero exit becomes
/// [`ScmError::Command`] carrying both output streams.
pub(crate) fn run(binary: &Path, args: &[OsString]) -> Result<CommandOutput, ScmError> {
    let rendered = render(binary, args);
    tracing::debug!(command = %rendered, "running");

    let output = Command::new(binary)
        .args(args)
        .output()
        .map_err(|e| io_err(binary, e))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if output.status.success() {
        return Ok(CommandOutput { stdout, stderr });
    }

    Err(ScmError::Command {
        command: rendered,
        status: output.status.to_string(),
        output: format!("{} {}", stdout.trim(), stderr.trim())
            .trim()
            .to_string(),
    })
}

fn render(binary: &Path, args: &[OsString]) -> String {
    let program = binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| binary.display().to_string());
    let mut line = program;
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn render_uses_program_name_only() {
        let args = vec![OsString::from("status"), OsString::from("-s")];
        assert_eq!(render(Path::new("/usr/bin/git"), &args), "git status -s");
    }

    #[test]
    fn missing_binary_is_io_error() {
        let err = run(&PathBuf::from("/definitely/not/here/git"), &[]).unwrap_err();
        assert!(matches!(err, ScmError::Io { .. }), "got {err:?}");
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_carries_output() {
        let err = run(
            Path::new("/bin/sh"),
            &[
                OsString::from("-c"),
                OsString::from("echo out; echo err >&2; exit 3"),
            ],
        )
        .unwrap_err();
        match err {
            ScmError::Command { command, output, .. } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(output, "out err");
            }
            other => panic!("expected command error, got {other:?}"),
        }
    }
}
