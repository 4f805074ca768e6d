use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::error::{AlignError, AlignResult};

#[must_use]
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Run an external program to completion, capturing stdout and stderr.
///
/// The program is resolved on PATH unless given as a path with a directory
/// component. A non-zero exit becomes a structured `CommandFailed` error
/// carrying the exit status and trimmed stderr.
pub fn run_command(program: &Path, args: &[String], cwd: Option<&Path>) -> AlignResult<Output> {
    if program.components().count() == 1 {
        let name = program.to_string_lossy();
        if !command_exists(&name) {
            return Err(AlignError::CommandMissing {
                command: name.into_owned(),
            });
        }
    }

    let rendered = format!("{} {}", program.display(), args.join(" "));
    tracing::debug!(command = %rendered, "spawning");

    let mut command = Command::new(program);
    command.args(args);
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output()?;
    validate_command_output(&rendered, output)
}

fn validate_command_output(rendered: &str, output: Output) -> AlignResult<Output> {
    if output.status.success() {
        return Ok(output);
    }

    let status = output.status.code().unwrap_or(-1);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    Err(AlignError::from_command_failure(
        rendered.to_owned(),
        status,
        stderr,
    ))
}
