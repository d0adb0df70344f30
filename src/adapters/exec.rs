use crate::domain::model::CommandLine;
use crate::domain::ports::Handoff;
use crate::utils::error::{EntrypointError, Result};
use std::path::PathBuf;
use std::process::Command;

/// Hands the process over to the application.
///
/// On Unix this is `execvp(3)`: the application takes over this PID, environment,
/// working directory and stdio, so signals sent to the container reach it directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecHandoff;

impl Handoff for ExecHandoff {
    #[cfg(unix)]
    fn exec(&self, command: &CommandLine) -> Result<()> {
        use std::os::unix::process::CommandExt;

        tracing::info!("🚀 Handing off to {:?}", command.display_argv());

        // Only returns if the exec itself failed.
        let source = Command::new(&command.program).args(&command.args).exec();
        Err(EntrypointError::ExecFailed {
            program: PathBuf::from(&command.program),
            source,
        })
    }

    #[cfg(not(unix))]
    fn exec(&self, command: &CommandLine) -> Result<()> {
        tracing::info!("🚀 Running {:?}", command.display_argv());

        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .map_err(|source| EntrypointError::ExecFailed {
                program: PathBuf::from(&command.program),
                source,
            })?;
        std::process::exit(status.code().unwrap_or(1));
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_exec_missing_program_returns_error() {
        let command =
            CommandLine::from_argv(["/definitely/not/a/real/program-entrygate", "--flag"]).unwrap();

        match ExecHandoff.exec(&command) {
            Err(EntrypointError::ExecFailed { program, source }) => {
                assert_eq!(
                    program,
                    PathBuf::from("/definitely/not/a/real/program-entrygate")
                );
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected exec failure, got {:?}", other),
        }
    }
}
