use crate::config::ActionConfig;
use std::{
    io,
    process::{Command, ExitStatus},
    thread::{self, JoinHandle},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("could not run `{command}`: {source}")]
    Spawn { command: String, source: io::Error },
    #[error("`{command}` exited with {status}")]
    Failed {
        command: String,
        status: ExitStatus,
        output: String,
    },
}

/// The shell command launched when the gesture completes.
#[derive(Debug, Clone)]
pub struct Action {
    shell: String,
    command: String,
}

impl Action {
    pub fn new<S: Into<String>, C: Into<String>>(shell: S, command: C) -> Self {
        Action {
            shell: shell.into(),
            command: command.into(),
        }
    }

    pub fn from_config(config: &ActionConfig) -> Self {
        Action::new(config.shell.clone(), config.command.clone())
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the command to completion and return its combined stdout and stderr.
    pub fn run(&self) -> Result<String, ActionError> {
        let out = Command::new(&self.shell)
            .arg("-c")
            .arg(&self.command)
            .output()
            .map_err(|source| ActionError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        if !out.status.success() {
            return Err(ActionError::Failed {
                command: self.command.clone(),
                status: out.status,
                output,
            });
        }

        Ok(output)
    }

    /// Run the command on its own thread; the outcome is only logged.
    pub fn fire(&self) -> io::Result<JoinHandle<()>> {
        let action = self.clone();

        thread::Builder::new()
            .name(String::from("trigger action"))
            .spawn(move || {
                log::info!("running `{}`", action.command);
                match action.run() {
                    Ok(output) => log::info!("{}", output),
                    Err(ActionError::Failed {
                        command,
                        status,
                        output,
                    }) => log::error!("`{}` exited with {}: {}", command, status, output),
                    Err(e) => log::error!("{}", e),
                }
            })
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::from_config(&ActionConfig::default())
    }
}
