use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, Read},
    path::Path,
    time::Duration,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("poll.interval_ms must be greater than zero")]
    ZeroInterval,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub poll: PollConfig,
    pub action: ActionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub backend: Backend,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Linux joystick interface, `/dev/input/jsN`.
    Joystick,
    /// Wii U / Switch GameCube controller adapter over USB.
    GcAdapter,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionConfig {
    pub shell: String,
    pub command: String,
}

impl Config {
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path.as_ref())?;
        let mut string = String::new();
        file.read_to_string(&mut string)?;

        Config::from_toml(&string)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;
        if cfg.poll.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(cfg)
    }

    /// The default configuration as a commented TOML document.
    pub fn default_toml() -> Result<String, ConfigError> {
        let comments = r#"# Configuration for konami-dashboard.
#
# Every key is optional; missing keys take the values shown here.
#
# device.backend is either "joystick" (Linux /dev/input/jsN, where N is
# device.index) or "gc-adapter" (USB GameCube adapter, device.index selects
# the port 0-3). A device number given on the command line overrides
# device.index.
#
# action.command is run with action.shell -c every time the gesture is
# completed.

"#;

        let mut contents = String::from(comments);
        contents.push_str(&toml::to_string_pretty(&Config::default())?);

        Ok(contents)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Joystick,
            index: 0,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 40 }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            shell: String::from("/bin/bash"),
            command: String::from(
                "DISPLAY=:0 chromium --kiosk --new-window https://hq.supergreenlab.com/",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_default() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.poll.interval(), Duration::from_millis(40));
        assert_eq!(cfg.device.backend, Backend::Joystick);
    }

    #[test]
    fn partial_sections() {
        let cfg = Config::from_toml(
            r#"
[device]
backend = "gc-adapter"

[action]
command = "notify-send konami"
"#,
        )
        .unwrap();

        assert_eq!(cfg.device.backend, Backend::GcAdapter);
        assert_eq!(cfg.device.index, 0);
        assert_eq!(cfg.action.command, "notify-send konami");
        assert_eq!(cfg.action.shell, "/bin/bash");
        assert_eq!(cfg.poll.interval_ms, 40);
    }

    #[test]
    fn rejects_unknown_backend() {
        let err = Config::from_toml("[device]\nbackend = \"keyboard\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_zero_interval() {
        let err = Config::from_toml("[poll]\ninterval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroInterval));
    }

    #[test]
    fn default_toml_parses_back() {
        let text = Config::default_toml().unwrap();
        assert!(text.starts_with("# Configuration for konami-dashboard."));
        assert!(text.contains("[device]"));
        assert!(text.contains("[action]"));

        let cfg = Config::from_toml(&text).unwrap();
        assert_eq!(cfg.device.backend, Backend::Joystick);
        assert_eq!(cfg.poll.interval_ms, 40);
        assert_eq!(cfg.action.shell, "/bin/bash");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn read_from_file() {
        let path = std::env::temp_dir().join(format!("konami-config-{}.toml", std::process::id()));
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "[poll]\ninterval_ms = 10").unwrap();
        }

        let cfg = Config::read_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.poll.interval(), Duration::from_millis(10));

        assert!(matches!(
            Config::read_from_file(&path).unwrap_err(),
            ConfigError::Io(_)
        ));
    }
}
