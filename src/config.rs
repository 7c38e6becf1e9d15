use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "L> ";
const HISTORY_FILE_NAME: &str = "lispcell_history";

/// Settings for the interactive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    pub prompt: String,
    pub history_file: Option<PathBuf>,
    /// Print the parsed tree before its value
    pub echo_parsed: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            prompt: DEFAULT_PROMPT.to_string(),
            history_file: dirs::data_dir().map(|dir| dir.join(HISTORY_FILE_NAME)),
            echo_parsed: false,
        }
    }
}

impl ReplConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, starting from the defaults.
    ///
    /// `LISPCELL_PROMPT` replaces the prompt, `LISPCELL_HISTORY` names the
    /// history file (`off` disables history) and `LISPCELL_ECHO` set to `1`
    /// or `true` echoes the parsed tree.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ReplConfig::default();

        if let Some(prompt) = lookup("LISPCELL_PROMPT") {
            config.prompt = prompt;
        }
        match lookup("LISPCELL_HISTORY").as_deref() {
            Some("off") | Some("") => config.history_file = None,
            Some(path) => config.history_file = Some(PathBuf::from(path)),
            None => {}
        }
        if let Some(echo) = lookup("LISPCELL_ECHO") {
            config.echo_parsed = matches!(echo.to_ascii_lowercase().as_str(), "1" | "true");
        }

        config
    }
}
