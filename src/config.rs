//! Bridge configuration
//!
//! Every option is string-keyed and independently optional. Values that
//! cannot be parsed fall back to the option's default instead of failing,
//! so a typo in a settings file never turns into a hard error.

use std::path::PathBuf;
use std::time::Duration;

/// Interpreter used when none is configured
pub const DEFAULT_INTERPRETER: &str = "node";

/// Flag appended to suppress the interpreter's display window
pub const DEFAULT_SUPPRESS_DISPLAY_FLAG: &str = "--headless";

/// Prefix for configuration environment variables
pub const ENV_PREFIX: &str = "SCRIPTBRIDGE_";

/// Where a summary line is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    None,
    Out,
    Error,
}

impl OutputStream {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(OutputStream::None),
            "out" | "stdout" => Some(OutputStream::Out),
            "error" | "err" | "stderr" => Some(OutputStream::Error),
            _ => None,
        }
    }
}

/// Recognized configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Omit the display-suppression flag for suppressible tests
    pub show_browser_window: bool,
    /// Remove the sandbox when the bridged test finishes
    pub delete_temp_files_when_finished: bool,
    /// Destination for failure summaries
    pub failure_stream: OutputStream,
    /// Destination for success summaries
    pub success_stream: OutputStream,
    /// Embed the raw interpreter output in assertion failure messages
    pub fail_message_from_test_output: bool,
    /// Interpreter command
    pub interpreter: String,
    /// Display-suppression flag text
    pub suppress_display_flag: String,
    /// Kill the interpreter after this long; `None` waits forever
    pub timeout: Option<Duration>,
    /// Directory in which sandboxes are created; `None` uses the system temp dir
    pub sandbox_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            show_browser_window: false,
            delete_temp_files_when_finished: true,
            failure_stream: OutputStream::None,
            success_stream: OutputStream::Out,
            fail_message_from_test_output: true,
            interpreter: DEFAULT_INTERPRETER.to_string(),
            suppress_display_flag: DEFAULT_SUPPRESS_DISPLAY_FLAG.to_string(),
            timeout: None,
            sandbox_root: None,
        }
    }
}

impl Config {
    /// Create a configuration with every option at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from string key/value pairs
    ///
    /// Keys are matched case-insensitively and ignore `_`, so both
    /// `DeleteTempFilesWhenFinished` and `DELETE_TEMP_FILES_WHEN_FINISHED`
    /// are recognized. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Config::default();
        for (key, value) in pairs {
            config.set(key.as_ref(), value.as_ref());
        }
        config
    }

    /// Build a configuration from `SCRIPTBRIDGE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .map(|name| (name.to_string(), value))
        }))
    }

    /// Apply a single string-keyed option
    ///
    /// Returns false when the key is not recognized.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let defaults = Config::default();
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "showbrowserwindow" => {
                self.show_browser_window = parse_bool(value).unwrap_or(defaults.show_browser_window)
            }
            "deletetempfileswhenfinished" => {
                self.delete_temp_files_when_finished =
                    parse_bool(value).unwrap_or(defaults.delete_temp_files_when_finished)
            }
            "failurestream" => {
                self.failure_stream =
                    OutputStream::parse(value).unwrap_or(defaults.failure_stream)
            }
            "successstream" => {
                self.success_stream =
                    OutputStream::parse(value).unwrap_or(defaults.success_stream)
            }
            "failmessagefromtestoutput" => {
                self.fail_message_from_test_output =
                    parse_bool(value).unwrap_or(defaults.fail_message_from_test_output)
            }
            "interpreter" => {
                self.interpreter = non_empty(value).unwrap_or(defaults.interpreter);
            }
            "suppressdisplayflag" => {
                self.suppress_display_flag =
                    non_empty(value).unwrap_or(defaults.suppress_display_flag);
            }
            "timeoutseconds" => {
                self.timeout = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs);
            }
            "sandboxroot" => {
                self.sandbox_root = non_empty(value).map(PathBuf::from);
            }
            _ => {
                tracing::debug!(key, "ignoring unknown configuration key");
                return false;
            }
        }
        true
    }

    /// Set whether the display window is shown
    pub fn show_browser_window(mut self, show: bool) -> Self {
        self.show_browser_window = show;
        self
    }

    /// Set whether the sandbox is deleted once the test finishes
    pub fn delete_temp_files_when_finished(mut self, delete: bool) -> Self {
        self.delete_temp_files_when_finished = delete;
        self
    }

    /// Set where failure summaries are written
    pub fn failure_stream(mut self, stream: OutputStream) -> Self {
        self.failure_stream = stream;
        self
    }

    /// Set where success summaries are written
    pub fn success_stream(mut self, stream: OutputStream) -> Self {
        self.success_stream = stream;
        self
    }

    /// Set whether assertion messages embed the raw interpreter output
    pub fn fail_message_from_test_output(mut self, embed: bool) -> Self {
        self.fail_message_from_test_output = embed;
        self
    }

    /// Set the interpreter command
    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Set the display-suppression flag
    pub fn suppress_display_flag(mut self, flag: impl Into<String>) -> Self {
        self.suppress_display_flag = flag.into();
        self
    }

    /// Set the interpreter timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the directory in which sandboxes are created
    pub fn sandbox_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sandbox_root = Some(root.into());
        self
    }

    /// Whether suppressible tests get the display-suppression flag
    pub fn suppress_display(&self) -> bool {
        !self.show_browser_window
    }

    /// Whether the sandbox is kept after the run
    pub fn retain_sandbox(&self) -> bool {
        !self.delete_temp_files_when_finished
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.show_browser_window);
        assert!(config.delete_temp_files_when_finished);
        assert_eq!(config.failure_stream, OutputStream::None);
        assert_eq!(config.success_stream, OutputStream::Out);
        assert!(config.fail_message_from_test_output);
        assert_eq!(config.interpreter, DEFAULT_INTERPRETER);
        assert!(config.timeout.is_none());
        assert!(config.suppress_display());
        assert!(!config.retain_sandbox());
    }

    #[test]
    fn test_from_pairs() {
        let config = Config::from_pairs([
            ("ShowBrowserWindow", "true"),
            ("DeleteTempFilesWhenFinished", "False"),
            ("FailureStream", "Error"),
            ("SuccessStream", "none"),
            ("FailMessageFromTestOutput", "0"),
            ("Interpreter", "/usr/local/bin/runner"),
            ("TimeoutSeconds", "30"),
        ]);
        assert!(config.show_browser_window);
        assert!(!config.delete_temp_files_when_finished);
        assert_eq!(config.failure_stream, OutputStream::Error);
        assert_eq!(config.success_stream, OutputStream::None);
        assert!(!config.fail_message_from_test_output);
        assert_eq!(config.interpreter, "/usr/local/bin/runner");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_unparseable_values_fall_back_to_defaults() {
        let config = Config::from_pairs([
            ("ShowBrowserWindow", "maybe"),
            ("DeleteTempFilesWhenFinished", ""),
            ("FailureStream", "printer"),
            ("SuccessStream", "???"),
            ("FailMessageFromTestOutput", "tru"),
            ("Interpreter", "   "),
            ("TimeoutSeconds", "soon"),
        ]);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_screaming_snake_keys() {
        let mut config = Config::default();
        assert!(config.set("SHOW_BROWSER_WINDOW", "yes"));
        assert!(config.set("sandbox_root", "/tmp/bridges"));
        assert!(!config.set("NOT_A_KEY", "1"));
        assert!(config.show_browser_window);
        assert_eq!(config.sandbox_root, Some(PathBuf::from("/tmp/bridges")));
    }

    #[test]
    fn test_from_env_reads_prefixed_variables() {
        std::env::set_var("SCRIPTBRIDGE_FAIL_MESSAGE_FROM_TEST_OUTPUT", "off");
        let config = Config::from_env();
        std::env::remove_var("SCRIPTBRIDGE_FAIL_MESSAGE_FROM_TEST_OUTPUT");
        assert!(!config.fail_message_from_test_output);
    }

    #[test]
    fn test_builder_setters() {
        let config = Config::new()
            .show_browser_window(true)
            .failure_stream(OutputStream::Out)
            .timeout(Duration::from_millis(500));
        assert!(!config.suppress_display());
        assert_eq!(config.failure_stream, OutputStream::Out);
        assert_eq!(config.timeout, Some(Duration::from_millis(500)));
    }
}
