//! Error types for scriptbridge-rs

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bridge operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// More than one primary descriptor was attached to a single test
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// No primary descriptor was attached to the test
    #[error("No test descriptor present for '{test}'")]
    MissingDescriptor { test: String },

    /// A descriptor was constructed with an empty required field
    #[error("Invalid descriptor: {message}")]
    InvalidDescriptor { message: String },

    /// A resource could not be copied into the sandbox
    #[error("Cannot extract resource '{resource}': {message}")]
    ResourceExtraction { resource: String, message: String },

    /// The sandbox directory could not be created
    #[error("Cannot create sandbox in '{}': {source}", .root.display())]
    Sandbox {
        root: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The interpreter could not be started
    #[error("Cannot start '{command}': {source}")]
    ProcessInvocation {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The interpreter ran longer than the configured timeout
    #[error("'{command}' did not finish within {timeout:?}")]
    Timeout {
        command: String,
        timeout: std::time::Duration,
    },

    /// Parse error in a descriptor manifest
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Manifest error with context
    #[error("Error in {script_file} at line {line_num}:\n{context}")]
    ScriptError {
        script_file: String,
        line_num: usize,
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a parse error
    pub fn parse_error(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a resource extraction error
    pub fn extraction(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ResourceExtraction {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create a sandbox creation error
    pub fn sandbox(root: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        Error::Sandbox {
            root: root.into(),
            source,
        }
    }

    /// Create an error for a descriptor field that must not be empty
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Error::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// Create a manifest error with context
    pub fn script_error(
        script_file: impl Into<String>,
        line_num: usize,
        script_content: &str,
        source: Error,
    ) -> Self {
        let context = manifest_context(script_content, line_num);
        Error::ScriptError {
            script_file: script_file.into(),
            line_num,
            context,
            source: Box::new(source),
        }
    }
}

/// Show the failing manifest line under the header of its section
///
/// Lines between the header and the failing line are elided. A line number
/// outside the content yields an empty context.
fn manifest_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let Some(failing) = line_num.checked_sub(1).and_then(|i| lines.get(i)) else {
        return String::new();
    };
    let width = line_num.to_string().len();
    let mut context = Vec::new();

    if !failing.trim_start().starts_with('[') {
        let header = lines[..line_num - 1]
            .iter()
            .rposition(|line| line.trim_start().starts_with('['));
        if let Some(i) = header {
            context.push(format!("  {:>width$} | {}", i + 1, lines[i]));
            if i + 2 < line_num {
                context.push(format!("  {:>width$} | ...", ""));
            }
        }
    }
    context.push(format!("> {:>width$} | {}", line_num, failing));
    context.join("\n")
}
