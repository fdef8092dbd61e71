//! Parser for descriptor manifests
//!
//! A manifest maps test ids to the descriptors attached to them:
//!
//! ```text
//! # comments start with '#'
//! [math_adds]
//! origin assets
//! test tests/math.js testAdd
//! support fixtures/a.json data/a.json
//!
//! [ui_renders]
//! suppressible-test ui/render.js testRender origin=ui
//! support "shared/main style.css" css/style.css origin=ui
//! ```
//!
//! Each `[id]` header opens a section. Inside a section:
//! 1. `test <script> <method>` attaches a plain test descriptor
//! 2. `suppressible-test <script> <method>` attaches a suppressible one
//! 3. `support <source> <target>` attaches a support file
//! 4. `origin <name>` sets the origin for later items in the section
//!
//! Items accept a trailing `origin=<name>` that overrides the section origin.

use crate::descriptor::{Descriptor, Registry, SupportFile, TestDescriptor, Variant};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Parse manifest text into a [`Registry`]
///
/// # Errors
/// Returns a parse error naming the offending line if the manifest is malformed
pub fn parse(content: &str) -> Result<Registry> {
    let mut registry = Registry::new();
    let mut section: Option<(String, Option<String>)> = None;

    for (i, line) in content.lines().enumerate() {
        let line_num = i + 1;
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(id) = parse_section_header(trimmed, line_num)? {
            if registry.contains(&id) {
                return Err(Error::parse_error(
                    line_num,
                    format!("Duplicate test section [{}]", id),
                ));
            }
            // A section with no test still resolves to a missing descriptor.
            registry.insert_section(&id);
            section = Some((id, None));
            continue;
        }

        let Some((test_id, section_origin)) = section.as_mut() else {
            return Err(Error::parse_error(
                line_num,
                "Directive outside of a [test] section",
            ));
        };

        let tokens = parse_tokens(trimmed, line_num)?;
        let (directive, args) = tokens
            .split_first()
            .ok_or_else(|| Error::parse_error(line_num, "Empty directive"))?;
        let (args, origin) = split_origin(args, line_num)?;
        let origin = origin.or_else(|| section_origin.clone());

        let descriptor: Descriptor = match directive.as_str() {
            "origin" => {
                let [name] = args else {
                    return Err(Error::parse_error(line_num, "origin expects exactly 1 argument"));
                };
                *section_origin = Some(name.clone());
                continue;
            }
            "test" | "suppressible-test" => {
                let [script, method] = args else {
                    return Err(Error::parse_error(
                        line_num,
                        format!("{} expects <script> <method>", directive),
                    ));
                };
                let variant = if directive == "test" {
                    Variant::Plain
                } else {
                    Variant::Suppressible
                };
                let mut descriptor =
                    TestDescriptor::with_variant(script.as_str(), method.as_str(), variant)
                        .map_err(|e| Error::parse_error(line_num, e.to_string()))?;
                if let Some(origin) = origin {
                    descriptor = descriptor.with_origin(origin);
                }
                descriptor.into()
            }
            "support" => {
                let [source, target] = args else {
                    return Err(Error::parse_error(line_num, "support expects <source> <target>"));
                };
                let mut support = SupportFile::new(source.as_str(), target.as_str())
                    .map_err(|e| Error::parse_error(line_num, e.to_string()))?;
                if let Some(origin) = origin {
                    support = support.with_origin(origin);
                }
                support.into()
            }
            other => {
                return Err(Error::parse_error(
                    line_num,
                    format!("Unknown directive: {}", other),
                ))
            }
        };

        registry.insert(test_id, descriptor);
    }

    Ok(registry)
}

/// Read and parse a manifest file
pub fn load(path: &Path) -> Result<Registry> {
    let content = fs::read_to_string(path)?;
    parse(&content).map_err(|e| match e {
        Error::Parse { line, message } => Error::script_error(
            path.to_string_lossy().to_string(),
            line,
            &content,
            Error::Parse { line, message },
        ),
        other => other,
    })
}

impl Registry {
    /// Build a registry from manifest text
    pub fn from_manifest(content: &str) -> Result<Self> {
        parse(content)
    }

    /// Build a registry from a manifest file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load(path.as_ref())
    }
}

/// Parse a section header line like "[test_id]"
fn parse_section_header(line: &str, line_num: usize) -> Result<Option<String>> {
    if !line.starts_with('[') {
        return Ok(None);
    }
    let Some(inner) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) else {
        return Err(Error::parse_error(line_num, "Unclosed section bracket"));
    };
    let id = inner.trim();
    if id.is_empty() || id.contains(char::is_whitespace) {
        return Err(Error::parse_error(
            line_num,
            format!("Invalid test id: [{}]", inner),
        ));
    }
    Ok(Some(id.to_string()))
}

/// Pull a trailing `origin=<name>` off an argument list
fn split_origin(args: &[String], line_num: usize) -> Result<(&[String], Option<String>)> {
    match args.split_last() {
        Some((last, rest)) if last.starts_with("origin=") => {
            let origin = &last["origin=".len()..];
            if origin.is_empty() {
                return Err(Error::parse_error(line_num, "origin= needs a name"));
            }
            Ok((rest, Some(origin.to_string())))
        }
        _ => Ok((args, None)),
    }
}

/// Split a directive into tokens, honoring single and double quotes
fn parse_tokens(input: &str, line_num: usize) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current_token = String::new();
    let mut quote: Option<char> = None;
    let mut just_closed_quotes = false;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => {
                quote = None;
                just_closed_quotes = true;
            }
            (None, '"' | '\'') => {
                quote = Some(ch);
            }
            (_, '\\') => match chars.next() {
                Some(next_ch) => current_token.push(next_ch),
                None => current_token.push('\\'),
            },
            (None, ' ' | '\t') => {
                if !current_token.is_empty() || just_closed_quotes {
                    tokens.push(std::mem::take(&mut current_token));
                }
                just_closed_quotes = false;
            }
            _ => current_token.push(ch),
        }
    }

    if quote.is_some() {
        return Err(Error::parse_error(line_num, "Unterminated quote"));
    }
    if !current_token.is_empty() || just_closed_quotes {
        tokens.push(current_token);
    }

    Ok(tokens)
}
