//! Human-readable summaries of bridged test results

use crate::config::{Config, OutputStream};
use crate::descriptor::TestDescriptor;
use crate::result::TestResult;
use std::io;

/// One-line summary, followed by the raw output for failures
pub fn summary(descriptor: &TestDescriptor, result: &TestResult) -> String {
    let status = if result.success() { "PASS" } else { "FAIL" };
    let mut text = format!(
        "{} {} ({}): {}",
        status,
        descriptor.test_method_name(),
        descriptor.script_locator(),
        result
    );
    if !result.success() && !result.raw_message().trim().is_empty() {
        text.push('\n');
        text.push_str(result.raw_message().trim_end());
    }
    text
}

/// Message handed to the host assertion when a bridged test fails
pub fn failure_message(
    descriptor: &TestDescriptor,
    result: &TestResult,
    config: &Config,
) -> String {
    if config.fail_message_from_test_output {
        format!(
            "External test '{}' failed:\n{}",
            descriptor.test_method_name(),
            result.raw_message()
        )
    } else {
        format!(
            "External test '{}' failed: {}",
            descriptor.test_method_name(),
            result
        )
    }
}

/// Write the summary to the stream configured for this outcome
pub fn report(descriptor: &TestDescriptor, result: &TestResult, config: &Config) -> io::Result<()> {
    let stream = if result.success() {
        config.success_stream
    } else {
        config.failure_stream
    };
    write_to(stream, &summary(descriptor, result), result.success())
}

// The print macros go through the test harness's output capture.
fn print_plain(stream: OutputStream, text: &str) {
    match stream {
        OutputStream::None => {}
        OutputStream::Out => println!("{}", text),
        OutputStream::Error => eprintln!("{}", text),
    }
}

#[cfg(not(feature = "colors"))]
fn write_to(stream: OutputStream, text: &str, _success: bool) -> io::Result<()> {
    print_plain(stream, text);
    Ok(())
}

/// Colored output for interactive terminals
///
/// The escape codes are rendered into a buffer and printed with the print
/// macros, so captured test output stays captured.
#[cfg(feature = "colors")]
fn write_to(stream: OutputStream, text: &str, success: bool) -> io::Result<()> {
    use std::io::Write;
    use termcolor::{Buffer, Color, ColorSpec, WriteColor};

    let tty = match stream {
        OutputStream::None => return Ok(()),
        OutputStream::Out => atty::Stream::Stdout,
        OutputStream::Error => atty::Stream::Stderr,
    };
    if !atty::is(tty) {
        print_plain(stream, text);
        return Ok(());
    }

    let mut buffer = Buffer::ansi();
    let (status, rest) = text.split_at(4);
    let color = if success { Color::Green } else { Color::Red };
    buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(buffer, "{}", status)?;
    buffer.reset()?;
    write!(buffer, "{}", rest)?;

    print_plain(stream, &String::from_utf8_lossy(buffer.as_slice()));
    Ok(())
}
