#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use scriptbridge_rs::{manifest, parser};

#[derive(Arbitrary, Debug)]
struct FuzzSummary {
    prefix: String,
    tests: u32,
    assertions: u32,
    failures: u32,
    errors: u32,
    suffix: String,
}

#[derive(Arbitrary, Debug)]
struct FuzzSection {
    id: String,
    origin: Option<String>,
    items: Vec<FuzzItem>,
}

#[derive(Arbitrary, Debug)]
enum FuzzItem {
    Test { script: String, method: String, suppressible: bool },
    Support { source: String, target: String },
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    summary: FuzzSummary,
    sections: Vec<FuzzSection>,
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains('"') {
        format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

impl FuzzInput {
    fn to_output(&self) -> String {
        let s = &self.summary;
        format!(
            "{}\n{} tests, {} assertions, {} failures, {} errors\n{}",
            s.prefix.replace(|c: char| c.is_ascii_digit(), ""),
            s.tests,
            s.assertions,
            s.failures,
            s.errors,
            s.suffix
        )
    }

    fn to_manifest(&self) -> String {
        let mut result = String::new();
        for section in &self.sections {
            result.push_str(&format!("[{}]\n", section.id));
            if let Some(ref origin) = section.origin {
                result.push_str(&format!("origin {}\n", quote(origin)));
            }
            for item in &section.items {
                match item {
                    FuzzItem::Test { script, method, suppressible } => {
                        let directive = if *suppressible { "suppressible-test" } else { "test" };
                        let line = format!("{} {} {}\n", directive, quote(script), quote(method));
                        result.push_str(&line);
                    }
                    FuzzItem::Support { source, target } => {
                        result.push_str(&format!("support {} {}\n", quote(source), quote(target)));
                    }
                }
            }
        }
        result
    }
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);
    if let Ok(fuzz_input) = FuzzInput::arbitrary(&mut unstructured) {
        // A well-formed summary line with a digit-free prefix is always found
        let s = &fuzz_input.summary;
        let result = parser::parse(&fuzz_input.to_output());
        if s.tests > 0 && !s.prefix.contains('\n') {
            assert_eq!(result.test_count(), s.tests);
            assert_eq!(result.success(), s.failures == 0 && s.errors == 0);
        } else {
            assert!(result.test_count() >= 1);
        }

        if let Ok(registry) = manifest::parse(&fuzz_input.to_manifest()) {
            for id in registry.test_ids() {
                let _ = registry.resolve(id);
            }
        }
    }
});
