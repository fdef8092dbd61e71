//! Example of running every test registered in a bridge manifest
//!
//! Usage: `cargo run --example bridge_runner -- <manifest> <assets-dir>`
//! Scripts and support files are read from `<assets-dir>` as origin "assets".
//! Set `SCRIPTBRIDGE_*` variables to configure, `RUST_LOG=debug` to trace.

use anyhow::{bail, Context};
use scriptbridge_rs::{bridge, Config, DirStore, Registry};

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let mut args = std::env::args().skip(1);
    let (Some(manifest), Some(assets)) = (args.next(), args.next()) else {
        bail!("usage: bridge_runner <manifest> <assets-dir>");
    };

    let registry = Registry::load(&manifest).with_context(|| format!("loading {}", manifest))?;
    let config = Config::from_env();

    let mut failed = Vec::new();
    for test in registry.test_ids() {
        let result = bridge::test(test)
            .registered(&registry)
            .store(DirStore::new().origin("assets", &assets))
            .origin("assets")
            .config(config.clone())
            .assert_on_failure(false)
            .execute()
            .with_context(|| format!("bridging {}", test))?;
        if !result.success() {
            failed.push(test.to_string());
        }
    }

    if !failed.is_empty() {
        bail!("{} bridged test(s) failed: {}", failed.len(), failed.join(", "));
    }
    println!("All bridged tests passed!");
    Ok(())
}
