use itertools::Itertools;
use miette::{Context, IntoDiagnostic, Result};
use swagbind_codegen_swift::{CodegenGraph, synthesize};
use swagbind_core::{
    codegen::{clear_dir, write_to_disk},
    ir::IrSpec,
    parse::Document,
};
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use self::config::{Input, Main};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    let Ok(main) = Main::parse().map_err(|err| err.exit());

    let filter = if main.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();

    let source = read_input(&main.input)?;

    let doc = if source.trim_start().starts_with('{') {
        Document::from_json(&source)
    } else {
        Document::from_yaml(&source)
    }
    .into_diagnostic()
    .context("Failed to parse Swagger document")?;

    let spec = IrSpec::from_doc(&doc)?;
    let spec = match main.base_url {
        Some(base_url) => spec.with_base_url(base_url),
        None => spec,
    };
    println!("Base URL: {}", spec.base_url);

    let graph = CodegenGraph::new(&spec);
    let units = synthesize(&graph, &main.config);

    let counts = units
        .iter()
        .into_grouping_map_by(|unit| unit.path.split_once('/').map(|(dir, _)| dir))
        .fold(0, |count, _, _| count + 1);
    println!(
        "Generating {} models and {} APIs...",
        counts.get(&Some("Models")).copied().unwrap_or_default(),
        counts.get(&Some("APIs")).copied().unwrap_or_default(),
    );

    println!("Writing generated code to `{}`...", main.output.display());
    clear_dir(&main.output, "Models")?;
    clear_dir(&main.output, "APIs")?;
    for unit in units {
        debug!(path = %unit.path, "writing unit");
        write_to_disk(&main.output, unit)?;
    }

    println!("Generation complete");

    Ok(())
}

/// Reads the document from a local path, or fetches it over HTTP.
fn read_input(input: &Input) -> Result<String> {
    match input {
        Input::Path(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("Failed to read `{}`", path.display())),
        Input::Url(url) => {
            println!("Fetching `{url}`...");
            reqwest::blocking::get(url.clone())
                .and_then(|response| response.error_for_status())
                .and_then(|response| response.text())
                .into_diagnostic()
                .with_context(|| format!("Failed to fetch `{url}`"))
        }
    }
}
