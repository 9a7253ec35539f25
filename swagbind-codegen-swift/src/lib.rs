use swagbind_core::codegen::SourceUnit;
use tracing::debug;

mod api;
mod config;
mod graph;
mod model;
mod naming;
mod operation;
mod primitive;
mod server;
mod statics;
mod writer;

#[cfg(test)]
mod tests;

pub use api::CodegenApi;
pub use config::*;
pub use graph::*;
pub use model::CodegenModel;
pub use naming::{escape, group_ident, type_ident, value_ident};

/// Generates Swift bindings for a processed document.
///
/// Returns one unit per schema under `Models/`, then `Utils.swift`,
/// then `Server.swift` if the server wrapper is enabled, then one unit
/// per tag group under `APIs/`. Models and groups are sorted by type name,
/// so the same input always produces the same output.
pub fn synthesize(graph: &CodegenGraph<'_>, config: &GeneratorConfig) -> Vec<SourceUnit> {
    let mut units = Vec::new();

    for schema in graph.schemas() {
        units.push(CodegenModel::new(graph, schema, config).into_unit());
    }

    units.push(statics::utils(config));
    if config.emit_server_wrapper {
        units.push(statics::server(config));
    }

    for group in &graph.groups() {
        units.push(CodegenApi::new(graph, group, config).into_unit());
    }

    debug!(units = units.len(), "synthesized bindings");
    units
}
