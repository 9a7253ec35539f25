use itertools::Itertools;

use super::{
    config::GeneratorConfig,
    graph::CodegenGraph,
    naming::escape,
    operation::CodegenOperation,
    primitive::{SwiftType, TypePosition},
    writer::SwiftWriter,
};

/// Writes `extension Server where Target == <API>`, with one function
/// per operation and call style.
pub fn server_extension(
    w: &mut SwiftWriter,
    graph: &CodegenGraph<'_>,
    api: &str,
    ops: &[CodegenOperation<'_>],
    config: &GeneratorConfig,
) {
    let access = config.access_level.modifier();
    let style = config.server_call_style;
    w.block(
        format_args!("extension Server where Target == {}", escape(api)),
        |w| {
            for op in ops {
                let name = escape(&op.case);
                let result = match op.op.success() {
                    Some(response) => {
                        SwiftType::new(graph, &response.result, TypePosition::Response).to_string()
                    }
                    None => "Void".to_owned(),
                };
                let params = op
                    .params
                    .iter()
                    .map(|param| {
                        let default = if param.required() { "" } else { " = nil" };
                        format!("{}: {}{default}", escape(&param.ident), param.ty(Some(api)))
                    })
                    .collect_vec();
                let target = op.construction();

                if style.sync() {
                    w.block(
                        format_args!("{access} func {name}({}) throws -> {result}", params.join(", ")),
                        |w| w.line(format_args!("return try response({target})")),
                    );
                    w.blank();
                }

                if style.callback() {
                    let completion = format!(
                        "completion: @escaping (Result<{result}, ServerError>) -> Void"
                    );
                    let params = params
                        .iter()
                        .map(String::as_str)
                        .chain([completion.as_str()])
                        .join(", ");
                    w.line("@discardableResult");
                    w.block(
                        format_args!("{access} func {name}({params}) -> Moya.Cancellable"),
                        |w| w.line(format_args!("return request({target}, completion: completion)")),
                    );
                    w.blank();
                }

                if style.suspend() {
                    if let Some(guard) = &config.async_availability_guard {
                        w.line(format_args!("@available({})", guard.trim()));
                    }
                    w.block(
                        format_args!(
                            "{access} func {name}({}) async throws -> {result}",
                            params.join(", ")
                        ),
                        |w| w.line(format_args!("return try await request({target})")),
                    );
                    w.blank();
                }
            }
        },
    );
}
