use std::{borrow::Cow, fmt::Display};

use heck::AsPascalCase;

/// Swift keywords that are only usable as identifiers when back-quoted.
const KEYWORDS: &[&str] = &[
    "Any",
    "Codable",
    "Self",
    "Type",
    "as",
    "associatedtype",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "continue",
    "default",
    "defer",
    "deinit",
    "do",
    "else",
    "enum",
    "extension",
    "fallthrough",
    "false",
    "fileprivate",
    "for",
    "func",
    "guard",
    "if",
    "import",
    "in",
    "init",
    "inout",
    "internal",
    "is",
    "let",
    "nil",
    "open",
    "operator",
    "private",
    "protocol",
    "public",
    "repeat",
    "rethrows",
    "return",
    "self",
    "static",
    "struct",
    "subscript",
    "super",
    "switch",
    "throw",
    "throws",
    "true",
    "try",
    "typealias",
    "var",
    "where",
    "while",
];

/// Type names that generated code declares or uses, and that schemas
/// and groups can't take.
pub const SUPPORT_TYPES: &[&str] = &[
    // Declared in `Utils.swift` and `Server.swift`.
    "AnyObjectValue",
    "FileValue",
    "HTTPHeadersPlugin",
    "ResponseDecodeError",
    "Server",
    "ServerError",
    "TargetTypeResponse",
    // Standard library and Foundation.
    "AnyClass",
    "Bool",
    "Data",
    "Decodable",
    "Decoder",
    "DecodingError",
    "Dictionary",
    "DispatchQueue",
    "DispatchSemaphore",
    "Double",
    "Encodable",
    "Encoder",
    "Error",
    "Float",
    "Foundation",
    "Int",
    "Int32",
    "Int64",
    "JSONDecoder",
    "JSONEncoder",
    "JSONSerialization",
    "NSError",
    "ProcessInfo",
    "Result",
    "String",
    "Swift",
    "Thread",
    "URL",
    "URLRequest",
    "URLSessionConfiguration",
    "UUID",
    "Void",
    // Moya and Alamofire.
    "AccessTokenAuthorizable",
    "AccessTokenPlugin",
    "AuthorizationType",
    "Endpoint",
    "JSONEncoding",
    "Moya",
    "MoyaError",
    "MoyaProvider",
    "MultipartFormData",
    "NetworkLoggerPlugin",
    "PluginType",
    "ProgressBlock",
    "Session",
    "TargetType",
];

/// Keeps only letters, digits, and underscores.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|&c| c.is_alphanumeric() || c == '_')
        .collect()
}

/// Makes a value-level identifier, like a property, parameter, case,
/// or function name. The result isn't escaped.
pub fn value_ident(name: &str) -> String {
    ident(name, "empty", |c| c.to_lowercase().collect())
}

/// Makes a type-level identifier, like a struct or enum name.
/// The result isn't escaped.
pub fn type_ident(name: &str) -> String {
    ident(name, "Empty", |c| c.to_uppercase().collect())
}

fn ident(name: &str, empty: &str, first: impl FnOnce(char) -> String) -> String {
    let name = sanitize(name);
    let mut chars = name.chars();
    let Some(c) = chars.next() else {
        return empty.to_owned();
    };
    if c.is_ascii_digit() {
        return format!("_{name}");
    }
    let mut ident = first(c);
    ident.push_str(chars.as_str());
    ident
}

/// Back-quotes an identifier if it's a Swift keyword.
pub fn escape(ident: &str) -> Cow<'_, str> {
    if KEYWORDS.contains(&ident) {
        format!("`{ident}`").into()
    } else {
        ident.into()
    }
}

/// Makes the type name for the operations that share a tag:
/// `user-accounts` becomes `UserAccountsAPI`.
pub fn group_ident(tag: &str) -> String {
    type_ident(&format!("{}API", AsPascalCase(tag)))
}

/// Formats a Swift string literal.
pub fn string_literal(s: &str) -> impl Display + '_ {
    struct Literal<'a>(&'a str);
    impl Display for Literal<'_> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "\"{}\"", string_content(self.0))
        }
    }
    Literal(s)
}

/// Formats text for the inside of a Swift string literal.
pub fn string_content(s: &str) -> impl Display + '_ {
    struct Content<'a>(&'a str);
    impl Display for Content<'_> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            for c in self.0.chars() {
                match c {
                    '\\' => f.write_str("\\\\")?,
                    '"' => f.write_str("\\\"")?,
                    '\n' => f.write_str("\\n")?,
                    '\r' => f.write_str("\\r")?,
                    '\t' => f.write_str("\\t")?,
                    c => write!(f, "{c}")?,
                }
            }
            Ok(())
        }
    }
    Content(s)
}
