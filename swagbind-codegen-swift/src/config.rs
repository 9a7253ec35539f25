use serde::Deserialize;

/// Options that shape the generated Swift code.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct GeneratorConfig {
    /// The access level of every generated declaration.
    pub access_level: AccessLevel,
    /// Whether optional initializer parameters of models default to `nil`.
    pub optional_field_defaults: bool,
    /// Whether model fields are `var`s instead of `let`s.
    pub mutable_fields: bool,
    /// If set, API groups conform to `AccessTokenAuthorizable`, and
    /// operations that need authorization use this kind.
    pub emit_auth_conformance: Option<AuthKind>,
    /// Whether API groups conform to `TargetTypeResponse`, which maps
    /// status codes to response types.
    pub emit_response_decoding: bool,
    /// Whether to emit the `Server` provider, and a function per
    /// operation for calling it.
    pub emit_server_wrapper: bool,
    pub server_call_style: ServerCallStyle,
    /// The platform guard for `async` functions, like `iOS 15.0.0, *`.
    pub async_availability_guard: Option<String>,
}

impl GeneratorConfig {
    /// Checks options that can't be checked by their types alone.
    pub fn validate(&self) -> Result<(), BadConfig> {
        if let Some(guard) = &self.async_availability_guard {
            let guard = guard.trim();
            if guard.is_empty() {
                return Err(BadConfig::EmptyAvailabilityGuard);
            }
            if guard.contains(['(', ')', '\n', '@']) {
                return Err(BadConfig::MalformedAvailabilityGuard(guard.to_owned()));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    #[default]
    Public,
    Internal,
}

impl AccessLevel {
    /// The modifier for structs, enums, and members.
    pub fn modifier(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
        }
    }

    /// The modifier for classes and their overridable members.
    pub fn class_modifier(self) -> &'static str {
        match self {
            Self::Public => "open",
            Self::Internal => "internal",
        }
    }
}

/// The Moya `AuthorizationType` for operations that need authorization.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthKind {
    Basic,
    Bearer,
    Custom,
}

impl AuthKind {
    pub fn marker(self) -> &'static str {
        match self {
            Self::Basic => ".basic",
            Self::Bearer => ".bearer",
            Self::Custom => ".custom(\"\")",
        }
    }
}

/// Which functions to emit for each operation on `Server`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ServerCallStyle {
    /// Blocking functions that return the response.
    Sync,
    /// Functions that take a completion handler.
    Callback,
    /// `async` functions.
    Suspend,
    /// Both blocking and `async` functions.
    #[default]
    Both,
}

impl ServerCallStyle {
    #[inline]
    pub fn sync(self) -> bool {
        matches!(self, Self::Sync | Self::Both)
    }

    #[inline]
    pub fn callback(self) -> bool {
        matches!(self, Self::Callback)
    }

    #[inline]
    pub fn suspend(self) -> bool {
        matches!(self, Self::Suspend | Self::Both)
    }
}

#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum BadConfig {
    #[error("the availability guard for `async` functions can't be empty")]
    EmptyAvailabilityGuard,
    #[error("malformed availability guard `{0}`")]
    #[diagnostic(help("pass only the arguments of `@available`, like `iOS 15.0.0, *`"))]
    MalformedAvailabilityGuard(String),
}
