use std::{ffi::OsString, io::ErrorKind as IoErrorKind, path::PathBuf};

use clap::{
    CommandFactory, FromArgMatches,
    error::{ErrorKind as ClapErrorKind, Result as ClapResult},
};
use serde::Deserialize;
use swagbind_codegen_swift::{AccessLevel, AuthKind, GeneratorConfig, ServerCallStyle};
use url::Url;

/// The name of the config file in the output directory.
pub const CONFIG_FILE_NAME: &str = ".swagbind.toml";

#[derive(Debug)]
pub struct Main {
    pub verbose: bool,
    pub input: Input,
    pub output: PathBuf,
    /// Replaces the base URL from the document's `host` and `basePath`.
    pub base_url: Option<String>,
    pub config: GeneratorConfig,
}

impl Main {
    pub fn parse() -> ClapResult<Main> {
        Self::parse_from(std::env::args_os())
    }

    pub fn parse_from<I, T>(args: I) -> ClapResult<Main>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = MainArgs::command();
        let mut matches = cmd
            .try_get_matches_from_mut(args)
            .map_err(|err| err.format(&mut cmd))?;
        let args =
            MainArgs::from_arg_matches_mut(&mut matches).map_err(|err| err.format(&mut cmd))?;

        let file: Option<ConfigFile> = {
            let path = args.output.join(CONFIG_FILE_NAME);
            match std::fs::read_to_string(&path) {
                Ok(contents) => Some(toml::from_str(&contents).map_err(|err| {
                    cmd.error(
                        ClapErrorKind::ValueValidation,
                        format!("Failed to parse `{}`: {err}", path.display()),
                    )
                })?),
                Err(err) if err.kind() == IoErrorKind::NotFound => None,
                Err(err) => {
                    return Err(cmd.error(
                        ClapErrorKind::Io,
                        format!("Failed to read `{}`: {err}", path.display()),
                    ));
                }
            }
        };
        let file = file.unwrap_or_default();

        let base_url = match args.generator.base_url.clone().or(file.base_url) {
            Some(url) => Some(parse_base_url(&url).map_err(|err| {
                cmd.error(ClapErrorKind::ValueValidation, format!("Invalid base URL: {err}"))
            })?),
            None => None,
        };

        let config = args.generator.merge(file.generator);
        config
            .validate()
            .map_err(|err| cmd.error(ClapErrorKind::ValueValidation, err))?;

        Ok(Main {
            verbose: args.verbose,
            input: Input::new(args.input),
            output: args.output,
            base_url,
            config,
        })
    }
}

/// Where to read the document from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Input {
    Path(PathBuf),
    Url(Url),
}

impl Input {
    fn new(arg: String) -> Self {
        match Url::parse(&arg) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(url),
            _ => Self::Path(arg.into()),
        }
    }
}

fn parse_base_url(arg: &str) -> Result<String, String> {
    let url = Url::parse(arg).map_err(|err| format!("`{arg}`: {err}"))?;
    if url.cannot_be_a_base() {
        return Err(format!("`{arg}` can't be a base URL"));
    }
    Ok(arg.to_owned())
}

#[derive(Debug, clap::Parser)]
#[command(version, about, long_about = None)]
struct MainArgs {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// The path or `http(s)` URL of the Swagger document (`.yaml` or `.json`).
    input: String,

    /// The output directory for the generated files.
    output: PathBuf,

    #[command(flatten)]
    generator: GeneratorArgs,
}

#[derive(Debug, Default, clap::Args)]
#[command(next_help_heading = "Generated code options")]
struct GeneratorArgs {
    /// The access level of generated declarations. Defaults to `public`.
    #[arg(long, value_enum)]
    access_level: Option<AccessLevelArg>,

    /// Make optional model initializer parameters default to `nil`.
    #[arg(long)]
    optional_defaults: bool,

    /// Declare model fields with `var` instead of `let`.
    #[arg(long)]
    mutable: bool,

    /// Conform APIs to `AccessTokenAuthorizable`, using this authorization
    /// type for operations with security requirements.
    #[arg(long, value_enum)]
    auth: Option<AuthKindArg>,

    /// Conform APIs to `TargetTypeResponse`, which maps status codes to
    /// response types.
    #[arg(long)]
    response_decoding: bool,

    /// Generate `Server.swift` and a function per operation for calling it.
    #[arg(long)]
    server: bool,

    /// The functions to generate for each operation on `Server`.
    /// Defaults to `both`.
    #[arg(long, value_enum)]
    call_style: Option<ServerCallStyleArg>,

    /// The `@available` arguments for `async` functions, like `iOS 15.0.0, *`.
    #[arg(long)]
    async_guard: Option<String>,

    /// The base URL of the API. Defaults to the document's `host`
    /// and `basePath`.
    #[arg(long, value_parser = parse_base_url)]
    base_url: Option<String>,
}

impl GeneratorArgs {
    /// Applies flags over options from the config file.
    fn merge(self, file: GeneratorConfig) -> GeneratorConfig {
        GeneratorConfig {
            access_level: self.access_level.map_or(file.access_level, Into::into),
            optional_field_defaults: self.optional_defaults || file.optional_field_defaults,
            mutable_fields: self.mutable || file.mutable_fields,
            emit_auth_conformance: self.auth.map(Into::into).or(file.emit_auth_conformance),
            emit_response_decoding: self.response_decoding || file.emit_response_decoding,
            emit_server_wrapper: self.server || file.emit_server_wrapper,
            server_call_style: self.call_style.map_or(file.server_call_style, Into::into),
            async_availability_guard: self.async_guard.or(file.async_availability_guard),
        }
    }
}

/// The contents of `.swagbind.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigFile {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(flatten)]
    generator: GeneratorConfig,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
enum AccessLevelArg {
    Public,
    Internal,
}

impl From<AccessLevelArg> for AccessLevel {
    fn from(value: AccessLevelArg) -> Self {
        match value {
            AccessLevelArg::Public => Self::Public,
            AccessLevelArg::Internal => Self::Internal,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
enum AuthKindArg {
    Basic,
    Bearer,
    Custom,
}

impl From<AuthKindArg> for AuthKind {
    fn from(value: AuthKindArg) -> Self {
        match value {
            AuthKindArg::Basic => Self::Basic,
            AuthKindArg::Bearer => Self::Bearer,
            AuthKindArg::Custom => Self::Custom,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
enum ServerCallStyleArg {
    Sync,
    Callback,
    Suspend,
    Both,
}

impl From<ServerCallStyleArg> for ServerCallStyle {
    fn from(value: ServerCallStyleArg) -> Self {
        match value {
            ServerCallStyleArg::Sync => Self::Sync,
            ServerCallStyleArg::Callback => Self::Callback,
            ServerCallStyleArg::Suspend => Self::Suspend,
            ServerCallStyleArg::Both => Self::Both,
        }
    }
}
