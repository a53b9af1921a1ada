//! Command definitions and dispatch

use clap::{Args, Parser, Subcommand};

use ol_core::{Config, ConfigManager, Error};
use ol_openlist::OpenListClient;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod completions;
mod find;
mod get;
mod ls;
mod mkdir;
mod proxy;
mod put;
mod rm;
mod server;
mod stat;

/// Command-line client for OpenList/AList file storage servers
#[derive(Parser, Debug)]
#[command(name = "ol", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that apply to every command
#[derive(Args, Debug, Clone, Copy)]
pub struct GlobalArgs {
    /// Print JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalArgs {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            quiet: self.quiet,
        }
    }
}

/// Server overrides layered over the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Server address, e.g. http://localhost:5244
    #[arg(long, env = "OL_URL", global = true)]
    pub url: Option<String>,

    /// Login user name
    #[arg(long, env = "OL_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password
    #[arg(long, env = "OL_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Forward proxy, e.g. http://127.0.0.1:8080 (empty disables)
    #[arg(long, env = "OL_PROXY", global = true)]
    pub proxy: Option<String>,
}

impl ConnectionArgs {
    /// Apply the overrides that were given
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.server.url = url.clone();
        }
        if let Some(username) = &self.username {
            config.server.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.server.password = password.clone();
        }
        if let Some(proxy) = &self.proxy {
            config.server = config.server.clone().with_proxy(proxy.as_str());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the saved server connection
    #[command(subcommand)]
    Server(server::ServerCommands),

    /// Check whether the configured proxy is reachable
    Proxy,

    /// List a remote directory
    Ls(ls::LsArgs),

    /// Search for files by keyword
    Find(find::FindArgs),

    /// Show metadata for a remote path
    Stat(stat::StatArgs),

    /// Upload a local file into a remote directory
    Put(put::PutArgs),

    /// Download a remote file
    Get(get::GetArgs),

    /// Remove remote files or directories
    Rm(rm::RmArgs),

    /// Create a remote directory
    Mkdir(mkdir::MkdirArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Run the parsed command line
pub async fn execute(cli: Cli) -> ExitCode {
    let output = cli.global.output_config();
    let connection = cli.connection;

    match cli.command {
        Commands::Server(cmd) => server::execute(cmd, &connection, output).await,
        Commands::Proxy => proxy::execute(&connection, output).await,
        Commands::Ls(args) => ls::execute(args, &connection, output).await,
        Commands::Find(args) => find::execute(args, &connection, output).await,
        Commands::Stat(args) => stat::execute(args, &connection, output).await,
        Commands::Put(args) => put::execute(args, &connection, output).await,
        Commands::Get(args) => get::execute(args, &connection, output).await,
        Commands::Rm(args) => rm::execute(args, &connection, output).await,
        Commands::Mkdir(args) => mkdir::execute(args, &connection, output).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Load the config file with command-line overrides applied
pub(crate) fn load_config(connection: &ConnectionArgs) -> Result<Config, Error> {
    let mut config = ConfigManager::new()?.load()?;
    connection.apply(&mut config);
    Ok(config)
}

/// Build a client from config and overrides, reporting failures
pub(crate) fn connect(
    connection: &ConnectionArgs,
    formatter: &Formatter,
) -> Result<OpenListClient, ExitCode> {
    let config = load_config(connection).map_err(|e| {
        formatter.error(&format!("Failed to load config: {e}"));
        exit_code_for(&e)
    })?;

    OpenListClient::new(&config.server, &config.timeouts).map_err(|e| {
        formatter.error(&e.to_string());
        exit_code_for(&e)
    })
}

/// Map a library error to the process exit code
pub(crate) fn exit_code_for(error: &Error) -> ExitCode {
    if error.is_already_exists() {
        return ExitCode::Conflict;
    }
    match error {
        Error::Config(_) | Error::InvalidPath(_) => ExitCode::UsageError,
        Error::Auth(_) => ExitCode::AuthError,
        Error::Network(_) | Error::Http { .. } => ExitCode::NetworkError,
        Error::NotFound(_) => ExitCode::NotFound,
        Error::Api { message, .. } if message.to_lowercase().contains("not found") => {
            ExitCode::NotFound
        }
        Error::CreateDir { source, .. } => exit_code_for(source),
        _ => ExitCode::GeneralError,
    }
}

/// Report a failed operation and pick its exit code
pub(crate) fn fail(formatter: &Formatter, context: &str, error: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {error}"));
    exit_code_for(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            exit_code_for(&Error::Auth("bad password".into())),
            ExitCode::AuthError
        );
        assert_eq!(
            exit_code_for(&Error::Network("refused".into())),
            ExitCode::NetworkError
        );
        assert_eq!(
            exit_code_for(&Error::Http {
                status: 502,
                body: String::new()
            }),
            ExitCode::NetworkError
        );
        assert_eq!(
            exit_code_for(&Error::Config("no url".into())),
            ExitCode::UsageError
        );
        assert_eq!(
            exit_code_for(&Error::Api {
                code: 500,
                message: "object not found".into()
            }),
            ExitCode::NotFound
        );
        assert_eq!(
            exit_code_for(&Error::Api {
                code: 500,
                message: "disk full".into()
            }),
            ExitCode::GeneralError
        );
        assert_eq!(
            exit_code_for(&Error::Conflict("exists".into())),
            ExitCode::Conflict
        );
    }

    #[test]
    fn test_exit_code_for_nested_create_dir() {
        let err = Error::CreateDir {
            path: "/a".into(),
            source: Box::new(Error::Auth("expired".into())),
        };
        assert_eq!(exit_code_for(&err), ExitCode::AuthError);
    }

    #[test]
    fn test_connection_overrides() {
        let mut config = Config::default();
        config.server.url = "http://file.example:5244".into();
        config.server.username = "admin".into();

        let overrides = ConnectionArgs {
            url: None,
            username: Some("guest".into()),
            password: Some("pw".into()),
            proxy: Some(String::new()),
        };
        overrides.apply(&mut config);

        assert_eq!(config.server.url, "http://file.example:5244");
        assert_eq!(config.server.username, "guest");
        assert_eq!(config.server.password, "pw");
        assert_eq!(config.server.proxy, None);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ol", "ls", "/docs", "--json", "--url", "http://h:1"])
            .unwrap();
        assert!(cli.global.json);
        assert_eq!(cli.connection.url.as_deref(), Some("http://h:1"));
        assert!(matches!(cli.command, Commands::Ls(_)));
    }
}
