//! Server connection management
//!
//! The connection (address, credentials, optional proxy) lives in the config
//! file so other commands can run without repeating flags.

use clap::Subcommand;
use serde::Serialize;

use ol_core::{ConfigManager, ServerConfig};

use super::{ConnectionArgs, exit_code_for};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Subcommand, Debug)]
pub enum ServerCommands {
    /// Save the server address and credentials
    Set(SetArgs),

    /// Show the effective connection settings
    Show,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Server address (e.g., `http://localhost:5244`)
    #[arg(id = "server_url", value_name = "URL")]
    pub url: String,

    /// Login user name
    #[arg(id = "server_username", value_name = "USERNAME")]
    pub username: String,

    /// Login password
    #[arg(id = "server_password", value_name = "PASSWORD")]
    pub password: String,
}

/// Connection settings for output (password masked)
#[derive(Debug, Serialize)]
struct ServerInfo {
    url: String,
    username: String,
    password_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxy: Option<String>,
    config_path: String,
}

impl ServerInfo {
    fn new(server: &ServerConfig, manager: &ConfigManager) -> Self {
        Self {
            url: server.url.clone(),
            username: server.username.clone(),
            password_set: !server.password.is_empty(),
            proxy: server.proxy.clone(),
            config_path: manager.path().display().to_string(),
        }
    }
}

pub async fn execute(
    cmd: ServerCommands,
    connection: &ConnectionArgs,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let manager = match ConfigManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to locate config: {e}"));
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        ServerCommands::Set(args) => execute_set(args, connection, &manager, &formatter),
        ServerCommands::Show => execute_show(connection, &manager, &formatter),
    }
}

fn execute_set(
    args: SetArgs,
    connection: &ConnectionArgs,
    manager: &ConfigManager,
    formatter: &Formatter,
) -> ExitCode {
    let mut server = ServerConfig::new(&args.url, &args.username, &args.password);
    // The global --proxy (or OL_PROXY) is saved along with the server
    if let Some(proxy) = &connection.proxy {
        server = server.with_proxy(proxy.as_str());
    }

    if let Err(e) = server.validate() {
        formatter.error(&e.to_string());
        return ExitCode::UsageError;
    }
    if server.username.is_empty() {
        formatter.error("User name cannot be empty");
        return ExitCode::UsageError;
    }

    let mut config = match manager.load() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to load config: {e}"));
            return exit_code_for(&e);
        }
    };
    config.server = server;

    if let Err(e) = manager.save(&config) {
        formatter.error(&format!("Failed to save config: {e}"));
        return exit_code_for(&e);
    }

    if formatter.is_json() {
        formatter.json(&ServerInfo::new(&config.server, manager));
    } else {
        let styled_url = formatter.style_url(&config.server.url);
        formatter.success(&format!("Server {styled_url} saved."));
    }
    ExitCode::Success
}

fn execute_show(
    connection: &ConnectionArgs,
    manager: &ConfigManager,
    formatter: &Formatter,
) -> ExitCode {
    let mut config = match manager.load() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to load config: {e}"));
            return exit_code_for(&e);
        }
    };
    connection.apply(&mut config);

    let info = ServerInfo::new(&config.server, manager);
    if formatter.is_json() {
        formatter.json(&info);
        return ExitCode::Success;
    }

    if info.url.is_empty() {
        formatter.println("No server configured.");
        return ExitCode::Success;
    }

    let key = |k: &str| formatter.style_key(&format!("{k:<9}"));
    formatter.println(&format!("{} {}", key("URL"), formatter.style_url(&info.url)));
    formatter.println(&format!("{} {}", key("Username"), info.username));
    let password = if info.password_set { "********" } else { "(not set)" };
    formatter.println(&format!("{} {password}", key("Password")));
    formatter.println(&format!(
        "{} {}",
        key("Proxy"),
        info.proxy.as_deref().unwrap_or("(none)")
    ));
    formatter.println(&format!("{} {}", key("Config"), info.config_path));
    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info_hides_password() {
        let server = ServerConfig::new("http://localhost:5244", "admin", "secret")
            .with_proxy("http://127.0.0.1:8080");
        let manager = ConfigManager::with_path("/tmp/ol/config.toml");
        let info = ServerInfo::new(&server, &manager);

        insta::assert_json_snapshot!(info, @r#"
        {
          "url": "http://localhost:5244",
          "username": "admin",
          "password_set": true,
          "proxy": "http://127.0.0.1:8080",
          "config_path": "/tmp/ol/config.toml"
        }
        "#);
    }

    #[test]
    fn test_server_info_omits_missing_proxy() {
        let server = ServerConfig::new("http://localhost:5244", "admin", "");
        let manager = ConfigManager::with_path("/tmp/ol/config.toml");
        let json = serde_json::to_value(ServerInfo::new(&server, &manager)).unwrap();

        assert_eq!(json["password_set"], false);
        assert!(json.get("proxy").is_none());
    }
}
