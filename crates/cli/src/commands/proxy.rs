//! proxy command - Check proxy reachability

use serde::Serialize;

use super::{ConnectionArgs, connect};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Debug, Serialize)]
struct ProxyOutput {
    proxy: Option<String>,
    status: String,
    usable: bool,
}

pub async fn execute(connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match connect(connection, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let usable = client.test_proxy().await;
    let status = client.proxy_status().await;
    let output = ProxyOutput {
        proxy: client.proxy_address().map(str::to_string),
        status: status.to_string(),
        usable,
    };

    if formatter.is_json() {
        formatter.json(&output);
    } else {
        match &output.proxy {
            None => formatter.println("No proxy configured; connecting directly."),
            Some(address) if usable => {
                formatter.success(&format!("Proxy {} is reachable.", formatter.style_url(address)));
            }
            Some(address) => {
                formatter.error(&format!("Proxy {address} is {status}."));
            }
        }
    }

    if usable {
        ExitCode::Success
    } else {
        ExitCode::NetworkError
    }
}
