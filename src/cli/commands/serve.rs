use clap::Args;

use crate::config::AppConfig;
use crate::server;

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Bind host (overrides CASHCARD_HOST)")]
    pub host: Option<String>,
    #[arg(long, help = "Bind port (overrides CASHCARD_PORT / PORT)")]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        config
    }
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.apply(AppConfig::from_env());
    server::serve(config).await
}
