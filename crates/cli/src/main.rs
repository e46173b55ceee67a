//! splashkit command line entry point.
//!
//! Page content goes to stdout; logs go to stderr so output can be piped.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use splashkit_client::Fetcher;
use splashkit_core::{FetchRequest, SplashConfig, get_cache_policy};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "splashkit")]
#[command(about = "Fetch JavaScript-rendered pages through a Splash service", long_about = None)]
struct Cli {
    /// Splash host as host:port, overriding configuration
    #[arg(long, global = true)]
    host: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a page and print its content
    Fetch {
        url: String,

        /// Raw Cookie header value
        #[arg(long, default_value = "")]
        cookies: String,

        /// Form field as name=value; turns the request into a POST
        #[arg(long = "form", value_parser = parse_pair)]
        form: Vec<(String, String)>,

        /// Extra request header as name=value
        #[arg(long = "header", value_parser = parse_pair)]
        headers: Vec<(String, String)>,

        /// Print reply metadata and the cache decision as JSON instead of content
        #[arg(long)]
        meta: bool,
    },
    /// Check the Splash service
    Ping,
    /// Clear Splash's render caches
    Gc,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected name=value, got {s:?}")),
    }
}

/// Apply `--host` to a loaded configuration; the result is validated again.
fn with_host_override(mut config: SplashConfig, host: Option<String>) -> Result<SplashConfig> {
    if let Some(host) = host {
        config.host = host;
        config.validate().context("invalid --host")?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = with_host_override(SplashConfig::load().context("loading configuration")?, cli.host)?;
    tracing::debug!("using Splash at {}", config.host);

    let fetcher = Fetcher::new(config)?;

    match cli.command {
        Commands::Fetch { url, cookies, form, headers, meta } => {
            let mut req = FetchRequest::new(url).with_cookies(cookies);
            req.form_params = form.into_iter().collect::<BTreeMap<_, _>>();
            for (name, value) in headers {
                req = req.with_header(name, value);
            }

            let result = fetcher.get_response(&req).await?;
            let (cacheable, expires_at) = get_cache_policy(&result);
            tracing::info!("fetched {} (cacheable: {}, expires: {})", req.storage_key(), cacheable, expires_at);

            if meta {
                let summary = serde_json::json!({
                    "url": req.url,
                    "key": req.storage_key(),
                    "status": result.response.as_ref().map(|r| r.status),
                    "headers": result.response.as_ref().map(|r| &r.headers),
                    "cacheable": cacheable,
                    "expires_at": expires_at,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let content = result.content(&req.url)?;
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&content).await?;
                stdout.flush().await?;
            }
        }
        Commands::Ping => {
            let ping = fetcher.ping().await?;
            println!("{}", serde_json::to_string_pretty(&ping)?);
        }
        Commands::Gc => {
            let gc = fetcher.gc().await?;
            if !gc.is_ok() {
                bail!("Splash gc returned status {:?}", gc.status);
            }
            println!("{}", serde_json::to_string_pretty(&gc)?);
        }
    }

    Ok(())
}
