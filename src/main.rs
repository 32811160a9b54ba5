use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdfqa::{config, logging, server};
use std::path::PathBuf;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "pdfqa",
    about = "Answer natural-language questions over PDF documents via HTTP"
)]
struct Cli {
    /// Port to listen on; overrides SERVER_PORT.
    #[arg(long, global = true)]
    port: Option<u16>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve `POST /query` with `{query, folder_path}`, ingesting the folder on every request.
    Folder,
    /// Serve `POST /query` with `{query}` against files ingested once at startup.
    Fixed {
        /// PDF to ingest; repeat for several. Defaults to QA_CORPUS_FILES.
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing(config.log_file.as_deref());
    tracing::debug!(
        openai_base_url = %config.openai_base_url,
        openai_model = %config.openai_model,
        capability = ?config.capability,
        corpus_files = config.corpus_files.len(),
        ingest_mode = ?config.ingest_mode,
        server_port = ?config.server_port,
        "Loaded configuration"
    );

    let variant = match cli.command {
        Command::Folder => server::Variant::Folder,
        Command::Fixed { files } if files.is_empty() => {
            server::Variant::Fixed(config.corpus_files.clone())
        }
        Command::Fixed { files } => server::Variant::Fixed(files),
    };

    let app = server::build_app(&config, &variant)
        .await
        .context("failed to start service")?;

    let (listener, port) = bind_listener(cli.port.or(config.server_port))
        .await
        .context("failed to bind listener")?;
    tracing::info!(?variant, "Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn bind_listener(port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8000-8099",
    ))
}
