//! GSVC receiver
//!
//! Connects to a sender, decodes frames until the stream ends, and logs
//! throughput. Ctrl-C stops the loop between frames.

use std::{process::ExitCode, time::Duration};

use clap::Parser;
use gsvc_core::{ProtocolConfig, ResyncPolicy};
use gsvc_receiver::{LoggingSink, Receiver, ReceiverConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gsvc-receiver")]
#[command(about = "Receive a GSVC frame stream over TCP")]
struct Args {
    /// Sender host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Sender port
    #[arg(long, default_value_t = 9000)]
    port: u16,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 5.0)]
    timeout: f64,

    /// Log stats every N frames (0 disables)
    #[arg(long, default_value_t = 120)]
    log_every: u64,

    /// Largest accepted payload in bytes
    #[arg(long, default_value_t = gsvc_proto::MAX_PAYLOAD_SIZE)]
    max_payload_size: u32,

    /// Scan up to N bytes for the next header after a protocol error
    #[arg(long)]
    resync_max_skip: Option<usize>,
}

impl Args {
    fn into_config(self) -> Result<ReceiverConfig, String> {
        let connect_timeout = Duration::try_from_secs_f64(self.timeout)
            .map_err(|e| format!("invalid timeout {}: {e}", self.timeout))?;

        let resync = self
            .resync_max_skip
            .map_or(ResyncPolicy::Disabled, |max_skip| ResyncPolicy::ScanForMagic { max_skip });

        Ok(ReceiverConfig {
            addr: format!("{}:{}", self.host, self.port),
            connect_timeout,
            log_every: self.log_every,
            protocol: ProtocolConfig::default().with_max_payload_size(self.max_payload_size),
            resync,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(msg) => {
            error!("{msg}");
            return ExitCode::FAILURE;
        },
    };

    let mut receiver = match Receiver::connect(&config).await {
        Ok(receiver) => receiver,
        Err(err) => {
            error!(%err, "connect failed");
            return ExitCode::FAILURE;
        },
    };

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let mut sink = LoggingSink::new();
    match receiver.run(&mut sink, shutdown).await {
        Ok(summary) => {
            info!(
                reason = ?summary.reason,
                frames = summary.frames,
                payload_bytes = summary.payload_bytes,
                skipped_bytes = summary.skipped_bytes,
                rejected_payloads = sink.rejected(),
                elapsed = ?summary.elapsed,
                "receiver stopped"
            );
            ExitCode::SUCCESS
        },
        Err(err) => {
            error!(%err, "receiver failed");
            ExitCode::FAILURE
        },
    }
}
