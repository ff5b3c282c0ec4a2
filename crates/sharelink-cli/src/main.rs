//! sharelink CLI.
//!
//! Commands:
//! - put-text / put-file: upload and print the share URL
//! - describe: metadata without consuming an access
//! - access: gated read (consumes one access)
//! - remove / list / sweep: administration

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use sharelink_core::domain::{AccessOutcome, AccessPayload, Artifact, ArtifactId, CreateOptions, Payload};
use sharelink_core::{ShareConfig, ShareService, ShareServiceBuilder, SweepLoop};

#[derive(Parser)]
#[command(name = "sharelink")]
#[command(version)]
#[command(about = "Share files and text behind expiring links")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "SHARELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Storage root (overrides the config file)
    #[arg(long, env = "SHARELINK_ROOT")]
    root: Option<PathBuf>,

    /// Base URL of share links (overrides the config file)
    #[arg(long = "base-url", env = "SHARELINK_BASE_URL")]
    base_url: Option<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Limits {
    /// Hours until the link expires
    #[arg(long = "expires-in")]
    expires_in: Option<u32>,

    /// Number of permitted accesses
    #[arg(long = "max-access")]
    max_access: Option<u64>,

    /// Label the artifact as not public
    #[arg(long)]
    private: bool,
}

impl Limits {
    fn into_options(self) -> CreateOptions {
        CreateOptions {
            expires_in_hours: self.expires_in,
            max_access: self.max_access,
            is_public: self.private.then_some(false),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Share a block of text
    PutText {
        #[arg(long)]
        title: String,

        /// Text to share
        #[arg(long, conflicts_with = "from_file")]
        content: Option<String>,

        /// Read the text from a file
        #[arg(long = "from-file")]
        from_file: Option<PathBuf>,

        #[command(flatten)]
        limits: Limits,
    },

    /// Share a file
    PutFile {
        path: PathBuf,

        /// Name shown to recipients (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        /// MIME type (guessed from the name when omitted)
        #[arg(long)]
        mime: Option<String>,

        #[command(flatten)]
        limits: Limits,
    },

    /// Show metadata without consuming an access
    Describe { id: ArtifactId },

    /// Consume one access and print (or save) the payload
    Access {
        id: ArtifactId,

        /// Write file payloads here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete an artifact and its blob
    Remove { id: ArtifactId },

    /// List all artifacts
    List,

    /// Reclaim expired and exhausted artifacts
    Sweep {
        /// Keep sweeping until interrupted
        #[arg(long)]
        watch: bool,

        /// Seconds between sweeps (overrides the config file)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Serialize)]
struct ArtifactView<'a> {
    #[serde(flatten)]
    artifact: &'a Artifact,
    status: sharelink_core::domain::ArtifactStatus,
    remaining_accesses: Option<u64>,
    share_url: String,
}

fn load_config(cli: &Cli) -> Result<ShareConfig> {
    let mut config = match &cli.config {
        Some(path) => ShareConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ShareConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.storage_root = root.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_artifact(service: &ShareService, artifact: &Artifact, json: bool) -> Result<()> {
    let view = ArtifactView {
        artifact,
        status: artifact.status(service.clock().now()),
        remaining_accesses: artifact.remaining_accesses(),
        share_url: service.share_url(artifact.id),
    };
    if json {
        return print_json(&view);
    }

    let label = match &artifact.payload {
        Payload::Text(body) => format!("text  {:?}", body.title),
        Payload::File(meta) => format!(
            "file  {:?} ({}, {} bytes)",
            meta.original_name, meta.mime_type, meta.byte_size
        ),
    };
    let limit = match (artifact.max_access, view.remaining_accesses) {
        (Some(max), Some(left)) => format!("{max} ({left} left)"),
        _ => "unlimited".to_string(),
    };
    let expires = artifact
        .expires_at
        .map_or_else(|| "never".to_string(), |at| at.to_rfc3339());
    println!("{}  {:?}  {label}", artifact.id, view.status);
    println!("    url      {}", view.share_url);
    println!("    accesses {}/{limit}  expires {expires}", artifact.access_count);
    Ok(())
}

async fn run(cli: Cli, service: Arc<ShareService>, config: &ShareConfig) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::PutText {
            title,
            content,
            from_file,
            limits,
        } => {
            let content = match (content, from_file) {
                (Some(content), _) => content,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => bail!("either --content or --from-file is required"),
            };
            let created = service
                .create_text(&title, &content, limits.into_options())
                .await?;
            if json {
                print_json(&created)?;
            } else {
                println!("{}", created.share_url);
            }
        }

        Commands::PutFile {
            path,
            name,
            mime,
            limits,
        } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("path has no file name; pass --name")?,
            };
            let mime = mime.unwrap_or_else(|| {
                mime_guess::from_path(&name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
            let created = service
                .create_file(Bytes::from(bytes), &name, &mime, limits.into_options())
                .await?;
            if json {
                print_json(&created)?;
            } else {
                println!("{}", created.share_url);
            }
        }

        Commands::Describe { id } => {
            let artifact = service.describe(id).await?;
            print_artifact(&service, &artifact, json)?;
        }

        Commands::Access { id, output } => {
            let outcome = service.access(id).await?;
            if let AccessOutcome::Granted {
                payload: AccessPayload::File { bytes, .. },
                ..
            } = &outcome
                && let Some(output) = &output
            {
                tokio::fs::write(output, bytes)
                    .await
                    .with_context(|| format!("writing {}", output.display()))?;
            }

            if json {
                print_json(&outcome)?;
            } else {
                match outcome {
                    AccessOutcome::Granted {
                        payload: AccessPayload::Text { title, content },
                        access_count,
                    } => {
                        println!("# {title} (access #{access_count})");
                        println!("{content}");
                    }
                    AccessOutcome::Granted {
                        payload:
                            AccessPayload::File {
                                original_name,
                                mime_type,
                                bytes,
                            },
                        access_count,
                    } => {
                        println!(
                            "{original_name} ({mime_type}, {} bytes, access #{access_count})",
                            bytes.len()
                        );
                        match &output {
                            Some(path) => println!("saved to {}", path.display()),
                            None => println!("pass --output to save the file"),
                        }
                    }
                    AccessOutcome::Expired => bail!("artifact {id} has expired"),
                    AccessOutcome::LimitReached => bail!("artifact {id} reached its access limit"),
                }
            }
        }

        Commands::Remove { id } => {
            let removal = service.remove(id).await?;
            if json {
                print_json(&removal)?;
            } else if removal.blob_was_missing {
                println!("removed {id} (its blob was already missing)");
            } else {
                println!("removed {id}");
            }
        }

        Commands::List => {
            let artifacts = service.list().await?;
            if json {
                let views: Vec<_> = artifacts
                    .iter()
                    .map(|artifact| ArtifactView {
                        artifact,
                        status: artifact.status(service.clock().now()),
                        remaining_accesses: artifact.remaining_accesses(),
                        share_url: service.share_url(artifact.id),
                    })
                    .collect();
                print_json(&views)?;
            } else {
                for artifact in &artifacts {
                    print_artifact(&service, artifact, false)?;
                }
            }
        }

        Commands::Sweep { watch, interval } => {
            if watch {
                let interval = interval
                    .map(std::time::Duration::from_secs)
                    .unwrap_or_else(|| config.sweep_interval());
                info!(?interval, "sweeping until interrupted");
                let handle = SweepLoop::new(Arc::clone(&service), interval).spawn();
                tokio::signal::ctrl_c()
                    .await
                    .context("waiting for ctrl-c")?;
                handle.shutdown_and_join().await;
            } else {
                let report = service.sweep().await?;
                if json {
                    print_json(&report)?;
                } else {
                    println!("removed {} artifact(s)", report.removed.len());
                    for (id, reason) in &report.failed {
                        println!("failed to remove {id}: {reason}");
                    }
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(&cli)?;
    let service = ShareServiceBuilder::new(config.clone())
        .persistent()
        .await?
        .build()?;

    run(cli, Arc::new(service), &config).await
}
