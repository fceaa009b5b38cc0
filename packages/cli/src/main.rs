#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the game play visualization toolchain.
//!
//! Lists the configured views, prints a one-off snapshot of a view as JSON,
//! or starts the API server.

use clap::{Parser, Subcommand};
use game_viz_dashboard::{DashboardEvent, DashboardHandle, LoadStatus};
use game_viz_dataset::DataRoot;
use game_viz_server::{ServerConfig, run_server};
use game_viz_view::{all_views, view_by_id};

#[derive(Parser)]
#[command(name = "game_viz", about = "Game play visualization toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all configured views
    Views,
    /// Load a view's dataset and print its snapshot as JSON
    Snapshot {
        /// View identifier (e.g., "`national`")
        #[arg(long)]
        view: String,
        /// Region to select (e.g., "California"); "All" clears the selection
        #[arg(long)]
        region: Option<String>,
        /// Map cell id to select, as reported in a previous snapshot
        #[arg(long, conflicts_with = "region")]
        cell: Option<String>,
        /// Year slider value
        #[arg(long)]
        year: Option<i32>,
        /// Directory or base URL the view datasets are read from
        /// (overrides `GAME_VIZ_DATA_ROOT`)
        #[arg(long)]
        data_root: Option<String>,
        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Start the API server
    Serve {
        /// Directory or base URL the view datasets are read from
        /// (overrides `GAME_VIZ_DATA_ROOT`)
        #[arg(long)]
        data_root: Option<String>,
        /// Port to listen on (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn data_root(flag: Option<&str>) -> DataRoot {
    flag.map_or_else(DataRoot::from_env, DataRoot::parse)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Views => {
            let views = all_views();
            println!("{:<14} {:<10} TITLE", "ID", "REGIONS");
            println!("{}", "-".repeat(70));
            for view in &views {
                println!(
                    "{:<14} {:<10} {}",
                    view.id,
                    view.region_column.as_deref().unwrap_or("-"),
                    view.title
                );
            }
        }
        Commands::Snapshot {
            view,
            region,
            cell,
            year,
            data_root: root,
            compact,
        } => {
            let definition = view_by_id(&view).ok_or_else(|| format!("Unknown view: {view}"))?;
            let handle = DashboardHandle::spawn(definition, &data_root(root.as_deref()));

            let mut snapshot = handle.wait_until_loaded().await?;
            if snapshot.status == LoadStatus::Failed {
                let reason = snapshot.error.clone().unwrap_or_default();
                return Err(format!("Failed to load view '{view}': {reason}").into());
            }

            let mut events = Vec::new();
            if let Some(name) = region {
                events.push(DashboardEvent::SelectRegion { name });
            }
            if let Some(cell_id) = cell {
                events.push(DashboardEvent::SelectCellById { cell_id });
            }
            if let Some(year) = year {
                events.push(DashboardEvent::SetYear { year });
            }
            for event in events {
                log::debug!("Applying {event:?}");
                snapshot = handle.apply(event).await?;
            }

            let json = if compact {
                serde_json::to_string(&*snapshot)?
            } else {
                serde_json::to_string_pretty(&*snapshot)?
            };
            println!("{json}");
        }
        Commands::Serve {
            data_root: root,
            port,
        } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(root) = root {
                config.data_root = DataRoot::parse(&root);
            }
            if let Some(port) = port {
                config.port = port;
            }

            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(run_server(config))
            })
            .await??;
        }
    }

    Ok(())
}
