// crates/edge/src/cli.rs

use crate::{router::build_app_router, settings::load_settings, Error};
use adapt::Site;
use axum::Router;
use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::{setting::Settings, template::ThemeSelection};
use serde::Serialize;
use std::{net::SocketAddr, path::PathBuf, process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

pub type Result<T> = std::result::Result<T, Error>;

/// Microsite CMS CLI, edge layer
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start(start) => do_start(start).await,
        Commands::Resolve(cmd) => do_resolve(cmd),
    };

    result.map_or_else(
        |e| {
            error!("micrositecms failed: {}", e);
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

#[tracing::instrument(skip_all)]
async fn do_start(start: StartCmd) -> Result<()> {
    // parse settings file -> does the settings file exist?  If yes, parse it
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::parse_settings_file(start)?;
    info!(
        "Settings parsed in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    // register routes and middleware
    let then = Utc::now();
    let process = process.register_routes_and_middleware();
    info!(
        "Routes registered in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    // bind the listener
    let then = Utc::now();
    let process = process.bind().await?;
    info!(
        "Listener bound in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    process.serve().await
}

#[tracing::instrument(skip_all)]
fn do_resolve(cmd: ResolveCmd) -> Result<()> {
    let report = resolve_report(&cmd.dir, &cmd.target)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// What the resolver decided for a request target.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub target: String,
    pub request_path: String,
    pub microsite_name: String,
    pub is_microsite_request: bool,
    pub known_template_sets: Vec<String>,
    pub selection: ThemeSelection,
}

pub fn resolve_report(dir: &std::path::Path, target: &str) -> Result<ResolveReport> {
    let settings = load_settings(dir)?;
    let site = Site::from_settings(dir, &settings);
    let resolution = site.resolve(target);
    let resolver = &resolution.resolver;

    Ok(ResolveReport {
        target: target.to_owned(),
        request_path: resolver.request_path().to_owned(),
        microsite_name: resolver.microsite_name().to_owned(),
        is_microsite_request: resolver.is_microsite_request(),
        known_template_sets: resolver.known_template_set_names().iter().cloned().collect(),
        selection: resolution.selection,
    })
}

#[derive(Parser, Debug)]
#[command(name = "micrositecms", version, about = "Microsite CMS command-line tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the site in the specified directory
    Start(StartCmd),

    /// Show how a request target would be resolved, without serving
    Resolve(ResolveCmd),
}

#[derive(Parser, Debug)]
pub struct StartCmd {
    /// Site directory containing settings.toml (or set MICROSITECMS_DIR)
    #[arg(
        value_name = "DIR",
        env = "MICROSITECMS_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ResolveCmd {
    /// Site directory containing settings.toml
    #[arg(value_name = "DIR", value_hint = ValueHint::DirPath, value_parser = dir_must_exist)]
    pub dir: PathBuf,

    /// Request target, e.g. `/blog/client-a/about?x=1`
    #[arg(value_name = "TARGET")]
    pub target: String,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    settings: Settings,
    site: Arc<Site>,
}

struct RouterCreated {
    settings: Settings,
    router: Router,
}

struct ListenerBound {
    listener: TcpListener,
    router: Router,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for RouterCreated {}
impl ProcessState for ListenerBound {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    #[tracing::instrument(skip_all)]
    fn parse_settings_file(command: StartCmd) -> Result<StartProcess<SettingsLoaded>> {
        let settings = load_settings(&command.dir)?;
        let site = Arc::new(Site::from_settings(&command.dir, &settings));

        info!(
            themes = %site.themes_dir.display(),
            microsites = %site.microsites_dir.display(),
            base_path = %site.site_base_path,
            "Site configured"
        );

        Ok(StartProcess {
            state: SettingsLoaded { settings, site },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    #[tracing::instrument(skip_all)]
    fn register_routes_and_middleware(self) -> StartProcess<RouterCreated> {
        let router = build_app_router(self.state.site);

        StartProcess {
            state: RouterCreated {
                settings: self.state.settings,
                router,
            },
        }
    }
}

impl StartProcess<RouterCreated> {
    #[tracing::instrument(skip_all)]
    async fn bind(self) -> Result<StartProcess<ListenerBound>> {
        let server = &self.state.settings.server;
        let addr = SocketAddr::new(server.ip, server.port);
        let listener = TcpListener::bind(addr).await?;
        info!(address = %listener.local_addr()?, "Listening for connections");

        Ok(StartProcess {
            state: ListenerBound {
                listener,
                router: self.state.router,
            },
        })
    }
}

impl StartProcess<ListenerBound> {
    #[tracing::instrument(skip_all)]
    async fn serve(self) -> Result<()> {
        axum::serve(self.state.listener, self.state.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
