use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mindframe_lib::catalog::{
    load_catalog, BuiltinCatalogSource, CatalogSource, CatalogState, FileCatalogSource,
    RemoteCatalogSource,
};
use mindframe_lib::config::{
    load_config, AnalysisMode, AppConfig, CatalogSourceKind, ConfigOverrides, StorageBackend,
};
use mindframe_lib::events::EventBroadcaster;
use mindframe_lib::server::{self, generate_auth_token, ServerAppState};
use mindframe_lib::shutdown::{register_signal_handlers, ShutdownHandler, ShutdownState};
use mindframe_lib::storage::{FileStorage, InMemoryStorage, SessionStorage};
use mindframe_lib::tutorial::{GeminiClient, PostgrestProgressStore, SupabaseAuth, TutorService};
use mindframe_lib::utils::default_data_dir;
use mindframe_lib::wizard::{
    FallbackAnalyzer, MockAnalyzer, ProblemAnalyzer, RemoteAnalyzer, WizardManager,
};

/// Mindframe - mental model catalog, problem wizard and tutorial proxy
#[derive(Parser, Debug)]
#[command(name = "mindframe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to bind the server to
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind the server to
    #[arg(long)]
    bind: Option<String>,

    /// Fixed auth token (or set MM_SERVER_TOKEN env var)
    /// If not provided, a random token is generated on each startup
    #[arg(long, env = "MM_SERVER_TOKEN")]
    token: Option<String>,

    /// Path to config.toml (defaults to ~/.mental-models/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the mock analyzer, for reproducible recommendations
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    env_logger::init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(cli)) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = ConfigOverrides {
        port: cli.port,
        bind: cli.bind,
        token: cli.token,
        seed: cli.seed,
    };
    let config = load_config(cli.config.as_deref(), &overrides)?;

    let shutdown_state = ShutdownState::new();
    if let Err(e) = register_signal_handlers(shutdown_state.clone()) {
        log::warn!("Failed to register signal handlers: {}", e);
    }

    let broadcaster = Arc::new(EventBroadcaster::new());

    let catalog_source = build_catalog_source(&config)?;
    let catalog = Arc::new(CatalogState::new(
        load_catalog(catalog_source.as_ref()).await,
    ));

    let wizard = Arc::new(WizardManager::new(
        build_analyzer(&config)?,
        catalog.clone(),
        build_storage(&config)?,
        broadcaster.clone(),
    ));

    let tutor = build_tutor(&config)?;

    let auth_token = config
        .server
        .token
        .clone()
        .unwrap_or_else(generate_auth_token);

    let state = ServerAppState {
        auth_token,
        catalog,
        catalog_source,
        wizard: wizard.clone(),
        tutor,
        broadcaster,
        shutdown_state: shutdown_state.clone(),
    };

    let served = server::run_server(
        config.server.port,
        &config.server.bind,
        state,
        config.server.cors_origins.clone(),
    )
    .await;

    let handler = ShutdownHandler::with_state(shutdown_state);
    let result = handler.handle_shutdown(|| Ok(wizard.flush()))?;
    if !result.is_clean() {
        log::warn!("Shutdown finished with errors: {:?}", result.errors);
    }

    served.map_err(anyhow::Error::msg)
}

fn build_catalog_source(config: &AppConfig) -> Result<Arc<dyn CatalogSource>> {
    let catalog = &config.catalog;
    let source: Arc<dyn CatalogSource> = match catalog.source {
        CatalogSourceKind::Builtin => Arc::new(BuiltinCatalogSource),
        CatalogSourceKind::File => {
            let path = catalog
                .path
                .clone()
                .context("catalog.path is required for the file catalog source")?;
            Arc::new(FileCatalogSource::new(path))
        }
        CatalogSourceKind::Remote => {
            let url = catalog
                .url
                .clone()
                .context("catalog.url is required for the remote catalog source")?;
            Arc::new(RemoteCatalogSource::new(url, catalog.api_key.clone())?)
        }
    };
    Ok(source)
}

fn build_analyzer(config: &AppConfig) -> Result<Arc<dyn ProblemAnalyzer>> {
    let analysis = &config.analysis;
    let mock: Arc<dyn ProblemAnalyzer> = Arc::new(
        MockAnalyzer::new(analysis.seed)
            .with_delay(Duration::from_millis(analysis.mock_delay_ms)),
    );

    match analysis.mode {
        AnalysisMode::Mock => Ok(mock),
        AnalysisMode::Remote => {
            let endpoint = analysis
                .endpoint
                .clone()
                .context("analysis.endpoint is required in remote mode")?;
            let remote = RemoteAnalyzer::new(
                endpoint,
                analysis.api_key.clone(),
                Duration::from_secs(analysis.timeout_secs),
            )
            .map_err(anyhow::Error::msg)?;
            Ok(Arc::new(FallbackAnalyzer::new(Arc::new(remote), mock)))
        }
    }
}

fn build_storage(config: &AppConfig) -> Result<Arc<dyn SessionStorage>> {
    let storage: Arc<dyn SessionStorage> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
        StorageBackend::File => {
            let data_dir = config
                .storage
                .data_dir
                .clone()
                .unwrap_or_else(default_data_dir);
            log::info!("Storing wizard sessions in {:?}", data_dir);
            Arc::new(FileStorage::new(data_dir)?)
        }
    };
    Ok(storage)
}

fn build_tutor(config: &AppConfig) -> Result<Option<Arc<TutorService>>> {
    let tutorial = &config.tutorial;
    let (Some(llm_key), Some(auth_url)) = (&tutorial.llm_api_key, &tutorial.auth_url) else {
        log::info!("Tutorial proxy disabled: set MM_LLM_API_KEY and MM_AUTH_URL to enable it");
        return Ok(None);
    };
    let auth_key = tutorial.auth_api_key.clone().unwrap_or_default();

    let llm = GeminiClient::new(&tutorial.llm_base_url, &tutorial.llm_model, llm_key)?;
    let auth = SupabaseAuth::new(auth_url, &auth_key)?;
    let progress = PostgrestProgressStore::new(auth_url, &auth_key)?;

    Ok(Some(Arc::new(TutorService::new(
        Arc::new(auth),
        Arc::new(llm),
        Arc::new(progress),
    ))))
}
