use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use inkscreen::api;
use inkscreen::assets::{AssetCategory, AssetLoader};
use inkscreen::models::{AppConfig, ContentLocator, DeviceModel, PlaylistItem};
use inkscreen::server::{self, AppState};
use inkscreen::services::{ChromeLauncher, TargetSpec};

#[derive(Parser)]
#[command(name = "inkscreen")]
#[command(about = "Inkscreen - content rendering backend for e-ink display terminals")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Produce screen content from HTML, a URL or an image file
    Render {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Produce the welcome screen for a device
    Welcome {
        /// Device name shown as the headline
        #[arg(long)]
        name: String,

        /// Device identifier shown below the name
        #[arg(long)]
        id: String,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Extract embedded assets to filesystem for customization
    Init {
        /// Extract HTML templates
        #[arg(long)]
        templates: bool,

        /// Extract config.yaml
        #[arg(long)]
        config: bool,

        /// Extract all assets
        #[arg(long)]
        all: bool,

        /// Overwrite existing files
        #[arg(long, short)]
        force: bool,

        /// List embedded assets without extracting
        #[arg(long)]
        list: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// HTML file to render
    #[arg(long)]
    html: Option<PathBuf>,

    /// Page to capture
    #[arg(long)]
    url: Option<String>,

    /// Image file to halftone
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args)]
struct TargetArgs {
    /// Device model id (see config.yaml); ignored when dimensions are given
    #[arg(short, long, default_value = "og")]
    model: String,

    /// Output width in pixels (requires --height)
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Output height in pixels (requires --width)
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Displayable levels for explicit dimensions; 2 means monochrome
    #[arg(long, default_value_t = 2)]
    color_depth: u32,
}

impl TargetArgs {
    fn to_params(&self) -> api::TargetParams {
        match (self.width, self.height) {
            (Some(width), Some(height)) => api::TargetParams {
                model: None,
                width: Some(width),
                height: Some(height),
                color_depth: Some(self.color_depth),
            },
            _ => api::TargetParams {
                model: Some(self.model.clone()),
                ..Default::default()
            },
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inkscreen API",
        description = "Content rendering backend for e-ink display terminals",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_list_models,
        api::handle_get_model,
        api::handle_html,
        api::handle_url,
        api::handle_image,
        api::handle_welcome,
        api::handle_remove_content,
        api::handle_add_items,
    ),
    components(schemas(
        DeviceModel,
        ContentLocator,
        PlaylistItem,
        api::TargetParams,
        api::HtmlScreenRequest,
        api::UrlScreenRequest,
        api::WelcomeScreenRequest,
        api::PlaylistItemsRequest,
        api::PlaylistItemsResponse,
    )),
    tags(
        (name = "Models", description = "Device models and their panel geometry"),
        (name = "Screens", description = "Screen content production"),
        (name = "Playlists", description = "Playlist item intake")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Render { source, target }) => run_render_command(source, target).await,
        Some(Commands::Welcome { name, id, target }) => {
            run_welcome_command(&name, &id, target).await
        }
        Some(Commands::Init {
            templates,
            config,
            all,
            force,
            list,
        }) => run_init_command(templates, config, all, force, list),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn init_tracing(default_filter: &str, with_time: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);
    if with_time {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();
    }
}

/// Load config and build the same state the server uses
fn build_state() -> anyhow::Result<AppState> {
    let asset_loader = AssetLoader::from_env();
    let config = AppConfig::load_from_assets(&asset_loader);
    let launcher = Arc::new(ChromeLauncher::new(&config.renderer));
    server::create_app_state(config, &asset_loader, launcher)
}

/// Produce content once, without a server
async fn run_render_command(source: SourceArgs, target: TargetArgs) -> anyhow::Result<()> {
    init_tracing("inkscreen=warn", false);

    let state = build_state()?;
    let target: TargetSpec = target.to_params().to_spec()?;

    let locator = if let Some(path) = source.html {
        let html = tokio::fs::read_to_string(&path).await?;
        state.content.from_html(&html, &target).await?
    } else if let Some(url) = source.url {
        state.content.from_url(&url, &target).await?
    } else if let Some(path) = source.image {
        let bytes = tokio::fs::read(&path).await?;
        state.content.from_image(bytes, &target).await?
    } else {
        anyhow::bail!("one of --html, --url or --image is required");
    };

    println!("{}", serde_json::to_string_pretty(&locator)?);
    Ok(())
}

async fn run_welcome_command(name: &str, id: &str, target: TargetArgs) -> anyhow::Result<()> {
    init_tracing("inkscreen=warn", false);

    let state = build_state()?;
    let target = target.to_params().to_spec()?;
    let locator = state.content.welcome_screen(name, id, &target).await?;

    println!("{}", serde_json::to_string_pretty(&locator)?);
    Ok(())
}

/// Extract embedded assets to filesystem
fn run_init_command(
    templates: bool,
    config: bool,
    all: bool,
    force: bool,
    list: bool,
) -> anyhow::Result<()> {
    if list {
        println!("Embedded assets:\n");
        println!("Templates:");
        for f in AssetLoader::list_embedded(AssetCategory::Templates) {
            println!("  {f}");
        }
        println!("\nConfig:");
        for f in AssetLoader::list_embedded(AssetCategory::Config) {
            println!("  {f}");
        }
        return Ok(());
    }

    let mut categories = Vec::new();
    if all || templates {
        categories.push(AssetCategory::Templates);
    }
    if all || config {
        categories.push(AssetCategory::Config);
    }

    if categories.is_empty() {
        eprintln!("No categories specified. Use --all, --templates or --config");
        eprintln!("\nRun 'inkscreen init --list' to see embedded assets.");
        std::process::exit(1);
    }

    let report = AssetLoader::from_env().init(&categories, force)?;

    if !report.written.is_empty() {
        println!("Extracted {} files:", report.written.len());
        for f in &report.written {
            println!("  + {f}");
        }
    }
    if !report.skipped.is_empty() {
        println!(
            "\nSkipped {} existing files (use --force to overwrite):",
            report.skipped.len()
        );
        for f in &report.skipped {
            println!("  - {f}");
        }
    }

    if report.written.is_empty() && report.skipped.is_empty() {
        println!("No files to extract.");
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let env = |key: &str| std::env::var(key).ok();
    let bind_addr = env("BIND_ADDR");
    let config_file = env("CONFIG_FILE");
    let templates_dir = env("TEMPLATES_DIR");

    println!("Inkscreen v{VERSION}");
    println!("Content rendering backend for e-ink display terminals\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR     = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    for key in ["CONFIG_FILE", "TEMPLATES_DIR", "CONTENT_DIR", "CHROME_PATH"] {
        println!(
            "  {key:<13} = {}",
            env(key).as_deref().unwrap_or("(not set)")
        );
    }
    println!(
        "  ACCESS_PIN    = {}",
        if env("ACCESS_PIN").is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );

    println!("\nAsset Sources:");
    let source = |path: Option<&String>| match path {
        Some(p) if PathBuf::from(p).exists() => p.clone(),
        Some(_) => "embedded (path not found)".to_string(),
        None => "embedded".to_string(),
    };
    println!("  Config:    {}", source(config_file.as_ref()));
    println!("  Templates: {}", source(templates_dir.as_ref()));

    let config = AppConfig::load_from_assets(&AssetLoader::from_env());
    println!("\nDevice Models:");
    for model in config.device_models() {
        println!(
            "  {:<6} {}x{} depth {} ({})",
            model.id, model.width, model.height, model.color_depth, model.name
        );
    }
    println!("\nContent directory: {}", config.content.dir.display());

    println!("\nCommands:");
    println!("  inkscreen serve     Start the HTTP server");
    println!("  inkscreen render    Produce content from --html, --url or --image");
    println!("  inkscreen welcome   Produce a welcome screen");
    println!("  inkscreen init      Extract embedded assets");
    println!("\nRun 'inkscreen --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    init_tracing("inkscreen=debug,tower_http=debug", true);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let asset_loader = AssetLoader::from_env();

    tracing::info!(
        config = ?asset_loader
            .config_file()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "embedded".to_string()),
        "Asset sources configured"
    );

    let config = AppConfig::load_from_assets(&asset_loader);
    let launcher = Arc::new(ChromeLauncher::new(&config.renderer));
    let state = server::create_app_state(config, &asset_loader, launcher)?;

    // Browser is launched lazily on the first HTML/URL render
    let app = server::build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Inkscreen server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
