use clap::Parser;
use papersheet::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

mod app_config;
mod beans;
mod cache;
mod greeting;

use beans::{CustomPropertyDemo, ExamplePrototypeBean, ProfileDemo, WelcomeController};
use cache::CacheableService;
use greeting::GreetingService;

#[derive(Parser, Debug)]
#[command(name = "papersheet-demo", about = "Walk through the managed object lifecycle")]
struct Args {
    /// Properties file to load
    #[arg(
        long,
        env = "PAPERSHEET_CONFIG",
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/application.properties")
    )]
    config: PathBuf,

    /// Active profile (repeatable); overrides papersheet.profiles.active
    #[arg(long = "profile")]
    profiles: Vec<String>,

    /// Wait for Ctrl+C / SIGTERM before shutting down
    #[arg(long)]
    wait: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    tracing::info!("🚀 Starting papersheet demo...");

    let config = ConfigService::load_file(&args.config)?.with_env();
    let mut builder = Application::builder().properties(config);
    if !args.profiles.is_empty() {
        builder = builder.active_profiles(args.profiles);
    }
    let app = app_config::configure(builder).start()?;

    walkthrough(&app)?;

    if args.wait {
        tracing::info!("✅ Ready; press Ctrl+C to shut down");
        app.shutdown_handler().wait_for_shutdown().await;
    } else {
        app.shutdown();
    }

    tracing::info!("👋 Demo finished");
    Ok(())
}

fn walkthrough(app: &Application) -> anyhow::Result<()> {
    let greeting = app.get::<GreetingService>()?;
    tracing::info!("{}", greeting.greet());

    let bean1 = app.get::<ExamplePrototypeBean>()?;
    let bean2 = app.get::<ExamplePrototypeBean>()?;
    tracing::info!(
        "Are prototype beans the same? {} ({} vs {})",
        Arc::ptr_eq(&bean1, &bean2),
        bean1.id,
        bean2.id
    );

    let demo = app.get::<CustomPropertyDemo>()?;
    tracing::info!("Custom property value: {}", demo.custom_property());

    match app.get::<ProfileDemo>() {
        Ok(profile) => tracing::info!("Active profile: {}", profile.profile()),
        Err(PapersheetError::DependencyNotFound { .. }) => tracing::info!(
            "No profile demo for active profiles {:?}",
            app.registry().active_profiles().as_slice()
        ),
        Err(e) => return Err(e.into()),
    }

    let cache = app.get::<CacheableService>()?;
    for call in ["First", "Second"] {
        let started = Instant::now();
        let data = cache.cached_data();
        tracing::info!("{} call result: {} ({:?})", call, data, started.elapsed());
    }

    let controller = app.get::<WelcomeController>()?;
    tracing::info!("{}", controller.welcome());

    Ok(())
}
