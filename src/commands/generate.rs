//! Build the static site

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::Folio;

/// Sync post assets, load the catalog and generate every page
pub fn run(folio: &Folio) -> Result<()> {
    let start = Instant::now();

    folio.sync_assets()?;

    let catalog = folio.load_catalog()?;
    Generator::new(folio)?.generate(&catalog)?;

    tracing::info!(
        "Generated {} posts in {:.2}s",
        catalog.published_posts().len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Rebuild whenever posts, assets, static files or the config change
pub async fn watch(folio: &Folio) -> Result<()> {
    let folio = folio.clone();
    tokio::task::spawn_blocking(move || watch_blocking(folio)).await?
}

/// Reload the configuration, then build with it
fn rebuild(folio: &Folio) -> Result<Folio> {
    let folio = folio.reload()?;
    run(&folio)?;
    Ok(folio)
}

fn watch_blocking(mut folio: Folio) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&folio.posts_dir, &folio.assets_dir, &folio.static_dir()] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = folio.config_path();
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path = e.path.to_string_lossy();
                        !path.contains(".DS_Store") && !path.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match rebuild(&folio) {
                    Ok(reloaded) => folio = reloaded,
                    Err(e) => tracing::error!("Generation failed: {:#}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}
