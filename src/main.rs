mod app;

use app::FlashcardApp;
use flashcard_tool::{catalog, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashcard_tool=info,flashcards=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::load();
    let mut sets = catalog::load_catalog(&config);

    if sets.is_empty() {
        match catalog::persist_sets(&config, &[catalog::sample_set()]) {
            Ok(()) => {
                tracing::info!("Sample set created!");
                sets = catalog::load_catalog(&config);
            }
            Err(e) => tracing::warn!("Failed to create sample set: {}", e),
        }
    }

    for set in &sets {
        tracing::info!("  - {} ({} cards)", set.name, set.cards.len());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height]),
        ..Default::default()
    };
    eframe::run_native(
        "Flashcard Tool",
        options,
        Box::new(move |_cc| Ok(Box::new(FlashcardApp::new(config, sets)))),
    )
}
