//! Shared test setup: one tracing subscriber per test binary.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{GameTree, NodeSpec};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // Per-event trace output from the engine drowns everything else
    let noisy_modules = ["abtree::domain::playback"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Max(Min(3, 5), Min(2, 9)): minimax value 3, alpha-beta prunes leaf `d2`.
pub fn sample_tree() -> GameTree {
    let spec = NodeSpec::max(
        "root",
        vec![
            NodeSpec::min("a", vec![NodeSpec::leaf("a1", 3.0), NodeSpec::leaf("a2", 5.0)]),
            NodeSpec::min("d", vec![NodeSpec::leaf("d1", 2.0), NodeSpec::leaf("d2", 9.0)]),
        ],
    );
    GameTree::from_spec(&spec).unwrap_or_default()
}
