// [libs/shared/beacon/src/lib.rs]
//! Observability strata shared by every binary in the workspace: structured tracing
//! initialization, environment-driven filtering, and a global panic hook that logs before
//! unwinding (SPEC_FULL §10).

use std::panic;
use tracing::{error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as formatting_layer, EnvFilter};

/// Initializes tracing for `service_name`.
///
/// Development builds get compact, human-readable output; non-debug builds get flattened JSON
/// suitable for log aggregation. `RUST_LOG` overrides the default filter, which otherwise
/// silences noisy infrastructure crates (tower_http, hyper, libsql) above `warn`.
///
/// # Panics
/// Panics if a global subscriber has already been installed in this process.
#[instrument(skip_all)]
pub fn init_tracing(service_name: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{}={level},tower_http=warn,hyper=warn,libsql=error",
            service_name,
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(formatting_layer::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(formatting_layer::layer().json().flatten_event(true))
            .init();
    }

    let service_id = service_name.to_string();
    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<non-string panic payload>");

        error!(
            target: "panic_monitor",
            service = %service_id,
            location = %location,
            "thread panicked: {}",
            payload
        );
    }));

    info!("tracing initialized for {}", service_name);
}
