/// Install the tracing subscriber for the CLI binary.
///
/// Filtering comes from `DECANT_LOG` (default `decant=info,sqlx=warn`);
/// output is JSON with RFC 3339 UTC timestamps. Safe to call more than
/// once; later calls are no-ops.
pub fn init() {
    let _ = tracing_log::LogTracer::init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("DECANT_LOG").unwrap_or_else(|_| "decant=info,sqlx=warn".into()),
        )
        .json()
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .try_init();
}
