use std::panic;
use std::process::ExitCode;

use spark_launcher::{AppError, app};
use tracing::error;
use tracing_error::{ErrorLayer, ExtractSpanTrace, SpanTrace};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_target(false)
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    panic::set_hook(Box::new(|info| {
        error!("{}", info);
        eprintln!("\n{}\n", color_spantrace::colorize(&SpanTrace::capture()));
    }));
}

fn report(e: &AppError) {
    error!("{e}");
    match e.span_trace() {
        Some(span_trace) => eprintln!("\n{}\n", color_spantrace::colorize(span_trace)),
        None => eprintln!("\nNo span trace available.\n"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match app().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
