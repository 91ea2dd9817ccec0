use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;
use notifier::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    let thread_prefix = settings.dispatcher.thread_prefix.clone();
    let thread_counter = Arc::new(AtomicUsize::new(0));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(settings.dispatcher.pool_size)
        .thread_name_fn(move || {
            let id = thread_counter.fetch_add(1, Ordering::Relaxed);
            format!("{}-{}", thread_prefix, id)
        })
        .enable_all()
        .build()?;

    runtime.block_on(execute_command(&cli, settings))?;
    Ok(())
}
