use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt as _, EnvFilter};

/// Send diagnostics to stderr, leaving stdout for the fields we've been asked to print.
///
/// `RUST_LOG` picks what gets shown; by default that's warnings and errors only.
pub fn init() {
	let layer = tracing_tree::HierarchicalLayer::default()
		.with_writer(std::io::stderr)
		.with_indent_lines(true)
		.with_indent_amount(2)
		.with_targets(true);

	let filter = EnvFilter::builder()
		.with_default_directive(LevelFilter::WARN.into())
		.from_env_lossy();

	let sub = tracing_subscriber::registry::Registry::default()
		.with(layer)
		.with(filter);

	if let Err(e) = tracing::subscriber::set_global_default(sub) {
		#[allow(clippy::print_stderr)] // there's nowhere else for it to go
		{
			eprintln!("toxfile: failed to start logging: {e}");
		}
		return;
	}

	if let Err(e) = tracing_log::LogTracer::init() {
		tracing::warn!("Failed to initialize LogTracer: {e}");
	}
}
