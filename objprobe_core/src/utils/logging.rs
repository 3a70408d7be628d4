use log::LevelFilter;

/// Initialize logging using env_logger.
/// By default, this reads the RUST_LOG environment variable for filtering,
/// e.g. `RUST_LOG=objprobe_core=debug objprobe`.
/// `level` (from `--log-level`) overrides it for every module.
///
/// Logs go to stderr so they stay out of the menu's way on stdout.
pub fn init_logging(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    builder.parse_default_env();
    if let Some(level) = level {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}
