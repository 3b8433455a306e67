use tracing_subscriber::EnvFilter;

/// stderrへのログ出力を初期化する
///
/// `RUST_LOG` があればそれに従う。なければ `-v` で debug、通常は warn。
pub fn init(verbose: bool) {
    let default = if verbose {
        "flarenet=debug,flarenet_console=debug,flarenet_common=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
