use tracing_subscriber::EnvFilter;

use tsoutline::{cli, output, router};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tsoutline=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = cli::parse();
    let json = cli.json;
    if let Err(e) = router::dispatch(cli) {
        let code = output::format_error(&e, json);
        std::process::exit(code);
    }
}
