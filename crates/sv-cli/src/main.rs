use tracing_subscriber::EnvFilter;

fn main() {
    // stdout carries the agent protocol and the terminal UI, so logs go to stderr
    // and are muted while the rich UI owns the screen.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STORYVIEW_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(sv_cli::log_writer)
        .init();

    std::process::exit(sv_cli::run_cli_from_args(std::env::args_os()));
}
