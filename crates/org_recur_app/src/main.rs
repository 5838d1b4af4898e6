use org_recur_app::app::{run, AppConfig};

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let config = AppConfig::from_env()
        .unwrap_or_default()
        .with_args(std::env::args().skip(1));
    if let Err(err) = run(config) {
        eprintln!("Failed to replay change batch: {err:#}");
        std::process::exit(1);
    }
}
