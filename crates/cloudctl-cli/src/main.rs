//! `cloudctl` binary entrypoint.

#[tokio::main]
async fn main() {
    std::process::exit(cloudctl_cli::run().await);
}
