//! Basic usage example for guise
//!
//! Run with: cargo run --example basic [proxy-url]

use guise::{RequestConfig, RequestManager, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Optional proxy from the command line, e.g. socks5://127.0.0.1:1080
    let proxy = std::env::args().nth(1);

    let manager = RequestManager::new(proxy.as_deref(), None)?;
    println!(
        "Chrome {} fingerprint: {}",
        manager.fingerprint().chrome_version(),
        manager.fingerprint().user_agent()
    );
    for (name, value) in manager.fingerprint().headers().iter() {
        println!("  {}: {}", name, value);
    }

    // Be a little more patient than the default
    manager.set_max_retries(5);

    // httpbin echoes back the headers it received
    let echoed = manager
        .request_text(
            RequestConfig::get("https://httpbin.org/headers").header("Accept", "application/json"),
        )
        .await?;
    println!("Server saw:\n{}", echoed);

    Ok(())
}
