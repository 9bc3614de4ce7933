#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use khutba_roster::persistence;
    use khutba_roster::{RosterConfig, http_api};

    let addr: SocketAddr = std::env::var("KHUTBA_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = RosterConfig::from_env()?;
    let store = persistence::store_from_env()?;
    let state = http_api::AppState::new(Arc::from(store), config);

    println!("khutba-roster HTTP API listening on http://{addr}");
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
