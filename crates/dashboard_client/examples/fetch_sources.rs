use dashboard_client::{Source, UpstreamClient, config::ClientConfig, http_client::ReqwestUpstreamClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: reads DASHBOARD_API_BASE_URL from env
    let cfg = match ClientConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestUpstreamClient::new(&cfg)?;
    for source in Source::ALL {
        match client.fetch_source(source).await {
            Ok(value) => println!("{source}: ok ({} bytes)", value.to_string().len()),
            Err(e) => println!("{source}: {e}"),
        }
    }
    Ok(())
}
