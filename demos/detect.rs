//! Look up a User-Agent string with the userstack client.
//!
//! Run with:
//!   USERSTACK_ACCESS_KEY=... cargo run --example detect -- "Mozilla/5.0 ..."
//!
//! Debug output is on; the access key shows up as `hidden`.

use userstack::{ClientBuilder, DecodeMode, DetectOptions, UserstackError};

const DEFAULT_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 12_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.1 Mobile/15E148 Safari/604.1";

#[tokio::main]
async fn main() -> userstack::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let ua = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_UA.to_string());

    // -----------------------------------------------------------------------
    // 1. Create a client (reads USERSTACK_ACCESS_KEY from environment)
    // -----------------------------------------------------------------------
    let client = ClientBuilder::new()
        .secure(false)
        .decode_mode(DecodeMode::Lenient)
        .debug(true)
        .build()?;

    // -----------------------------------------------------------------------
    // 2. Full detection
    // -----------------------------------------------------------------------
    match client.detect(&ua).await {
        Ok(stack) => {
            println!("UA:      {}", stack.ua);
            if let Some(ty) = &stack.entity_type {
                println!("Type:    {ty}");
            }
            println!("Browser: {} {} ({})", stack.browser.name, stack.browser.version, stack.browser.engine);
            println!("OS:      {} [{}]", stack.os.name, stack.os.family_vendor);
            println!(
                "Device:  {} {} (mobile: {})",
                stack.device.brand, stack.device.name, stack.device.is_mobile_device
            );
            if stack.is_crawler() {
                println!("Crawler: {:?}, last seen {}", stack.crawler.category, stack.crawler.last_seen);
            }
        }
        Err(UserstackError::Api(err)) => {
            eprintln!("userstack rejected the lookup: {err}");
            return Ok(());
        }
        Err(e) => return Err(e),
    }
    println!();

    // -----------------------------------------------------------------------
    // 3. Only ask for a subset of fields
    // -----------------------------------------------------------------------
    let opts = DetectOptions::default().fields("browser.name,os.name");
    let stack = client.detect_with(&ua, &opts).await?;
    println!("{} on {}", stack.browser.name, stack.os.name);

    Ok(())
}
