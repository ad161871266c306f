//! Demo of reading from a glucose site.
//!
//! Usage: `feed_demo <site-url> [token]`

use feed::{Client, ClientSettings};

fn main() {
    let mut args = std::env::args().skip(1);
    let site = args.next().expect("usage: feed_demo <site-url> [token]");
    let settings = ClientSettings::default().with_token(args.next());

    let client = Client::new(&site, settings).expect("could not set up client");

    println!("fetching readings from {}...", client.site());
    match client.reading_payload() {
        Ok(v) => match v.get("bgs").and_then(|bgs| bgs.get(0)) {
            Some(latest) => println!("latest: {}", latest),
            None => println!("no readings"),
        },
        Err(e) => println!("error: {}", e),
    }

    println!("fetching status...");
    match client.status_payload() {
        Ok(v) => println!("settings: {}", v.get("settings").unwrap_or(&v)),
        Err(e) => println!("error: {}", e),
    }
}
