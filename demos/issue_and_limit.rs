//! Demonstrates minting a token, authenticating it back into an identity, and rate limiting the
//! identity while reporting `X-RateLimit-*` metadata.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use time::Duration;
// self
use token_gate::{clock::ManualClock, config::GateConfig};

fn main() -> Result<()> {
	color_eyre::install()?;

	let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
	let mut config = GateConfig::new("demo-secret");

	config.rate_limit_per_window = 3;

	let authority = config.token_authority_with_clock(clock.clone())?;
	let limiter = config.rate_limiter_with_clock(clock.clone())?;
	let issued = authority.issue("alice")?;

	println!(
		"Issued a {} token for {} valid for {} seconds.",
		issued.token_type(),
		issued.claims.identity,
		issued.expires_in().whole_seconds()
	);

	let identity = authority.verify(issued.token.expose())?;

	for attempt in 1..=4 {
		let admitted = limiter.is_allowed(&identity);
		let headers = limiter.headers(&identity).to_pairs();

		println!("Attempt {attempt}: admitted={admitted} headers={headers:?}.");
	}

	clock.advance(Duration::seconds(config.rate_limit_window_seconds));

	println!("After one window: admitted={}.", limiter.is_allowed(&identity));

	clock.advance(Duration::seconds(config.token_ttl_seconds));

	match authority.verify(issued.token.expose()) {
		Ok(_) => println!("Token unexpectedly still valid."),
		Err(e) => println!("Token rejected after expiry: {e}"),
	}

	Ok(())
}
