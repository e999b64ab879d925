//! Token authority that mints and verifies stateless HMAC-signed bearer tokens.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map as JsonMap, Value as JsonValue};
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, SigningKey, TokenClaims},
	clock::{self, Clock},
	error::ConfigError,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Token type label reported alongside issued tokens.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Freshly minted token together with the claims it encodes.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// Serialized token handed to the client.
	pub token: BearerToken,
	/// Claims signed into [`token`](Self::token).
	pub claims: TokenClaims,
}
impl IssuedToken {
	/// Token type label (always [`BEARER_TOKEN_TYPE`]).
	pub const fn token_type(&self) -> &'static str {
		BEARER_TOKEN_TYPE
	}

	/// Lifetime granted at mint time (`expires_at - issued_at`).
	pub fn expires_in(&self) -> Duration {
		Duration::seconds(self.claims.expires_at.saturating_sub(self.claims.issued_at))
	}
}

/// Mints and verifies stateless identity tokens.
///
/// The authority holds no mutable state: clones share the same key and clock, and `mint`/`verify`
/// may run in parallel without coordination.
#[derive(Clone)]
pub struct TokenAuthority {
	key: SigningKey,
	ttl: Duration,
	clock: Arc<dyn Clock>,
}
impl TokenAuthority {
	/// Creates an authority signing with `secret` and granting `ttl_seconds` of validity.
	///
	/// A zero or negative TTL is accepted; such tokens are expired as soon as the clock moves
	/// (zero) or immediately (negative).
	pub fn new(secret: impl AsRef<[u8]>, ttl_seconds: i64) -> Result<Self, ConfigError> {
		Ok(Self {
			key: SigningKey::new(secret)?,
			ttl: Duration::seconds(ttl_seconds),
			clock: clock::system(),
		})
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Configured token lifetime.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Mints a token for `identity` and returns it with its claims.
	///
	/// The identity is not validated here; an empty identity mints a token that `verify` will
	/// later reject. Fails only if the claims cannot be encoded as JSON.
	pub fn issue(&self, identity: impl Into<String>) -> Result<IssuedToken> {
		let _guard = OpSpan::new(OpKind::Mint, "issue").entered();
		let claims = TokenClaims::new(
			identity,
			self.clock.now().unix_timestamp(),
			self.ttl.whole_seconds(),
		);
		let json = claims.to_json()?;
		let payload = STANDARD.encode(json);
		let signature = self.key.sign(payload.as_bytes());

		obs::record_op_outcome(OpKind::Mint, OpOutcome::Accepted);

		Ok(IssuedToken { token: BearerToken::new(format!("{payload}.{signature}")), claims })
	}

	/// Mints a serialized token for `identity`.
	pub fn mint(&self, identity: impl Into<String>) -> Result<String> {
		self.issue(identity).map(|issued| issued.token.into_inner())
	}

	/// Verifies `token` and returns the identity it was minted for.
	pub fn verify(&self, token: &str) -> Result<String> {
		self.verify_claims(token).map(|claims| claims.identity)
	}

	/// Verifies `token` and returns its full claims.
	///
	/// Every failure maps to [`Error::InvalidToken`]; the underlying cause is only visible to
	/// the optional tracing output.
	pub fn verify_claims(&self, token: &str) -> Result<TokenClaims> {
		let _guard = OpSpan::new(OpKind::Verify, "verify").entered();

		match self.check(token) {
			Ok(claims) => {
				obs::record_op_outcome(OpKind::Verify, OpOutcome::Accepted);

				Ok(claims)
			},
			Err(rejection) => {
				obs::trace_rejection(OpKind::Verify, &rejection);
				obs::record_op_rejection(OpKind::Verify, rejection.reason());

				Err(Error::InvalidToken)
			},
		}
	}

	fn check(&self, token: &str) -> Result<TokenClaims, Rejection> {
		let mut parts = token.split('.');
		let (Some(payload), Some(signature), None) = (parts.next(), parts.next(), parts.next())
		else {
			return Err(Rejection::Malformed);
		};

		if !self.key.verify(payload.as_bytes(), signature) {
			return Err(Rejection::Signature);
		}

		let json = STANDARD.decode(payload).map_err(|_| Rejection::Encoding)?;
		// Only a JSON object is a payload; sequences would otherwise fill the fields positionally.
		let object: JsonMap<String, JsonValue> = serde_json::from_slice(&json)
			.map_err(|_| Rejection::Payload { path: String::from(".") })?;
		let claims: TokenClaims = serde_path_to_error::deserialize(JsonValue::Object(object))
			.map_err(|e| Rejection::Payload { path: e.path().to_string() })?;

		if claims.identity.is_empty() {
			return Err(Rejection::EmptyIdentity);
		}

		let now = self.clock.now();

		if claims.is_expired_at(now) {
			return Err(Rejection::Expired { expires_at: claims.expires_at });
		}

		Ok(claims)
	}
}
impl Debug for TokenAuthority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAuthority")
			.field("key", &self.key)
			.field("ttl", &self.ttl)
			.finish_non_exhaustive()
	}
}

/// Internal verification failure cause; never surfaced to callers.
#[derive(Debug)]
enum Rejection {
	Malformed,
	Signature,
	Encoding,
	Payload { path: String },
	EmptyIdentity,
	Expired { expires_at: i64 },
}
impl Rejection {
	/// Stable, low-cardinality label for metrics.
	const fn reason(&self) -> &'static str {
		match self {
			Rejection::Malformed => "malformed",
			Rejection::Signature => "signature",
			Rejection::Encoding => "encoding",
			Rejection::Payload { .. } => "payload",
			Rejection::EmptyIdentity => "empty_identity",
			Rejection::Expired { .. } => "expired",
		}
	}
}
impl Display for Rejection {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Rejection::Malformed => f.write_str("token is not `payload.signature`"),
			Rejection::Signature => f.write_str("signature mismatch"),
			Rejection::Encoding => f.write_str("payload is not valid base64"),
			Rejection::Payload { path } => write!(f, "payload does not decode at `{path}`"),
			Rejection::EmptyIdentity => f.write_str("payload identity is empty"),
			Rejection::Expired { expires_at } => write!(f, "token expired at {expires_at}"),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::clock::ManualClock;

	fn authority_at(secret: &str, ttl: i64, unix: i64) -> (TokenAuthority, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::at_unix(unix));
		let authority = TokenAuthority::new(secret, ttl)
			.expect("Authority fixture should build.")
			.with_clock(clock.clone());

		(authority, clock)
	}

	fn forge(authority: &TokenAuthority, json: &str) -> String {
		let payload = STANDARD.encode(json);

		format!("{payload}.{}", authority.key.sign(payload.as_bytes()))
	}

	#[test]
	fn minted_token_has_wire_layout() {
		let (authority, _) = authority_at("s", 3_600, 1_000);
		let token = authority.mint("alice").expect("Minting should succeed.");
		let (payload, signature) =
			token.split_once('.').expect("Minted token should contain a separator.");
		let json = STANDARD.decode(payload).expect("Payload should be standard base64.");

		assert_eq!(json, br#"{"user_id":"alice","expires_at":4600,"issued_at":1000}"#);
		assert_eq!(signature.len(), 64);
		assert!(signature.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
		assert_eq!(
			signature,
			SigningKey::new("s").expect("Fixture secret should be accepted.").sign(payload.as_bytes())
		);
	}

	#[test]
	fn issue_reports_bearer_metadata() {
		let (authority, _) = authority_at("s", 3_600, 1_000);
		let issued = authority.issue("alice").expect("Issuing should succeed.");

		assert_eq!(issued.token_type(), "bearer");
		assert_eq!(issued.expires_in(), Duration::hours(1));
		assert_eq!(issued.claims.issued_at, 1_000);
		assert_eq!(
			authority.verify(issued.token.expose()).expect("Fresh token should verify."),
			"alice"
		);
	}

	#[test]
	fn verify_rejects_payload_shape_problems() {
		let (authority, _) = authority_at("s", 60, 1_000);

		for json in [
			r#"{"user_id":"","expires_at":2000}"#,
			r#"{"user_id":"bob","expires_at":"2000"}"#,
			r#"{"user_id":"bob","expires_at":2000.0}"#,
			r#"{"expires_at":2000}"#,
			r#"["bob",2000]"#,
			r#"{"user_id":"bob","expires_at":2000} trailing"#,
			"not json",
		] {
			let token = forge(&authority, json);

			assert!(matches!(authority.verify(&token), Err(Error::InvalidToken)), "{json}");
		}

		let ok = forge(&authority, r#"{"user_id":"bob","expires_at":2000,"extra":true}"#);

		assert_eq!(authority.verify(&ok).expect("Unknown fields should be ignored."), "bob");
	}

	#[test]
	fn verify_tolerates_malformed_issued_at() {
		let (authority, _) = authority_at("s", 60, 1_000);
		let token = forge(&authority, r#"{"user_id":"bob","expires_at":2000,"issued_at":"x"}"#);
		let claims = authority.verify_claims(&token).expect("Issued-at is informational only.");

		assert_eq!(claims.identity, "bob");
		assert_eq!(claims.issued_at, 0);
	}

	#[test]
	fn rejection_reasons_are_distinct_labels() {
		let reasons = [
			Rejection::Malformed,
			Rejection::Signature,
			Rejection::Encoding,
			Rejection::Payload { path: String::from("expires_at") },
			Rejection::EmptyIdentity,
			Rejection::Expired { expires_at: 0 },
		]
		.iter()
		.map(Rejection::reason)
		.collect::<Vec<_>>();

		assert_eq!(
			reasons,
			["malformed", "signature", "encoding", "payload", "empty_identity", "expired"]
		);
	}

	#[test]
	fn verify_rejects_signed_non_base64_payload() {
		let (authority, _) = authority_at("s", 60, 1_000);
		let token = format!("%%%.{}", authority.key.sign(b"%%%"));

		assert!(matches!(authority.verify(&token), Err(Error::InvalidToken)));
	}

	#[test]
	fn zero_ttl_expires_once_the_clock_moves() {
		let (authority, clock) = authority_at("s", 0, 1_000);
		let token = authority.mint("alice").expect("Minting should succeed.");

		assert!(authority.verify(&token).is_ok());

		clock.advance(Duration::seconds(1));

		assert!(authority.verify(&token).is_err());
	}

	#[test]
	fn debug_output_redacts_the_key() {
		let (authority, _) = authority_at("very-secret", 60, 0);
		let rendered = format!("{authority:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("very-secret"));
	}
}
