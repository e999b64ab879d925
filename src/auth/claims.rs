//! Token payload carried inside every bearer token.

// crates.io
use serde::Deserializer;
use serde_json::Value as JsonValue;
// self
use crate::_prelude::*;

/// Claims embedded in a token payload.
///
/// Wire names are part of the interoperability contract: `{"user_id", "expires_at", "issued_at"}`
/// in that order, timestamps as unix seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Subject the token was minted for.
	#[serde(rename = "user_id")]
	pub identity: String,
	/// Unix timestamp (seconds) after which the token is rejected.
	pub expires_at: i64,
	/// Unix timestamp (seconds) at which the token was minted.
	///
	/// Informational only: a missing or non-integer value decodes as `0`.
	#[serde(default, deserialize_with = "lenient_timestamp")]
	pub issued_at: i64,
}
impl TokenClaims {
	/// Builds claims for `identity` issued at `issued_at` and valid for `ttl_seconds`.
	///
	/// A negative TTL yields claims that are already expired.
	pub fn new(identity: impl Into<String>, issued_at: i64, ttl_seconds: i64) -> Self {
		Self {
			identity: identity.into(),
			expires_at: issued_at.saturating_add(ttl_seconds),
			issued_at,
		}
	}

	/// Returns `true` once `now` has passed the expiry second.
	///
	/// The expiry second itself is still valid.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at < now.unix_timestamp()
	}

	/// Time left until expiry, negative when already expired.
	pub fn expires_in(&self, now: OffsetDateTime) -> Duration {
		Duration::seconds(self.expires_at.saturating_sub(now.unix_timestamp()))
	}

	/// Canonical JSON encoding of the claims in wire field order.
	pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
		serde_json::to_vec(self)
	}
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(JsonValue::deserialize(deserializer)?.as_i64().unwrap_or_default())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn canonical_json_uses_wire_names_and_order() {
		let json = TokenClaims::new("alice", 1_000, 3_600)
			.to_json()
			.expect("Token claims should serialize to JSON.");

		assert_eq!(json, br#"{"user_id":"alice","expires_at":4600,"issued_at":1000}"#);

		let escaped = TokenClaims::new("al\"ice/\u{e9}", 0, 1)
			.to_json()
			.expect("Token claims should serialize to JSON.");
		let decoded: TokenClaims =
			serde_json::from_slice(&escaped).expect("Escaped claims should decode.");

		assert_eq!(decoded.identity, "al\"ice/\u{e9}");
	}

	#[test]
	fn issued_at_is_optional_on_decode() {
		let claims: TokenClaims = serde_json::from_str(r#"{"user_id":"bob","expires_at":10}"#)
			.expect("Claims without issued_at should still decode.");

		assert_eq!(claims.identity, "bob");
		assert_eq!(claims.expires_at, 10);
		assert_eq!(claims.issued_at, 0);
	}

	#[test]
	fn malformed_issued_at_decodes_as_zero() {
		for payload in [
			r#"{"user_id":"bob","expires_at":10,"issued_at":"x"}"#,
			r#"{"user_id":"bob","expires_at":10,"issued_at":1.5}"#,
			r#"{"user_id":"bob","expires_at":10,"issued_at":null}"#,
			r#"{"user_id":"bob","expires_at":10,"issued_at":[1]}"#,
		] {
			let claims: TokenClaims = serde_json::from_str(payload)
				.expect("A malformed issued_at should not reject the claims.");

			assert_eq!(claims.issued_at, 0, "{payload}");
		}

		let claims: TokenClaims =
			serde_json::from_str(r#"{"user_id":"bob","expires_at":10,"issued_at":7}"#)
				.expect("An integer issued_at should decode.");

		assert_eq!(claims.issued_at, 7);
	}

	#[test]
	fn expires_at_must_be_an_integer() {
		for payload in [
			r#"{"user_id":"bob","expires_at":10.5}"#,
			r#"{"user_id":"bob","expires_at":"10"}"#,
			r#"{"user_id":"bob","expires_at":null}"#,
			r#"{"user_id":"bob"}"#,
			r#"{"user_id":7,"expires_at":10}"#,
		] {
			assert!(serde_json::from_str::<TokenClaims>(payload).is_err(), "{payload}");
		}
	}

	#[test]
	fn expiry_boundary_is_inclusive() {
		let claims = TokenClaims::new("alice", 1_000, 3_600);
		let at = |secs: i64| OffsetDateTime::UNIX_EPOCH + Duration::seconds(secs);

		assert!(!claims.is_expired_at(at(4_599)));
		assert!(!claims.is_expired_at(at(4_600)));
		assert!(claims.is_expired_at(at(4_601)));
		assert_eq!(claims.expires_in(at(4_000)), Duration::seconds(600));
		assert!(TokenClaims::new("alice", 1_000, -1).is_expired_at(at(1_000)));
	}
}
