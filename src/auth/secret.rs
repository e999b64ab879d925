//! Secret wrappers that keep key material and issued tokens out of logs.

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
// self
use crate::{_prelude::*, error::ConfigError};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signing key derived from the shared secret.
///
/// The keyed MAC state is computed once and cloned for every signature, so the raw secret is
/// never retained after construction.
#[derive(Clone)]
pub struct SigningKey {
	mac: HmacSha256,
}
impl SigningKey {
	/// Keys a new signer; rejects an empty secret.
	pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
		let secret = secret.as_ref();

		if secret.is_empty() {
			return Err(ConfigError::EmptySecret);
		}

		let mac = HmacSha256::new_from_slice(secret).map_err(|_| ConfigError::InvalidSecret)?;

		Ok(Self { mac })
	}

	/// Returns the lowercase hex HMAC-SHA256 of `data`.
	pub fn sign(&self, data: &[u8]) -> String {
		hex::encode(self.mac.clone().chain_update(data).finalize().into_bytes())
	}

	/// Checks `signature` against the expected hex digest of `data` in constant time.
	///
	/// Only the length check may short-circuit; the digest bytes are always compared in full.
	pub fn verify(&self, data: &[u8], signature: &str) -> bool {
		let expected = self.sign(data);

		expected.as_bytes().ct_eq(signature.as_bytes()).into()
	}
}
impl Debug for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningKey").field(&"<redacted>").finish()
	}
}
impl Display for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Serialized bearer token; formatters redact it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerToken(String);
impl BearerToken {
	/// Wraps a serialized token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the token text. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Unwraps the token text.
	pub fn into_inner(self) -> String {
		self.0
	}
}
impl AsRef<str> for BearerToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BearerToken").field(&"<redacted>").finish()
	}
}
impl Display for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let key = SigningKey::new("super-secret").expect("Non-empty secret should key the MAC.");
		let token = BearerToken::new("payload.signature");

		assert_eq!(format!("{key:?}"), "SigningKey(\"<redacted>\")");
		assert_eq!(format!("{key}"), "<redacted>");
		assert_eq!(format!("{token:?}"), "BearerToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
		assert_eq!(token.expose(), "payload.signature");
	}

	#[test]
	fn empty_secret_is_rejected() {
		assert_eq!(SigningKey::new("").unwrap_err(), ConfigError::EmptySecret);
	}

	#[test]
	fn sign_matches_rfc_4231_vector() {
		// RFC 4231, test case 2.
		let key = SigningKey::new("Jefe").expect("Fixture secret should be accepted.");

		assert_eq!(
			key.sign(b"what do ya want for nothing?"),
			"5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
		);
	}

	#[test]
	fn verify_rejects_altered_or_truncated_signatures() {
		let key = SigningKey::new("s").expect("Fixture secret should be accepted.");
		let signature = key.sign(b"payload");

		assert!(key.verify(b"payload", &signature));
		assert!(!key.verify(b"payload!", &signature));
		assert!(!key.verify(b"payload", &signature[..signature.len() - 1]));
		assert!(!key.verify(b"payload", &signature.to_uppercase()));
		assert!(!key.verify(b"payload", ""));
	}
}
