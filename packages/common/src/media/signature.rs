//! Request signing for the hosted media API.

use sha1::Sha1;
use sha2::{Digest, Sha256};

use super::config::SignatureAlgorithm;

/// Parameters that travel with a request but are never part of the signature.
const UNSIGNED_PARAMS: &[&str] = &["file", "cloud_name", "resource_type", "api_key"];

/// Sign a set of request parameters with the account secret.
///
/// Parameters are sorted by name, empty values and unsigned parameters are
/// dropped, the rest are joined as `k=v` with `&`, the secret is appended and
/// the whole string is hashed. The result is lowercase hex.
pub fn api_sign_request(
    params: &[(&str, String)],
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let mut signed: Vec<&(&str, String)> = params
        .iter()
        .filter(|(k, v)| !v.is_empty() && !UNSIGNED_PARAMS.contains(k))
        .collect();
    signed.sort_by(|a, b| a.0.cmp(b.0));

    let mut to_sign = signed
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    to_sign.push_str(api_secret);

    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(to_sign.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(to_sign.as_bytes())),
    }
}
