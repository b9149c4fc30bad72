// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Maps an IANA JWS `alg` identifier to the digest function that secures its
//! selective-disclosure commitments.

use sha2::Digest;
use sha2::Sha256;
use sha2::Sha384;
use sha2::Sha512;

use crate::error::Error;
use crate::error::Result;

/// A digest algorithm this crate knows how to compute.
///
/// Keeping this an explicit allow-list (rather than, say, forwarding an
/// arbitrary name string to a generic hasher) means an unrecognized `alg`
/// fails closed with [`Error::UnsupportedAlg`] instead of silently picking
/// an ambiguous digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlg {
  Sha256,
  Sha384,
  Sha512,
}

impl DigestAlg {
  /// Computes the digest of `input` under this algorithm.
  pub fn digest(self, input: &[u8]) -> Vec<u8> {
    match self {
      DigestAlg::Sha256 => Sha256::digest(input).to_vec(),
      DigestAlg::Sha384 => Sha384::digest(input).to_vec(),
      DigestAlg::Sha512 => Sha512::digest(input).to_vec(),
    }
  }
}

/// Resolves a JWS `alg` (e.g. `"ES256K"`, `"EdDSA"`) to the [`DigestAlg`] used
/// for that algorithm's `_sd` commitments.
///
/// `ES256K` maps to SHA-256 and `EdDSA` to SHA-512, per the issuer/verifier
/// pairing this toolkit targets. Anything else falls back to stripping
/// hyphens and lowercasing (so `SHA-384` becomes `sha384`), restricted to the
/// digests this crate actually implements; names outside that allow-list
/// return [`Error::UnsupportedAlg`] rather than guessing.
pub fn digest_name(alg: &str) -> Result<DigestAlg> {
  match alg {
    "ES256K" => Ok(DigestAlg::Sha256),
    "EdDSA" => Ok(DigestAlg::Sha512),
    other => {
      let normalized = other.replace('-', "").to_lowercase();
      match normalized.as_str() {
        "sha256" => Ok(DigestAlg::Sha256),
        "sha384" => Ok(DigestAlg::Sha384),
        "sha512" => Ok(DigestAlg::Sha512),
        _ => Err(Error::UnsupportedAlg(other.to_string())),
      }
    }
  }
}

#[cfg(test)]
mod test {
  use super::digest_name;
  use super::DigestAlg;

  #[test]
  fn es256k_maps_to_sha256() {
    assert_eq!(digest_name("ES256K").unwrap(), DigestAlg::Sha256);
  }

  #[test]
  fn eddsa_maps_to_sha512() {
    assert_eq!(digest_name("EdDSA").unwrap(), DigestAlg::Sha512);
  }

  #[test]
  fn fallback_strips_hyphens_and_lowercases() {
    assert_eq!(digest_name("SHA-384").unwrap(), DigestAlg::Sha384);
    assert_eq!(digest_name("SHA-256").unwrap(), DigestAlg::Sha256);
  }

  #[test]
  fn unknown_alg_fails_closed() {
    assert!(digest_name("PS256").is_err());
  }
}
