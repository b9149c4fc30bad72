// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors produced by issuance, presentation, verification and revocation.
#[derive(Error, Debug)]
pub enum Error {
  /// `_sd_alg` (or a `KeyMaterial`'s `alg`) names a digest the crypto backend doesn't support.
  #[error("unsupported hash algorithm: {0}")]
  UnsupportedAlg(String),

  /// A claim selected for hiding is a JSON object; nested selective disclosure isn't supported.
  #[error("nested selective disclosure is not supported for claim: {0}")]
  NestedNotSupported(String),

  /// A disclosure string didn't base64url/JSON-decode into a 3-element array.
  #[error("malformed disclosure: {0}")]
  MalformedDisclosure(String),

  /// The number of `&`-delimited disclosure groups didn't match the number of credentials.
  #[error("disclosure group count ({groups}) does not match credential count ({credentials})")]
  GroupCountMismatch { groups: usize, credentials: usize },

  /// A disclosure's digest was not found in the credential's `_sd` array.
  #[error("disclosure digest not found in `_sd`: {0}")]
  DisclosureMismatch(String),

  /// An SD-JWT string had no `~`-delimited disclosure segment at all.
  #[error("no disclosures present in SD-JWT")]
  NoDisclosures,

  /// A JWS signature failed verification.
  #[error("signature invalid: {0}")]
  SignatureInvalid(String),

  /// The `DIDResolver` failed to resolve a verification key.
  #[error("resolver failure: {0}")]
  ResolverFailure(String),

  /// A revocation bit index fell outside `[0, 128000)`.
  #[error("index {0} out of range for revocation list")]
  IndexOutOfRange(usize),

  /// The `Signer` collaborator failed to produce a signature.
  #[error("signing failed: {0}")]
  SigningFailed(String),

  /// Fetching a published status list failed.
  #[error("fetch failed: {0}")]
  FetchFailure(String),

  /// Publishing an updated status list failed.
  #[error("publish failed: {0}")]
  PublishFailure(String),

  /// A compact JWS string didn't split into exactly header/payload/signature.
  #[error("malformed JWS: {0}")]
  MalformedJws(String),

  /// A JSON value was not of the expected shape.
  #[error("invalid data: {0}")]
  DataTypeMismatch(String),

  /// `credentialStatus` wasn't a `StatusList2021Entry`, or its `id` wasn't `{listUrl}#{index}`.
  #[error("invalid status list entry: {0}")]
  InvalidStatusEntry(String),

  /// base64/JSON (de)serialization failure not otherwise classified above.
  #[error("(de)serialization error: {0}")]
  Codec(String),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
