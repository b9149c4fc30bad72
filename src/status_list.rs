// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! StatusList2021 revocation: a fixed-size bitstring engine plus the
//! fetch-mutate-republish flow an issuer runs to revoke a credential.

use std::io::Read;
use std::io::Write;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use multibase::Base;
use serde_json::Value;

use crate::credential::create_credential;
use crate::credential::VcPayload;
use crate::error::Error;
use crate::error::Result;
use crate::interfaces::KeyMaterial;
use crate::interfaces::Signer;
use crate::interfaces::StatusListFetcher;

/// Number of 64-bit words backing a [`RevocationList`].
pub const WORD_COUNT: usize = 2000;
/// Bits addressed per word.
pub const BITS_PER_WORD: usize = 64;
/// Total addressable bit count: `WORD_COUNT * BITS_PER_WORD`.
pub const CAPACITY: usize = WORD_COUNT * BITS_PER_WORD;

/// A 128,000-bit revocation bitmap. Bit *i* set means credential *i* is revoked.
///
/// Word order is reversed: logical index 0 lives in the highest-addressed
/// word. Bits only ever transition `0 -> 1`; there is no unrevoke operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationList {
  words: Box<[u64; WORD_COUNT]>,
}

impl Default for RevocationList {
  fn default() -> Self {
    Self::new()
  }
}

impl RevocationList {
  /// A zero-initialized list: no credential revoked.
  pub fn new() -> Self {
    Self {
      words: Box::new([0u64; WORD_COUNT]),
    }
  }

  fn address(index: usize) -> (usize, usize) {
    (WORD_COUNT - 1 - index / BITS_PER_WORD, index % BITS_PER_WORD)
  }

  /// Returns whether bit `index` is set.
  ///
  /// # Errors
  /// [`Error::IndexOutOfRange`] if `index >= CAPACITY`, mirroring [`Self::revoke`].
  pub fn is_revoked(&self, index: usize) -> Result<bool> {
    if index >= CAPACITY {
      return Err(Error::IndexOutOfRange(index));
    }
    let (word, bit) = Self::address(index);
    Ok(self.words[word] & (1u64 << bit) != 0)
  }

  /// Sets bit `index`, revoking the credential at that position. Idempotent.
  ///
  /// # Errors
  /// [`Error::IndexOutOfRange`] if `index` is outside `[0, 128000)`.
  pub fn revoke(&mut self, index: usize) -> Result<()> {
    if index >= CAPACITY {
      return Err(Error::IndexOutOfRange(index));
    }
    let (word, bit) = Self::address(index);
    self.words[word] |= 1u64 << bit;
    Ok(())
  }

  /// Serializes the bitmap as gzip-compressed, standard-base64-encoded,
  /// little-endian word bytes.
  pub fn serialize(&self) -> Result<String> {
    let mut raw = Vec::with_capacity(WORD_COUNT * 8);
    for word in self.words.iter() {
      raw.extend_from_slice(&word.to_le_bytes());
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).map_err(|e| Error::Codec(e.to_string()))?;
    let compressed = encoder.finish().map_err(|e| Error::Codec(e.to_string()))?;

    Ok(Base::Base64Pad.encode(compressed))
  }

  /// Parses a list from its [`Self::serialize`] form.
  pub fn parse(s: &str) -> Result<Self> {
    let compressed = Base::Base64Pad.decode(s).map_err(|e| Error::Codec(e.to_string()))?;

    let mut raw = Vec::with_capacity(WORD_COUNT * 8);
    GzDecoder::new(compressed.as_slice())
      .read_to_end(&mut raw)
      .map_err(|e| Error::Codec(e.to_string()))?;

    if raw.len() != WORD_COUNT * 8 {
      return Err(Error::Codec(format!(
        "expected {} bytes, found {}",
        WORD_COUNT * 8,
        raw.len()
      )));
    }

    let mut words = Box::new([0u64; WORD_COUNT]);
    for (word, chunk) in words.iter_mut().zip(raw.chunks_exact(8)) {
      *word = u64::from_le_bytes(chunk.try_into().unwrap());
    }
    Ok(Self { words })
  }
}

/// Fetches the status list backing `vc`'s `credentialStatus`, revokes its bit,
/// and republishes the list as a freshly-signed StatusList2021 credential.
///
/// Resolves the "async fire-and-forget" ambiguity in the original design by
/// being a plainly awaited, fallible operation: fetch, parse, and publish
/// failures all surface as a distinguishable [`Error`] variant rather than a
/// synchronous `false`.
///
/// # Errors
/// - [`Error::InvalidStatusEntry`] if `vc` has no `StatusList2021Entry` status,
///   or its `id` isn't of the form `{listUrl}#{index}`.
/// - [`Error::FetchFailure`] if the list can't be retrieved or parsed.
/// - [`Error::IndexOutOfRange`] if the entry's index is outside the list's range.
/// - [`Error::PublishFailure`] if the republished list can't be posted.
pub async fn revoke_sl21(
  vc: &VcPayload,
  issuer_did: &str,
  subject_did: &str,
  fetcher: &impl StatusListFetcher,
  signer: &impl Signer,
  issuer_key: &KeyMaterial,
) -> Result<()> {
  let status = vc
    .vc
    .credential_status
    .as_ref()
    .ok_or_else(|| Error::InvalidStatusEntry("credentialStatus is absent".to_string()))?;
  if status.type_ != "StatusList2021Entry" {
    return Err(Error::InvalidStatusEntry(format!(
      "unexpected status type: {}",
      status.type_
    )));
  }
  let (list_url, cred_id_str) = status
    .id
    .split_once('#')
    .ok_or_else(|| Error::InvalidStatusEntry(format!("id has no `#index` suffix: {}", status.id)))?;
  let cred_id: usize = cred_id_str
    .parse()
    .map_err(|_| Error::InvalidStatusEntry(format!("non-numeric index: {cred_id_str}")))?;

  let list_json_url = format!("{list_url}/list.json");
  tracing::debug!(url = %list_json_url, "fetching status list");
  let fetched = fetcher
    .get(&list_json_url)
    .await
    .map_err(|e| Error::FetchFailure(e.to_string()))?;

  let encoded_list = fetched
    .get("credentialSubject")
    .and_then(|subject| subject.get("encodedList"))
    .and_then(Value::as_str)
    .ok_or_else(|| Error::FetchFailure("response missing credentialSubject.encodedList".to_string()))?;

  let mut list = RevocationList::parse(encoded_list).map_err(|e| Error::FetchFailure(e.to_string()))?;
  list.revoke(cred_id)?;
  let serialized = list.serialize().map_err(|e| Error::PublishFailure(e.to_string()))?;

  let mut subject_claims = serde_json::Map::new();
  subject_claims.insert("type".to_string(), Value::String("StatusList2021".to_string()));
  subject_claims.insert("purpose".to_string(), Value::String("revocation".to_string()));
  subject_claims.insert("encodedList".to_string(), Value::String(serialized));

  let new_vc = create_credential(
    issuer_did,
    subject_did,
    subject_claims,
    vec!["StatusList2021".to_string()],
  );
  let payload_bytes = serde_json::to_vec(&new_vc).map_err(|e| Error::Codec(e.to_string()))?;
  let jws = signer
    .sign(issuer_key, &payload_bytes)
    .await
    .map_err(|e| Error::SigningFailed(e.to_string()))?;

  let status_list_url = format!("{list_url}/statusList");
  tracing::debug!(url = %status_list_url, "publishing updated status list");
  fetcher
    .post(&status_list_url, &Value::String(jws))
    .await
    .map_err(|e| Error::PublishFailure(e.to_string()))?;

  Ok(())
}
