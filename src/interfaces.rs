// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Collaborator contracts this crate is built against but does not implement:
//! DID method drivers, JWS signing/verification primitives, and HTTP transport
//! for status lists. Concrete implementations live in downstream crates.

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use strum::EnumString;

use crate::error::Result;

/// A JWS signing algorithm this toolkit issues and verifies credentials under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Serialize, Deserialize)]
pub enum KeyAlg {
  #[strum(serialize = "ES256K")]
  #[serde(rename = "ES256K")]
  Es256k,
  #[strum(serialize = "EdDSA")]
  #[serde(rename = "EdDSA")]
  EdDsa,
}

/// Opaque key material identified by a DID. The private key (when present) is
/// never inspected by this crate — it is only ever handed to a [`Signer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMaterial {
  pub did: String,
  pub alg: KeyAlg,
  pub public_key: Vec<u8>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub private_key: Option<Vec<u8>>,
}

/// Produces a signed compact JWS over a JSON payload using the given key.
#[async_trait]
pub trait Signer {
  async fn sign(&self, key: &KeyMaterial, payload: &[u8]) -> Result<String>;
}

/// Checks a compact JWS's signature against a resolved verification key.
#[async_trait]
pub trait Verifier {
  async fn verify(&self, compact_jws: &str, key: &KeyMaterial) -> Result<bool>;
}

/// Resolves a DID to the [`KeyMaterial`] used to verify signatures it made.
#[async_trait]
pub trait DIDResolver {
  async fn resolve(&self, did: &str) -> Result<KeyMaterial>;
}

/// HTTP access to a published StatusList2021 credential.
#[async_trait]
pub trait StatusListFetcher {
  async fn get(&self, url: &str) -> Result<Value>;
  async fn post(&self, url: &str, vc: &Value) -> Result<()>;
}
