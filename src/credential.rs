// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! VC/VP payload shapes. These are plain JWT claim sets (`iss`, `sub`, `iat`,
//! plus a `vc`/`vp` object) — credential schema validation beyond this shape
//! is out of scope for this crate.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

use crate::jwt::JsonObject;

/// `credentialStatus` entry pointing at a StatusList2021 bit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialStatus {
  pub id: String,
  #[serde(rename = "type")]
  pub type_: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status_purpose: Option<String>,
}

/// The `vc` object inside an SD-JWT VC payload.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VcClaims {
  #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
  pub type_: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub _sd_alg: Option<String>,
  #[serde(rename = "credentialSubject", default)]
  pub credential_subject: JsonObject,
  #[serde(rename = "credentialStatus", default, skip_serializing_if = "Option::is_none")]
  pub credential_status: Option<CredentialStatus>,
}

/// Top-level claims of a Verifiable Credential JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcPayload {
  pub iss: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sub: Option<String>,
  pub iat: u64,
  pub vc: VcClaims,
}

/// The `vp` object inside a Verifiable Presentation JWT.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VpClaims {
  #[serde(rename = "verifiableCredential", default)]
  pub verifiable_credential: Vec<String>,
}

/// Top-level claims of a Verifiable Presentation JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpPayload {
  pub iss: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sub: Option<String>,
  pub iat: u64,
  pub vp: VpClaims,
}

fn now_unix() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_secs()
}

/// Builds a new Verifiable Credential payload, e.g. a republished
/// StatusList2021 credential, with `credentialSubject` set from `subject_claims`
/// plus `id: subject_did`.
pub fn create_credential(
  issuer_did: &str,
  subject_did: &str,
  mut subject_claims: JsonObject,
  types: Vec<String>,
) -> VcPayload {
  subject_claims
    .entry("id".to_string())
    .or_insert_with(|| serde_json::Value::String(subject_did.to_string()));

  let mut type_ = vec!["VerifiableCredential".to_string()];
  type_.extend(types);

  VcPayload {
    iss: issuer_did.to_string(),
    sub: Some(subject_did.to_string()),
    iat: now_unix(),
    vc: VcClaims {
      type_,
      _sd_alg: None,
      credential_subject: subject_claims,
      credential_status: None,
    },
  }
}
