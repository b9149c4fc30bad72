// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use crate::credential::VcPayload;
use crate::credential::VpPayload;
use crate::disclosure::Disclosure;
use crate::error::Error;
use crate::error::Result;
use crate::hash_agility::digest_name;
use crate::interfaces::DIDResolver;
use crate::interfaces::Verifier;
use crate::jwt::JsonObject;
use crate::jwt::Jwt;

/// Default digest algorithm assumed for a VC that omits `_sd_alg`.
const DEFAULT_SD_ALG: &str = "ES256K";

/// Result of verifying a (possibly multi-credential) SD-VP.
#[derive(Debug, Clone)]
pub struct VerifiedPresentation {
  /// Always `true` — verification failures are returned as `Err` instead.
  /// Kept as an explicit field so callers mirror the shape described by the
  /// source specification's `{vp: {verified}, disclosed}` response.
  pub verified: bool,
  /// One revealed-claims map per credential, positionally matching
  /// `vp.verifiableCredential`.
  pub disclosed: Vec<JsonObject>,
}

/// Verifies an SD-VP produced by [`crate::presenter::present_vp`]: checks the
/// outer VP JWS, each enclosed VC JWS, and that every disclosed claim's
/// digest is committed to in its VC's `_sd` array.
///
/// # Errors
/// - [`Error::NoDisclosures`] if `vp_string` has no `~`-delimited tail.
/// - [`Error::GroupCountMismatch`] if the number of `&`-delimited groups
///   doesn't match the number of credentials in the VP.
/// - [`Error::SignatureInvalid`] if the VP or a VC's signature fails verification.
/// - [`Error::ResolverFailure`] if the `resolver` collaborator fails.
/// - [`Error::DisclosureMismatch`] if a disclosure's digest isn't in its VC's `_sd`.
/// - [`Error::MalformedDisclosure`] / [`Error::MalformedJws`] for structurally invalid input.
pub async fn verify_vp(
  vp_string: &str,
  verifier: &impl Verifier,
  resolver: &impl DIDResolver,
) -> Result<VerifiedPresentation> {
  let (vp_jws, tail) = vp_string.split_once('~').ok_or(Error::NoDisclosures)?;

  let vp_jwt = Jwt::<VpPayload>::parse(vp_jws)?;
  let vp_key = resolver
    .resolve(&vp_jwt.claims().iss)
    .await
    .map_err(|e| Error::ResolverFailure(e.to_string()))?;
  let vp_ok = verifier
    .verify(vp_jws, &vp_key)
    .await
    .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
  if !vp_ok {
    return Err(Error::SignatureInvalid("VP signature did not verify".to_string()));
  }

  let credentials = &vp_jwt.claims().vp.verifiable_credential;
  let groups: Vec<&str> = tail.split('&').collect();
  if groups.len() != credentials.len() {
    return Err(Error::GroupCountMismatch {
      groups: groups.len(),
      credentials: credentials.len(),
    });
  }

  let mut disclosed = Vec::with_capacity(credentials.len());
  for (vc_jws, group) in credentials.iter().zip(groups.iter()) {
    disclosed.push(verify_one_credential(vc_jws, group, verifier, resolver).await?);
  }

  Ok(VerifiedPresentation {
    verified: true,
    disclosed,
  })
}

async fn verify_one_credential(
  vc_jws: &str,
  group: &str,
  verifier: &impl Verifier,
  resolver: &impl DIDResolver,
) -> Result<JsonObject> {
  let vc_jwt = Jwt::<VcPayload>::parse(vc_jws)?;
  let vc_key = resolver
    .resolve(&vc_jwt.claims().iss)
    .await
    .map_err(|e| Error::ResolverFailure(e.to_string()))?;
  let vc_ok = verifier
    .verify(vc_jws, &vc_key)
    .await
    .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
  if !vc_ok {
    return Err(Error::SignatureInvalid("VC signature did not verify".to_string()));
  }

  let sd_alg_name = vc_jwt.claims().vc._sd_alg.as_deref().unwrap_or(DEFAULT_SD_ALG);
  let digest_alg = digest_name(sd_alg_name)?;

  let sd_set: HashSet<&str> = vc_jwt
    .claims()
    .vc
    .credential_subject
    .get("_sd")
    .and_then(serde_json::Value::as_array)
    .map(|entries| entries.iter().filter_map(serde_json::Value::as_str).collect())
    .unwrap_or_default();

  let mut claims = JsonObject::new();
  if !group.is_empty() {
    for encoded in group.split('~') {
      let disclosure = Disclosure::parse(encoded)?;
      let digest = Disclosure::digest(digest_alg, encoded);
      if !sd_set.contains(digest.as_str()) {
        return Err(Error::DisclosureMismatch(digest));
      }
      claims.insert(disclosure.name().to_string(), disclosure.value().clone().into());
    }
  }
  Ok(claims)
}

#[cfg(test)]
mod test {
  use async_trait::async_trait;
  use serde_json::json;

  use super::*;
  use crate::credential::VcClaims;
  use crate::interfaces::KeyAlg;
  use crate::interfaces::KeyMaterial;
  use crate::interfaces::Signer;
  use crate::issuer::issue_sd;
  use crate::presenter::present_vp;

  struct EchoSigner;

  #[async_trait]
  impl Signer for EchoSigner {
    async fn sign(&self, _key: &KeyMaterial, payload: &[u8]) -> Result<String> {
      use multibase::Base;
      let header = Base::Base64Url.encode(br#"{"alg":"ES256K","typ":"JWT"}"#);
      let body = Base::Base64Url.encode(payload);
      Ok(format!("{header}.{body}.sig"))
    }
  }

  struct AcceptAllVerifier;

  #[async_trait]
  impl Verifier for AcceptAllVerifier {
    async fn verify(&self, _compact_jws: &str, _key: &KeyMaterial) -> Result<bool> {
      Ok(true)
    }
  }

  struct RejectingVerifier;

  #[async_trait]
  impl Verifier for RejectingVerifier {
    async fn verify(&self, _compact_jws: &str, _key: &KeyMaterial) -> Result<bool> {
      Ok(false)
    }
  }

  struct StaticResolver;

  #[async_trait]
  impl DIDResolver for StaticResolver {
    async fn resolve(&self, did: &str) -> Result<KeyMaterial> {
      Ok(KeyMaterial {
        did: did.to_string(),
        alg: KeyAlg::Es256k,
        public_key: vec![9, 9, 9],
        private_key: None,
      })
    }
  }

  fn holder_key() -> KeyMaterial {
    KeyMaterial {
      did: "did:key:holder".to_string(),
      alg: KeyAlg::Es256k,
      public_key: vec![4, 5, 6],
      private_key: None,
    }
  }

  fn issuer_key() -> KeyMaterial {
    KeyMaterial {
      did: "did:key:issuer".to_string(),
      alg: KeyAlg::Es256k,
      public_key: vec![1, 2, 3],
      private_key: None,
    }
  }

  async fn issue_sample() -> String {
    issue_sample_with_national_id("ajj3i23293f290").await
  }

  async fn issue_sample_with_national_id(national_id: &str) -> String {
    let mut subject = serde_json::Map::new();
    subject.insert("fname".to_string(), json!("John"));
    subject.insert("sname".to_string(), json!("Doe"));
    subject.insert("nationalId".to_string(), json!(national_id));
    let payload = VcPayload {
      iss: "did:key:issuer".to_string(),
      sub: Some("did:key:subject".to_string()),
      iat: 1_700_000_000,
      vc: VcClaims {
        type_: vec!["VerifiableCredential".to_string()],
        _sd_alg: None,
        credential_subject: subject,
        credential_status: None,
      },
    };
    let hide = vec!["fname".to_string(), "sname".to_string()];
    issue_sd(&EchoSigner, &issuer_key(), payload, "ES256K", &hide)
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn verify_reveals_no_claims_when_reveal_set_is_empty() {
    let sd_jwt = issue_sample().await;
    let vp = present_vp(&EchoSigner, &holder_key(), &[sd_jwt], &[vec![]])
      .await
      .unwrap();
    let result = verify_vp(&vp, &AcceptAllVerifier, &StaticResolver).await.unwrap();
    assert!(result.verified);
    assert!(result.disclosed[0].is_empty());
  }

  #[tokio::test]
  async fn verify_reveals_only_the_requested_claim() {
    let sd_jwt = issue_sample().await;
    let vp = present_vp(&EchoSigner, &holder_key(), &[sd_jwt], &[vec!["fname".to_string()]])
      .await
      .unwrap();
    let result = verify_vp(&vp, &AcceptAllVerifier, &StaticResolver).await.unwrap();
    assert_eq!(result.disclosed[0].get("fname").unwrap(), "John");
    assert!(result.disclosed[0].get("sname").is_none());
  }

  #[tokio::test]
  async fn verify_reveals_all_requested_claims() {
    let sd_jwt = issue_sample().await;
    let vp = present_vp(
      &EchoSigner,
      &holder_key(),
      &[sd_jwt],
      &[vec!["fname".to_string(), "sname".to_string()]],
    )
    .await
    .unwrap();
    let result = verify_vp(&vp, &AcceptAllVerifier, &StaticResolver).await.unwrap();
    assert_eq!(result.disclosed[0].get("fname").unwrap(), "John");
    assert_eq!(result.disclosed[0].get("sname").unwrap(), "Doe");
  }

  #[tokio::test]
  async fn tampered_disclosure_byte_fails_digest_check() {
    let sd_jwt = issue_sample().await;
    let mut vp = present_vp(&EchoSigner, &holder_key(), &[sd_jwt], &[vec!["fname".to_string()]])
      .await
      .unwrap();
    // Flip a byte inside the disclosure segment to invalidate its digest.
    let tamper_at = vp.rfind('~').unwrap() + 1;
    let mut bytes = vp.into_bytes();
    bytes[tamper_at] = if bytes[tamper_at] == b'A' { b'B' } else { b'A' };
    vp = String::from_utf8(bytes).unwrap();

    let err = verify_vp(&vp, &AcceptAllVerifier, &StaticResolver).await.unwrap_err();
    assert!(matches!(
      err,
      Error::DisclosureMismatch(_) | Error::MalformedDisclosure(_)
    ));
  }

  #[tokio::test]
  async fn rejected_signature_fails_verification() {
    let sd_jwt = issue_sample().await;
    let vp = present_vp(&EchoSigner, &holder_key(), &[sd_jwt], &[vec![]])
      .await
      .unwrap();
    let err = verify_vp(&vp, &RejectingVerifier, &StaticResolver).await.unwrap_err();
    assert!(matches!(err, Error::SignatureInvalid(_)));
  }

  #[tokio::test]
  async fn group_count_mismatch_detected() {
    let sd_jwt = issue_sample().await;
    let vp = present_vp(&EchoSigner, &holder_key(), &[sd_jwt], &[vec![]])
      .await
      .unwrap();
    let broken = format!("{vp}&extra-group");
    let err = verify_vp(&broken, &AcceptAllVerifier, &StaticResolver)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::GroupCountMismatch { .. }));
  }

  #[tokio::test]
  async fn multi_credential_groups_line_up_positionally_with_an_empty_middle_group() {
    let cred0 = issue_sample_with_national_id("first-credential-id").await;
    let cred1 = issue_sample_with_national_id("second-credential-id").await;
    let cred2 = issue_sample_with_national_id("third-credential-id").await;

    let vp = present_vp(
      &EchoSigner,
      &holder_key(),
      &[cred0, cred1, cred2],
      &[vec!["fname".to_string()], vec![], vec!["sname".to_string()]],
    )
    .await
    .unwrap();

    // The middle credential reveals nothing, so its group is empty and the
    // wire form carries a literal `&&` between the two non-empty groups.
    let tail = vp.split_once('~').unwrap().1;
    assert!(tail.contains("&&"));

    let result = verify_vp(&vp, &AcceptAllVerifier, &StaticResolver).await.unwrap();
    assert_eq!(result.disclosed.len(), 3);
    assert_eq!(result.disclosed[0].get("fname").unwrap(), "John");
    assert!(result.disclosed[0].get("sname").is_none());
    assert!(result.disclosed[1].is_empty());
    assert!(result.disclosed[2].get("fname").is_none());
    assert_eq!(result.disclosed[2].get("sname").unwrap(), "Doe");
  }
}
