// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use crate::credential::VcPayload;
use crate::disclosure::ClaimValue;
use crate::disclosure::Disclosure;
use crate::error::Error;
use crate::error::Result;
use crate::hash_agility::digest_name;
use crate::interfaces::KeyMaterial;
use crate::interfaces::Signer;

/// Issues a selectively-disclosable SD-JWT for `vc_payload`, hiding
/// `claims_to_hide` behind salted digest commitments.
///
/// `vc_payload` is consumed and a new payload is built from it; the caller's
/// original value (if any was kept) is left untouched — this crate never
/// mutates a VC payload in place.
///
/// # Errors
/// - [`Error::UnsupportedAlg`] if `hash_alg` isn't a known digest algorithm.
/// - [`Error::NestedNotSupported`] if a hidden claim's value is a JSON object or array.
/// - [`Error::SigningFailed`] if the `signer` collaborator fails.
pub async fn issue_sd(
  signer: &impl Signer,
  issuer_key: &KeyMaterial,
  mut vc_payload: VcPayload,
  hash_alg: &str,
  claims_to_hide: &[String],
) -> Result<String> {
  let digest_alg = digest_name(hash_alg)?;

  let mut disclosures = Vec::with_capacity(claims_to_hide.len());
  let mut digests = Vec::with_capacity(claims_to_hide.len());

  for name in claims_to_hide {
    let value = vc_payload
      .vc
      .credential_subject
      .remove(name)
      .ok_or_else(|| Error::DataTypeMismatch(format!("claim `{name}` not present in credentialSubject")))?;
    let claim_value: ClaimValue = value.into();
    if !claim_value.is_primitive() {
      return Err(Error::NestedNotSupported(name.clone()));
    }

    let disclosure = Disclosure::new(name.clone(), claim_value);
    let encoded = disclosure.encode()?;
    let digest = Disclosure::digest(digest_alg, &encoded);

    digests.push(digest);
    disclosures.push(encoded);
  }

  digests.sort();
  let sd_array = digests.into_iter().map(serde_json::Value::String).collect();
  vc_payload
    .vc
    .credential_subject
    .insert("_sd".to_string(), serde_json::Value::Array(sd_array));
  vc_payload.vc._sd_alg = Some(hash_alg.to_string());

  let payload_bytes = serde_json::to_vec(&vc_payload).map_err(|e| Error::Codec(e.to_string()))?;
  let jws = signer
    .sign(issuer_key, &payload_bytes)
    .await
    .map_err(|e| Error::SigningFailed(e.to_string()))?;

  let mut out = jws;
  for disclosure in disclosures {
    out.push('~');
    out.push_str(&disclosure);
  }
  Ok(out)
}

#[cfg(test)]
mod test {
  use async_trait::async_trait;
  use serde_json::json;

  use super::*;
  use crate::credential::VcClaims;
  use crate::interfaces::KeyAlg;

  struct EchoSigner;

  #[async_trait]
  impl Signer for EchoSigner {
    async fn sign(&self, _key: &KeyMaterial, payload: &[u8]) -> Result<String> {
      // A stand-in JWS: header and payload are real base64url segments, the
      // signature segment is a fixed placeholder since no real crypto runs here.
      use multibase::Base;
      let header = Base::Base64Url.encode(br#"{"alg":"ES256K","typ":"JWT"}"#);
      let body = Base::Base64Url.encode(payload);
      Ok(format!("{header}.{body}.sig"))
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

  fn sample_payload() -> VcPayload {
    let mut subject = serde_json::Map::new();
    subject.insert("fname".to_string(), json!("John"));
    subject.insert("sname".to_string(), json!("Doe"));
    subject.insert("nationalId".to_string(), json!("ajj3i23293f290"));
    VcPayload {
      iss: "did:key:issuer".to_string(),
      sub: Some("did:key:subject".to_string()),
      iat: 1_700_000_000,
      vc: VcClaims {
        type_: vec!["VerifiableCredential".to_string()],
        _sd_alg: None,
        credential_subject: subject,
        credential_status: None,
      },
    }
  }

  #[tokio::test]
  async fn issuance_strips_hidden_claims_and_sorts_sd() {
    let hide = vec!["fname".to_string(), "sname".to_string()];
    let sd_jwt = issue_sd(&EchoSigner, &issuer_key(), sample_payload(), "ES256K", &hide)
      .await
      .unwrap();

    assert_eq!(sd_jwt.matches('~').count(), 2);

    let jws = sd_jwt.split('~').next().unwrap();
    let payload_b64 = jws.split('.').nth(1).unwrap();
    let payload_bytes = multibase::Base::Base64Url.decode(payload_b64).unwrap();
    let claims: VcPayload = serde_json::from_slice(&payload_bytes).unwrap();

    assert_eq!(claims.vc._sd_alg.as_deref(), Some("ES256K"));
    let sd = claims.vc.credential_subject.get("_sd").unwrap().as_array().unwrap();
    assert_eq!(sd.len(), 2);
    assert!(!claims.vc.credential_subject.contains_key("fname"));
    assert!(!claims.vc.credential_subject.contains_key("sname"));
    assert!(claims.vc.credential_subject.contains_key("nationalId"));
  }

  #[tokio::test]
  async fn nested_object_claim_rejected() {
    let mut payload = sample_payload();
    payload
      .vc
      .credential_subject
      .insert("address".to_string(), json!({"city": "Berlin"}));
    let hide = vec!["address".to_string()];
    let err = issue_sd(&EchoSigner, &issuer_key(), payload, "ES256K", &hide)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NestedNotSupported(_)));
  }

  #[tokio::test]
  async fn unsupported_alg_rejected() {
    let err = issue_sd(
      &EchoSigner,
      &issuer_key(),
      sample_payload(),
      "PS256",
      &["fname".to_string()],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedAlg(_)));
  }
}
