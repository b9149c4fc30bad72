// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::credential::VpClaims;
use crate::credential::VpPayload;
use crate::disclosure::Disclosure;
use crate::error::Error;
use crate::error::Result;
use crate::interfaces::KeyMaterial;
use crate::interfaces::Signer;

/// Splits an SD-JWT into its bare JWS and the encoded strings of its
/// disclosures, in wire order.
fn split_sd_jwt(sd_jwt: &str) -> Result<(&str, Vec<&str>)> {
  let mut segments = sd_jwt.split('~');
  let jws = segments.next().filter(|s| !s.is_empty()).ok_or(Error::NoDisclosures)?;
  let disclosures: Vec<&str> = segments.collect();
  if sd_jwt.matches('~').count() == 0 {
    return Err(Error::NoDisclosures);
  }
  Ok((jws, disclosures))
}

/// Filters an SD-JWT's disclosures down to `reveal_names`, returning a new
/// SD-JWT string. An empty `reveal_names` yields the bare JWS with no
/// trailing `~`.
pub fn disclose(sd_jwt: &str, reveal_names: &[String]) -> Result<String> {
  let (jws, disclosures) = split_sd_jwt(sd_jwt)?;

  let mut kept = Vec::new();
  for encoded in disclosures {
    let parsed = Disclosure::parse(encoded)?;
    if reveal_names.iter().any(|n| n == parsed.name()) {
      kept.push(encoded);
    }
  }

  if kept.is_empty() {
    Ok(jws.to_string())
  } else {
    Ok(format!("{jws}~{}", kept.join("~")))
  }
}

fn now_unix() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_secs()
}

/// Assembles a multi-credential SD-VP: `<vp-jws>~<g0>&<g1>&...&<gN-1>` where
/// `gK` is the `~`-joined list of disclosures revealed for the K-th credential,
/// positionally matching `vp.verifiableCredential[K]`.
///
/// # Errors
/// [`Error::GroupCountMismatch`] if `credentials` and `reveal_sets` differ in length.
pub async fn present_vp(
  signer: &impl Signer,
  holder_key: &KeyMaterial,
  credentials: &[String],
  reveal_sets: &[Vec<String>],
) -> Result<String> {
  if credentials.len() != reveal_sets.len() {
    return Err(Error::GroupCountMismatch {
      groups: reveal_sets.len(),
      credentials: credentials.len(),
    });
  }

  let mut bare_jws = Vec::with_capacity(credentials.len());
  let mut groups = Vec::with_capacity(credentials.len());

  for (sd_jwt, reveal_names) in credentials.iter().zip(reveal_sets.iter()) {
    let (jws, disclosures) = split_sd_jwt(sd_jwt)?;
    bare_jws.push(jws.to_string());

    let mut kept = Vec::new();
    for encoded in disclosures {
      let parsed = Disclosure::parse(encoded)?;
      if reveal_names.iter().any(|n| n == parsed.name()) {
        kept.push(encoded);
      }
    }
    groups.push(kept.join("~"));
  }

  let vp_payload = VpPayload {
    iss: holder_key.did.clone(),
    sub: None,
    iat: now_unix(),
    vp: VpClaims {
      verifiable_credential: bare_jws,
    },
  };
  let payload_bytes = serde_json::to_vec(&vp_payload).map_err(|e| Error::Codec(e.to_string()))?;
  let vp_jws = signer
    .sign(holder_key, &payload_bytes)
    .await
    .map_err(|e| Error::SigningFailed(e.to_string()))?;

  Ok(format!("{vp_jws}~{}", groups.join("&")))
}
