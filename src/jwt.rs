// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use multibase::Base;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::error::Result;

/// A JSON object, used for JWS headers and for the dynamic parts of VC/VP payloads.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// A parsed compact JWS: `base64url(header).base64url(payload).base64url(signature)`.
///
/// This crate never computes or checks the signature itself — that's the
/// [`crate::interfaces::Signer`]/[`crate::interfaces::Verifier`] collaborators'
/// job. `Jwt` only knows how to pull the header and typed claims back out of
/// an already-produced compact string, and to hand the original string back
/// unchanged for re-transmission.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Jwt<C> {
  header: JsonObject,
  claims: C,
  raw: String,
  _marker: PhantomData<C>,
}

impl<C: DeserializeOwned> Jwt<C> {
  /// Parses a compact JWS string, decoding its header and payload segments.
  /// The signature segment is retained verbatim but not interpreted.
  pub fn parse(s: &str) -> Result<Self> {
    let mut segments = s.split('.');
    let header_b64 = segments
      .next()
      .filter(|s| !s.is_empty())
      .ok_or_else(|| Error::MalformedJws("missing header segment".to_string()))?;
    let payload_b64 = segments
      .next()
      .ok_or_else(|| Error::MalformedJws("missing payload segment".to_string()))?;
    let _signature_b64 = segments
      .next()
      .ok_or_else(|| Error::MalformedJws("missing signature segment".to_string()))?;
    if segments.next().is_some() {
      return Err(Error::MalformedJws("too many segments".to_string()));
    }

    let header_bytes = Base::Base64Url
      .decode(header_b64)
      .map_err(|e| Error::MalformedJws(format!("header: {e}")))?;
    let header: JsonObject =
      serde_json::from_slice(&header_bytes).map_err(|e| Error::MalformedJws(format!("header: {e}")))?;

    let payload_bytes = Base::Base64Url
      .decode(payload_b64)
      .map_err(|e| Error::MalformedJws(format!("payload: {e}")))?;
    let claims: C = serde_json::from_slice(&payload_bytes).map_err(|e| Error::MalformedJws(format!("payload: {e}")))?;

    Ok(Self {
      header,
      claims,
      raw: s.to_string(),
      _marker: PhantomData,
    })
  }
}

impl<C> Jwt<C> {
  pub fn header(&self) -> &JsonObject {
    &self.header
  }

  pub fn claims(&self) -> &C {
    &self.claims
  }
}

impl<C> Display for Jwt<C> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.raw)
  }
}

impl<C: DeserializeOwned> FromStr for Jwt<C> {
  type Err = Error;
  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    Self::parse(s)
  }
}
