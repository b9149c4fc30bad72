// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use multibase::Base;
use rand::RngCore;
use serde_json::Value;

use crate::error::Error;
use crate::error::Result;
use crate::hash_agility::DigestAlg;

/// Length in bytes of a disclosure's salt (16 bytes, fixed).
const SALT_LEN: usize = 16;

/// A primitive JSON value a claim may carry.
///
/// Object-valued claims are represented so that attempting to disclose one
/// is a explicit, typed failure ([`Error::NestedNotSupported`]) rather than
/// a silent truncation — nested selective disclosure is out of scope for
/// this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
  String(String),
  Number(serde_json::Number),
  Bool(bool),
  Null,
  Object(serde_json::Map<String, Value>),
  Array(Vec<Value>),
}

impl ClaimValue {
  /// `true` for any primitive (non-object, non-array) variant.
  pub fn is_primitive(&self) -> bool {
    !matches!(self, ClaimValue::Object(_) | ClaimValue::Array(_))
  }
}

impl From<Value> for ClaimValue {
  fn from(value: Value) -> Self {
    match value {
      Value::String(s) => ClaimValue::String(s),
      Value::Number(n) => ClaimValue::Number(n),
      Value::Bool(b) => ClaimValue::Bool(b),
      Value::Null => ClaimValue::Null,
      Value::Object(o) => ClaimValue::Object(o),
      Value::Array(a) => ClaimValue::Array(a),
    }
  }
}

impl From<ClaimValue> for Value {
  fn from(value: ClaimValue) -> Self {
    match value {
      ClaimValue::String(s) => Value::String(s),
      ClaimValue::Number(n) => Value::Number(n),
      ClaimValue::Bool(b) => Value::Bool(b),
      ClaimValue::Null => Value::Null,
      ClaimValue::Object(o) => Value::Object(o),
      ClaimValue::Array(a) => Value::Array(a),
    }
  }
}

/// An opened `[salt, name, value]` triple that reveals one hidden claim.
#[derive(Debug, Clone, PartialEq)]
pub struct Disclosure {
  salt: String,
  name: String,
  value: ClaimValue,
}

impl Disclosure {
  /// Builds a disclosure with a freshly generated, cryptographically random salt.
  pub fn new(name: impl Into<String>, value: ClaimValue) -> Self {
    Self {
      salt: Self::gen_salt(),
      name: name.into(),
      value,
    }
  }

  fn gen_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    Base::Base64Url.encode(bytes)
  }

  pub fn salt(&self) -> &str {
    &self.salt
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn value(&self) -> &ClaimValue {
    &self.value
  }

  /// Encodes this disclosure as `base64url(utf8(json([salt, name, value])))`,
  /// with no padding and no inserted whitespace.
  pub fn encode(&self) -> Result<String> {
    let array = Value::Array(vec![
      Value::String(self.salt.clone()),
      Value::String(self.name.clone()),
      self.value.clone().into(),
    ]);
    let json = serde_json::to_string(&array).map_err(|e| Error::Codec(e.to_string()))?;
    Ok(Base::Base64Url.encode(json.as_bytes()))
  }

  /// Decodes a disclosure from its wire form, requiring the decoded JSON array
  /// to have exactly 3 elements.
  pub fn parse(s: &str) -> Result<Self> {
    let bytes = multibase::Base::Base64Url
      .decode(s)
      .map_err(|e| Error::MalformedDisclosure(e.to_string()))?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| Error::MalformedDisclosure(e.to_string()))?;
    let Value::Array(mut elements) = value else {
      return Err(Error::MalformedDisclosure("not a JSON array".to_string()));
    };
    if elements.len() != 3 {
      return Err(Error::MalformedDisclosure(format!(
        "expected 3 elements, found {}",
        elements.len()
      )));
    }
    let value = elements.pop().unwrap();
    let name = match elements.pop().unwrap() {
      Value::String(s) => s,
      _ => return Err(Error::MalformedDisclosure("claim name is not a string".to_string())),
    };
    let salt = match elements.pop().unwrap() {
      Value::String(s) => s,
      _ => return Err(Error::MalformedDisclosure("salt is not a string".to_string())),
    };
    Ok(Self {
      salt,
      name,
      value: value.into(),
    })
  }

  /// Hashes the *encoded* disclosure string (not the decoded triple) under `alg`,
  /// returning an unpadded base64url digest.
  pub fn digest(alg: DigestAlg, encoded: &str) -> String {
    Base::Base64Url.encode(alg.digest(encoded.as_bytes()))
  }
}

impl Display for Disclosure {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.encode().unwrap_or_default())
  }
}

impl FromStr for Disclosure {
  type Err = Error;
  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    Self::parse(s)
  }
}

#[cfg(test)]
mod test {
  use super::ClaimValue;
  use super::Disclosure;
  use crate::hash_agility::DigestAlg;

  #[test]
  fn encode_parse_roundtrip() {
    let disclosure = Disclosure::new("fname", ClaimValue::String("John".to_string()));
    let encoded = disclosure.encode().unwrap();
    let parsed = Disclosure::parse(&encoded).unwrap();
    assert_eq!(parsed, disclosure);
  }

  #[test]
  fn digest_is_stable_for_same_encoding() {
    let disclosure = Disclosure::new("fname", ClaimValue::String("John".to_string()));
    let encoded = disclosure.encode().unwrap();
    let d1 = Disclosure::digest(DigestAlg::Sha256, &encoded);
    let d2 = Disclosure::digest(DigestAlg::Sha256, &encoded);
    assert_eq!(d1, d2);
  }

  #[test]
  fn malformed_array_length_rejected() {
    let bad = multibase::Base::Base64Url.encode(b"[\"only\", \"two\"]");
    assert!(Disclosure::parse(&bad).is_err());
  }

  #[test]
  fn known_vector_digest() {
    // From the IETF SD-JWT draft's worked examples.
    let encoded = "WyI2cU1RdlJMNWhhaiIsICJmYW1pbHlfbmFtZSIsICJNw7ZiaXVzIl0";
    let digest = Disclosure::digest(DigestAlg::Sha256, encoded);
    assert_eq!(digest, "uutlBuYeMDyjLLTpf6Jxi7yNkEF35jdyWMn9U7b_RYY");
  }
}
