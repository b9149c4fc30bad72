// Copyright 2020-2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![warn(rust_2018_idioms)]

//! Issuance, selective-disclosure presentation, and verification of
//! SD-JWT Verifiable Credentials and Presentations, plus a StatusList2021
//! revocation bitstring engine.
//!
//! DID method drivers, JWS cryptography, and HTTP transport are not
//! implemented here: they're consumed as the [`interfaces`] collaborator
//! traits ([`KeyMaterial`], [`Signer`], [`Verifier`], [`DIDResolver`],
//! [`StatusListFetcher`]).
//!
//! ```text
//! issue_sd(payload, hide) -> SD-JWT -> disclose(reveal) / present_vp(reveal_sets)
//!   -> SD-JWT / SD-VP -> verify_vp(resolver) -> { verified, disclosed }
//! ```

pub mod credential;
pub mod disclosure;
pub mod error;
pub mod hash_agility;
pub mod interfaces;
pub mod issuer;
pub mod jwt;
pub mod presenter;
pub mod status_list;
pub mod verifier;

pub use credential::create_credential;
pub use credential::CredentialStatus;
pub use credential::VcClaims;
pub use credential::VcPayload;
pub use credential::VpClaims;
pub use credential::VpPayload;
pub use disclosure::ClaimValue;
pub use disclosure::Disclosure;
pub use error::Error;
pub use error::Result;
pub use hash_agility::digest_name;
pub use hash_agility::DigestAlg;
pub use interfaces::DIDResolver;
pub use interfaces::KeyAlg;
pub use interfaces::KeyMaterial;
pub use interfaces::Signer;
pub use interfaces::StatusListFetcher;
pub use interfaces::Verifier;
pub use issuer::issue_sd;
pub use jwt::JsonObject;
pub use jwt::Jwt;
pub use presenter::disclose;
pub use presenter::present_vp;
pub use status_list::RevocationList;
pub use status_list::BITS_PER_WORD;
pub use status_list::CAPACITY;
pub use status_list::WORD_COUNT;
pub use verifier::verify_vp;
pub use verifier::VerifiedPresentation;
