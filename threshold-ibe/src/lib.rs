/*
 * Copyright 2025 by Ideal Labs, LLC
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Threshold identity-based encryption over supersingular pairing-friendly
//! curves.
//!
//! Any sender can encrypt for a human-readable identity string using only the
//! public system parameters; the identity owner recovers the matching private
//! key from a threshold of key-share servers, each holding a Shamir share of
//! the master scalar. The crate implements the whole cryptographic core:
//! arithmetic in F_p and F_p^2, the group law on `E: y^2 = x^3 + 1`, the Tate
//! pairing via Miller's algorithm (with a shortened loop for Solinas-form
//! subgroup orders and a precomputation cache for fixed first arguments),
//! deterministic hashing of identities onto the curve, the Boneh-Franklin
//! key-encapsulation mechanism, threshold splitting and Lagrange
//! reconstruction of master and derived keys, BLS short signatures, and
//! certificate-based identity signatures.
//!
//! Symmetric framing, transport, configuration, and the key-share servers
//! themselves live outside this crate; they exchange opaque byte strings with
//! the core through the [`bytes`] encoding.

#![warn(
	unused,
	future_incompatible,
	nonstandard_style,
	rust_2018_idioms,
	rust_2021_compatibility
)]
#![deny(unsafe_code)]

pub mod bytes;
pub mod curve;
pub mod fp;
pub mod fp2;
pub mod hash;
pub mod hybrid;
pub mod ibe;
pub mod pairing;
pub mod shamir;
pub mod sig;

use core::fmt;

/// Library version recorded inside serialized parameter bundles.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Failures surfaced at API boundaries.
///
/// Arithmetic that can only fail when an internal invariant has already been
/// violated (inverting zero inside the pairing, for instance) panics instead:
/// such a state is a programming error, not an input condition a caller could
/// recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// A deserialized value lies outside its domain: a scalar not below the
	/// subgroup order, a coordinate not below the field prime, a point that
	/// fails the curve equation or is not in the expected subfield.
	Domain,
	/// A byte string does not parse: bad length prefix, element count
	/// mismatch, trailing bytes.
	Structure,
	/// Two shares handed to a reconstruction carry the same index.
	DuplicateShare,
	/// A modular inverse did not exist where the caller supplied the
	/// operands (Lagrange denominators from untrusted share sets).
	Arithmetic,
	/// An AEAD opening failed; the sealed key was tampered with or the
	/// KEM secret is wrong.
	Authenticity,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Domain => write!(f, "value out of domain"),
			Error::Structure => write!(f, "malformed byte string"),
			Error::DuplicateShare => write!(f, "duplicate share index"),
			Error::Arithmetic => write!(f, "arithmetic failure"),
			Error::Authenticity => write!(f, "authenticity check failed"),
		}
	}
}

impl std::error::Error for Error {}

/// Crate-wide result type.
pub type Result<T> = core::result::Result<T, Error>;
