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

//! BLS short signatures over the IBE parameters, and identity-based
//! signatures built from them with certificates.
//!
//! A BLS signature is `x * H(m)`; verification tests that
//! `(P, xP, H(m), sig)` is a Diffie-Hellman tuple with two pairings. The
//! identity-based scheme aggregates a user's BLS signature with a
//! certificate `master * H(pub || id)` issued by the key generator, so one
//! point carries both the signature and its chain back to the system key.
//! Verifiers must keep the argument slots straight: the public key pairs
//! against the hashed message, the system key against the hashed
//! certificate plaintext.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::{
	bytes,
	curve::Point,
	fp, hash,
	ibe::{self, MasterKey, Params},
	pairing,
	shamir::{self, KeyShare, MasterShare},
};

/// A fresh BLS keypair `(x, xP)`.
pub fn keygen<R: rand::Rng + rand::CryptoRng>(
	params: &Params,
	rng: &mut R,
) -> (BigUint, Point) {
	let secret = loop {
		let x = fp::random_below(rng, &params.curve.q);
		if !x.is_zero() {
			break x;
		}
	};
	let public = params.curve.mul(&secret, &params.generator);
	(secret, public)
}

/// `sig = x * H(m)`.
pub fn sign(params: &Params, message: &[u8], secret: &BigUint) -> Point {
	let h = hash::map_to_point(&params.curve, message);
	params.curve.mul(secret, &h)
}

/// Accepts iff `(P, pub, H(m), sig)` is a DH tuple.
pub fn verify(
	params: &Params,
	sig: &Point,
	message: &[u8],
	public: &Point,
) -> bool {
	if !params.curve.is_base_point(sig) || !params.curve.is_base_point(public)
	{
		return false;
	}
	let h = hash::map_to_point(&params.curve, message);
	is_ddh_tuple(params, &params.generator, public, &h, sig)
}

/// Tests `e(P, Phi(cP)) = e(aP, Phi(bP))`, i.e. that `(P, aP, bP, cP)` is a
/// Diffie-Hellman tuple.
pub fn is_ddh_tuple(
	params: &Params,
	p0: &Point,
	a_p: &Point,
	b_p: &Point,
	c_p: &Point,
) -> bool {
	let curve = &params.curve;
	let lhs = pairing::tate_pairing(curve, p0, &params.phi(c_p));
	let rhs = pairing::tate_pairing(curve, a_p, &params.phi(b_p));
	lhs == rhs
}

/// Keypair for the identity-based signature scheme; the same generation as
/// BLS.
pub fn ibs_keygen<R: rand::Rng + rand::CryptoRng>(
	params: &Params,
	rng: &mut R,
) -> (BigUint, Point) {
	keygen(params, rng)
}

/// Certificate plaintext: the digest of the length-prefixed pair
/// `(pub, id)`.
fn cert_digest(public: &Point, id: &str) -> Vec<u8> {
	hash::hash_pair(&bytes::point_to_bytes(public), id.as_bytes())
}

/// `cert = master * H(pub || id)`, binding a public key to an identity.
pub fn certify(
	params: &Params,
	master: &MasterKey,
	public: &Point,
	id: &str,
) -> Point {
	ibe::extract_bytes(params, master, &cert_digest(public, id)).0
}

/// One server's certificate share; combine with
/// [`crate::shamir::combine`].
pub fn certify_share(
	params: &Params,
	mshare: &MasterShare,
	public: &Point,
	id: &str,
) -> KeyShare {
	shamir::extract_share_bytes(params, mshare, &cert_digest(public, id))
}

/// `sig = cert + x * H(m)`: the certificate and the message signature
/// aggregated into a single point.
pub fn ibs_sign(
	params: &Params,
	message: &[u8],
	secret: &BigUint,
	cert: &Point,
) -> Point {
	let own = sign(params, message, secret);
	params.curve.add(cert, &own)
}

/// Accepts iff `e(P, Phi(sig)) = e(pub, Phi(H(m))) * e(P_pub, Phi(H(pub || id)))`.
pub fn ibs_verify(
	params: &Params,
	sig: &Point,
	message: &[u8],
	public: &Point,
	id: &str,
) -> bool {
	let curve = &params.curve;
	if !curve.is_base_point(sig) || !curve.is_base_point(public) {
		return false;
	}

	let lhs = pairing::tate_pairing(curve, &params.generator, &params.phi(sig));

	let h_m = hash::map_to_point(curve, message);
	let f_msg = pairing::tate_pairing(curve, public, &params.phi(&h_m));

	let h_cert = hash::map_to_point(curve, &cert_digest(public, id));
	let f_cert =
		pairing::tate_pairing(curve, &params.public_key, &params.phi(&h_cert));

	lhs == f_msg.mul(&f_cert, &curve.p)
}
