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

//! Deterministic hashing: byte strings into `F_p`, identities onto order-q
//! curve points, and `F_p^2` elements into fixed-length secrets.
//!
//! The same digest must back every operation of a deployment; encryptors
//! and decryptors that disagree on it derive different secrets.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use sha2::Digest;

use crate::{
	bytes,
	curve::{Curve, Point},
	fp2::Fp2,
};

/// sha256 hasher
pub fn sha256(b: &[u8]) -> Vec<u8> {
	let mut hasher = sha2::Sha256::new();
	hasher.update(b);
	hasher.finalize().to_vec()
}

/// Digest of the length-prefixed pair `(a, b)`; backs the `pub || id`
/// certificate hashing.
pub fn hash_pair(a: &[u8], b: &[u8]) -> Vec<u8> {
	sha256(&bytes::join(a, b))
}

/// Hashes a byte string to a residue below `limit`.
///
/// The digest is expanded to `digest || 1 || digest || 2 || ...` bit by bit
/// until at least `bits(limit)` bits are produced, then high bits are
/// cleared until the value drops below the limit.
pub fn hash_to_fp(data: &[u8], limit: &BigUint) -> BigUint {
	expand_digest(&sha256(data), limit)
}

fn expand_digest(md: &[u8], limit: &BigUint) -> BigUint {
	let z = BigUint::from_bytes_be(md);
	let zbits = z.bits().max(1);

	let mut x = BigUint::zero();
	let mut i = 0u64;
	let mut remaining = limit.bits() as i64;
	let mut count = BigUint::one();
	loop {
		for j in 0..zbits {
			if z.bit(j) {
				x.set_bit(i, true);
			}
			i += 1;
		}
		remaining -= zbits as i64;
		if remaining <= 0 {
			break;
		}

		let countbits = count.bits();
		for j in 0..countbits {
			if count.bit(j) {
				x.set_bit(i, true);
			}
			i += 1;
		}
		remaining -= countbits as i64;
		count += 1u32;
		if remaining <= 0 {
			break;
		}
	}

	while x >= *limit {
		let top = x.bits() - 1;
		x.set_bit(top, false);
	}
	x
}

/// Maps a byte string deterministically to a point of order `q` on
/// `E(F_p)`.
///
/// The digest picks the y-coordinate, the cube-root identity recovers x
/// without a rejection loop, and the cofactor multiplication lands in the
/// q-torsion; the infinity outcome retries with successive small
/// y-coordinates (negligible at cryptographic sizes).
pub fn map_to_point(curve: &Curve, id: &[u8]) -> Point {
	let mut y = hash_to_fp(id, &curve.p);
	let mut i = 1u32;
	loop {
		let x = curve.x_from_y(&y);
		let point = Point::Affine {
			x: Fp2::from_base(x),
			y: Fp2::from_base(y),
		};
		let point = curve.make_order_q(&point);
		if !point.is_infinity() {
			return point;
		}
		y = BigUint::from(i);
		i += 1;
	}
}

/// Hashes an `F_p^2` element to a fixed-length secret; the KEM output.
pub fn hash_fp2(x: &Fp2) -> Vec<u8> {
	sha256(&bytes::fp2_to_bytes(x))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ibe;
	use rand::SeedableRng;
	use rand_chacha::ChaCha20Rng;

	#[test]
	fn sha256_known_vector() {
		let actual = sha256(b"test");
		let expected = vec![
			159, 134, 208, 129, 136, 76, 125, 101, 154, 47, 234, 160, 197, 90,
			208, 21, 163, 191, 79, 27, 43, 11, 130, 44, 209, 93, 108, 21, 176,
			240, 10, 8,
		];
		assert_eq!(actual, expected);
	}

	#[test]
	fn hash_to_fp_stays_below_the_limit() {
		for limit in [5u64, 59, 1 << 20, (1 << 61) - 1] {
			let limit = BigUint::from(limit);
			for msg in [&b"alice"[..], b"bob", b"", b"carol@example.com"] {
				let h = hash_to_fp(msg, &limit);
				assert!(h < limit);
				assert_eq!(h, hash_to_fp(msg, &limit));
			}
		}
	}

	#[test]
	fn hash_to_fp_expands_past_the_digest_length() {
		// a 400-bit limit needs more than one digest block
		let limit = BigUint::from(1u32) << 400;
		let h = hash_to_fp(b"needs expansion", &limit);
		assert!(h.bits() > 256);
	}

	#[test]
	fn hash_pair_is_order_sensitive() {
		assert_ne!(hash_pair(b"a", b"b"), hash_pair(b"b", b"a"));
		// length-prefixed, so moving a boundary byte changes the digest
		assert_ne!(hash_pair(b"ab", b"c"), hash_pair(b"a", b"bc"));
	}

	#[test]
	fn map_to_point_lands_in_the_right_subgroup() {
		let mut rng = ChaCha20Rng::seed_from_u64(13);
		let (params, _master) = ibe::setup(192, 96, "hash-test", &mut rng).unwrap();
		let curve = &params.curve;

		let d1 = map_to_point(curve, b"alice@example.com");
		let d2 = map_to_point(curve, b"bob@example.com");

		assert!(curve.is_base_point(&d1));
		assert!(curve.general_mul(&curve.q, &d1).is_infinity());
		assert_ne!(d1, d2);
		assert_eq!(d1, map_to_point(curve, b"alice@example.com"));
	}
}
