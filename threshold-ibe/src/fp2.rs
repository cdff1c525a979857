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

//! Arithmetic in the quadratic extension `F_p^2 = F_p[i]`, `i^2 = -1`.
//!
//! The representation is valid whenever `p = 3 mod 4`, which setup enforces
//! by construction (`p = 11 mod 12`). Elements are pairs `a + b*i` of reduced
//! residues; every operation takes the prime as an explicit argument and
//! returns a fully reduced element.

use core::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::fp;

// constants for the sliding-window exponentiation
const WINDOW_SIZE: u64 = 5;
const WINDOW_POWER: usize = 15; // 2^(WINDOW_SIZE - 1) - 1

/// An element `a + b*i` of `F_p^2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fp2 {
	pub a: BigUint,
	pub b: BigUint,
}

impl Fp2 {
	pub fn zero() -> Self {
		Fp2 { a: BigUint::zero(), b: BigUint::zero() }
	}

	pub fn one() -> Self {
		Fp2 { a: BigUint::one(), b: BigUint::zero() }
	}

	/// Embeds a base-field residue.
	pub fn from_base(a: BigUint) -> Self {
		Fp2 { a, b: BigUint::zero() }
	}

	pub fn is_zero(&self) -> bool {
		self.a.is_zero() && self.b.is_zero()
	}

	/// True when the element lies in the prime subfield.
	pub fn is_base_field(&self) -> bool {
		self.b.is_zero()
	}

	pub fn add(&self, other: &Fp2, p: &BigUint) -> Fp2 {
		Fp2 {
			a: fp::add(&self.a, &other.a, p),
			b: fp::add(&self.b, &other.b, p),
		}
	}

	pub fn sub(&self, other: &Fp2, p: &BigUint) -> Fp2 {
		Fp2 {
			a: fp::sub(&self.a, &other.a, p),
			b: fp::sub(&self.b, &other.b, p),
		}
	}

	pub fn neg(&self, p: &BigUint) -> Fp2 {
		Fp2 { a: fp::neg(&self.a, p), b: fp::neg(&self.b, p) }
	}

	/// Complex conjugate `a - b*i`; the Frobenius map `x -> x^p`.
	pub fn conjugate(&self, p: &BigUint) -> Fp2 {
		Fp2 { a: self.a.clone(), b: fp::neg(&self.b, p) }
	}

	/// Schoolbook product with one reduction per coordinate.
	pub fn mul(&self, other: &Fp2, p: &BigUint) -> Fp2 {
		// (a + bi)(c + di) = (ac - bd) + (ad + bc)i
		let ac = &self.a * &other.a;
		let bd = &self.b * &other.b;
		let ad = &self.a * &other.b;
		let bc = &self.b * &other.a;
		let bd = bd % p;
		Fp2 {
			a: fp::sub(&(ac % p), &bd, p),
			b: (ad + bc) % p,
		}
	}

	/// Scales both coordinates by a base-field residue.
	pub fn mul_scalar(&self, s: &BigUint, p: &BigUint) -> Fp2 {
		Fp2 { a: fp::mul(&self.a, s, p), b: fp::mul(&self.b, s, p) }
	}

	pub fn square(&self, p: &BigUint) -> Fp2 {
		// (a + bi)^2 = (a - b)(a + b) + 2ab*i
		let d = fp::sub(&self.a, &self.b, p);
		let s = fp::add(&self.a, &self.b, p);
		let ab = &self.a * &self.b;
		Fp2 {
			a: fp::mul(&d, &s, p),
			b: (ab << 1) % p,
		}
	}

	/// Multiplicative inverse `(a - bi) / (a^2 + b^2)`.
	///
	/// Panics on zero; the pairing never inverts zero by construction, and a
	/// zero reaching this point means an invariant was already broken.
	pub fn inv(&self, p: &BigUint) -> Fp2 {
		let norm = (&self.a * &self.a + &self.b * &self.b) % p;
		let ninv = fp::inv(&norm, p)
			.expect("inverse of zero in F_p^2: input violated a nonzero invariant");
		Fp2 {
			a: fp::mul(&ninv, &self.a, p),
			b: fp::neg(&fp::mul(&ninv, &self.b, p), p),
		}
	}

	pub fn div(&self, other: &Fp2, p: &BigUint) -> Fp2 {
		self.mul(&other.inv(p), p)
	}

	/// `self^n` by a signed sliding window of width 5 over an odd-power
	/// table.
	pub fn pow(&self, n: &BigUint, p: &BigUint) -> Fp2 {
		if n.is_zero() {
			return Fp2::one();
		}

		// g[k] = self^(2k + 1), plus the running square
		let sq = self.mul(self, p);
		let mut g = Vec::with_capacity(WINDOW_POWER + 1);
		g.push(self.clone());
		for k in 1..=WINDOW_POWER {
			let next = g[k - 1].mul(&sq, p);
			g.push(next);
		}

		let mut res = Fp2::one();
		let mut m = n.bits() as i64 - 1;
		while m >= 0 {
			if !n.bit(m as u64) {
				res = res.square(p);
				m -= 1;
			} else {
				let mut l = if m as u64 >= WINDOW_SIZE - 1 {
					m as u64 - (WINDOW_SIZE - 1)
				} else {
					0
				};
				while !n.bit(l) {
					l += 1;
				}
				let mut j = 1usize;
				res = res.square(p);
				for k in (l..m as u64).rev() {
					j <<= 1;
					if n.bit(k) {
						j += 1;
					}
					res = res.square(p);
				}
				res = res.mul(&g[(j - 1) / 2], p);
				m = l as i64 - 1;
			}
		}
		res
	}

	/// The non-unit cube root of unity `(-1 - sqrt(-3)) / 2`, with
	/// `sqrt(3) = 3^((p+1)/4)` in the base field.
	pub fn cbrt_unity(p: &BigUint) -> Fp2 {
		let half_neg = (p - 1u32) >> 1;
		let p1on4 = (p + 1u32) >> 2;
		let sqrt3 = BigUint::from(3u32).modpow(&p1on4, p);
		let b = fp::mul(&sqrt3, &half_neg, p);
		Fp2 { a: half_neg, b }
	}
}

impl fmt::Display for Fp2 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{} {}]", self.a, self.b)
	}
}
