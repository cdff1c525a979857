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

//! Residues modulo a prime: thin helpers over [`num_bigint`].
//!
//! Every function assumes its field operands are already reduced, i.e. lie in
//! `{0, ..., p-1}`, and returns a reduced result. Addition and subtraction
//! use a conditional correction rather than a full reduction.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};

/// x = a + b mod p
pub fn add(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
	let x = a + b;
	if x >= *p {
		x - p
	} else {
		x
	}
}

/// x = a - b mod p
pub fn sub(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
	if a >= b {
		a - b
	} else {
		a + p - b
	}
}

/// x = -b mod p
pub fn neg(b: &BigUint, p: &BigUint) -> BigUint {
	if b.is_zero() {
		BigUint::zero()
	} else {
		p - b
	}
}

/// x = a * b mod p
pub fn mul(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
	(a * b) % p
}

/// x = a / 2 mod p
pub fn halve(a: &BigUint, p: &BigUint) -> BigUint {
	if a.is_odd() {
		(a + p) >> 1
	} else {
		a >> 1
	}
}

/// x = a^n mod p
pub fn pow(a: &BigUint, n: &BigUint, p: &BigUint) -> BigUint {
	a.modpow(n, p)
}

/// x = 1 / a mod m, or `None` when a has no inverse modulo m.
pub fn inv(a: &BigUint, m: &BigUint) -> Option<BigUint> {
	let sa = BigInt::from(a.clone());
	let sm = BigInt::from(m.clone());
	let egcd = sa.extended_gcd(&sm);
	if !egcd.gcd.is_one() {
		return None;
	}
	let x = ((egcd.x % &sm) + &sm) % &sm;
	x.to_biguint()
}

/// Uniform scalar in `{0, ..., bound - 1}`.
pub fn random_below<R: Rng + CryptoRng>(rng: &mut R, bound: &BigUint) -> BigUint {
	rng.gen_biguint_below(bound)
}

/// Uniform scalar of exactly `bits` bits (top bit forced set).
pub fn random_bits<R: Rng + CryptoRng>(rng: &mut R, bits: u64) -> BigUint {
	let mut x = rng.gen_biguint(bits);
	x.set_bit(bits - 1, true);
	x
}

const SMALL_PRIMES: [u32; 25] = [
	2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67,
	71, 73, 79, 83, 89, 97,
];

/// Miller-Rabin probabilistic primality test with `rounds` random bases,
/// preceded by trial division against small primes.
pub fn is_probable_prime<R: Rng + CryptoRng>(
	n: &BigUint,
	rounds: u32,
	rng: &mut R,
) -> bool {
	let two = BigUint::from(2u32);
	if *n < two {
		return false;
	}
	for sp in SMALL_PRIMES {
		let sp = BigUint::from(sp);
		if *n == sp {
			return true;
		}
		if (n % &sp).is_zero() {
			return false;
		}
	}

	// n - 1 = 2^s * d with d odd
	let n_minus_1 = n - 1u32;
	let mut d = n_minus_1.clone();
	let mut s = 0u64;
	while d.is_even() {
		d >>= 1;
		s += 1;
	}

	'witness: for _ in 0..rounds {
		// base in {2, ..., n - 2}
		let a = rng.gen_biguint_below(&(n - 3u32)) + &two;
		let mut x = a.modpow(&d, n);
		if x.is_one() || x == n_minus_1 {
			continue;
		}
		for _ in 0..s.saturating_sub(1) {
			x = x.modpow(&two, n);
			if x == n_minus_1 {
				continue 'witness;
			}
		}
		return false;
	}
	true
}
