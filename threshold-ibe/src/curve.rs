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

//! The supersingular curve `E: y^2 = x^3 + 1` over `F_p`, `p = 2 mod 3`, and
//! its quadratic twist arithmetic over `F_p^2`.
//!
//! Public entry points work on affine points; the inner loops of scalar
//! multiplication run in Jacobian projective coordinates and convert back
//! with a single inversion. The [`Curve`] descriptor carries everything that
//! can be derived from `(p, q)` once: the cofactor `(p+1)/q`, the cube-root
//! exponent `(2p-1)/3`, the Tate exponent `(p^2-1)/q`, and the Solinas
//! decomposition of `q` when one exists.

use core::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::{fp, fp2::Fp2, Error, Result};

// constants for the sliding-window algorithms
const WINDOW_SIZE: i64 = 5;
const WINDOW_POWER: usize = 15; // 2^(WINDOW_SIZE - 1) - 1

/// A point of `E(F_p^2)` in affine coordinates, or the point at infinity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Point {
	Infinity,
	Affine { x: Fp2, y: Fp2 },
}

impl Point {
	pub fn is_infinity(&self) -> bool {
		matches!(self, Point::Infinity)
	}

	/// True when both coordinates lie in the prime subfield (or the point
	/// is at infinity).
	pub fn is_base_field(&self) -> bool {
		match self {
			Point::Infinity => true,
			Point::Affine { x, y } => x.is_base_field() && y.is_base_field(),
		}
	}

	pub(crate) fn base_coords(&self) -> (&BigUint, &BigUint) {
		match self {
			Point::Affine { x, y } if x.is_base_field() && y.is_base_field() => {
				(&x.a, &y.a)
			},
			_ => panic!("expected a finite point over F_p"),
		}
	}
}

impl fmt::Display for Point {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Point::Infinity => write!(f, "O"),
			Point::Affine { x, y } => write!(f, "{x} {y}"),
		}
	}
}

/// Solinas decomposition `q = 2^|a| + sgn(b) * 2^|b| + sgn(a)`.
///
/// The signs of the two stored integers record the signs of the trailing
/// terms; `b = 0` means the middle term is absent (`q = 2^|a| + sgn(a)`),
/// the merged two-digit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solinas {
	pub a: i64,
	pub b: i64,
}

impl Solinas {
	/// Re-runs the NAF recurrence over `q` and keeps the result only when it
	/// has exactly three nonzero digits (or the merged two-digit form).
	pub fn decompose(q: &BigUint) -> Option<Solinas> {
		if q.is_even() || *q < BigUint::from(3u32) {
			return None;
		}
		let m = q.bits();
		let mut c0 = 0u8;
		let mut count = 0u32;
		let mut sol_a = 0i64;
		let mut sol_b = 0i64;
		for i in 0..=m {
			let c1 = (q.bit(i) as u8 + q.bit(i + 1) as u8 + c0) >> 1;
			let j = q.bit(i) as i64 + c0 as i64 - 2 * c1 as i64;
			if j != 0 {
				if count >= 3 {
					return None;
				}
				if i == 0 {
					sol_a = j;
				} else if count == 1 {
					sol_b = i as i64 * j;
				} else {
					sol_a *= i as i64;
				}
				count += 1;
			}
			c0 = c1;
		}
		if count == 2 {
			sol_a *= sol_b;
			sol_b = 0;
		}
		if count < 2 {
			return None;
		}
		Some(Solinas { a: sol_a, b: sol_b })
	}

	pub fn abs_a(&self) -> u64 {
		self.a.unsigned_abs()
	}

	pub fn abs_b(&self) -> u64 {
		self.b.unsigned_abs()
	}
}

/// Immutable curve descriptor; see the module docs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
	pub p: BigUint,
	pub q: BigUint,
	/// (p + 1) / q
	pub p1_on_q: BigUint,
	/// (2p - 1) / 3
	pub cbrt_exp: BigUint,
	/// (p^2 - 1) / q
	pub tate_exp: BigUint,
	pub solinas: Option<Solinas>,
}

impl Curve {
	/// Derives a descriptor from `(p, q)`.
	///
	/// Fails when the congruences the curve family relies on do not hold
	/// (`p = 3 mod 4`, `p = 2 mod 3`) or when `q` does not divide `p + 1`.
	pub fn new(p: BigUint, q: BigUint) -> Result<Curve> {
		if p < BigUint::from(5u32) || q < BigUint::from(2u32) {
			return Err(Error::Domain);
		}
		if &p % BigUint::from(4u32) != BigUint::from(3u32)
			|| &p % BigUint::from(3u32) != BigUint::from(2u32)
		{
			return Err(Error::Domain);
		}
		let p_plus_1 = &p + 1u32;
		if !(&p_plus_1 % &q).is_zero() {
			return Err(Error::Domain);
		}
		let p1_on_q = &p_plus_1 / &q;
		let cbrt_exp = ((&p << 1) - 1u32) / BigUint::from(3u32);
		let tate_exp = (&p - 1u32) * &p1_on_q;
		let solinas = Solinas::decompose(&q);
		Ok(Curve { p, q, p1_on_q, cbrt_exp, tate_exp, solinas })
	}

	/// The group law, with the degenerate cases handled explicitly.
	pub fn add(&self, lhs: &Point, rhs: &Point) -> Point {
		let p = &self.p;
		let (px, py) = match lhs {
			Point::Infinity => return rhs.clone(),
			Point::Affine { x, y } => (x, y),
		};
		let (qx, qy) = match rhs {
			Point::Infinity => return lhs.clone(),
			Point::Affine { x, y } => (x, y),
		};

		if px == qx {
			if *py == qy.neg(p) {
				return Point::Infinity;
			}
			// tangent: lambda = 3x^2 / 2y
			let mut lambda = px.add(px, p);
			lambda = lambda.add(px, p);
			lambda = lambda.mul(px, p);
			lambda = lambda.div(&py.add(py, p), p);

			let rx = lambda.square(p).sub(&px.add(px, p), p);
			let ry = px.sub(&rx, p).mul(&lambda, p).sub(py, p);
			Point::Affine { x: rx, y: ry }
		} else {
			// chord: lambda = (Qy - Py) / (Qx - Px)
			let lambda = qy.sub(py, p).div(&qx.sub(px, p), p);

			let rx = lambda.square(p).sub(px, p).sub(qx, p);
			let ry = px.sub(&rx, p).mul(&lambda, p).sub(py, p);
			Point::Affine { x: rx, y: ry }
		}
	}

	/// Checks `y^2 = x^3 + 1` over `F_p^2`.
	pub fn is_on_curve(&self, point: &Point) -> bool {
		let p = &self.p;
		match point {
			Point::Infinity => true,
			Point::Affine { x, y } => {
				let x3 = x.square(p).mul(x, p);
				let rhs = x3.add(&Fp2::one(), p);
				y.square(p) == rhs
			},
		}
	}

	/// Checks the point is finite, lies over `F_p`, and satisfies the curve
	/// equation.
	pub fn is_base_point(&self, point: &Point) -> bool {
		match point {
			Point::Infinity => false,
			_ => point.is_base_field() && self.is_on_curve(point),
		}
	}

	/// The x-coordinate with a given y: the unique cube root of `y^2 - 1`
	/// (cubing is a bijection on `F_p` when `p = 2 mod 3`).
	pub fn x_from_y(&self, y: &BigUint) -> BigUint {
		let yy = (y * y) % &self.p;
		let t = fp::sub(&yy, &BigUint::one(), &self.p);
		t.modpow(&self.cbrt_exp, &self.p)
	}

	/// A random point of `E(F_p)`, of unknown order.
	pub fn random_point<R: rand::Rng + rand::CryptoRng>(
		&self,
		rng: &mut R,
	) -> Point {
		let y = fp::random_below(rng, &self.p);
		let x = self.x_from_y(&y);
		Point::Affine { x: Fp2::from_base(x), y: Fp2::from_base(y) }
	}

	/// A random point of exact order `q`, by clearing the cofactor and
	/// retrying on the (cryptographically negligible) infinity outcome.
	pub fn random_order_q_point<R: rand::Rng + rand::CryptoRng>(
		&self,
		rng: &mut R,
	) -> Point {
		loop {
			let point = self.make_order_q(&self.random_point(rng));
			if !point.is_infinity() {
				return point;
			}
		}
	}

	/// Multiplies by the cofactor `(p+1)/q`, mapping any curve point into
	/// the `q`-torsion.
	///
	/// The input has unknown order, so this runs the affine ladder, which
	/// tolerates intermediate infinities and low-order points; the windowed
	/// projective path assumes an order-`q` input.
	pub fn make_order_q(&self, point: &Point) -> Point {
		self.window_mul_affine(&self.p1_on_q, point)
	}

	/// `a * point` for any point of `E(F_p^2)` and any scalar, reduced
	/// modulo `q` first.
	pub fn general_mul(&self, a: &BigUint, point: &Point) -> Point {
		if point.is_infinity() {
			return Point::Infinity;
		}
		let n = a % &self.q;
		if n.is_zero() {
			return Point::Infinity;
		}
		debug_assert!(self.is_on_curve(point));
		self.window_mul_affine(&n, point)
	}

	/// Sliding-window ladder built on the total group law; handles any
	/// operand the faster projective paths cannot.
	fn window_mul_affine(&self, n: &BigUint, point: &Point) -> Point {
		if n.is_zero() || point.is_infinity() {
			return Point::Infinity;
		}

		// g[k] = (2k + 1) * point
		let double = self.add(point, point);
		let mut g = Vec::with_capacity(WINDOW_POWER + 1);
		g.push(point.clone());
		for k in 1..=WINDOW_POWER {
			let next = self.add(&g[k - 1], &double);
			g.push(next);
		}

		let mut res = Point::Infinity;
		let mut m = n.bits() as i64 - 1;
		while m >= 0 {
			if !n.bit(m as u64) {
				res = self.add(&res, &res);
				m -= 1;
			} else {
				let mut l = if m >= WINDOW_SIZE - 1 {
					(m - (WINDOW_SIZE - 1)) as u64
				} else {
					0
				};
				while !n.bit(l) {
					l += 1;
				}
				let mut j = 1usize;
				res = self.add(&res, &res);
				for k in (l..m as u64).rev() {
					j <<= 1;
					if n.bit(k) {
						j += 1;
					}
					res = self.add(&res, &res);
				}
				res = self.add(&res, &g[(j - 1) / 2]);
				m = l as i64 - 1;
			}
		}
		res
	}

	/// `n * point` for a finite point over `F_p` of order `q` and
	/// `0 < n`: signed windowed NAF over Jacobian coordinates, one
	/// inversion at the end.
	pub fn mul(&self, n: &BigUint, point: &Point) -> Point {
		let p = &self.p;
		assert!(!n.is_zero(), "scalar must be positive");
		let (px, py) = point.base_coords();

		let s = naf(n);

		// odd multiples: tbl[k] = (2k + 1) * point
		let dbl = zzp_double(px, py, p);
		let mut tbl: Vec<(BigUint, BigUint)> = Vec::with_capacity(WINDOW_POWER + 1);
		tbl.push((px.clone(), py.clone()));
		for k in 1..=WINDOW_POWER {
			let next = zzp_add(&tbl[k - 1].0, &tbl[k - 1].1, &dbl.0, &dbl.1, p);
			tbl.push(next);
		}

		// the top slot may be unused after NAF conversion
		let mut m = s.len() as i64 - 1;
		if s[m as usize] == 0 {
			m -= 1;
		}

		// first window seeds the accumulator straight from the table
		let mut l = if m >= WINDOW_SIZE - 1 { m - (WINDOW_SIZE - 1) } else { 0 };
		while l < m && s[l as usize] == 0 {
			l += 1;
		}
		let mut j = s[l as usize] as i64;
		let mut i = 1i64;
		for k in (l + 1)..=m {
			i <<= 1;
			j += s[k as usize] as i64 * i;
		}
		let (tx, ty) = &tbl[(j.unsigned_abs() as usize - 1) / 2];
		let mut rx = tx.clone();
		let mut ry = if j < 0 { fp::neg(ty, p) } else { ty.clone() };
		let mut rz = BigUint::one();
		m = l - 1;

		while m >= 0 {
			if s[m as usize] == 0 {
				proj_double(&mut rx, &mut ry, &mut rz, p);
				m -= 1;
			} else {
				let mut l =
					if m >= WINDOW_SIZE - 1 { m - (WINDOW_SIZE - 1) } else { 0 };
				while l < m && s[l as usize] == 0 {
					l += 1;
				}
				let mut j = s[l as usize] as i64;
				proj_double(&mut rx, &mut ry, &mut rz, p);
				let mut i = 1i64;
				for k in (l + 1)..=m {
					i <<= 1;
					j += s[k as usize] as i64 * i;
					proj_double(&mut rx, &mut ry, &mut rz, p);
				}
				let (tx, ty) = &tbl[(j.unsigned_abs() as usize - 1) / 2];
				if j < 0 {
					proj_mix_in(&mut rx, &mut ry, &mut rz, tx, &fp::neg(ty, p), p);
				} else {
					proj_mix_in(&mut rx, &mut ry, &mut rz, tx, ty, p);
				}
				m = l - 1;
			}
		}

		jacobian_to_affine(rx, ry, &rz, p)
	}

	/// Precomputes the doubling chain `2^i * point` for a fixed base over
	/// `F_p`.
	pub fn mul_preprocess(&self, point: &Point) -> FixedBaseTable {
		let p = &self.p;
		let (px, py) = point.base_coords();
		let m = self.q.bits() as usize;

		let mut xs = Vec::with_capacity(m + 1);
		let mut ys = Vec::with_capacity(m + 1);
		xs.push(px.clone());
		ys.push(py.clone());
		for i in 1..=m {
			let (x, y) = zzp_double(&xs[i - 1], &ys[i - 1], p);
			xs.push(x);
			ys.push(y);
		}
		FixedBaseTable { xs, ys }
	}

	/// `n * point` against a precomputed doubling chain: NAF with mixed
	/// additions only, no per-call doubling. Requires `0 < n < q`.
	pub fn mul_fixed(&self, n: &BigUint, table: &FixedBaseTable) -> Point {
		let p = &self.p;
		assert!(!n.is_zero(), "scalar must be positive");
		assert!(*n < self.q, "scalar must be below the subgroup order");

		let s = naf(n);
		let mut m = s.len() - 1;
		if s[m] == 0 {
			m -= 1;
		}

		let mut rx = table.xs[m].clone();
		let mut ry = table.ys[m].clone();
		let mut rz = BigUint::one();

		for k in (0..m).rev() {
			if s[k] < 0 {
				let ny = fp::neg(&table.ys[k], p);
				proj_mix_in(&mut rx, &mut ry, &mut rz, &table.xs[k], &ny, p);
			} else if s[k] > 0 {
				proj_mix_in(&mut rx, &mut ry, &mut rz, &table.xs[k], &table.ys[k], p);
			}
		}

		jacobian_to_affine(rx, ry, &rz, p)
	}
}

/// Preprocessed fixed-base multiplication data: the chain `2^i * P`.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBaseTable {
	pub(crate) xs: Vec<BigUint>,
	pub(crate) ys: Vec<BigUint>,
}

/// Non-adjacent form of `n`, one digit longer than its bit length; derived
/// with the carry recurrence `c' = (b_i + b_{i+1} + c) >> 1`.
pub(crate) fn naf(n: &BigUint) -> Vec<i8> {
	let m = n.bits();
	let mut s = vec![0i8; m as usize + 1];
	let mut c0 = 0u8;
	for j in 0..=m {
		let c1 = (n.bit(j) as u8 + n.bit(j + 1) as u8 + c0) >> 1;
		s[j as usize] = n.bit(j) as i8 + c0 as i8 - 2 * c1 as i8;
		c0 = c1;
	}
	s
}

/// Affine doubling over `F_p`; the operand must not be of order 1 or 2.
fn zzp_double(
	px: &BigUint,
	py: &BigUint,
	p: &BigUint,
) -> (BigUint, BigUint) {
	let mut lambda = fp::add(px, px, p);
	lambda = fp::add(&lambda, px, p);
	lambda = fp::mul(&lambda, px, p);
	let denom = fp::inv(&fp::add(py, py, p), p)
		.expect("doubled a point of order two: input not of order q");
	lambda = fp::mul(&lambda, &denom, p);

	let mut x = fp::mul(&lambda, &lambda, p);
	x = fp::sub(&x, px, p);
	x = fp::sub(&x, px, p);

	let mut y = fp::sub(px, &x, p);
	y = fp::mul(&y, &lambda, p);
	y = fp::sub(&y, py, p);
	(x, y)
}

/// Affine addition over `F_p`; operands must be distinct with a finite sum.
fn zzp_add(
	px: &BigUint,
	py: &BigUint,
	qx: &BigUint,
	qy: &BigUint,
	p: &BigUint,
) -> (BigUint, BigUint) {
	let num = fp::sub(qy, py, p);
	let denom = fp::inv(&fp::sub(qx, px, p), p)
		.expect("added coincident points: input not of order q");
	let lambda = fp::mul(&num, &denom, p);

	let mut x = fp::mul(&lambda, &lambda, p);
	x = fp::sub(&x, px, p);
	x = fp::sub(&x, qx, p);

	let mut y = fp::sub(px, &x, p);
	y = fp::mul(&y, &lambda, p);
	y = fp::sub(&y, py, p);
	(x, y)
}

fn jacobian_to_affine(
	rx: BigUint,
	ry: BigUint,
	rz: &BigUint,
	p: &BigUint,
) -> Point {
	let zi = fp::inv(rz, p)
		.expect("projective Z vanished: input not of order q");
	let zi2 = fp::mul(&zi, &zi, p);
	let x = fp::mul(&rx, &zi2, p);
	let y = fp::mul(&ry, &fp::mul(&zi2, &zi, p), p);
	Point::Affine { x: Fp2::from_base(x), y: Fp2::from_base(y) }
}

/// Jacobian doubling `(x, y, z) *= 2` with `a = 0`; see Blake, Seroussi &
/// Smart, fig. IV.2. The operand must not be O or of order two.
pub(crate) fn proj_double(
	x: &mut BigUint,
	y: &mut BigUint,
	z: &mut BigUint,
	p: &BigUint,
) {
	// t1 = 3x^2
	let xx = (&*x * &*x) % p;
	let t1 = (&xx * 3u32) % p;

	// z' = 2yz
	*z = ((&*y * &*z) << 1) % p;

	// t2 = 4xy^2, t5 holds y^2
	let t5 = (&*y * &*y) % p;
	let t2 = ((&*x * &t5) << 2) % p;

	// x' = t1^2 - 2t2
	let t3 = (&t1 * &t1) % p;
	let t4 = fp::add(&t2, &t2, p);
	*x = fp::sub(&t3, &t4, p);

	// t3 = 8y^4
	let t3 = ((&t5 * &t5) << 3) % p;

	// y' = t1(t2 - x') - t3
	let t4 = fp::sub(&t2, x, p);
	*y = fp::sub(&((&t1 * &t4) % p), &t3, p);
}

/// Jacobian mixed addition `(x, y, z) += (a, b, 1)`; see Blake, Seroussi &
/// Smart, fig. IV.1. Operands must be distinct, finite, with a finite sum.
pub(crate) fn proj_mix_in(
	x: &mut BigUint,
	y: &mut BigUint,
	z: &mut BigUint,
	a: &BigUint,
	b: &BigUint,
	p: &BigUint,
) {
	// lambda_2 = x_2 z_1^2
	let z2 = (&*z * &*z) % p;
	let t2 = (&z2 * a) % p;

	// lambda_3 = lambda_1 - lambda_2
	let t3 = fp::sub(x, &t2, p);

	// lambda_5 = y_2 z_1^3
	let t5 = ((&z2 * &*z) % p * b) % p;

	// lambda_6 = lambda_4 - lambda_5
	let t6 = fp::sub(y, &t5, p);

	// lambda_7 = lambda_1 + lambda_2
	let t7 = fp::add(x, &t2, p);

	// lambda_8 = lambda_4 + lambda_5
	let t8 = fp::add(y, &t5, p);

	// z_3 = z_1 lambda_3
	*z = (&*z * &t3) % p;

	// x_3 = lambda_6^2 - lambda_7 lambda_3^2
	let t3sq = (&t3 * &t3) % p;
	*x = fp::sub(&((&t6 * &t6) % p), &((&t3sq * &t7) % p), p);

	// lambda_9 = lambda_7 lambda_3^2 - 2 x_3
	let t9 = fp::sub(&((&t7 * &t3sq) % p), &fp::add(x, x, p), p);

	// y_3 = (lambda_9 lambda_6 - lambda_8 lambda_3^3) / 2
	let t8c = ((&t8 * &t3sq) % p * &t3) % p;
	let yt = fp::sub(&((&t9 * &t6) % p), &t8c, p);
	*y = fp::halve(&yt, p);
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ibe;
	use rand::SeedableRng;
	use rand_chacha::ChaCha20Rng;

	fn test_rng() -> ChaCha20Rng {
		ChaCha20Rng::seed_from_u64(7)
	}

	/// p = 59, q = 5: 5 divides p + 1 = 60 and 59 = 11 mod 12.
	fn tiny_curve() -> Curve {
		Curve::new(BigUint::from(59u32), BigUint::from(5u32)).unwrap()
	}

	fn tiny_points(curve: &Curve) -> Vec<Point> {
		// every y gives a point; keep the ones of exact order q
		let mut found = Vec::new();
		for y in 0u32..59 {
			let y = BigUint::from(y);
			let x = curve.x_from_y(&y);
			let point = Point::Affine {
				x: Fp2::from_base(x),
				y: Fp2::from_base(y),
			};
			assert!(curve.is_on_curve(&point));
			let point = curve.make_order_q(&point);
			if !point.is_infinity() {
				found.push(point);
			}
		}
		found.dedup();
		assert!(!found.is_empty());
		found
	}

	#[test]
	fn descriptor_derives_the_exponents() {
		let curve = tiny_curve();
		assert_eq!(curve.p1_on_q, BigUint::from(12u32));
		assert_eq!(curve.cbrt_exp, BigUint::from(39u32));
		assert_eq!(curve.tate_exp, BigUint::from(58u32 * 12));
		// q = 5 = 2^2 + 1, the merged two-digit form
		assert_eq!(curve.solinas, Some(Solinas { a: 2, b: 0 }));
	}

	#[test]
	fn descriptor_rejects_wrong_congruences() {
		// p = 13 = 1 mod 3
		assert_eq!(
			Curve::new(BigUint::from(13u32), BigUint::from(7u32)).unwrap_err(),
			Error::Domain
		);
		// q does not divide p + 1
		assert_eq!(
			Curve::new(BigUint::from(59u32), BigUint::from(7u32)).unwrap_err(),
			Error::Domain
		);
	}

	#[test]
	fn solinas_decomposition_matches_q() {
		let recompose = |s: &Solinas| -> BigUint {
			let mut v = num_bigint::BigInt::from(1u32) << s.abs_a();
			if s.b != 0 {
				let mid = num_bigint::BigInt::from(1u32) << s.abs_b();
				if s.b < 0 {
					v -= mid;
				} else {
					v += mid;
				}
			}
			if s.a < 0 {
				v -= 1;
			} else {
				v += 1;
			}
			v.to_biguint().unwrap()
		};

		for q in [5u64, 7, 17, 23, 31, 257, (1 << 41) - (1 << 9) + 1] {
			let q = BigUint::from(q);
			let sol = Solinas::decompose(&q).expect("solinas form");
			assert_eq!(recompose(&sol), q);
		}
		assert_eq!(Solinas::decompose(&BigUint::from(5u32)),
			Some(Solinas { a: 2, b: 0 }));
		assert_eq!(Solinas::decompose(&BigUint::from(7u32)),
			Some(Solinas { a: -3, b: 0 }));
		// 43 = 101011b needs four NAF digits
		assert_eq!(Solinas::decompose(&BigUint::from(43u32)), None);
		assert_eq!(Solinas::decompose(&BigUint::from(42u32)), None);
	}

	#[test]
	fn group_law_degenerate_cases() {
		let curve = tiny_curve();
		let points = tiny_points(&curve);
		let point = &points[0];
		let minus = match point {
			Point::Affine { x, y } => Point::Affine {
				x: x.clone(),
				y: y.neg(&curve.p),
			},
			Point::Infinity => unreachable!(),
		};

		assert_eq!(curve.add(&Point::Infinity, point), *point);
		assert_eq!(curve.add(point, &Point::Infinity), *point);
		assert_eq!(curve.add(point, &minus), Point::Infinity);
		assert!(curve.is_on_curve(&curve.add(point, point)));
	}

	#[test]
	fn group_law_is_associative() {
		let curve = tiny_curve();
		let points = tiny_points(&curve);
		for a in points.iter().take(4) {
			for b in points.iter().take(4) {
				for c in points.iter().take(4) {
					let lhs = curve.add(&curve.add(a, b), c);
					let rhs = curve.add(a, &curve.add(b, c));
					assert_eq!(lhs, rhs);
				}
			}
		}
	}

	#[test]
	fn general_mul_matches_iterated_addition() {
		let curve = tiny_curve();
		let points = tiny_points(&curve);
		for point in points.iter().take(3) {
			let mut acc = Point::Infinity;
			for n in 0u32..12 {
				assert_eq!(curve.general_mul(&BigUint::from(n), point), acc);
				acc = curve.add(&acc, point);
			}
		}
	}

	#[test]
	fn q_torsion_points_have_order_q() {
		let curve = tiny_curve();
		for point in tiny_points(&curve) {
			assert!(curve.general_mul(&curve.q, &point).is_infinity());
		}
	}

	#[test]
	fn windowed_mul_agrees_with_affine_ladder() {
		let mut rng = test_rng();
		let (params, _master) = ibe::setup(160, 80, "curve-test", &mut rng).unwrap();
		let curve = &params.curve;
		let point = curve.random_order_q_point(&mut rng);

		for _ in 0..8 {
			let n = crate::fp::random_below(&mut rng, &curve.q);
			if n.is_zero() {
				continue;
			}
			let fast = curve.mul(&n, &point);
			let slow = curve.general_mul(&n, &point);
			assert_eq!(fast, slow);
			assert!(curve.is_base_point(&fast));
		}
	}

	#[test]
	fn windowed_mul_matches_iterated_addition_for_small_scalars() {
		let mut rng = test_rng();
		let (params, _master) = ibe::setup(160, 80, "curve-test", &mut rng).unwrap();
		let curve = &params.curve;
		let point = curve.random_order_q_point(&mut rng);

		let mut acc = point.clone();
		for n in 1u32..24 {
			assert_eq!(curve.mul(&BigUint::from(n), &point), acc);
			acc = curve.add(&acc, &point);
		}
	}

	#[test]
	fn fixed_base_table_agrees_with_direct_mul() {
		let mut rng = test_rng();
		let (params, _master) = ibe::setup(160, 80, "curve-test", &mut rng).unwrap();
		let curve = &params.curve;
		let point = curve.random_order_q_point(&mut rng);
		let table = curve.mul_preprocess(&point);

		for _ in 0..8 {
			let n = crate::fp::random_below(&mut rng, &curve.q);
			if n.is_zero() {
				continue;
			}
			assert_eq!(curve.mul_fixed(&n, &table), curve.mul(&n, &point));
		}
	}

	#[test]
	fn naf_digits_recompose_and_are_nonadjacent() {
		let mut rng = test_rng();
		for _ in 0..32 {
			let n = crate::fp::random_bits(&mut rng, 64);
			let s = naf(&n);
			let mut acc = num_bigint::BigInt::from(0u32);
			for (i, d) in s.iter().enumerate() {
				acc += num_bigint::BigInt::from(*d) << i;
			}
			assert_eq!(acc.to_biguint().unwrap(), n);
			for w in s.windows(2) {
				assert!(w[0] == 0 || w[1] == 0);
			}
		}
	}
}
