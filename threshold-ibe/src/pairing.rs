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

//! The Tate pairing `e(P, Q)` via Miller's algorithm, with a shortened loop
//! for Solinas-form subgroup orders and a precomputation cache for a fixed
//! first argument.
//!
//! `P` must be a finite point of `E(F_p)[q]`; `Q` must lie in
//! `E(F_p^2) \ E(F_p)`, in practice the image of a base-field point under
//! the distortion map `(x, y) -> (zeta * x, y)`. Because `P` is rational and
//! `Q` is not, no evaluation in the loop can vanish, so the division at the
//! end of the loop and the final exponentiation are always defined.
//!
//! When `q = 2^a + s_b*2^b + s_a`, the loop computes the doubling chain to
//! `2^b`, extends it to `2^a`, and patches the result with the line through
//! `2^a*P` and `s_b*2^b*P` plus a vertical at their sum (which is `-s_a*P`
//! in the q-torsion). The generic double-and-add loop is kept for subgroup
//! orders with no Solinas form.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::{
	curve::{proj_double, Curve, Point},
	fp,
	fp2::Fp2,
};

/// Line coefficients extracted from a fixed first argument `P`, indexed by
/// the doubling chain of the Solinas loop, plus the three correction
/// entries. Numerators evaluate as `a*x_Q + y_Q + c`, verticals as
/// `x_Q + c`.
#[derive(Debug, Clone, PartialEq)]
pub struct MillerCache {
	num_a: Vec<BigUint>,
	num_c: Vec<BigUint>,
	denom_c: Vec<BigUint>,
	denom_sb: BigUint,
	denom_s1: BigUint,
	num_l1a: BigUint,
	num_l1c: BigUint,
	denom_l1c: BigUint,
	num_l2c: BigUint,
}

/// A first pairing argument prepared for repeated use: a Miller cache when
/// the subgroup order is Solinas, the bare point otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedKey {
	Cached(MillerCache),
	Plain(Point),
}

impl PreparedKey {
	pub fn prepare(curve: &Curve, point: &Point) -> PreparedKey {
		if curve.solinas.is_some() {
			PreparedKey::Cached(tate_preprocess(curve, point))
		} else {
			PreparedKey::Plain(point.clone())
		}
	}

	/// `e(P, Q)` for the prepared `P`.
	pub fn pairing(&self, curve: &Curve, q_point: &Point) -> Fp2 {
		match self {
			PreparedKey::Cached(cache) => tate_postprocess(curve, cache, q_point),
			PreparedKey::Plain(point) => tate_pairing(curve, point, q_point),
		}
	}
}

/// `res = e(P, Q)`, an element of order dividing `q` in `F_p^2`.
pub fn tate_pairing(curve: &Curve, point: &Point, q_point: &Point) -> Fp2 {
	debug_assert!(curve.is_base_point(point));
	debug_assert!(!q_point.is_infinity() && !q_point.is_base_field());
	let raw = match curve.solinas {
		Some(_) => miller_solinas(curve, point, q_point),
		None => miller_generic(curve, point, q_point),
	};
	tate_power(curve, &raw)
}

/// The final exponentiation to `(p^2 - 1)/q`: raise to `(p + 1)/q`, then
/// divide the conjugate by the result (conjugation is the Frobenius, so
/// this supplies the remaining factor `p - 1`).
pub(crate) fn tate_power(curve: &Curve, res: &Fp2) -> Fp2 {
	let t = res.pow(&curve.p1_on_q, &curve.p);
	t.conjugate(&curve.p).div(&t, &curve.p)
}

// ---- affine line evaluation at Q -------------------------------------------

/// v *= (x_Q - x_P); the vertical through `at`. No-op at infinity.
fn eval_vertical(v: &mut Fp2, qx: &Fp2, at: &Point, p: &BigUint) {
	if let Point::Affine { x, .. } = at {
		let t = qx.sub(x, p);
		*v = v.mul(&t, p);
	}
}

/// v *= the tangent line at `at`, evaluated at Q. No-op at infinity; falls
/// back to the vertical for points of order two.
fn eval_tangent(v: &mut Fp2, qx: &Fp2, qy: &Fp2, at: &Point, p: &BigUint) {
	let (x, y) = match at {
		Point::Infinity => return,
		Point::Affine { x, y } => (x, y),
	};
	if y.is_zero() {
		eval_vertical(v, qx, at, p);
		return;
	}

	// a = -3x^2, b = 2y, c = -(b*y + a*x); the slope denominator is folded
	// into the coefficients to avoid a division
	let mut a = x.add(x, p);
	a = a.add(x, p);
	a = a.mul(x, p);
	a = a.neg(p);

	let b = y.add(y, p);

	let mut c = b.mul(y, p);
	c = c.add(&a.mul(x, p), p);
	c = c.neg(p);

	let mut t = a.mul(qx, p);
	t = t.add(&b.mul(qy, p), p);
	t = t.add(&c, p);
	*v = v.mul(&t, p);
}

/// v *= the line through `p1` and `p2`, evaluated at Q, with every
/// degenerate pair handled.
fn eval_line(
	v: &mut Fp2,
	qx: &Fp2,
	qy: &Fp2,
	p1: &Point,
	p2: &Point,
	p: &BigUint,
) {
	let (x1, y1) = match p1 {
		Point::Infinity => return eval_vertical(v, qx, p2, p),
		Point::Affine { x, y } => (x, y),
	};
	let (x2, y2) = match p2 {
		Point::Infinity => return eval_vertical(v, qx, p1, p),
		Point::Affine { x, y } => (x, y),
	};

	if x1 == x2 {
		if *y1 == y2.neg(p) {
			return eval_vertical(v, qx, p1, p);
		}
		return eval_tangent(v, qx, qy, p1, p);
	}

	// a = -(y2 - y1), b = x2 - x1, c = -(b*y1 + a*x1); the chord slope
	// denominator is folded in as with the tangent
	let b = x2.sub(x1, p);
	let a = y1.sub(y2, p);
	let mut c = b.mul(y1, p);
	c = c.add(&a.mul(x1, p), p);
	c = c.neg(p);

	let mut t = a.mul(qx, p);
	t = t.add(&b.mul(qy, p), p);
	t = t.add(&c, p);
	*v = v.mul(&t, p);
}

// ---- projective line evaluation inside the Solinas loop --------------------

/// Tangent at the Jacobian point `(zx, zy, z)`, evaluated at Q. Powers of
/// `z` land in `F_p` and are killed by the final exponentiation, so the
/// coefficients are only cleared of denominators, never normalized.
fn pts_eval_tangent(
	v: &mut Fp2,
	qx: &Fp2,
	qy: &Fp2,
	zx: &BigUint,
	zy: &BigUint,
	z: &BigUint,
	p: &BigUint,
) {
	debug_assert!(!zy.is_zero());

	let xx = (zx * zx) % p;
	let t = (&xx * 3u32) % p;
	let z2 = (z * z) % p;
	let a = fp::neg(&fp::mul(&t, &z2, p), p);

	let z3 = fp::mul(&z2, z, p);
	let b = fp::mul(&fp::add(zy, zy, p), &z3, p);

	let two_y2 = ((zy * zy) << 1) % p;
	let c = fp::sub(&fp::mul(&t, zx, p), &two_y2, p);

	let mut f = qx.mul_scalar(&a, p);
	f = f.add(&qy.mul_scalar(&b, p), p);
	f.a = fp::add(&f.a, &c, p);
	*v = v.mul(&f, p);
}

/// Vertical at the Jacobian point `(zx, _, z)`, evaluated at Q.
fn pts_eval_vertical(
	v: &mut Fp2,
	qx: &Fp2,
	zx: &BigUint,
	z: &BigUint,
	p: &BigUint,
) {
	let z2 = (z * z) % p;
	let mut f = qx.mul_scalar(&z2, p);
	f.a = fp::sub(&f.a, zx, p);
	*v = v.mul(&f, p);
}

fn jacobian_normalize(
	zx: &mut BigUint,
	zy: &mut BigUint,
	z: &mut BigUint,
	p: &BigUint,
) {
	let zi = fp::inv(z, p)
		.expect("projective Z vanished inside the Miller loop");
	let zi2 = fp::mul(&zi, &zi, p);
	*zx = fp::mul(zx, &zi2, p);
	*zy = fp::mul(zy, &fp::mul(&zi2, &zi, p), p);
	*z = BigUint::one();
}

// ---- Miller loops ----------------------------------------------------------

/// Miller's algorithm specialized to `q = 2^a + s_b*2^b + s_a`.
fn miller_solinas(curve: &Curve, point: &Point, q_point: &Point) -> Fp2 {
	let p = &curve.p;
	let sol = curve.solinas.expect("caller checked the Solinas form");
	let a = sol.abs_a();
	let b = sol.abs_b();

	let (px, py) = point.base_coords();
	let (qx, qy) = match q_point {
		Point::Affine { x, y } => (x, y),
		Point::Infinity => panic!("cannot evaluate at O"),
	};

	let mut zx = px.clone();
	let mut zy = py.clone();
	let mut z = BigUint::one();

	let mut v = Fp2::one();
	let mut vdenom = Fp2::one();
	// (s_b 2^b P, f_{s_b 2^b} numerator and denominator)
	let mut b_part: Option<(Point, Fp2, Fp2)> = None;

	let mut i = 0u64;
	if b != 0 {
		// the chain to f_{2^b}
		while i < b {
			v = v.square(p);
			vdenom = vdenom.square(p);
			pts_eval_tangent(&mut v, qx, qy, &zx, &zy, &z, p);
			proj_double(&mut zx, &mut zy, &mut z, p);
			pts_eval_vertical(&mut vdenom, qx, &zx, &z, p);
			i += 1;
		}
		jacobian_normalize(&mut zx, &mut zy, &mut z, p);

		if sol.b < 0 {
			// f_{-2^b} = 1 / (f_{2^b} * vertical at 2^b P)
			let fb = vdenom.clone();
			let mut fbdenom = v.clone();
			let t = Fp2 {
				a: fp::sub(&qx.a, &zx, p),
				b: qx.b.clone(),
			};
			fbdenom = fbdenom.mul(&t, p);
			let b_point = Point::Affine {
				x: Fp2::from_base(zx.clone()),
				y: Fp2::from_base(fp::neg(&zy, p)),
			};
			b_part = Some((b_point, fb, fbdenom));
		} else {
			let b_point = Point::Affine {
				x: Fp2::from_base(zx.clone()),
				y: Fp2::from_base(zy.clone()),
			};
			b_part = Some((b_point, v.clone(), vdenom.clone()));
		}
	}

	// continue doubling to f_{2^a}
	while i < a {
		v = v.square(p);
		vdenom = vdenom.square(p);
		pts_eval_tangent(&mut v, qx, qy, &zx, &zy, &z, p);
		proj_double(&mut zx, &mut zy, &mut z, p);
		pts_eval_vertical(&mut vdenom, qx, &zx, &z, p);
		i += 1;
	}
	jacobian_normalize(&mut zx, &mut zy, &mut z, p);

	let mut z_point = Point::Affine {
		x: Fp2::from_base(zx),
		y: Fp2::from_base(zy),
	};

	// patch in f_{2^a +- 2^b +- 1}
	if let Some((b_point, fb, fbdenom)) = b_part {
		v = v.mul(&fb, p);
		vdenom = vdenom.mul(&fbdenom, p);
		eval_line(&mut v, qx, qy, &z_point, &b_point, p);
		z_point = curve.add(&z_point, &b_point);
		eval_vertical(&mut vdenom, qx, &z_point, p);
	}

	// the sign of `a` records whether the trailing term is +1 or -1
	if sol.a < 0 {
		eval_vertical(&mut vdenom, qx, point, p);
	}

	// Z is now -s_a * P, so the closing line is a vertical and the final
	// vertical (at O) is 1
	eval_vertical(&mut v, qx, &z_point, p);

	v.div(&vdenom, p)
}

/// Plain double-and-add Miller loop over the bits of `q`; the fallback for
/// subgroup orders with no Solinas form.
fn miller_generic(curve: &Curve, point: &Point, q_point: &Point) -> Fp2 {
	let p = &curve.p;
	let (qx, qy) = match q_point {
		Point::Affine { x, y } => (x, y),
		Point::Infinity => panic!("cannot evaluate at O"),
	};

	let mut v = Fp2::one();
	let mut vdenom = Fp2::one();
	let mut z_point = point.clone();

	for m in (0..=curve.q.bits() - 2).rev() {
		v = v.square(p);
		vdenom = vdenom.square(p);
		eval_tangent(&mut v, qx, qy, &z_point, p);
		z_point = curve.add(&z_point, &z_point);
		eval_vertical(&mut vdenom, qx, &z_point, p);
		if curve.q.bit(m) {
			eval_line(&mut v, qx, qy, &z_point, point, p);
			z_point = curve.add(&z_point, point);
			eval_vertical(&mut vdenom, qx, &z_point, p);
		}
	}

	v.div(&vdenom, p)
}

// ---- precomputation --------------------------------------------------------

/// Extracts the Miller cache for a fixed first argument `P`.
///
/// Each doubling step costs a couple of inversions here so that every later
/// [`tate_postprocess`] needs only two scalar multiplications of Q's
/// coordinates and a constant addition per step.
pub fn tate_preprocess(curve: &Curve, point: &Point) -> MillerCache {
	let p = &curve.p;
	let sol = curve
		.solinas
		.expect("preprocessing requires a Solinas subgroup order");
	let a = sol.abs_a();
	let b = sol.abs_b();

	let (px, py) = point.base_coords();
	let mut zx = px.clone();
	let mut zy = py.clone();
	let mut z = BigUint::one();

	let steps = a as usize;
	let mut num_a = vec![BigUint::zero(); steps];
	let mut num_c = vec![BigUint::zero(); steps];
	let mut denom_c = vec![BigUint::zero(); steps];
	let mut denom_sb = BigUint::zero();
	let mut denom_s1 = BigUint::zero();
	let mut num_l1a = BigUint::zero();
	let mut num_l1c = BigUint::zero();
	let mut denom_l1c = BigUint::zero();

	let mut b_point: Option<Point> = None;

	let mut i = 0u64;
	if b != 0 {
		while i < b {
			preprocess_tangent(&mut num_a, &mut num_c, i as usize, &zx, &zy, &z, p);
			proj_double(&mut zx, &mut zy, &mut z, p);
			preprocess_vertical(&mut denom_c, i as usize, &zx, &z, p);
			i += 1;
		}
		jacobian_normalize(&mut zx, &mut zy, &mut z, p);

		if sol.b < 0 {
			denom_sb = fp::neg(&zx, p);
			b_point = Some(Point::Affine {
				x: Fp2::from_base(zx.clone()),
				y: Fp2::from_base(fp::neg(&zy, p)),
			});
		} else {
			b_point = Some(Point::Affine {
				x: Fp2::from_base(zx.clone()),
				y: Fp2::from_base(zy.clone()),
			});
		}
	}

	while i < a {
		preprocess_tangent(&mut num_a, &mut num_c, i as usize, &zx, &zy, &z, p);
		proj_double(&mut zx, &mut zy, &mut z, p);
		preprocess_vertical(&mut denom_c, i as usize, &zx, &z, p);
		i += 1;
	}
	jacobian_normalize(&mut zx, &mut zy, &mut z, p);

	let mut z_point = Point::Affine {
		x: Fp2::from_base(zx.clone()),
		y: Fp2::from_base(zy.clone()),
	};

	if let Some(b_point) = &b_point {
		// coefficients of the line through 2^a P and s_b 2^b P
		let (bx, by) = b_point.base_coords();
		let cinv = fp::inv(&fp::sub(bx, &zx, p), p)
			.expect("line through coincident points in preprocessing");
		num_l1a = fp::mul(&fp::sub(&zy, by, p), &cinv, p);
		num_l1c = fp::neg(&fp::add(&fp::mul(&num_l1a, &zx, p), &zy, p), p);

		z_point = curve.add(&z_point, b_point);
		let (sx, _) = z_point.base_coords();
		denom_l1c = fp::neg(sx, p);
	}

	if sol.a < 0 {
		let (sx, _) = z_point.base_coords();
		denom_s1 = fp::neg(sx, p);
	}

	let (sx, _) = z_point.base_coords();
	let num_l2c = fp::neg(sx, p);

	MillerCache {
		num_a,
		num_c,
		denom_c,
		denom_sb,
		denom_s1,
		num_l1a,
		num_l1c,
		denom_l1c,
		num_l2c,
	}
}

/// Affine tangent coefficients recovered from the Jacobian point:
/// `a = -3x^2/(2yz)`, `c = -(y + a*x*z)/z^3`.
fn preprocess_tangent(
	num_a: &mut [BigUint],
	num_c: &mut [BigUint],
	i: usize,
	zx: &BigUint,
	zy: &BigUint,
	z: &BigUint,
	p: &BigUint,
) {
	debug_assert!(!zy.is_zero());

	let denom = fp::mul(&fp::add(zy, zy, p), z, p);
	let dinv = fp::inv(&denom, p)
		.expect("tangent at a point of order two in preprocessing");
	let xx = (zx * zx) % p;
	let t = (&xx * 3u32) % p;
	num_a[i] = fp::neg(&fp::mul(&t, &dinv, p), p);

	let z3 = fp::mul(&fp::mul(z, z, p), z, p);
	let z3inv = fp::inv(&z3, p)
		.expect("projective Z vanished in preprocessing");
	let mut c = fp::mul(&num_a[i], zx, p);
	c = fp::mul(&c, z, p);
	c = fp::add(&c, zy, p);
	c = fp::neg(&c, p);
	num_c[i] = fp::mul(&c, &z3inv, p);
}

/// Vertical constant `-x` recovered from the Jacobian point.
fn preprocess_vertical(
	denom_c: &mut [BigUint],
	i: usize,
	zx: &BigUint,
	z: &BigUint,
	p: &BigUint,
) {
	let z2inv = fp::inv(&fp::mul(z, z, p), p)
		.expect("projective Z vanished in preprocessing");
	denom_c[i] = fp::neg(&fp::mul(zx, &z2inv, p), p);
}

/// Replays the cached Solinas loop against a fresh second argument.
fn miller_from_cache(curve: &Curve, cache: &MillerCache, q_point: &Point) -> Fp2 {
	let p = &curve.p;
	let sol = curve.solinas.expect("cache exists only for Solinas orders");
	let a = sol.abs_a() as usize;
	let b = sol.abs_b() as usize;

	let (qx, qy) = match q_point {
		Point::Affine { x, y } => (x, y),
		Point::Infinity => panic!("cannot evaluate at O"),
	};

	let mut v = Fp2::one();
	let mut vdenom = Fp2::one();
	// f_{s_b 2^b} numerator and denominator
	let mut b_part: Option<(Fp2, Fp2)> = None;

	let apply_num = |v: &mut Fp2, ca: &BigUint, cc: &BigUint| {
		let mut f = qx.mul_scalar(ca, p);
		f = f.add(qy, p);
		f.a = fp::add(&f.a, cc, p);
		*v = v.mul(&f, p);
	};
	let apply_denom = |v: &mut Fp2, cc: &BigUint| {
		let mut f = qx.clone();
		f.a = fp::add(&f.a, cc, p);
		*v = v.mul(&f, p);
	};

	let mut i = 0usize;
	if b != 0 {
		while i < b {
			v = v.square(p);
			vdenom = vdenom.square(p);
			apply_num(&mut v, &cache.num_a[i], &cache.num_c[i]);
			apply_denom(&mut vdenom, &cache.denom_c[i]);
			i += 1;
		}

		if sol.b < 0 {
			let fb = vdenom.clone();
			let mut fbdenom = v.clone();
			apply_denom(&mut fbdenom, &cache.denom_sb);
			b_part = Some((fb, fbdenom));
		} else {
			b_part = Some((v.clone(), vdenom.clone()));
		}
	}

	while i < a {
		v = v.square(p);
		vdenom = vdenom.square(p);
		apply_num(&mut v, &cache.num_a[i], &cache.num_c[i]);
		apply_denom(&mut vdenom, &cache.denom_c[i]);
		i += 1;
	}

	if let Some((fb, fbdenom)) = b_part {
		v = v.mul(&fb, p);
		vdenom = vdenom.mul(&fbdenom, p);
		apply_num(&mut v, &cache.num_l1a, &cache.num_l1c);
		apply_denom(&mut vdenom, &cache.denom_l1c);
	}

	if sol.a < 0 {
		apply_denom(&mut vdenom, &cache.denom_s1);
	}

	apply_denom(&mut v, &cache.num_l2c);

	v.div(&vdenom, p)
}

/// `e(P, Q)` against the cache extracted from `P`.
pub fn tate_postprocess(curve: &Curve, cache: &MillerCache, q_point: &Point) -> Fp2 {
	let raw = miller_from_cache(curve, cache, q_point);
	tate_power(curve, &raw)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ibe;
	use num_bigint::RandBigInt;
	use rand::SeedableRng;
	use rand_chacha::ChaCha20Rng;

	fn test_rng() -> ChaCha20Rng {
		ChaCha20Rng::seed_from_u64(11)
	}

	fn tiny_curve() -> Curve {
		Curve::new(BigUint::from(59u32), BigUint::from(5u32)).unwrap()
	}

	/// Distinct q-torsion base-field points of the tiny curve.
	fn tiny_points(curve: &Curve) -> Vec<Point> {
		let mut found: Vec<Point> = Vec::new();
		for y in 0u32..59 {
			let y = BigUint::from(y);
			let x = curve.x_from_y(&y);
			let point = Point::Affine {
				x: Fp2::from_base(x),
				y: Fp2::from_base(y),
			};
			let point = curve.make_order_q(&point);
			if !point.is_infinity() && !found.contains(&point) {
				found.push(point);
			}
		}
		found
	}

	fn phi(curve: &Curve, point: &Point) -> Point {
		let zeta = Fp2::cbrt_unity(&curve.p);
		match point {
			Point::Infinity => Point::Infinity,
			Point::Affine { x, y } => Point::Affine {
				x: x.mul(&zeta, &curve.p),
				y: y.clone(),
			},
		}
	}

	#[test]
	fn tiny_pairing_is_bilinear_and_of_order_q() {
		let curve = tiny_curve();
		let points = tiny_points(&curve);
		assert!(points.len() >= 3);
		let (p1, p2) = (&points[0], &points[1]);
		let q_point = phi(&curve, &points[2]);

		let e1 = tate_pairing(&curve, p1, &q_point);
		let e2 = tate_pairing(&curve, p2, &q_point);
		let sum = curve.add(p1, p2);
		let e12 = if sum.is_infinity() {
			Fp2::one()
		} else {
			tate_pairing(&curve, &sum, &q_point)
		};
		assert_eq!(e12, e1.mul(&e2, &curve.p));

		assert_eq!(e1.pow(&curve.q, &curve.p), Fp2::one());
		assert_eq!(e2.pow(&curve.q, &curve.p), Fp2::one());
	}

	#[test]
	fn tiny_pairing_is_nondegenerate() {
		let curve = tiny_curve();
		let points = tiny_points(&curve);
		let point = &points[0];
		let e = tate_pairing(&curve, point, &phi(&curve, point));
		assert_ne!(e, Fp2::one());
	}

	#[test]
	fn cached_pairing_matches_direct() {
		let curve = tiny_curve();
		let points = tiny_points(&curve);
		for point in points.iter().take(3) {
			let cache = tate_preprocess(&curve, point);
			for other in points.iter().take(3) {
				let q_point = phi(&curve, other);
				assert_eq!(
					tate_postprocess(&curve, &cache, &q_point),
					tate_pairing(&curve, point, &q_point),
				);
			}
		}
	}

	#[test]
	fn solinas_loop_matches_generic_loop() {
		let curve = tiny_curve();
		let points = tiny_points(&curve);
		for point in points.iter().take(3) {
			for other in points.iter().take(3) {
				let q_point = phi(&curve, other);
				let fast = miller_solinas(&curve, point, &q_point);
				let slow = miller_generic(&curve, point, &q_point);
				assert_eq!(
					tate_power(&curve, &fast),
					tate_power(&curve, &slow),
				);
			}
		}
	}

	#[test]
	fn tate_power_matches_direct_exponentiation() {
		let curve = tiny_curve();
		let mut rng = test_rng();
		for _ in 0..16 {
			let x = Fp2 {
				a: rng.gen_biguint_below(&curve.p),
				b: rng.gen_biguint_below(&curve.p),
			};
			if x.is_zero() {
				continue;
			}
			assert_eq!(
				tate_power(&curve, &x),
				x.pow(&curve.tate_exp, &curve.p),
			);
		}
	}

	#[test]
	fn pairing_is_bilinear_on_generated_parameters() {
		let mut rng = test_rng();
		let (params, _master) =
			ibe::setup(192, 96, "pairing-test", &mut rng).unwrap();
		let curve = &params.curve;

		let base = curve.random_order_q_point(&mut rng);
		let other = curve.random_order_q_point(&mut rng);
		let q_point = phi(curve, &other);

		let e = tate_pairing(curve, &base, &q_point);
		assert_eq!(e.pow(&curve.q, &curve.p), Fp2::one());

		let a = crate::fp::random_below(&mut rng, &curve.q);
		let b = crate::fp::random_below(&mut rng, &curve.q);
		if a.is_zero() || b.is_zero() {
			return;
		}
		let lhs = tate_pairing(
			curve,
			&curve.mul(&a, &base),
			&phi(curve, &curve.mul(&b, &other)),
		);
		let ab = (&a * &b) % &curve.q;
		assert_eq!(lhs, e.pow(&ab, &curve.p));

		// the cache agrees off the tiny curve too
		let cache = tate_preprocess(curve, &base);
		assert_eq!(tate_postprocess(curve, &cache, &q_point), e);
		let generic = tate_power(curve, &miller_generic(curve, &base, &q_point));
		assert_eq!(generic, e);
	}
}
