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

//! Shamir threshold splitting of the master scalar, and Lagrange
//! reconstruction of the scalar itself and of derived keys in the
//! exponent, so that the master never has to exist in one place after
//! setup.
//!
//! Shares carry their index because reconstruction needs the matching
//! public evaluation points `x_i` from the parameter bundle. Reconstructing
//! in the group also serves certificates: a full certificate combines from
//! certificate shares exactly like a private key from key shares.

use num_bigint::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

use crate::{
	bytes,
	curve::{Curve, Point},
	fp, hash,
	ibe::{MasterKey, Params},
	Error, Result,
};

/// One server's share `(i, f(x_i))` of the master scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterShare {
	pub index: u32,
	pub value: BigUint,
}

impl MasterShare {
	pub fn to_bytes(&self) -> Vec<u8> {
		bytes::join(&bytes::u32_to_bytes(self.index), &self.value.to_bytes_be())
	}

	pub fn from_bytes(data: &[u8], curve: &Curve) -> Result<MasterShare> {
		let (index, value) = bytes::split(data)?;
		let index = bytes::u32_from_bytes(&index)?;
		let value = BigUint::from_bytes_be(&value);
		if value.is_zero() || value >= curve.q {
			return Err(Error::Domain);
		}
		Ok(MasterShare { index, value })
	}
}

/// One server's share `(i, y_i * Q_id)` of a derived private key (or of a
/// certificate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyShare {
	pub index: u32,
	pub point: Point,
}

impl KeyShare {
	pub fn to_bytes(&self) -> Vec<u8> {
		bytes::join(
			&bytes::u32_to_bytes(self.index),
			&bytes::point_to_bytes(&self.point),
		)
	}

	pub fn from_bytes(data: &[u8], curve: &Curve) -> Result<KeyShare> {
		let (index, point) = bytes::split(data)?;
		let index = bytes::u32_from_bytes(&index)?;
		let point = bytes::point_from_bytes(&point, curve)?;
		if !curve.is_base_point(&point) {
			return Err(Error::Domain);
		}
		Ok(KeyShare { index, point })
	}
}

/// Splits the master into `n` shares, any `t` of which reconstruct it.
///
/// A random degree `t-1` polynomial over `F_q` with `f(0) = master` is
/// evaluated by Horner's rule at `n` distinct nonzero random points. The
/// evaluation points land in the parameter bundle as `robust_x`, together
/// with the verification points `P_i = f(x_i) * P_pub`; discard the master
/// once the shares are distributed.
pub fn split_master<R: Rng + CryptoRng>(
	params: &mut Params,
	master: &MasterKey,
	t: usize,
	n: usize,
	rng: &mut R,
) -> Result<Vec<MasterShare>> {
	if t == 0 || t > n || n > 0xffff {
		return Err(Error::Domain);
	}
	let q = params.curve.q.clone();

	let mut poly = Vec::with_capacity(t);
	poly.push(master.0.clone());
	for _ in 1..t {
		poly.push(fp::random_below(rng, &q));
	}

	let mut robust_x: Vec<BigUint> = Vec::with_capacity(n);
	while robust_x.len() < n {
		let x = fp::random_below(rng, &q);
		if x.is_zero() || robust_x.contains(&x) {
			continue;
		}
		robust_x.push(x);
	}

	let mut shares = Vec::with_capacity(n);
	let mut robust_p = Vec::with_capacity(n);
	for (i, xi) in robust_x.iter().enumerate() {
		let mut y = BigUint::zero();
		for coeff in poly.iter().rev() {
			y = fp::add(&fp::mul(&y, xi, &q), coeff, &q);
		}
		robust_p.push(params.curve.mul(&y, &params.public_key));
		shares.push(MasterShare { index: i as u32, value: y });
	}

	params.threshold = t;
	params.share_count = n;
	params.robust_x = robust_x;
	params.robust_p = robust_p;
	Ok(shares)
}

/// Lagrange coefficient of `x_i` at zero over the points indexed by
/// `indices`.
fn lagrange_at_zero(
	params: &Params,
	indices: &[usize],
	i: usize,
) -> Result<BigUint> {
	let q = &params.curve.q;
	let xi = &params.robust_x[indices[i]];
	let mut num = BigUint::from(1u32);
	let mut denom = BigUint::from(1u32);
	for (j, idx) in indices.iter().enumerate() {
		if j == i {
			continue;
		}
		let xj = &params.robust_x[*idx];
		num = fp::mul(&num, xj, q);
		denom = fp::mul(&denom, &fp::sub(xj, xi, q), q);
	}
	let denom = fp::inv(&denom, q).ok_or(Error::Arithmetic)?;
	Ok(fp::mul(&num, &denom, q))
}

/// Validates a share set: exactly `t` shares, in-range indices, no
/// duplicates. Returns the index list.
fn check_indices<T>(
	params: &Params,
	shares: &[T],
	index_of: impl Fn(&T) -> u32,
) -> Result<Vec<usize>> {
	if params.threshold == 0 || shares.len() != params.threshold {
		return Err(Error::Structure);
	}
	let mut indices = Vec::with_capacity(shares.len());
	for share in shares {
		let idx = index_of(share) as usize;
		if idx >= params.share_count {
			return Err(Error::Domain);
		}
		if indices.contains(&idx) {
			return Err(Error::DuplicateShare);
		}
		indices.push(idx);
	}
	Ok(indices)
}

/// Reconstructs the master scalar from `t` shares.
///
/// Normally never called (the shares exist so the master does not), but
/// key escrow and the test suite need it.
pub fn construct_master(
	params: &Params,
	shares: &[MasterShare],
) -> Result<MasterKey> {
	let indices = check_indices(params, shares, |share| share.index)?;

	let q = &params.curve.q;
	let mut x = BigUint::zero();
	for (i, share) in shares.iter().enumerate() {
		if share.value.is_zero() || share.value >= *q {
			return Err(Error::Domain);
		}
		let coeff = lagrange_at_zero(params, &indices, i)?;
		x = fp::add(&x, &fp::mul(&coeff, &share.value, q), q);
	}
	if x.is_zero() {
		return Err(Error::Domain);
	}
	Ok(MasterKey(x))
}

/// A server's contribution to a private key: `(i, y_i * Q_id)`.
pub fn extract_share(
	params: &Params,
	mshare: &MasterShare,
	id: &str,
) -> KeyShare {
	extract_share_bytes(params, mshare, id.as_bytes())
}

/// Byte-string identity variant of [`extract_share`]; certificate shares
/// hash into this.
pub fn extract_share_bytes(
	params: &Params,
	mshare: &MasterShare,
	id: &[u8],
) -> KeyShare {
	let q_id = hash::map_to_point(&params.curve, id);
	KeyShare {
		index: mshare.index,
		point: params.curve.mul(&mshare.value, &q_id),
	}
}

/// Lagrange-combines `t` key shares in the group:
/// `sum L_i * (y_i * Q) = f(0) * Q = x * Q`.
///
/// Also reconstructs a certificate from certificate shares.
pub fn combine(params: &Params, shares: &[KeyShare]) -> Result<Point> {
	let indices = check_indices(params, shares, |share| share.index)?;

	let mut acc = Point::Infinity;
	for (i, share) in shares.iter().enumerate() {
		if !params.curve.is_base_point(&share.point) {
			return Err(Error::Domain);
		}
		let coeff = lagrange_at_zero(params, &indices, i)?;
		let term = params.curve.mul(&coeff, &share.point);
		acc = params.curve.add(&acc, &term);
	}
	Ok(acc)
}
