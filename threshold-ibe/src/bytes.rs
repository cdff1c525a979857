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

//! The byte-string envelope exchanged with the outside world.
//!
//! Arrays are a two-byte big-endian element count, the two-byte lengths of
//! every element, then the concatenated element bodies. Integers are
//! minimal big-endian (a single zero byte for zero); `F_p^2` elements are
//! the two-element array `(a, b)`, points the two-element array `(x, y)`.
//! The point at infinity never appears in serialized public data.
//!
//! Decoding validates structure here and domains at the typed layer:
//! coordinates must reduce below `p` and points must satisfy the curve
//! equation before anything downstream sees them.

use num_bigint::BigUint;

use crate::{
	curve::{Curve, Point},
	fp2::Fp2,
	Error, Result,
};

/// Encodes an array of byte strings under the two-byte count/length scheme.
///
/// Counts and element lengths beyond 65535 do not occur for any object this
/// crate produces; feeding one is a caller bug.
pub fn encode_array(parts: &[&[u8]]) -> Vec<u8> {
	assert!(parts.len() <= 0xffff, "array count overflows the count prefix");
	let body: usize = parts.iter().map(|part| part.len()).sum();
	let mut out = Vec::with_capacity(2 + 2 * parts.len() + body);
	out.extend_from_slice(&(parts.len() as u16).to_be_bytes());
	for part in parts {
		assert!(part.len() <= 0xffff, "element overflows the length prefix");
		out.extend_from_slice(&(part.len() as u16).to_be_bytes());
	}
	for part in parts {
		out.extend_from_slice(part);
	}
	out
}

/// Decodes an array, checking the count, every length, and that no bytes
/// trail the final element.
pub fn decode_array(data: &[u8]) -> Result<Vec<Vec<u8>>> {
	if data.len() < 2 {
		return Err(Error::Structure);
	}
	let n = u16::from_be_bytes([data[0], data[1]]) as usize;
	if data.len() < 2 + 2 * n {
		return Err(Error::Structure);
	}

	let mut lens = Vec::with_capacity(n);
	let mut offset = 2;
	let mut total = 0usize;
	for _ in 0..n {
		let len = u16::from_be_bytes([data[offset], data[offset + 1]]) as usize;
		lens.push(len);
		offset += 2;
		total += len;
	}
	if data.len() != offset + total {
		return Err(Error::Structure);
	}

	let mut out = Vec::with_capacity(n);
	for len in lens {
		out.push(data[offset..offset + len].to_vec());
		offset += len;
	}
	Ok(out)
}

/// Two-element convenience encoder.
pub fn join(a: &[u8], b: &[u8]) -> Vec<u8> {
	encode_array(&[a, b])
}

/// Two-element convenience decoder.
pub fn split(data: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
	let mut parts = decode_array(data)?;
	if parts.len() != 2 {
		return Err(Error::Structure);
	}
	let b = parts.pop().expect("length checked");
	let a = parts.pop().expect("length checked");
	Ok((a, b))
}

pub fn u32_to_bytes(n: u32) -> [u8; 4] {
	n.to_be_bytes()
}

pub fn u32_from_bytes(data: &[u8]) -> Result<u32> {
	let arr: [u8; 4] = data.try_into().map_err(|_| Error::Structure)?;
	Ok(u32::from_be_bytes(arr))
}

pub fn fp2_to_bytes(x: &Fp2) -> Vec<u8> {
	join(&x.a.to_bytes_be(), &x.b.to_bytes_be())
}

/// Decodes an `F_p^2` element, rejecting unreduced coordinates.
pub fn fp2_from_bytes(data: &[u8], p: &BigUint) -> Result<Fp2> {
	let (a, b) = split(data)?;
	let a = BigUint::from_bytes_be(&a);
	let b = BigUint::from_bytes_be(&b);
	if a >= *p || b >= *p {
		return Err(Error::Domain);
	}
	Ok(Fp2 { a, b })
}

pub fn point_to_bytes(point: &Point) -> Vec<u8> {
	match point {
		Point::Infinity => panic!("the point at infinity is never serialized"),
		Point::Affine { x, y } => join(&fp2_to_bytes(x), &fp2_to_bytes(y)),
	}
}

/// Decodes a point and checks it against the curve equation.
pub fn point_from_bytes(data: &[u8], curve: &Curve) -> Result<Point> {
	let (x, y) = split(data)?;
	let point = Point::Affine {
		x: fp2_from_bytes(&x, &curve.p)?,
		y: fp2_from_bytes(&y, &curve.p)?,
	};
	if !curve.is_on_curve(&point) {
		return Err(Error::Domain);
	}
	Ok(point)
}

#[cfg(test)]
mod test {
	use super::*;
	use num_traits::Zero;

	#[test]
	fn array_round_trips() {
		let parts: Vec<&[u8]> = vec![b"alpha", b"", b"b", b"gamma-gamma"];
		let encoded = encode_array(&parts);
		let decoded = decode_array(&encoded).unwrap();
		assert_eq!(decoded.len(), parts.len());
		for (d, p) in decoded.iter().zip(parts.iter()) {
			assert_eq!(d.as_slice(), *p);
		}
	}

	#[test]
	fn encoding_is_the_documented_layout() {
		// count 2, lengths 2 and 1, bodies "ab" "c"
		let encoded = join(b"ab", b"c");
		assert_eq!(encoded, hex::decode("000200020001616263").unwrap());
	}

	#[test]
	fn decode_rejects_malformed_input() {
		assert_eq!(decode_array(&[]), Err(Error::Structure));
		assert_eq!(decode_array(&[0]), Err(Error::Structure));
		// claims two elements, lengths missing
		assert_eq!(decode_array(&[0, 2, 0, 1]), Err(Error::Structure));
		// trailing garbage
		let mut encoded = join(b"ab", b"c");
		encoded.push(0);
		assert_eq!(decode_array(&encoded), Err(Error::Structure));
		// truncated body
		let encoded = join(b"ab", b"c");
		assert_eq!(
			decode_array(&encoded[..encoded.len() - 1]),
			Err(Error::Structure)
		);
		// split wants exactly two elements
		assert_eq!(split(&encode_array(&[b"a"])), Err(Error::Structure));
	}

	#[test]
	fn integers_round_trip() {
		for n in [0u32, 1, 0xdead, u32::MAX] {
			assert_eq!(u32_from_bytes(&u32_to_bytes(n)).unwrap(), n);
		}
		assert_eq!(u32_from_bytes(&[1, 2, 3]), Err(Error::Structure));
	}

	#[test]
	fn biguint_encoding_is_minimal() {
		assert_eq!(BigUint::zero().to_bytes_be(), vec![0]);
		assert_eq!(BigUint::from(0x1234u32).to_bytes_be(), vec![0x12, 0x34]);
	}

	#[test]
	fn fp2_round_trips_and_validates() {
		let p = BigUint::from(59u32);
		let x = Fp2 { a: BigUint::from(17u32), b: BigUint::from(42u32) };
		let encoded = fp2_to_bytes(&x);
		assert_eq!(fp2_from_bytes(&encoded, &p).unwrap(), x);

		let big = Fp2 { a: BigUint::from(59u32), b: BigUint::from(1u32) };
		assert_eq!(
			fp2_from_bytes(&fp2_to_bytes(&big), &p),
			Err(Error::Domain)
		);
	}

	#[test]
	fn point_round_trips_and_validates() {
		let curve = Curve::new(BigUint::from(59u32), BigUint::from(5u32)).unwrap();
		// y = 3: x = cuberoot(8)
		let y = BigUint::from(3u32);
		let point = Point::Affine {
			x: Fp2::from_base(curve.x_from_y(&y)),
			y: Fp2::from_base(y),
		};
		assert!(curve.is_on_curve(&point));

		let encoded = point_to_bytes(&point);
		assert_eq!(point_from_bytes(&encoded, &curve).unwrap(), point);

		// perturb x off the curve
		let bad = Point::Affine {
			x: Fp2::from_base(BigUint::from(1u32)),
			y: Fp2::from_base(BigUint::from(3u32)),
		};
		let encoded = point_to_bytes(&bad);
		assert_eq!(point_from_bytes(&encoded, &curve), Err(Error::Domain));
	}
}
