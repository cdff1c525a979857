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

//! System parameters and the Boneh-Franklin key-encapsulation mechanism.
//!
//! [`setup`] searches for a Solinas subgroup order `q` and a matching prime
//! `p = 12qr - 1`, which makes `E: y^2 = x^3 + 1` supersingular with
//! embedding degree two and validates the `F_p[i]` representation of the
//! extension field. Everything derivable from the serialized fields (the
//! cube root of unity, the distorted public key, the Miller cache over
//! `P_pub`, the fixed-base table for the generator) is rebuilt on load and
//! never persisted.
//!
//! Encapsulation draws one scalar `r` per call: the header `U = rP` is
//! shared by every recipient, while each identity receives the hash of
//! `e(P_pub, Phi(Q_id))^r` as its secret. Decapsulation pairs the private
//! key against `Phi(U)` and hashes; the two agree by bilinearity.

use core::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};

use crate::{
	bytes,
	curve::{Curve, FixedBaseTable, Point},
	fp,
	fp2::Fp2,
	hash,
	pairing::{self, PreparedKey},
	Error, Result, VERSION,
};

/// Miller-Rabin rounds used while searching for `p` and `q`.
const PRIME_ROUNDS: u32 = 16;

/// The master scalar `x`. Exists transiently during setup; split it and
/// discard it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterKey(pub(crate) BigUint);

impl MasterKey {
	pub fn to_bytes(&self) -> Vec<u8> {
		self.0.to_bytes_be()
	}

	/// Rejects scalars outside `[1, q)`.
	pub fn from_bytes(data: &[u8], curve: &Curve) -> Result<MasterKey> {
		let x = BigUint::from_bytes_be(data);
		if x.is_zero() || x >= curve.q {
			return Err(Error::Domain);
		}
		Ok(MasterKey(x))
	}
}

/// An identity's private key `x * Q_id`, a point of `E(F_p)[q]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey(pub Point);

impl PrivateKey {
	pub fn to_bytes(&self) -> Vec<u8> {
		bytes::point_to_bytes(&self.0)
	}

	/// Rejects points off the curve or outside the base field.
	pub fn from_bytes(data: &[u8], curve: &Curve) -> Result<PrivateKey> {
		let point = bytes::point_from_bytes(data, curve)?;
		if !curve.is_base_point(&point) {
			return Err(Error::Domain);
		}
		Ok(PrivateKey(point))
	}
}

/// The public parameter bundle. Immutable after setup apart from the
/// threshold fields, which [`crate::shamir::split_master`] fills in.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
	pub version: String,
	pub system: String,
	pub curve: Curve,
	/// The generator `P`, a point of order `q` over `F_p`.
	pub generator: Point,
	/// `P_pub = x * P`.
	pub public_key: Point,
	pub threshold: usize,
	pub share_count: usize,
	/// Public evaluation points of the sharing polynomial.
	pub robust_x: Vec<BigUint>,
	/// `P_i = f(x_i) * P_pub`, published so shares can be spot-checked.
	pub robust_p: Vec<Point>,
	/// Derived: the cube root of unity behind the distortion map.
	pub zeta: Fp2,
	/// Derived: `Phi(P_pub)`.
	pub phi_public: Point,
	pub(crate) public_prepared: PreparedKey,
	pub(crate) gen_table: FixedBaseTable,
}

impl Params {
	/// Assembles the bundle and rebuilds every derived field.
	#[allow(clippy::too_many_arguments)]
	fn derive(
		version: String,
		system: String,
		curve: Curve,
		generator: Point,
		public_key: Point,
		threshold: usize,
		share_count: usize,
		robust_x: Vec<BigUint>,
		robust_p: Vec<Point>,
	) -> Params {
		let zeta = Fp2::cbrt_unity(&curve.p);
		let phi_public = phi_with(&zeta, &public_key, &curve.p);
		let public_prepared = PreparedKey::prepare(&curve, &public_key);
		let gen_table = curve.mul_preprocess(&generator);
		Params {
			version,
			system,
			curve,
			generator,
			public_key,
			threshold,
			share_count,
			robust_x,
			robust_p,
			zeta,
			phi_public,
			public_prepared,
			gen_table,
		}
	}

	/// The distortion map `Phi: (x, y) -> (zeta * x, y)`, sending
	/// `E(F_p)[q]` off the base field.
	pub fn phi(&self, point: &Point) -> Point {
		phi_with(&self.zeta, point, &self.curve.p)
	}

	pub fn version(&self) -> &str {
		&self.version
	}

	pub fn system(&self) -> &str {
		&self.system
	}

	pub fn threshold(&self) -> usize {
		self.threshold
	}

	pub fn share_count(&self) -> usize {
		self.share_count
	}
}

fn phi_with(zeta: &Fp2, point: &Point, p: &BigUint) -> Point {
	match point {
		Point::Infinity => Point::Infinity,
		Point::Affine { x, y } => Point::Affine {
			x: x.mul(zeta, p),
			y: y.clone(),
		},
	}
}

impl fmt::Display for Params {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "IBE version: {}", self.version)?;
		writeln!(f, "system ID: {}", self.system)?;
		writeln!(f, "p = {}", self.curve.p)?;
		writeln!(f, "q = {}", self.curve.q)?;
		writeln!(f, "P = {}", self.generator)?;
		writeln!(f, "Ppub = {}", self.public_key)?;
		write!(f, "share t/n = {}/{}", self.threshold, self.share_count)
	}
}

/// Generates system parameters and the master scalar.
///
/// `k` is the bit length of `p` (512 is typical), `qk` the bit length of
/// the subgroup order (160 is typical). The search samples Solinas
/// candidates `q = 2^(qk-1) +- 2^b +- 1` until one is prime, then random
/// `r` of `k - qk - 4` bits until `p = 12qr - 1` is prime; the form of `p`
/// gives `p = 11 mod 12` by construction.
pub fn setup<R: Rng + CryptoRng>(
	k: u64,
	qk: u64,
	system: &str,
	rng: &mut R,
) -> Result<(Params, MasterKey)> {
	if qk < 8 || k < qk + 12 {
		return Err(Error::Domain);
	}
	let rbits = k - qk - 4;

	let (p, q) = loop {
		let mut cand = BigInt::one() << (qk - 1);
		let mid = BigInt::one() << ((rng.next_u32() as u64) % qk);
		if rng.gen::<bool>() {
			cand += &mid;
		} else {
			cand -= &mid;
		}
		if rng.gen::<bool>() {
			cand += 1u32;
		} else {
			cand -= 1u32;
		}
		let Some(q) = cand.to_biguint() else { continue };
		if q.bits() < 2 || !fp::is_probable_prime(&q, PRIME_ROUNDS, rng) {
			continue;
		}

		let r = fp::random_bits(rng, rbits);
		let p = &q * &r * 12u32 - 1u32;
		if fp::is_probable_prime(&p, PRIME_ROUNDS, rng) {
			break (p, q);
		}
	};

	// master scalar in [1, q)
	let x = loop {
		let x = fp::random_below(rng, &q);
		if !x.is_zero() {
			break x;
		}
	};

	let curve = Curve::new(p, q)?;
	let generator = curve.random_order_q_point(rng);
	let public_key = curve.mul(&x, &generator);

	let params = Params::derive(
		VERSION.to_owned(),
		system.to_owned(),
		curve,
		generator,
		public_key,
		0,
		0,
		Vec::new(),
		Vec::new(),
	);
	Ok((params, MasterKey(x)))
}

/// Private key for an identity, straight from the master scalar.
///
/// Only meaningful where the master actually exists in one piece, i.e.
/// tests and single-server deployments; threshold deployments go through
/// [`crate::shamir`].
pub fn extract(params: &Params, master: &MasterKey, id: &str) -> PrivateKey {
	extract_bytes(params, master, id.as_bytes())
}

/// Byte-string identity variant of [`extract`]; certificate issuance hashes
/// into this.
pub fn extract_bytes(
	params: &Params,
	master: &MasterKey,
	id: &[u8],
) -> PrivateKey {
	let q_id = hash::map_to_point(&params.curve, id);
	PrivateKey(params.curve.mul(&master.0, &q_id))
}

/// Encapsulates one fresh secret per identity under a single header
/// `U = rP`.
///
/// Batching recipients shares the header and the scalar multiplication;
/// every identity still receives an unrelated secret.
pub fn kem_encrypt_array<R: Rng + CryptoRng>(
	params: &Params,
	ids: &[&str],
	rng: &mut R,
) -> (Point, Vec<Vec<u8>>) {
	let curve = &params.curve;
	let r = loop {
		let r = fp::random_below(rng, &curve.q);
		if !r.is_zero() {
			break r;
		}
	};
	let u = curve.mul_fixed(&r, &params.gen_table);

	let mut secrets = Vec::with_capacity(ids.len());
	for id in ids {
		let q_id = hash::map_to_point(curve, id.as_bytes());
		let phi_q = params.phi(&q_id);
		// e(P_pub, Phi(Q_id))^r against the cached public key
		let g = params.public_prepared.pairing(curve, &phi_q);
		let g_r = g.pow(&r, &curve.p);
		secrets.push(hash::hash_fp2(&g_r));
	}
	(u, secrets)
}

/// Single-recipient form of [`kem_encrypt_array`].
pub fn kem_encrypt<R: Rng + CryptoRng>(
	params: &Params,
	id: &str,
	rng: &mut R,
) -> (Point, Vec<u8>) {
	let (u, mut secrets) = kem_encrypt_array(params, &[id], rng);
	let secret = secrets.pop().expect("one id in, one secret out");
	(u, secret)
}

/// Recovers the secret from a header with the identity's private key:
/// `H(e(x Q_id, Phi(U)))`.
pub fn kem_decrypt(
	params: &Params,
	u: &Point,
	key: &PrivateKey,
) -> Result<Vec<u8>> {
	if !params.curve.is_base_point(u) {
		return Err(Error::Domain);
	}
	let phi_u = params.phi(u);
	let g = pairing::tate_pairing(&params.curve, &key.0, &phi_u);
	Ok(hash::hash_fp2(&g))
}

/// The non-interactive secret shared between the holder of `key` and the
/// identity `id`: `H(e(d_own, Phi(Q_id)))`, symmetric in the two parties.
pub fn shared_secret(params: &Params, id: &str, key: &PrivateKey) -> Vec<u8> {
	let q_id = hash::map_to_point(&params.curve, id.as_bytes());
	let phi_q = params.phi(&q_id);
	let g = pairing::tate_pairing(&params.curve, &key.0, &phi_q);
	hash::hash_fp2(&g)
}

/// Caches the Miller coefficients of one's own private key for repeated
/// [`shared_secret_postprocess`] calls.
pub fn shared_secret_preprocess(
	params: &Params,
	key: &PrivateKey,
) -> PreparedKey {
	PreparedKey::prepare(&params.curve, &key.0)
}

/// [`shared_secret`] against a prepared own key.
pub fn shared_secret_postprocess(
	params: &Params,
	id: &str,
	prepared: &PreparedKey,
) -> Vec<u8> {
	let q_id = hash::map_to_point(&params.curve, id.as_bytes());
	let phi_q = params.phi(&q_id);
	hash::hash_fp2(&prepared.pairing(&params.curve, &phi_q))
}

/// Serializes the bundle in the documented order: version, system id, p, q,
/// P, P_pub, t, n, then the interleaved `(x_i, P_i)` pairs.
pub fn serialize_params(params: &Params) -> Vec<u8> {
	let mut parts: Vec<Vec<u8>> = vec![
		params.version.as_bytes().to_vec(),
		params.system.as_bytes().to_vec(),
		params.curve.p.to_bytes_be(),
		params.curve.q.to_bytes_be(),
		bytes::point_to_bytes(&params.generator),
		bytes::point_to_bytes(&params.public_key),
		bytes::u32_to_bytes(params.threshold as u32).to_vec(),
		bytes::u32_to_bytes(params.share_count as u32).to_vec(),
	];
	for i in 0..params.share_count {
		parts.push(params.robust_x[i].to_bytes_be());
		parts.push(bytes::point_to_bytes(&params.robust_p[i]));
	}
	let refs: Vec<&[u8]> = parts.iter().map(|part| part.as_slice()).collect();
	bytes::encode_array(&refs)
}

/// Rebuilds a bundle from its serialized form, revalidating every field:
/// the congruences on `p`, the curve membership and subfield of each point,
/// the range and distinctness of the share coordinates. The Solinas
/// decomposition is re-derived from `q`; orders with no such form fall back
/// to the generic Miller loop instead of failing the load.
pub fn deserialize_params(data: &[u8]) -> Result<Params> {
	let parts = bytes::decode_array(data)?;
	if parts.len() < 8 {
		return Err(Error::Structure);
	}

	let version =
		String::from_utf8(parts[0].clone()).map_err(|_| Error::Structure)?;
	let system =
		String::from_utf8(parts[1].clone()).map_err(|_| Error::Structure)?;
	let p = BigUint::from_bytes_be(&parts[2]);
	let q = BigUint::from_bytes_be(&parts[3]);
	let curve = Curve::new(p, q)?;

	let generator = bytes::point_from_bytes(&parts[4], &curve)?;
	let public_key = bytes::point_from_bytes(&parts[5], &curve)?;
	if !curve.is_base_point(&generator) || !curve.is_base_point(&public_key) {
		return Err(Error::Domain);
	}

	let threshold = bytes::u32_from_bytes(&parts[6])? as usize;
	let share_count = bytes::u32_from_bytes(&parts[7])? as usize;
	if threshold > share_count {
		return Err(Error::Domain);
	}
	if parts.len() != 8 + 2 * share_count {
		return Err(Error::Structure);
	}

	let mut robust_x = Vec::with_capacity(share_count);
	let mut robust_p = Vec::with_capacity(share_count);
	for i in 0..share_count {
		let x = BigUint::from_bytes_be(&parts[8 + 2 * i]);
		if x.is_zero() || x >= curve.q || robust_x.contains(&x) {
			return Err(Error::Domain);
		}
		let point = bytes::point_from_bytes(&parts[9 + 2 * i], &curve)?;
		if !curve.is_base_point(&point) {
			return Err(Error::Domain);
		}
		robust_x.push(x);
		robust_p.push(point);
	}

	Ok(Params::derive(
		version,
		system,
		curve,
		generator,
		public_key,
		threshold,
		share_count,
		robust_x,
		robust_p,
	))
}

#[cfg(test)]
mod test {
	use super::*;
	use rand::SeedableRng;
	use rand_chacha::ChaCha20Rng;

	fn test_rng() -> ChaCha20Rng {
		ChaCha20Rng::seed_from_u64(17)
	}

	#[test]
	fn setup_produces_consistent_parameters() {
		let mut rng = test_rng();
		let (params, master) = setup(192, 96, "test system", &mut rng).unwrap();
		let curve = &params.curve;

		assert_eq!(&curve.p % BigUint::from(12u32), BigUint::from(11u32));
		assert!(curve.solinas.is_some());
		assert!(curve.is_base_point(&params.generator));
		assert!(curve.is_base_point(&params.public_key));
		assert!(curve.general_mul(&curve.q, &params.generator).is_infinity());
		assert_eq!(
			params.public_key,
			curve.mul(&master.0, &params.generator)
		);
		assert_eq!(params.system(), "test system");
		assert_eq!(params.version(), crate::VERSION);
		assert_eq!(params.threshold(), 0);
		assert_eq!(params.share_count(), 0);
	}

	#[test]
	fn setup_rejects_bad_sizes() {
		let mut rng = test_rng();
		assert_eq!(setup(64, 60, "x", &mut rng).unwrap_err(), Error::Domain);
		assert_eq!(setup(64, 4, "x", &mut rng).unwrap_err(), Error::Domain);
	}

	#[test]
	fn kem_round_trips() {
		let mut rng = test_rng();
		let (params, master) = setup(256, 96, "kem", &mut rng).unwrap();

		let id = "alice@example.com";
		let (u, secret) = kem_encrypt(&params, id, &mut rng);
		let key = extract(&params, &master, id);
		let recovered = kem_decrypt(&params, &u, &key).unwrap();
		assert_eq!(secret, recovered);
	}

	#[test]
	fn kem_round_trips_at_production_sizes() {
		// setup(p-bits=512, q-bits=160), the sizes of a real deployment
		let mut rng = test_rng();
		let (params, master) = setup(512, 160, "test", &mut rng).unwrap();

		let id = "blynn@stanford.edu";
		let (u, secret) = kem_encrypt(&params, id, &mut rng);
		let key = extract(&params, &master, id);
		let recovered = kem_decrypt(&params, &u, &key).unwrap();
		assert_eq!(secret, recovered);
	}

	#[test]
	fn kem_batches_share_the_header_but_not_the_secret() {
		let mut rng = test_rng();
		let (params, master) = setup(256, 96, "kem", &mut rng).unwrap();

		let ids = ["alice@example.com", "bob@example.com", "carol@example.com"];
		let (u, secrets) = kem_encrypt_array(&params, &ids, &mut rng);
		assert_eq!(secrets.len(), ids.len());
		assert_ne!(secrets[0], secrets[1]);
		assert_ne!(secrets[1], secrets[2]);

		for (id, secret) in ids.iter().zip(secrets.iter()) {
			let key = extract(&params, &master, id);
			assert_eq!(kem_decrypt(&params, &u, &key).unwrap(), *secret);
		}
	}

	#[test]
	fn kem_decrypt_with_the_wrong_key_disagrees() {
		let mut rng = test_rng();
		let (params, master) = setup(256, 96, "kem", &mut rng).unwrap();

		let (u, secret) = kem_encrypt(&params, "alice@example.com", &mut rng);
		let wrong = extract(&params, &master, "eve@example.com");
		assert_ne!(kem_decrypt(&params, &u, &wrong).unwrap(), secret);
	}

	#[test]
	fn master_key_bytes_round_trip_and_validate() {
		let mut rng = test_rng();
		let (params, master) = setup(192, 96, "bytes", &mut rng).unwrap();
		let curve = &params.curve;

		let reloaded = MasterKey::from_bytes(&master.to_bytes(), curve).unwrap();
		assert_eq!(reloaded, master);

		assert_eq!(
			MasterKey::from_bytes(&curve.q.to_bytes_be(), curve),
			Err(Error::Domain)
		);
		assert_eq!(MasterKey::from_bytes(&[0], curve), Err(Error::Domain));
	}

	#[test]
	fn private_key_bytes_round_trip_and_validate() {
		let mut rng = test_rng();
		let (params, master) = setup(192, 96, "bytes", &mut rng).unwrap();

		let key = extract(&params, &master, "alice@example.com");
		let reloaded =
			PrivateKey::from_bytes(&key.to_bytes(), &params.curve).unwrap();
		assert_eq!(reloaded, key);

		// a point over F_p^2 but outside the base field is rejected
		let off_base = params.phi(&key.0);
		let encoded = bytes::point_to_bytes(&off_base);
		assert_eq!(
			PrivateKey::from_bytes(&encoded, &params.curve),
			Err(Error::Domain)
		);
	}

	#[test]
	fn params_serialization_round_trips() {
		let mut rng = test_rng();
		let (mut params, master) = setup(256, 96, "reload", &mut rng).unwrap();
		crate::shamir::split_master(&mut params, &master, 3, 5, &mut rng)
			.unwrap();

		let blob = serialize_params(&params);
		let reloaded = deserialize_params(&blob).unwrap();

		assert_eq!(reloaded.version, params.version);
		assert_eq!(reloaded.system, params.system);
		assert_eq!(reloaded.curve, params.curve);
		assert_eq!(reloaded.generator, params.generator);
		assert_eq!(reloaded.public_key, params.public_key);
		assert_eq!(reloaded.threshold, params.threshold);
		assert_eq!(reloaded.robust_x, params.robust_x);
		assert_eq!(reloaded.robust_p, params.robust_p);

		// the reloaded bundle encrypts, the original key decrypts
		let id = "alice@example.com";
		let (u, secret) = kem_encrypt(&reloaded, id, &mut rng);
		let key = extract(&params, &master, id);
		assert_eq!(kem_decrypt(&params, &u, &key).unwrap(), secret);
	}

	#[test]
	fn deserialize_rejects_corrupted_points() {
		let mut rng = test_rng();
		let (params, _master) = setup(192, 96, "corrupt", &mut rng).unwrap();
		let blob = serialize_params(&params);

		let mut parts = bytes::decode_array(&blob).unwrap();
		// replace the generator with a point that misses the curve
		let bogus = Point::Affine {
			x: Fp2::from_base(BigUint::from(2u32)),
			y: Fp2::from_base(BigUint::from(2u32)),
		};
		parts[4] = bytes::point_to_bytes(&bogus);
		let refs: Vec<&[u8]> =
			parts.iter().map(|part| part.as_slice()).collect();
		let tampered = bytes::encode_array(&refs);

		assert_eq!(deserialize_params(&tampered), Err(Error::Domain));
	}

	#[test]
	fn shared_secrets_are_symmetric() {
		let mut rng = test_rng();
		let (params, master) = setup(256, 96, "auth", &mut rng).unwrap();

		let alice = "alice@example.com";
		let bob = "bob@example.com";
		let alice_key = extract(&params, &master, alice);
		let bob_key = extract(&params, &master, bob);

		let s_ab = shared_secret(&params, bob, &alice_key);
		let s_ba = shared_secret(&params, alice, &bob_key);
		assert_eq!(s_ab, s_ba);

		// preprocessing does not change the value
		let prepared = shared_secret_preprocess(&params, &alice_key);
		assert_eq!(shared_secret_postprocess(&params, bob, &prepared), s_ab);
	}

	#[test]
	fn params_display_names_the_system() {
		let mut rng = test_rng();
		let (params, _master) = setup(192, 96, "display me", &mut rng).unwrap();
		let text = format!("{params}");
		assert!(text.contains("system ID: display me"));
		assert!(text.contains("share t/n = 0/0"));
	}
}
