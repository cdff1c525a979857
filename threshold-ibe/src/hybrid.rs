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

//! Wrapping a session key under KEM secrets.
//!
//! A message for `n` recipients is encrypted once under a session key `K`;
//! `K` is then sealed separately for every recipient under their
//! encapsulated secret with AES-GCM. Opening a tampered box (or opening
//! with the wrong secret) fails authentication rather than yielding noise;
//! this is where the composition gets its CCA security, the pairing core
//! itself carries no authenticity check.

use aes_gcm::{
	aead::{Aead, KeyInit},
	Aes256Gcm, Nonce,
};
use rand::{CryptoRng, Rng};

use crate::{
	curve::Point,
	hash,
	ibe::{self, Params, PrivateKey},
	Error, Result,
};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Seals `key` for every identity: one shared header `U`, one AES-GCM box
/// per recipient.
pub fn hide_key_array<R: Rng + CryptoRng>(
	params: &Params,
	ids: &[&str],
	key: &[u8],
	rng: &mut R,
) -> (Point, Vec<Vec<u8>>) {
	let (u, secrets) = ibe::kem_encrypt_array(params, ids, rng);
	let boxes = secrets
		.iter()
		.map(|secret| seal(secret, key, rng))
		.collect();
	(u, boxes)
}

/// Single-recipient form of [`hide_key_array`].
pub fn hide_key<R: Rng + CryptoRng>(
	params: &Params,
	id: &str,
	key: &[u8],
	rng: &mut R,
) -> (Point, Vec<u8>) {
	let (u, mut boxes) = hide_key_array(params, &[id], key, rng);
	let sealed = boxes.pop().expect("one id in, one box out");
	(u, sealed)
}

/// Recovers `K` from a header and a sealed box with the recipient's
/// private key.
pub fn reveal_key(
	params: &Params,
	u: &Point,
	sealed: &[u8],
	key: &PrivateKey,
) -> Result<Vec<u8>> {
	let secret = ibe::kem_decrypt(params, u, key)?;
	open(&secret, sealed)
}

/// nonce || AES-256-GCM box, keyed by the digest of the KEM secret.
fn seal<R: Rng + CryptoRng>(
	secret: &[u8],
	plaintext: &[u8],
	rng: &mut R,
) -> Vec<u8> {
	let cipher = cipher_for(secret);
	let mut nonce = [0u8; NONCE_LEN];
	rng.fill_bytes(&mut nonce);
	let boxed = cipher
		.encrypt(Nonce::from_slice(&nonce), plaintext)
		.expect("AES-GCM sealing of an in-memory buffer cannot fail");
	let mut out = nonce.to_vec();
	out.extend_from_slice(&boxed);
	out
}

fn open(secret: &[u8], data: &[u8]) -> Result<Vec<u8>> {
	if data.len() < NONCE_LEN + TAG_LEN {
		return Err(Error::Structure);
	}
	let cipher = cipher_for(secret);
	cipher
		.decrypt(Nonce::from_slice(&data[..NONCE_LEN]), &data[NONCE_LEN..])
		.map_err(|_| Error::Authenticity)
}

fn cipher_for(secret: &[u8]) -> Aes256Gcm {
	let key = hash::sha256(secret);
	Aes256Gcm::new_from_slice(&key).expect("a digest is a valid AES-256 key")
}

#[cfg(test)]
mod test {
	use super::*;
	use rand::SeedableRng;
	use rand_chacha::ChaCha20Rng;

	fn test_rng() -> ChaCha20Rng {
		ChaCha20Rng::seed_from_u64(37)
	}

	#[test]
	fn hidden_key_round_trips() {
		let mut rng = test_rng();
		let (params, master) = ibe::setup(256, 96, "hybrid", &mut rng).unwrap();

		let session_key = b"thirty-two bytes of session key!";
		let (u, sealed) =
			hide_key(&params, "alice@example.com", session_key, &mut rng);

		let key = ibe::extract(&params, &master, "alice@example.com");
		let revealed = reveal_key(&params, &u, &sealed, &key).unwrap();
		assert_eq!(revealed, session_key);
	}

	#[test]
	fn every_recipient_opens_the_same_session_key() {
		let mut rng = test_rng();
		let (params, master) = ibe::setup(256, 96, "hybrid", &mut rng).unwrap();

		let ids = ["alice@example.com", "bob@example.com"];
		let session_key = b"k".repeat(16);
		let (u, boxes) = hide_key_array(&params, &ids, &session_key, &mut rng);
		assert_ne!(boxes[0], boxes[1]);

		for (id, sealed) in ids.iter().zip(boxes.iter()) {
			let key = ibe::extract(&params, &master, id);
			assert_eq!(
				reveal_key(&params, &u, sealed, &key).unwrap(),
				session_key
			);
		}
	}

	#[test]
	fn tampering_fails_authentication() {
		let mut rng = test_rng();
		let (params, master) = ibe::setup(256, 96, "hybrid", &mut rng).unwrap();

		let (u, mut sealed) =
			hide_key(&params, "alice@example.com", b"secret", &mut rng);
		let key = ibe::extract(&params, &master, "alice@example.com");

		let last = sealed.len() - 1;
		sealed[last] ^= 1;
		assert_eq!(
			reveal_key(&params, &u, &sealed, &key).unwrap_err(),
			Error::Authenticity
		);

		assert_eq!(
			reveal_key(&params, &u, &[0u8; 8], &key).unwrap_err(),
			Error::Structure
		);
	}

	#[test]
	fn the_wrong_identity_cannot_open() {
		let mut rng = test_rng();
		let (params, master) = ibe::setup(256, 96, "hybrid", &mut rng).unwrap();

		let (u, sealed) =
			hide_key(&params, "alice@example.com", b"secret", &mut rng);
		let eve = ibe::extract(&params, &master, "eve@example.com");
		assert_eq!(
			reveal_key(&params, &u, &sealed, &eve).unwrap_err(),
			Error::Authenticity
		);
	}
}
