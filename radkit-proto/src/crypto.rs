//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use md5::{Digest, Md5};

use crate::consts::{AUTH_PASS_LEN, AUTH_VECTOR_LEN, MAX_PASS_LEN};
use crate::error::{DecodeError, DecodeResult};

// Computes MD5(vector + secret) XOR data, the Ascend-Send-Secret scheme.
pub fn make_secret(
    vector: &[u8; AUTH_VECTOR_LEN],
    secret: &str,
    data: &[u8],
) -> [u8; AUTH_VECTOR_LEN] {
    let mut context = Md5::new();
    context.update(vector);
    context.update(secret.as_bytes());
    let mut digest: [u8; AUTH_VECTOR_LEN] = context.finalize().into();
    for (digest, data) in digest.iter_mut().zip(data.iter()) {
        *digest ^= data;
    }
    digest
}

// Decrypts a User-Password value in place (RFC 2865 section 5.2).
//
// The keystream block for the first ciphertext block is MD5(secret +
// vector); every following block is keyed on the previous ciphertext
// block, so the intermediate MD5(secret) state is cloned once per block.
//
// There is no integrity check at this layer: a wrong secret yields
// garbage, not an error. Returns the number of octets processed (the
// input is capped at 128 octets per the RFC).
pub fn decode_user_password(
    buf: &mut [u8],
    len: usize,
    secret: &str,
    vector: &[u8; AUTH_VECTOR_LEN],
) -> usize {
    let len = len.min(MAX_PASS_LEN).min(buf.len());
    if len == 0 {
        return 0;
    }

    let mut context = Md5::new();
    context.update(secret.as_bytes());
    let saved = context.clone();

    let mut n = 0;
    while n < len {
        if n == 0 {
            context.update(vector);
        }
        let digest: [u8; AUTH_PASS_LEN] = context.finalize().into();

        context = saved.clone();
        if len > n + AUTH_PASS_LEN {
            context.update(&buf[n..n + AUTH_PASS_LEN]);
        }

        let block_len = AUTH_PASS_LEN.min(len - n);
        for i in 0..block_len {
            buf[n + i] ^= digest[i];
        }
        n += AUTH_PASS_LEN;
    }

    len
}

// Decrypts a Tunnel-Password value in place (RFC 2868 section 3.5).
//
// The value starts with a two-octet salt, followed by ciphertext whose
// first plaintext octet carries the declared password length. The first
// keystream block is MD5(secret + vector + salt); following blocks are
// keyed on the previous ciphertext block.
//
// On success the plaintext occupies `buf[..n]` and the declared length
// `n` is returned. A declared length exceeding the ciphertext window is
// the one sanity check this scheme allows and fails the decode.
pub fn decode_tunnel_password(
    buf: &mut [u8],
    len: usize,
    secret: &str,
    vector: &[u8; AUTH_VECTOR_LEN],
) -> DecodeResult<usize> {
    if len < 2 || len > buf.len() {
        return Err(DecodeError::TunnelPasswordTooShort);
    }

    // A salt with no ciphertext, or a salt with only the length octet.
    // It's wrong, but it can only mean an empty password.
    if len <= 3 {
        return Ok(0);
    }

    let encrypted_len = len - 2;

    let mut context = Md5::new();
    context.update(secret.as_bytes());
    let saved = context.clone();
    context.update(vector);
    context.update(&buf[..2]);

    let mut real_len = 0;
    let mut n = 0;
    while n < encrypted_len {
        let block_len = if n + 2 + AUTH_PASS_LEN > len {
            len - n - 2
        } else {
            AUTH_PASS_LEN
        };

        let digest: [u8; AUTH_PASS_LEN] = context.finalize().into();
        context = saved.clone();
        context.update(&buf[n + 2..n + 2 + block_len]);

        let base = if n == 0 {
            // The first plaintext octet is the declared length. Check it
            // before committing to the rest of the block.
            real_len = usize::from(buf[2] ^ digest[0]);
            if real_len > encrypted_len {
                return Err(DecodeError::TunnelPasswordTooLong);
            }
            1
        } else {
            0
        };

        for i in base..block_len {
            buf[n + i - 1] = buf[n + i + 2] ^ digest[i];
        }
        n += AUTH_PASS_LEN;
    }

    Ok(real_len)
}
