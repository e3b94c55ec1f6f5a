//! Password encryption of stored secrets
//!
//! A secret is encrypted with AES-256-CBC and PKCS#7 padding under the double
//! SHA256 of the password, with a random IV prepended, and base64 encoded.
//! There is no authentication tag. A wrong password usually fails on padding
//! but may decode to garbage, so callers must check the result against
//! something they already know.

use crate::util::{sha256d, Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto::buffer::{BufferResult, ReadBuffer, RefReadBuffer, RefWriteBuffer, WriteBuffer};
use crypto::symmetriccipher::{Decryptor, Encryptor, SymmetricCipherError};
use crypto::{aes, blockmodes};
use rand::{thread_rng, RngCore};

const IV_LEN: usize = 16;

/// Encrypts a secret, or returns it unchanged when there is no password
pub fn pw_encode(plaintext: &str, password: Option<&str>) -> Result<String> {
    let password = match password {
        Some(password) => password,
        None => return Ok(plaintext.to_string()),
    };
    let key = sha256d(password.as_bytes());
    let mut iv = [0; IV_LEN];
    thread_rng().fill_bytes(&mut iv);

    let mut encryptor =
        aes::cbc_encryptor(aes::KeySize::KeySize256, &key, &iv, blockmodes::PkcsPadding);
    let ciphertext = encrypt_all(&mut *encryptor, plaintext.as_bytes())
        .map_err(|e| Error::BadData(format!("Encryption failed: {:?}", e)))?;

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(&out))
}

/// Decrypts a secret produced by `pw_encode`
///
/// Any failure to decode is reported as `InvalidPassword`.
pub fn pw_decode(encoded: &str, password: Option<&str>) -> Result<String> {
    let password = match password {
        Some(password) => password,
        None => return Ok(encoded.to_string()),
    };
    let data = BASE64.decode(encoded).map_err(|_| Error::InvalidPassword)?;
    if data.len() <= IV_LEN || (data.len() - IV_LEN) % 16 != 0 {
        return Err(Error::InvalidPassword);
    }
    let (iv, ciphertext) = data.split_at(IV_LEN);
    let key = sha256d(password.as_bytes());

    let mut decryptor =
        aes::cbc_decryptor(aes::KeySize::KeySize256, &key, iv, blockmodes::PkcsPadding);
    let plaintext = decrypt_all(&mut *decryptor, ciphertext).map_err(|_| Error::InvalidPassword)?;
    String::from_utf8(plaintext).map_err(|_| Error::InvalidPassword)
}

fn encrypt_all(
    encryptor: &mut dyn Encryptor,
    data: &[u8],
) -> std::result::Result<Vec<u8>, SymmetricCipherError> {
    let mut result = Vec::new();
    let mut read_buffer = RefReadBuffer::new(data);
    let mut buf = [0; 4096];
    let mut write_buffer = RefWriteBuffer::new(&mut buf);
    loop {
        let status = encryptor.encrypt(&mut read_buffer, &mut write_buffer, true)?;
        result.extend_from_slice(write_buffer.take_read_buffer().take_remaining());
        if let BufferResult::BufferUnderflow = status {
            return Ok(result);
        }
    }
}

fn decrypt_all(
    decryptor: &mut dyn Decryptor,
    data: &[u8],
) -> std::result::Result<Vec<u8>, SymmetricCipherError> {
    let mut result = Vec::new();
    let mut read_buffer = RefReadBuffer::new(data);
    let mut buf = [0; 4096];
    let mut write_buffer = RefWriteBuffer::new(&mut buf);
    loop {
        let status = decryptor.decrypt(&mut read_buffer, &mut write_buffer, true)?;
        result.extend_from_slice(write_buffer.take_read_buffer().take_remaining());
        if let BufferResult::BufferUnderflow = status {
            return Ok(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        let secret = "KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617";
        let encoded = pw_encode(secret, Some("hunter2")).unwrap();
        assert!(encoded != secret);
        assert!(pw_decode(&encoded, Some("hunter2")).unwrap() == secret);
    }

    #[test]
    fn random_iv() {
        let a = pw_encode("secret", Some("pw")).unwrap();
        let b = pw_encode("secret", Some("pw")).unwrap();
        assert!(a != b);
    }

    #[test]
    fn no_password_is_passthrough() {
        assert!(pw_encode("secret", None).unwrap() == "secret");
        assert!(pw_decode("secret", None).unwrap() == "secret");
    }

    #[test]
    fn wrong_password_never_yields_the_secret() {
        let secret = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";
        let encoded = pw_encode(secret, Some("right")).unwrap();
        match pw_decode(&encoded, Some("wrong")) {
            Ok(garbage) => assert!(garbage != secret),
            Err(Error::InvalidPassword) => {}
            Err(e) => panic!("Unexpected error {:?}", e),
        }
    }

    #[test]
    fn malformed_input() {
        match pw_decode("!!not base64!!", Some("pw")) {
            Err(Error::InvalidPassword) => {}
            _ => panic!("Expected InvalidPassword"),
        }
        match pw_decode(&BASE64.encode(&[0; 20]), Some("pw")) {
            Err(Error::InvalidPassword) => {}
            _ => panic!("Expected InvalidPassword"),
        }
    }
}
