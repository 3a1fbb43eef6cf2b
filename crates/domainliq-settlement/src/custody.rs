//! At-rest custody of transfer authorization secrets.
//!
//! Secrets are sealed with ChaCha20-Poly1305 under a fresh random nonce
//! per seal. The order id is bound as associated data, so a sealed secret
//! lifted from one order cannot be opened against another.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use domainliq_types::{DomainliqError, OrderId, Result, SealedSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AEAD nonce length in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// 256-bit vault key. Zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VaultKey([u8; 32]);

impl VaultKey {
    /// Fresh key from CSPRNG entropy.
    #[must_use]
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Key from externally supplied bytes (KMS, env injection).
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Seals and opens transfer authorization secrets.
#[derive(Clone)]
pub struct SecretVault {
    cipher: ChaCha20Poly1305,
}

impl SecretVault {
    #[must_use]
    pub fn new(key: &VaultKey) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key.as_bytes())),
        }
    }

    /// Seal `secret` for exactly one order.
    ///
    /// # Errors
    /// [`DomainliqError::CustodySealFailed`] on cipher failure.
    pub fn seal(&self, order_id: OrderId, secret: &str) -> Result<SealedSecret> {
        let nonce_bytes: [u8; NONCE_SIZE] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: secret.as_bytes(),
                    aad: order_id.0.as_bytes(),
                },
            )
            .map_err(|err| DomainliqError::CustodySealFailed {
                reason: err.to_string(),
            })?;
        Ok(SealedSecret {
            nonce: nonce_bytes,
            ciphertext,
        })
    }

    /// Open a sealed secret for the order it was sealed under.
    ///
    /// # Errors
    /// [`DomainliqError::CustodyOpenFailed`] on authentication failure —
    /// wrong key, wrong order, or tampered ciphertext.
    pub fn open(&self, order_id: OrderId, sealed: &SealedSecret) -> Result<String> {
        let nonce = Nonce::from_slice(&sealed.nonce);
        let plaintext = self
            .cipher
            .decrypt(
                nonce,
                Payload {
                    msg: sealed.ciphertext.as_slice(),
                    aad: order_id.0.as_bytes(),
                },
            )
            .map_err(|err| DomainliqError::CustodyOpenFailed {
                reason: err.to_string(),
            })?;
        String::from_utf8(plaintext).map_err(|err| DomainliqError::CustodyOpenFailed {
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let vault = SecretVault::new(&VaultKey::generate());
        let order_id = OrderId::new();

        let sealed = vault.seal(order_id, "EPP-AUTH-7f3a9").unwrap();
        assert_ne!(sealed.ciphertext, b"EPP-AUTH-7f3a9");

        let opened = vault.open(order_id, &sealed).unwrap();
        assert_eq!(opened, "EPP-AUTH-7f3a9");
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let order_id = OrderId::new();
        let sealed = SecretVault::new(&VaultKey::generate())
            .seal(order_id, "secret")
            .unwrap();

        let err = SecretVault::new(&VaultKey::generate())
            .open(order_id, &sealed)
            .unwrap_err();
        assert!(matches!(err, DomainliqError::CustodyOpenFailed { .. }));
    }

    #[test]
    fn sealed_secret_is_bound_to_its_order() {
        let vault = SecretVault::new(&VaultKey::generate());
        let sealed = vault.seal(OrderId::new(), "secret").unwrap();

        let err = vault.open(OrderId::new(), &sealed).unwrap_err();
        assert!(matches!(err, DomainliqError::CustodyOpenFailed { .. }));
    }

    #[test]
    fn tampered_ciphertext_fails_to_open() {
        let vault = SecretVault::new(&VaultKey::generate());
        let order_id = OrderId::new();
        let mut sealed = vault.seal(order_id, "secret").unwrap();
        sealed.ciphertext[0] ^= 0xFF;

        let err = vault.open(order_id, &sealed).unwrap_err();
        assert!(matches!(err, DomainliqError::CustodyOpenFailed { .. }));
    }

    #[test]
    fn each_seal_uses_a_fresh_nonce() {
        let vault = SecretVault::new(&VaultKey::generate());
        let order_id = OrderId::new();

        let a = vault.seal(order_id, "secret").unwrap();
        let b = vault.seal(order_id, "secret").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn empty_secret_roundtrips() {
        let vault = SecretVault::new(&VaultKey::generate());
        let order_id = OrderId::new();

        let sealed = vault.seal(order_id, "").unwrap();
        assert_eq!(vault.open(order_id, &sealed).unwrap(), "");
    }
}
