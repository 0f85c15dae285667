// Key management

use crate::core::{Identity, generate_keypair};
use crate::error::{LedgerError, Result};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Key pair together with the identity it controls
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub identity: Identity,
}

impl KeyPair {
    /// Generate a new key pair
    pub fn generate() -> Result<Self> {
        let (secret_key, public_key) = generate_keypair()?;
        Ok(Self::from_keys(secret_key, public_key))
    }

    /// Restore from a hex-encoded secret key
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self> {
        let bytes = hex::decode(secret_hex)
            .map_err(|e| LedgerError::Signature(format!("Invalid secret key encoding: {e}")))?;
        let secret_key = SecretKey::from_slice(&bytes)?;
        let public_key = secret_key.public_key(&Secp256k1::new());
        Ok(Self::from_keys(secret_key, public_key))
    }

    fn from_keys(secret_key: SecretKey, public_key: PublicKey) -> Self {
        Self {
            secret_key,
            public_key,
            identity: Identity::from_public_key(&public_key),
        }
    }

    /// Secret key as hex (what the keystore file stores)
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        // Never print the secret half
        f.debug_struct("KeyPair")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// On-disk form: name -> secret key hex
#[derive(Serialize, Deserialize)]
struct KeystoreFile {
    keys: BTreeMap<String, String>,
    default: Option<String>,
}

/// Keystore - named key pairs with an optional default
#[derive(Debug, Default)]
pub struct Keystore {
    keys: BTreeMap<String, KeyPair>,
    default_name: Option<String>,
}

impl Keystore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a key under `name`; the first key becomes the default
    pub fn generate(&mut self, name: &str) -> Result<Identity> {
        if self.keys.contains_key(name) {
            return Err(LedgerError::Config(format!("Key {name} already exists")));
        }

        let keypair = KeyPair::generate()?;
        let identity = keypair.identity.clone();
        self.insert(name, keypair);

        log::info!("Generated key {} ({})", name, identity);
        Ok(identity)
    }

    /// Store a key pair, replacing any key with the same name
    pub fn insert(&mut self, name: &str, keypair: KeyPair) {
        if self.default_name.is_none() {
            self.default_name = Some(name.to_string());
        }
        self.keys.insert(name.to_string(), keypair);
    }

    pub fn get(&self, name: &str) -> Option<&KeyPair> {
        self.keys.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.keys.keys().cloned().collect()
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    pub fn default_keypair(&self) -> Option<&KeyPair> {
        self.default_name.as_ref().and_then(|name| self.keys.get(name))
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.keys.contains_key(name) {
            return Err(LedgerError::Config(format!("Key {name} not found in keystore")));
        }
        self.default_name = Some(name.to_string());
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.keys.len()
    }

    /// Save keystore to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = KeystoreFile {
            keys: self
                .keys
                .iter()
                .map(|(name, kp)| (name.clone(), kp.secret_hex()))
                .collect(),
            default: self.default_name.clone(),
        };

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    /// Load keystore from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let file: KeystoreFile = serde_json::from_str(&json)?;

        let mut keys = BTreeMap::new();
        for (name, secret_hex) in file.keys {
            keys.insert(name, KeyPair::from_secret_hex(&secret_hex)?);
        }

        if let Some(default) = &file.default {
            if !keys.contains_key(default) {
                return Err(LedgerError::Config(format!(
                    "Default key {default} missing from keystore"
                )));
            }
        }

        Ok(Self {
            keys,
            default_name: file.default,
        })
    }

    /// Load the keystore, or create one holding a single default key
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }

        let mut keystore = Self::new();
        keystore.generate("default")?;
        keystore.save(path)?;
        Ok(keystore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let kp = KeyPair::generate().unwrap();

        // Compressed public key, hex encoded
        assert_eq!(kp.identity.as_str().len(), 66);
        assert_eq!(kp.identity.to_public_key().unwrap(), kp.public_key);
    }

    #[test]
    fn test_secret_hex_restores_identity() {
        let kp = KeyPair::generate().unwrap();
        let restored = KeyPair::from_secret_hex(&kp.secret_hex()).unwrap();

        assert_eq!(restored.identity, kp.identity);
        assert!(KeyPair::from_secret_hex("zz").is_err());
    }

    #[test]
    fn test_keystore() {
        let mut ks = Keystore::new();

        assert_eq!(ks.count(), 0);
        assert!(ks.default_keypair().is_none());

        let alice = ks.generate("alice").unwrap();
        let bob = ks.generate("bob").unwrap();
        assert_eq!(ks.count(), 2);
        assert_eq!(ks.default_name(), Some("alice"));
        assert!(ks.generate("alice").is_err());

        ks.set_default("bob").unwrap();
        assert_ne!(ks.default_keypair().unwrap().identity, alice);
        assert_eq!(ks.default_keypair().unwrap().identity, bob);
        assert!(ks.set_default("carol").is_err());
        assert_eq!(ks.names(), vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "utxo-ledger-keystore-{}.json",
            std::process::id()
        ));

        let mut ks = Keystore::new();
        let alice = ks.generate("alice").unwrap();
        ks.save(&path).unwrap();

        let loaded = Keystore::load(&path).unwrap();
        assert_eq!(loaded.count(), 1);
        assert_eq!(loaded.default_keypair().unwrap().identity, alice);

        fs::remove_file(&path).unwrap();
    }
}
