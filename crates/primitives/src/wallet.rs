//! A `Wallet` is a wrapper around an ethers wallet used to sign user operations on behalf of
//! the bundler's beneficiary account

use crate::UserOperationSigned;
use ethers::{
    prelude::{k256::ecdsa::SigningKey, rand},
    signers::{coins_bip39::English, MnemonicBuilder, Signer},
    types::{Address, U256},
};
use expanded_pathbuf::ExpandedPathBuf;
use std::fs;

/// Wrapper around ethers wallet
#[derive(Clone, Debug)]
pub struct Wallet {
    /// Signing key of the wallet
    pub signer: ethers::signers::Wallet<SigningKey>,
}

impl Wallet {
    /// Builds a `Wallet` from a newly generated mnemonic, writing the phrase to `path`
    pub fn build_random(path: ExpandedPathBuf, chain_id: &U256) -> eyre::Result<Self> {
        let mut rng = rand::thread_rng();

        fs::create_dir_all(&path)?;

        let wallet = MnemonicBuilder::<English>::default()
            .write_to(path.to_path_buf())
            .derivation_path("m/44'/60'/0'/0/0")
            .expect("Failed to derive wallet")
            .build_random(&mut rng)?;

        Ok(Self { signer: wallet.with_chain_id(chain_id.as_u64()) })
    }

    /// Creates a new wallet from the given file containing the mnemonic phrase
    pub fn from_file(path: ExpandedPathBuf, chain_id: &U256) -> eyre::Result<Self> {
        let wallet = MnemonicBuilder::<English>::default()
            .phrase(path.to_path_buf())
            .derivation_path("m/44'/60'/0'/0/0")
            .expect("Failed to derive wallet")
            .build()?;

        Ok(Self { signer: wallet.with_chain_id(chain_id.as_u64()) })
    }

    /// Creates a new wallet from the given mnemonic phrase
    pub fn from_phrase(phrase: &str, chain_id: &U256) -> eyre::Result<Self> {
        let wallet = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path("m/44'/60'/0'/0/0")
            .expect("Failed to derive wallet")
            .build()?;

        Ok(Self { signer: wallet.with_chain_id(chain_id.as_u64()) })
    }

    /// Address of the wallet, used as the bundle transaction's beneficiary by default
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs the user operation hash with the bundler's key, as required by some validation
    /// flows that need the operation re-signed by a known account
    pub async fn sign_uo(
        &self,
        uo: &UserOperationSigned,
        ep: &Address,
        chain_id: u64,
    ) -> eyre::Result<UserOperationSigned> {
        let h = uo.hash(ep, chain_id);
        let sig = self.signer.sign_message(h.0.as_bytes()).await?;
        Ok(uo.clone().signature(sig.to_vec().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn build_random_then_sign() {
        let dir = tempdir().unwrap();
        let wallet =
            Wallet::build_random(ExpandedPathBuf::from(dir.path().to_path_buf()), &U256::from(1))
                .unwrap();
        let uo = UserOperationSigned::default().sender(wallet.address());
        let signed = wallet
            .sign_uo(&uo, &"0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789".parse().unwrap(), 1)
            .await
            .unwrap();
        assert!(!signed.signature.is_empty());
    }
}
