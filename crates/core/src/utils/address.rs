use crate::bindings::nonce_holder::NonceHolder;
use alloy::primitives::{Address, B256, U256, address, keccak256};
use alloy::providers::Provider;
use alloy_zksync::network::Zksync;
use eyre::Result;

/// Keeps the deployment nonce of every account.
pub const NONCE_HOLDER_ADDRESS: Address = address!("0x0000000000000000000000000000000000008003");

/// Address of a contract created with `CREATE` on zkSync.
///
/// Unlike Ethereum this is not derived from the RLP of sender and nonce:
/// `keccak256(keccak256("zksyncCreate") ++ pad32(sender) ++ pad32(nonce))[12..]`,
/// where the nonce is the sender's deployment nonce.
pub fn zksync_create_address(sender: Address, deployment_nonce: U256) -> Address {
    let prefix = keccak256(b"zksyncCreate");
    let sender_word = B256::left_padding_from(sender.as_slice());
    let nonce_word = B256::from(deployment_nonce.to_be_bytes::<32>());

    let hash = keccak256(
        [
            prefix.as_slice(),
            sender_word.as_slice(),
            nonce_word.as_slice(),
        ]
        .concat(),
    );

    Address::from_slice(&hash[12..])
}

/// Address the next `CREATE` from `sender` will land on.
pub async fn predict_create_address<P>(provider: &P, sender: Address) -> Result<Address>
where
    P: Provider<Zksync>,
{
    let nonce_holder = NonceHolder::new(NONCE_HOLDER_ADDRESS, provider);
    let nonce = nonce_holder.getDeploymentNonce(sender).call().await?;
    Ok(zksync_create_address(sender, nonce))
}
