//! User operation request (optional fields, used for gas estimation)

use super::UserOperationSigned;
use crate::utils::as_checksum_addr;
use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// User operation with the gas-related fields left optional, accepted by
/// `eth_estimateUserOperationGas` before the bundler has filled them in
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationRequest {
    #[serde(default = "Address::zero", serialize_with = "as_checksum_addr")]
    pub sender: Address,
    #[serde(default)]
    pub nonce: U256,
    #[serde(default)]
    pub init_code: Bytes,
    #[serde(default)]
    pub call_data: Bytes,
    #[serde(default)]
    pub call_gas_limit: Option<U256>,
    #[serde(default)]
    pub verification_gas_limit: Option<U256>,
    #[serde(default)]
    pub pre_verification_gas: Option<U256>,
    #[serde(default)]
    pub max_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub paymaster_and_data: Bytes,
    #[serde(default)]
    pub signature: Option<Bytes>,
}

impl From<UserOperationRequest> for UserOperationSigned {
    fn from(user_operation: UserOperationRequest) -> Self {
        Self {
            sender: user_operation.sender,
            nonce: user_operation.nonce,
            init_code: user_operation.init_code,
            call_data: user_operation.call_data,
            call_gas_limit: user_operation.call_gas_limit.unwrap_or_default(),
            verification_gas_limit: user_operation.verification_gas_limit.unwrap_or_default(),
            pre_verification_gas: user_operation.pre_verification_gas.unwrap_or_default(),
            max_fee_per_gas: user_operation.max_fee_per_gas.unwrap_or_default(),
            max_priority_fee_per_gas: user_operation
                .max_priority_fee_per_gas
                .unwrap_or_default(),
            paymaster_and_data: user_operation.paymaster_and_data,
            signature: user_operation.signature.unwrap_or_default(),
        }
    }
}

impl From<UserOperationSigned> for UserOperationRequest {
    fn from(user_operation: UserOperationSigned) -> Self {
        Self {
            sender: user_operation.sender,
            nonce: user_operation.nonce,
            init_code: user_operation.init_code,
            call_data: user_operation.call_data,
            call_gas_limit: Some(user_operation.call_gas_limit),
            verification_gas_limit: Some(user_operation.verification_gas_limit),
            pre_verification_gas: Some(user_operation.pre_verification_gas),
            max_fee_per_gas: Some(user_operation.max_fee_per_gas),
            max_priority_fee_per_gas: Some(user_operation.max_priority_fee_per_gas),
            paymaster_and_data: user_operation.paymaster_and_data,
            signature: Some(user_operation.signature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_fills_missing_gas_fields_with_zero() {
        let req = UserOperationRequest {
            sender: Address::random(),
            call_data: "0x1234".parse().unwrap(),
            ..Default::default()
        };
        let uo: UserOperationSigned = req.into();
        assert_eq!(uo.call_gas_limit, U256::zero());
        assert_eq!(uo.verification_gas_limit, U256::zero());
        assert_eq!(uo.pre_verification_gas, U256::zero());
    }

    #[test]
    fn roundtrip_preserves_filled_fields() {
        let uo = UserOperationSigned::default()
            .sender(Address::random())
            .call_gas_limit(21_000.into())
            .verification_gas_limit(100_000.into());
        let req: UserOperationRequest = uo.clone().into();
        let back: UserOperationSigned = req.into();
        assert_eq!(uo.sender, back.sender);
        assert_eq!(uo.call_gas_limit, back.call_gas_limit);
        assert_eq!(uo.verification_gas_limit, back.verification_gas_limit);
    }
}
