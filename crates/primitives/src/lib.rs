#![allow(dead_code)]

pub mod bundler;
pub mod constants;
pub mod provider;
pub mod reputation;
pub mod simulation;
pub mod user_operation;
pub mod utils;
pub mod wallet;

pub use bundler::{BundleMode, BundleStrategy};
pub use reputation::{ReputationEntry, ReputationStatus, StakeInfo, StakeInfoResponse, Status};
pub use simulation::{CodeHash, StorageMap, ValidationConfig, EXPIRATION_TIMESTAMP_DIFF};
pub use user_operation::{
    UserOperation, UserOperationByHash, UserOperationGasEstimation, UserOperationHash,
    UserOperationReceipt, UserOperationRequest, UserOperationSigned,
};
pub use utils::get_address;
pub use wallet::Wallet;
