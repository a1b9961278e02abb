use ethers::{
    contract::{abigen, EthCall},
    types::Selector,
};
use lazy_static::lazy_static;
use std::collections::HashMap;

abigen!(
    EntryPointAPI,
    r#"[
        struct UserOperation {address sender;uint256 nonce;bytes initCode;bytes callData;uint256 callGasLimit;uint256 verificationGasLimit;uint256 preVerificationGas;uint256 maxFeePerGas;uint256 maxPriorityFeePerGas;bytes paymasterAndData;bytes signature;}
        struct StakeInfo {uint256 stake;uint256 unstakeDelaySec;}
        struct ReturnInfo {uint256 preOpGas;uint256 prefund;bool sigFailed;uint256 validAfter;uint256 validUntil;bytes paymasterContext;}
        struct AggregatorStakeInfo {address aggregator;StakeInfo stakeInfo;}
        struct ValidationResult {ReturnInfo returnInfo;StakeInfo senderInfo;StakeInfo factoryInfo;StakeInfo paymasterInfo;}
        struct ValidationResultWithAggregation {ReturnInfo returnInfo;StakeInfo senderInfo;StakeInfo factoryInfo;StakeInfo paymasterInfo;AggregatorStakeInfo aggregatorInfo;}
        struct ExecutionResult {uint256 preOpGas;uint256 paid;uint256 validAfter;uint256 validUntil;bool targetSuccess;bytes targetResult;}
        struct UserOpsPerAggregator {UserOperation[] userOps;address aggregator;bytes signature;}
        function handleOps(UserOperation[] calldata ops,address payable beneficiary) external
        function handleAggregatedOps(UserOpsPerAggregator[] calldata opsPerAggregator,address payable beneficiary) external
        function getSenderAddress(bytes memory initCode) external
        function getUserOpHash(UserOperation calldata userOp) external view returns (bytes32)
        function simulateValidation(UserOperation calldata userOp) external returns (ValidationResult memory)
        function simulateHandleOp(UserOperation calldata op,address target,bytes calldata targetCallData) external returns (ExecutionResult memory)
        function createSender(bytes calldata initCode) external returns (address sender)
        function validateUserOp(UserOperation calldata userOp,bytes32 userOpHash,uint256 missingAccountFunds) external returns (uint256 validationData)
        function validatePaymasterUserOp(UserOperation calldata userOp,bytes32 userOpHash,uint256 maxCost) external returns (bytes memory context, uint256 validationData)
        function getNonce(address sender, uint192 key) public view returns (uint256 nonce)
        error FailedOp(uint256 opIndex, string reason)
        error FailedOpWithRevert(uint256 opIndex, string reason, bytes inner)
        error PostOpReverted(bytes returnData)
        error SenderAddressResult(address sender)
        event UserOperationRevertReason(bytes32 indexed userOpHash,address indexed sender,uint256 nonce,bytes revertReason)
        event UserOperationEvent(bytes32 indexed userOpHash,address indexed sender,address indexed paymaster,uint256 nonce,bool success,uint256 actualGasCost,uint256 actualGasUsed)
        event AccountDeployed(bytes32 indexed userOpHash,address indexed sender,address factory,address paymaster)
        event SignatureAggregatorChanged(address indexed aggregator)
    ]"#
);

abigen!(
    StakeManagerAPI,
    r#"[
        struct DepositInfo {uint256 deposit;bool staked;uint112 stake;uint32 unstakeDelaySec;uint48 withdrawTime;}
        function getDepositInfo(address account) external view returns (DepositInfo memory info)
        function balanceOf(address account) external view returns (uint256)
        function depositTo(address account) external payable
        function addStake(uint32 unstakeDelaySec) external payable
        function unlockStake() external
        function withdrawStake(address payable withdrawAddress) external
        function withdrawTo(address payable withdrawAddress,uint256 withdrawAmount) external
        event Deposited(address indexed account,uint256 totalDeposit)
        event Withdrawn(address indexed account,address withdrawAddress,uint256 amount)
        event StakeLocked(address indexed account,uint256 totalStaked,uint256 unstakeDelaySec)
        event StakeUnlocked(address indexed account,uint256 withdrawTime)
        event StakeWithdrawn(address indexed account,address withdrawAddress,uint256 amount)
    ]"#
);

pub use entry_point_api::{
    AccountDeployedFilter, EntryPointAPIErrors, EntryPointAPIEvents, ExecutionResult, FailedOp,
    FailedOpWithRevert, PostOpReverted, SenderAddressResult, SignatureAggregatorChangedFilter,
    UserOperationEventFilter, UserOperationRevertReasonFilter, ValidatePaymasterUserOpReturn,
    ValidationResult, ValidationResultWithAggregation,
};
pub use stake_manager_api::DepositInfo;

lazy_static! {
    pub static ref SELECTORS_NAMES: HashMap<Selector, String> = {
        let mut map = HashMap::new();
        // entry point
        map.insert(entry_point_api::GetSenderAddressCall::selector(), entry_point_api::GetSenderAddressCall::function_name().into());
        map.insert(entry_point_api::GetUserOpHashCall::selector(), entry_point_api::GetUserOpHashCall::function_name().into());
        map.insert(entry_point_api::HandleAggregatedOpsCall::selector(), entry_point_api::HandleAggregatedOpsCall::function_name().into());
        map.insert(entry_point_api::HandleOpsCall::selector(), entry_point_api::HandleOpsCall::function_name().into());
        map.insert(entry_point_api::SimulateHandleOpCall::selector(), entry_point_api::SimulateHandleOpCall::function_name().into());
        map.insert(entry_point_api::SimulateValidationCall::selector(), entry_point_api::SimulateValidationCall::function_name().into());
        map.insert(entry_point_api::GetNonceCall::selector(), entry_point_api::GetNonceCall::function_name().into());
        // stake manager
        map.insert(stake_manager_api::GetDepositInfoCall::selector(), stake_manager_api::GetDepositInfoCall::function_name().into());
        map.insert(stake_manager_api::BalanceOfCall::selector(), stake_manager_api::BalanceOfCall::function_name().into());
        map.insert(stake_manager_api::DepositToCall::selector(), stake_manager_api::DepositToCall::function_name().into());
        map.insert(stake_manager_api::AddStakeCall::selector(), stake_manager_api::AddStakeCall::function_name().into());
        map.insert(stake_manager_api::UnlockStakeCall::selector(), stake_manager_api::UnlockStakeCall::function_name().into());
        map.insert(stake_manager_api::WithdrawStakeCall::selector(), stake_manager_api::WithdrawStakeCall::function_name().into());
        map.insert(stake_manager_api::WithdrawToCall::selector(), stake_manager_api::WithdrawToCall::function_name().into());
        // sender creator
        map.insert(entry_point_api::CreateSenderCall::selector(), entry_point_api::CreateSenderCall::function_name().into());
        // account
        map.insert(entry_point_api::ValidateUserOpCall::selector(), entry_point_api::ValidateUserOpCall::function_name().into());
        // paymaster
        map.insert(entry_point_api::ValidatePaymasterUserOpCall::selector(), entry_point_api::ValidatePaymasterUserOpCall::function_name().into());

        map
    };
    pub static ref SELECTORS_INDICES: HashMap<Selector, usize> = {
        let mut map = HashMap::new();
        // factory
        map.insert(entry_point_api::CreateSenderCall::selector(), 0);
        // sender/account
        map.insert(entry_point_api::ValidateUserOpCall::selector(), 1);
        // paymaster
        map.insert(entry_point_api::ValidatePaymasterUserOpCall::selector(), 2);
        map
    };
}
