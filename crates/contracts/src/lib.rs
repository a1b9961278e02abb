#![allow(dead_code)]

pub mod entry_point;
pub mod error;
pub mod executor_tracer;
mod gen;
pub mod tracer;
mod utils;

pub use entry_point::{EntryPoint, EntryPointError, SimulateValidationResult};
pub use error::{decode_revert_error, decode_revert_string};
pub use gen::{
    AccountDeployedFilter, EntryPointAPI, EntryPointAPIErrors, EntryPointAPIEvents, ExecutionResult,
    FailedOp, FailedOpWithRevert, PostOpReverted, SELECTORS_INDICES, SELECTORS_NAMES,
    SenderAddressResult, SignatureAggregatorChangedFilter, StakeManagerAPI,
    UserOperationEventFilter, UserOperationRevertReasonFilter, ValidatePaymasterUserOpReturn,
};
pub use tracer::{Call, CallEntry, JsTracerFrame, JS_TRACER};
pub use utils::parse_from_input_data;
