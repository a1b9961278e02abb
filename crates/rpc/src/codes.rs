//! JSON-RPC error codes for bundler-specific error conditions, as used by [crate::error].

use silius_primitives::constants::error_codes;

pub const SANITY: i32 = error_codes::SANITY_CHECK;
pub const OPCODE: i32 = error_codes::OPCODE;
pub const TIMESTAMP: i32 = error_codes::EXPIRATION;
pub const BANNED_OR_THROTTLED_ENTITY: i32 = error_codes::ENTITY_BANNED_OR_THROTTLED;
pub const STAKE_TOO_LOW: i32 = error_codes::STAKE_TOO_LOW;
pub const SIGNATURE: i32 = error_codes::SIGNATURE;
pub const EXECUTION: i32 = error_codes::EXECUTION;
pub const VALIDATION: i32 = error_codes::VALIDATION;
pub const USER_OPERATION_HASH: i32 = error_codes::VALIDATION;
