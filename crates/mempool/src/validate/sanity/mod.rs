//! Sanity module performs call gas limit, verification gas limit, max priority fee, paymaster
//! verification, sender vericiation, and UserOperation type checks
pub mod call_gas;
pub mod entities;
pub mod max_fee;
pub mod paymaster;
pub mod sender;
pub mod unstaked_entities;
pub mod verification_gas;
