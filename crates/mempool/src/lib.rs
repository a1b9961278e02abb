//! The UserOperation alternative mempool implementation according to the [ERC-4337 specifications](https://eips.ethereum.org/EIPS/eip-4337#Alternative%20Mempools).
#![allow(dead_code)]

mod builder;
pub mod error;
mod estimate;
pub mod events;
mod memory;
mod mempool;
mod reputation;
mod uopool;
mod utils;
pub mod validate;

pub use builder::UoPoolBuilder;
pub use error::{
    InvalidMempoolUserOperationError, MempoolError, MempoolErrorKind, ReputationError, SanityError,
    SimulationError,
};
pub use events::EventsManager;
pub use mempool::{
    mempool_id, AddRemoveUserOp, AddRemoveUserOpHash, ClearOp, Mempool, MempoolId,
    UserOperationAct, UserOperationAddrAct, UserOperationAddrOp, UserOperationCodeHashAct,
    UserOperationCodeHashOp, UserOperationOp,
};
pub use reputation::{HashSetOp, Reputation, ReputationEntryOp};
pub use uopool::UoPool;
pub use utils::Overhead;
pub use validate::{SanityCheck, SimulationCheck, SimulationTraceCheck};
