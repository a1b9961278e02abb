//! Simulation trace module performs call stack, code hash, external contract, gas, opcode, and
//! storage access checks based on the JS-tracer output of `debug_traceCall`
pub mod call_stack;
pub mod code_hashes;
pub mod external_contracts;
pub mod gas;
pub mod opcodes;
pub mod storage_access;
