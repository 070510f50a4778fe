//! C ABI shared by the host and loadable modules.

pub mod abi;
pub mod safety;
