pub mod algorand;
pub mod hedera;
pub mod mock;
pub mod xrpl;
