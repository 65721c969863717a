pub mod relayer;
pub mod transaction;
