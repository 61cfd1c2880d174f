pub mod ids;
pub mod money;

pub use money::round2;
