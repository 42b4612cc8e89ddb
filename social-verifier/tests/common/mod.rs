pub mod fake_gateway;
pub mod test_setup;

pub use fake_gateway::*;
pub use test_setup::*;
