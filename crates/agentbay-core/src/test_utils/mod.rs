pub mod fake_provider;
pub mod mock_agentbay_server;

pub use fake_provider::{FakeSandboxProvider, RunBehavior};
pub use mock_agentbay_server::{MockAgentBayServer, MockBehavior};
