mod orchestrator;
mod session;

pub use orchestrator::{AuthOrchestrator, LoginFlow};
pub use session::{AuthPhase, AuthSession, AuthSnapshot};
