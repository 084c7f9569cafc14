mod credential;

pub use credential::{ChallengeInit, CredentialApi, CredentialBundle, CredentialService};
