//! Authentication storage: API key records, pending challenges, and the
//! store traits the handshake is built on.

mod api_key;
mod challenge;
mod challenge_store;
mod store;

pub use api_key::ApiKeyRecord;
pub use challenge::Challenge;
pub use challenge_store::{ChallengeStore, MemoryChallengeStore};
pub use store::{ApiKeyStore, MemoryApiKeyStore};
