pub mod helix_client;

pub use helix_client::{HelixClient, HelixCredentials};
