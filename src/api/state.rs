use std::sync::Arc;

use crate::crypto::{CredentialHasher, TokenService};
use crate::db::UserDirectory;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn UserDirectory>,
    pub hasher: Arc<CredentialHasher>,
    pub tokens: Arc<TokenService>,
}
