mod login;
mod register;
mod worker;

pub use login::login;
pub use register::register;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::prompt::{CredentialChoice, Prompt};

/// Serializes calls into the host-supplied [`Prompt`] so that, even
/// though several device workers race concurrently, at most one prompt
/// call is outstanding at a time (§5, shared-resource policy).
pub(crate) struct Mediator {
    prompt: Arc<dyn Prompt>,
    lock: Mutex<()>,
}

impl Mediator {
    pub(crate) fn new(prompt: Arc<dyn Prompt>) -> Self {
        Self {
            prompt,
            lock: Mutex::new(()),
        }
    }

    pub(crate) async fn touch(&self) {
        let _guard = self.lock.lock().await;
        self.prompt.prompt_touch().await;
    }

    pub(crate) async fn pin(&self) -> String {
        let _guard = self.lock.lock().await;
        self.prompt.prompt_pin().await
    }

    pub(crate) async fn credential(&self, choices: &[CredentialChoice]) -> CredentialChoice {
        let _guard = self.lock.lock().await;
        self.prompt.prompt_credential(choices).await
    }
}
