use carpool_core::validation::ValidationError;
use carpool_core::GatewayError;

/// Anything a screen can fail with. None of it is fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScreenError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ScreenError {
    /// Inline text shown where the failure happened
    pub fn message(&self) -> String {
        match self {
            ScreenError::Gateway(err) => {
                match err {
                    GatewayError::Network(detail) | GatewayError::Decode(detail) => {
                        tracing::warn!("Recovered from gateway failure: {}", detail)
                    }
                    _ => tracing::debug!("Screen error: {}", err),
                }
                err.user_message()
            }
            ScreenError::Validation(err) => err.0.clone(),
        }
    }
}

/// Loading, then loaded or failed. A failure keeps whatever was on screen before.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<T> {
    Loading { previous: Option<T> },
    Loaded(T),
    Failed { message: String, previous: Option<T> },
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        ScreenState::Loading { previous: None }
    }
}

impl<T> ScreenState<T> {
    pub fn begin_loading(&mut self) {
        let previous = self.take_value();
        *self = ScreenState::Loading { previous };
    }

    /// Settle a load started with `begin_loading`
    pub fn finish(&mut self, result: Result<T, ScreenError>) {
        *self = match result {
            Ok(value) => ScreenState::Loaded(value),
            Err(err) => ScreenState::Failed {
                message: err.message(),
                previous: self.take_value(),
            },
        };
    }

    /// Show an error without dropping the current content
    pub fn fail(&mut self, err: ScreenError) {
        let message = err.message();
        let previous = self.take_value();
        *self = ScreenState::Failed { message, previous };
    }

    /// Content currently on screen, fresh or kept from before a failure
    pub fn value(&self) -> Option<&T> {
        match self {
            ScreenState::Loaded(value) => Some(value),
            ScreenState::Loading { previous } | ScreenState::Failed { previous, .. } => {
                previous.as_ref()
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ScreenState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ScreenState::Loading { .. })
    }

    fn take_value(&mut self) -> Option<T> {
        match std::mem::take(self) {
            ScreenState::Loaded(value) => Some(value),
            ScreenState::Loading { previous } | ScreenState::Failed { previous, .. } => previous,
        }
    }
}
