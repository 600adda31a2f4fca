use std::{error, fmt};

/// Input that can't describe a route. Carried inside `anyhow::Error`; callers that care can
/// `downcast_ref::<ValidationError>()`.
#[derive(Clone, PartialEq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new<I: Into<String>>(message: I) -> ValidationError {
        ValidationError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid route: {}", self.message)
    }
}

impl fmt::Debug for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Do the same thing as the Display trait
        write!(f, "{}", self)
    }
}

impl error::Error for ValidationError {}
