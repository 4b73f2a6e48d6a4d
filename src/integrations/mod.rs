//! External service integrations.

pub mod openai_client {
    pub use crate::openai_client::*;
}

pub mod services {
    pub use crate::services::*;
}
