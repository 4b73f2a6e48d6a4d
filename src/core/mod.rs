// Domain-layer modules and shared errors/models
pub mod analysis {
    pub use crate::analysis::*;
}

pub mod highlights {
    pub use crate::highlights::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
