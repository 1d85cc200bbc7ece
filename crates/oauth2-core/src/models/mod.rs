pub mod error;
pub mod resource;
pub mod resources;
pub mod scope;

pub use error::*;
pub use resource::*;
pub use resources::*;
pub use scope::*;
