pub mod mapping;
pub mod question;
pub mod taxonomy;
pub mod workspace;

pub use mapping::*;
pub use question::*;
pub use taxonomy::*;
pub use workspace::*;
