pub mod change;
pub mod history;
pub mod observation;

pub use change::*;
pub use history::*;
pub use observation::*;
