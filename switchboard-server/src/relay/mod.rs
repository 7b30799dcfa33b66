mod relay;
mod relay_command;
mod relay_handle;
mod room_registry;
mod session_table;

pub use relay::*;
pub use relay_command::*;
pub use relay_handle::*;
pub use room_registry::*;
pub use session_table::*;
