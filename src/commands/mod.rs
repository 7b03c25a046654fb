pub mod stage;
pub mod status;
pub mod watch;

pub use stage::*;
pub use status::*;
pub use watch::*;

use crate::core::registry::ConsumerId;

/// The command-line harness is the registry's only consumer
pub(crate) const CLI_CONSUMER: ConsumerId = ConsumerId(0);
