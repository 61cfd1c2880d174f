pub mod alternatives;
pub mod composer;
pub mod facade;
pub mod stats;
pub mod watchdog;

pub use alternatives::{AlternativeGenerator, AlternativeRules};
pub use composer::{ComposeRules, PackageComposer, SearchRequest};
pub use facade::Engine;
pub use watchdog::{DisruptionWatchdog, TickOutcome, WatchdogConfig};
