pub mod condition;
pub mod detector;
pub mod engine;
pub mod event;
pub mod harness;
pub mod history;
pub mod inhibit;
pub mod router;
pub mod state;

pub use condition::{Condition, ConditionKind};
pub use detector::{Detector, PredicateOutcome};
pub use engine::{AlertEngine, FiringAlert};
pub use event::{AlertEvent, AlertStatus};
pub use inhibit::{InhibitRule, Matcher};
pub use router::{AlertRouter, DispatchError, DispatchReport, Dispatcher, WebhookDispatcher};
