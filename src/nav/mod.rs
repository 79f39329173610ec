//! Navigation state machine.
//!
//! - [`state`]: modes, policies, active cell and inline edits
//! - [`machine`]: pre-emption rules and generic row movement
//! - [`handlers`]: the ordered key handler chain

pub mod handlers;
pub mod machine;
pub mod state;

pub use handlers::{GenericNavigationHandler, KeyContext, KeyHandler, PreemptionHandler};
pub use machine::{navigate_target, preempt, Decision, NodeFacts};
pub use state::{EditSession, NavigationMode, NavigationPolicy, NavigationState, ParsePolicyError};
