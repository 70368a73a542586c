// Change-notification fan-out
//
// Every write to the shared store produces a MatchChange. The bus fans changes
// out per match; subscriptions route them to handlers such as the sync layer
// or a live viewer feed.

// Public API - what other modules can use
pub use bus::{EventBus, DEFAULT_CHANNEL_CAPACITY};
pub use changes::MatchChange;
pub use handler::{ChangeHandlerError, MatchChangeHandler};
pub use subscription::{MatchSubscription, SubscriptionHandle};

// Internal modules
mod bus;
mod changes;
mod handler;
mod subscription;
