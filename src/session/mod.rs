// Console session context
//
// Who is driving this console and with which role. Created once at startup
// and handed to every console; nothing reads the role from ambient state.

// Public API - what other modules can use
pub use context::ConsoleSession;
pub use role::Role;

// Internal modules
mod context;
mod role;
