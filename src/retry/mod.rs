//! Retry module
//!
//! Stateless retry with constant, linear or exponential backoff. Knows nothing
//! about pagination; the engine wraps every fetch with it.

mod policy;

pub use policy::RetryPolicy;
