//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden (`with_target(false)`); every actor
//! log line carries an `entity_type` field instead.
//!
//! ```bash
//! # Lifecycle and state changes
//! RUST_LOG=info cargo run
//!
//! # Full request payloads
//! RUST_LOG=debug cargo run
//! ```
//!
//! With `RUST_LOG=info`, placing an order reads roughly like:
//!
//! ```text
//! INFO place_order: Sending request
//! INFO Action ok entity_type="Coupon" id=10PERCENT
//! INFO Created entity_type="Order" id=order_1 size=1
//! ```
//!
//! Failed hooks are logged at `warn` with the entity id and the error.

/// Installs the global subscriber. Calling it again is a no-op, which keeps
/// tests that share a process from panicking.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // entity_type replaces the module path
        .compact()
        .try_init();
}
