//! Balance simulator: greedy play driven through the tick clock.
//! Run with: cargo test simulate_greedy -- --nocapture
