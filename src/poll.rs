//! Bounded busy waiting for hardware acknowledgements

/// Default number of attempts when waiting for INAK or SLAK
pub const ACK_ATTEMPTS: u32 = 0xFFFF;

/// Evaluates `condition` up to `attempts` times and returns true as soon as it holds.
///
/// There is no time base involved, so the effective timeout scales with the core clock.
pub fn wait_for<F>(attempts: u32, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    (0..attempts).any(|_| condition())
}
