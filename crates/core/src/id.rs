// SPDX-License-Identifier: MIT

//! ID generation.
//!
//! The source this spec was distilled from combines wall-clock + a monotonic
//! counter + a random suffix. We preserve the uniqueness property with a
//! 64-bit monotonic counter combined with a process-start nonce; collisions
//! are possible at extreme generation rates but are not a concern for this
//! workload (interactive conversational events, not a high-throughput queue).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);
static PROCESS_NONCE: OnceLock<u32> = OnceLock::new();

fn process_nonce() -> u32 {
    *PROCESS_NONCE.get_or_init(|| {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos();
        seed ^ (std::process::id())
    })
}

/// Generate an opaque, sortable-by-creation-order id with the given prefix,
/// e.g. `generate_id("ses")` -> `"ses_1n8x2k4p7q0000a1b2"`.
pub fn generate_id(prefix: &str) -> String {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{prefix}_{}{}",
        to_base36(now_ms),
        to_base36(u64::from(process_nonce()) ^ seq)
    )
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
