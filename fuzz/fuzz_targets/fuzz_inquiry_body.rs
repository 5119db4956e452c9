//! Fuzz target: JSON deserialization and validation of `Inquiry`.
//!
//! Arbitrary bytes posted to `/api/send-email` must never panic the
//! parser or the strict validator.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pitcs_core::Inquiry;

fuzz_target!(|data: &[u8]| {
    if let Ok(inquiry) = serde_json::from_slice::<Inquiry>(data) {
        let _ = inquiry.validate();
    }
});
