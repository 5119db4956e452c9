//! Fuzz target: HTML rendering of arbitrary inquiry text.
//!
//! User text must never introduce markup into the HTML body.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pitcs_core::Inquiry;
use pitcs_mailer::render;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data).into_owned();
    let baseline = render(&Inquiry::default()).html.matches('<').count();

    let inquiry = Inquiry {
        name: text.clone(),
        email: text.clone(),
        message: text,
        ..Inquiry::default()
    };
    let rendered = render(&inquiry);
    assert_eq!(
        rendered.html.matches('<').count(),
        baseline,
        "user text must be escaped in the HTML body"
    );
});
