//! Plain-text and HTML renderings of an inquiry.

use std::fmt::Write as _;

use pitcs_core::Inquiry;

/// Subject, plain-text body and HTML body of one inquiry email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedInquiry {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render `inquiry` for delivery.
///
/// The HTML body escapes every field; the plain-text body carries the
/// values unchanged.
#[must_use]
pub fn render(inquiry: &Inquiry) -> RenderedInquiry {
    let fields = labelled_fields(inquiry);

    let mut text = String::new();
    for (label, value) in fields {
        let _ = writeln!(text, "{label}: {value}");
    }

    let mut html = String::from("<h2>New Inquiry from Website</h2>\n");
    for (label, value) in fields {
        let _ = writeln!(html, "<p><strong>{label}:</strong> {}</p>", escape_html(value));
    }

    RenderedInquiry { subject: subject(inquiry), text, html }
}

/// `New Website Inquiry: {option} from {name}`.
#[must_use]
pub fn subject(inquiry: &Inquiry) -> String {
    format!("New Website Inquiry: {} from {}", inquiry.option, inquiry.name)
}

/// Escape the characters that are significant in HTML text and attributes.
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn labelled_fields(inquiry: &Inquiry) -> [(&'static str, &str); 6] {
    [
        ("Name", inquiry.name.as_str()),
        ("Email", inquiry.email.as_str()),
        ("Contact", inquiry.contact.as_str()),
        ("Option", inquiry.option.as_str()),
        ("Message", inquiry.message.as_str()),
        ("Timestamp", inquiry.timestamp.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn ana() -> Inquiry {
        Inquiry {
            name: "Ana".to_owned(),
            email: "ana@x.com".to_owned(),
            contact: "555-1234".to_owned(),
            option: "Sales".to_owned(),
            message: "Hi".to_owned(),
            timestamp: "2024-01-01T00:00:00Z".to_owned(),
        }
    }

    #[test]
    fn subject_names_option_and_sender() {
        assert_eq!(subject(&ana()), "New Website Inquiry: Sales from Ana");
    }

    #[test]
    fn text_body_lists_fields_in_order() {
        let rendered = render(&ana());
        assert_eq!(
            rendered.text,
            "Name: Ana\nEmail: ana@x.com\nContact: 555-1234\nOption: Sales\nMessage: Hi\n\
             Timestamp: 2024-01-01T00:00:00Z\n"
        );
    }

    #[test]
    fn html_body_has_heading_and_labelled_fields() {
        let rendered = render(&ana());
        assert!(rendered.html.starts_with("<h2>New Inquiry from Website</h2>"));
        assert!(rendered.html.contains("<p><strong>Email:</strong> ana@x.com</p>"));
        assert!(rendered.html.contains("<p><strong>Timestamp:</strong> 2024-01-01T00:00:00Z</p>"));
    }

    #[test]
    fn html_body_escapes_markup_in_fields() {
        let inquiry = Inquiry {
            message: "<script>alert('x')</script> & \"more\"".to_owned(),
            ..ana()
        };
        let rendered = render(&inquiry);
        assert!(!rendered.html.contains("<script>"), "markup must not survive escaping");
        assert!(rendered.html.contains(
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;more&quot;"
        ));
        assert!(rendered.text.contains("<script>"), "plain text is left as submitted");
    }

    #[test]
    fn blank_inquiry_renders_empty_sections() {
        let rendered = render(&Inquiry::default());
        assert_eq!(rendered.subject, "New Website Inquiry:  from ");
        assert!(rendered.text.contains("Name: \n"));
        assert!(rendered.html.contains("<p><strong>Message:</strong> </p>"));
    }

    proptest! {
        #[test]
        fn escaped_html_never_contains_angle_brackets(s in ".*") {
            let escaped = escape_html(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
        }

        #[test]
        fn user_fields_never_add_tags(name in ".*", message in ".*", option in ".*") {
            let baseline = render(&Inquiry::default()).html.matches('<').count();
            let inquiry = Inquiry { name, message, option, ..Inquiry::default() };
            prop_assert_eq!(render(&inquiry).html.matches('<').count(), baseline);
        }
    }
}
