//! Templated outbound messages and `wa.me` deep links.
//!
//! A template is plain text with `{field}` placeholders drawn from the
//! canonical contact fields (`{{` and `}}` escape literal braces). Rendering
//! is all-or-nothing: an unknown placeholder fails with its name, nothing is
//! partially applied. The deep-link builder produces the bit-exact
//! `https://wa.me/<digits>?text=<encoded>` contract the chat app expects.

use url::form_urlencoded;

use crate::db::{Contact, CrmDb, NewActivity};
use crate::error::CrmError;

/// Country calling code substituted for a leading `0` (South African
/// numbers).
const DEFAULT_CALLING_CODE: &str = "27";

/// Substitute `{field}` placeholders with the contact's values.
///
/// Empty fields render as empty strings; a placeholder that names no contact
/// field is an error carrying the offending name. `{{`/`}}` emit literal
/// braces.
pub fn render_template(template: &str, contact: &Contact) -> Result<String, CrmError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(CrmError::BadTemplate(format!(
                                "unclosed placeholder {{{}", name
                            )))
                        }
                    }
                }
                match contact.field(&name) {
                    Some(value) => out.push_str(value),
                    None => return Err(CrmError::UnknownPlaceholder(name)),
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(CrmError::BadTemplate("unmatched '}'".to_string()));
                }
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Build a WhatsApp deep link for a raw phone number and message text.
///
/// Non-digit characters are stripped; a leading `0` is rewritten to the
/// country calling code. A phone that reduces to no digits still produces a
/// (useless) link — validation is the caller's concern, not this function's.
pub fn wa_link(phone_raw: &str, text: &str) -> String {
    let mut digits: String = phone_raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix('0') {
        digits = format!("{}{}", DEFAULT_CALLING_CODE, rest);
    }
    let encoded: String = form_urlencoded::byte_serialize(text.as_bytes()).collect();
    format!("https://wa.me/{}?text={}", digits, encoded)
}

/// Render a template for a contact and build the deep link to send it.
pub fn wa_link_for_contact(template: &str, contact: &Contact) -> Result<String, CrmError> {
    let message = render_template(template, contact)?;
    Ok(wa_link(&contact.phone, &message))
}

/// Log a sent WhatsApp message against the contact's activity trail. The
/// full rendered text goes into the details column.
pub fn log_whatsapp_activity(
    db: &CrmDb,
    contact: &Contact,
    message: &str,
) -> Result<i64, CrmError> {
    db.insert_activity(&NewActivity {
        contact_id: Some(contact.id),
        kind: "whatsapp".to_string(),
        summary: "Sent template".to_string(),
        details: message.to_string(),
        ..Default::default()
    })
}
