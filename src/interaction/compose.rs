//! Reply templates and their composition.

use crate::base::{
    replies,
    types::{ColorCode, ReplyField, ReplyPayload, Template, UserInfo},
};

/// Selects the template for a mention's text.
///
/// Case-insensitive containment of the leave keyword selects the leave-request
/// template; anything else gets the greeting.
pub fn select_template(text: &str) -> Template {
    if text.to_lowercase().contains(replies::LEAVE_KEYWORD) {
        Template::LeaveRequest
    } else {
        Template::Greeting
    }
}

/// Builds the reply for a template and the user who mentioned the bot.
pub fn compose(template: Template, user: &UserInfo) -> ReplyPayload {
    match template {
        Template::LeaveRequest => ReplyPayload {
            pretext: replies::LEAVE_PRETEXT.to_string(),
            body: replies::LEAVE_BODY.to_string(),
            color: ColorCode::Positive,
            fields: vec![
                ReplyField::new(replies::LEAVE_FORMAT_TITLE, replies::LEAVE_FORMAT),
                ReplyField::new(replies::APPLICANT_TITLE, user.display_name.as_str()),
            ],
        },
        Template::Greeting => ReplyPayload {
            pretext: replies::GREETING_PRETEXT.to_string(),
            body: replies::GREETING_BODY.replace("{name}", &user.display_name),
            color: ColorCode::Neutral,
            fields: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserInfo {
        UserInfo {
            id: "U1".to_string(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn leave_keyword_is_case_insensitive() {
        assert_eq!(select_template("I need LEAVE tomorrow"), Template::LeaveRequest);
        assert_eq!(select_template("<@B1> please approve my Leave"), Template::LeaveRequest);
        assert_eq!(select_template("hello bot"), Template::Greeting);
        assert_eq!(select_template(""), Template::Greeting);
    }

    #[test]
    fn leave_keyword_matches_as_a_substring() {
        assert_eq!(select_template("on sick-leave"), Template::LeaveRequest);
        assert_eq!(select_template("please don't leave"), Template::LeaveRequest);
    }

    #[test]
    fn leave_template_names_the_applicant() {
        for name in ["Asha", "asha.r", "Ñandú 🦩"] {
            let payload = compose(Template::LeaveRequest, &user(name));

            assert_eq!(payload.field(replies::APPLICANT_TITLE), Some(name));
            assert_eq!(payload.field(replies::LEAVE_FORMAT_TITLE), Some(replies::LEAVE_FORMAT));
            assert_eq!(payload.pretext, replies::LEAVE_PRETEXT);
            assert_eq!(payload.color, ColorCode::Positive);
        }
    }

    #[test]
    fn leave_template_orders_format_before_applicant() {
        let payload = compose(Template::LeaveRequest, &user("Asha"));
        let titles: Vec<_> = payload.fields.iter().map(|f| f.title.as_str()).collect();

        assert_eq!(titles, [replies::LEAVE_FORMAT_TITLE, replies::APPLICANT_TITLE]);
    }

    #[test]
    fn greeting_interpolates_the_display_name() {
        let payload = compose(Template::Greeting, &user("Asha"));

        assert_eq!(payload.pretext, replies::GREETING_PRETEXT);
        assert_eq!(payload.body, "How can I help you Asha?\n");
        assert_eq!(payload.color, ColorCode::Neutral);
        assert!(payload.fields.is_empty());
    }

    #[test]
    fn composition_is_deterministic() {
        for template in [Template::LeaveRequest, Template::Greeting] {
            let first = serde_json::to_string(&compose(template, &user("Asha"))).unwrap();
            let second = serde_json::to_string(&compose(template, &user("Asha"))).unwrap();

            assert_eq!(first, second);
        }
    }
}
