//! Fixed wording of the bot's replies.

/// Keyword that selects the leave-request template.
pub const LEAVE_KEYWORD: &str = "leave";

/// Heading of the leave-request reply.
pub const LEAVE_PRETEXT: &str = "Greetings Opstrian";

/// Body of the leave-request reply.
pub const LEAVE_BODY: &str = "Hope you are doing well, Please send leave info in below format\n";

/// Title of the field holding the leave format.
pub const LEAVE_FORMAT_TITLE: &str = "Leave format";

/// The leave format the applicant is asked to fill in.
pub const LEAVE_FORMAT: &str = "Reason:\t\t\nno. of days:\t\t\nDate From:\tTo Date:\t\t\nDay:\t\t\ncc:\t\t\nAppliedOnPortal:\t\t\n";

/// Title of the field holding the applicant's name.
pub const APPLICANT_TITLE: &str = "Applicant";

/// Heading of the generic greeting.
pub const GREETING_PRETEXT: &str = "How can I be of service";

/// Body of the generic greeting; `{name}` is replaced with the user's display name.
pub const GREETING_BODY: &str = "How can I help you {name}?\n";

/// Heading of a one-shot notification.
pub const NOTIFICATION_PRETEXT: &str = "Ops bot notification";

/// Title of the field holding the notification's timestamp.
pub const NOTIFICATION_DATE_TITLE: &str = "Date";
