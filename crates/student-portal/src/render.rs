//! Text rendering for the terminal front end.

use triage::{ClassificationResult, ComplaintForm, Role, Turn, KNOWN_CATEGORIES};

pub const CHAT_HELP: &str = "\
Commands:
  <text>        send a message to the assistant
  /complaint    open the complaint form (with or without a chat)
  /new          start a new chat
  /export       print the transcript as JSON
  /help         show this help
  /quit         leave the portal
";

pub const FORM_HELP: &str = "\
Form commands:
  <text>            append text to the complaint
  /body <text>      replace the complaint text
  /name <name>      change the name on the complaint
  /category [hint]  set a category hint, or clear it
  /show             show the current draft
  /submit           file the complaint
  /cancel           back to the chat
  /quit             leave the portal
";

pub fn turn(turn: &Turn) -> String {
    let speaker = match turn.role() {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    if turn.escalation_offered() {
        format!("{}> {}\n  (type /complaint to continue)\n", speaker, turn.text())
    } else {
        format!("{}> {}\n", speaker, turn.text())
    }
}

pub fn draft(form: &ComplaintForm) -> String {
    let draft = form.draft();
    let mut out = String::from("--- Complaint ---\n");
    if form.based_on_chat() {
        out.push_str("(Based on your chat conversation)\n");
    }
    out.push_str(&format!("Name: {}\n", draft.requester_name()));
    out.push_str(&format!("Student ID: {}\n", draft.requester_id()));
    out.push_str(&format!(
        "Category: {}\n",
        draft.category().unwrap_or("(auto-detect)")
    ));
    out.push_str(&format!("Complaint: {}\n", draft.body_text()));
    out.push_str(&format!("Known categories: {}\n", KNOWN_CATEGORIES.join(", ")));
    out
}

pub fn result(result: &ClassificationResult) -> String {
    match result {
        Ok(filed) => format!(
            "Complaint Submitted Successfully!\n  Complaint ID: #{}\n  Category: {}\n  Priority: {}\n  Status: {}\n",
            filed.complaint_id, filed.category, filed.priority, filed.status
        ),
        Err(e) => format!("Error: {}\n", e),
    }
}
