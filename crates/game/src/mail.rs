use std::sync::Mutex;

/// Interface to the mail queue collaborator.
///
/// The rank subsystem emits one templated message per rank change; the
/// transport behind this trait lives outside the workspace.
pub trait MailQueue: Send + Sync {
    /// Queue one templated message. `unique_id` collapses duplicate
    /// notifications, `parameters` fill the template, `to` lists
    /// `user:<id>` addresses.
    fn send(&self, template: &str, unique_id: &str, parameters: &[(String, String)], to: &[String]);
}

/// Mail queue that drops everything.
#[derive(Debug, Default)]
pub struct NullMailQueue;

impl MailQueue for NullMailQueue {
    fn send(&self, _: &str, _: &str, _: &[(String, String)], _: &[String]) {}
}

/// One captured message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMail {
    pub template: String,
    pub unique_id: String,
    pub parameters: Vec<(String, String)>,
    pub to: Vec<String>,
}

/// Mail queue that records messages for inspection in tests.
#[derive(Debug, Default)]
pub struct MemoryMailQueue {
    messages: Mutex<Vec<CapturedMail>>,
}

impl MemoryMailQueue {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn messages(&self) -> Vec<CapturedMail> {
        self.messages.lock().unwrap().clone()
    }
}

impl MailQueue for MemoryMailQueue {
    fn send(&self, template: &str, unique_id: &str, parameters: &[(String, String)], to: &[String]) {
        self.messages.lock().unwrap().push(CapturedMail {
            template: template.to_string(),
            unique_id: unique_id.to_string(),
            parameters: parameters.to_vec(),
            to: to.to_vec(),
        });
    }
}
