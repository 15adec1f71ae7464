//! Two-step delete confirmation

use pb_client::ContactId;

/// Pending delete target.
///
/// Requesting a delete only records the target; the DELETE call happens
/// when the prompt is confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletePrompt {
    target: Option<ContactId>,
}

impl DeletePrompt {
    /// Open the prompt for `id`, replacing any earlier target
    pub fn request(&mut self, id: ContactId) {
        self.target = Some(id);
    }

    pub fn cancel(&mut self) {
        self.target = None;
    }

    pub fn target(&self) -> Option<ContactId> {
        self.target
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_cancel() {
        let mut prompt = DeletePrompt::default();
        assert!(!prompt.is_open());

        prompt.request(ContactId(4));
        prompt.request(ContactId(5));
        assert_eq!(prompt.target(), Some(ContactId(5)));

        prompt.cancel();
        assert_eq!(prompt.target(), None);
    }
}
