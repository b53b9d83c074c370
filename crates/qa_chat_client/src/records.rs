//! Q&A record forms. Each action reports progress and result on the shared
//! status display; a form is reset only when its action succeeds.

use std::sync::Arc;
use tracing::warn;

use crate::client::{ClientError, RecordStore};
use crate::messages::{Record, RecordDraft, RecordId};
use crate::view::StatusDisplay;

/// Add form: both fields required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddForm {
    pub question: String,
    pub answer: String,
}

/// Update form: id required, blank fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateForm {
    pub id: String,
    pub question: String,
    pub answer: String,
}

/// Delete form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteForm {
    pub id: String,
}

/// Result of one form action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOutcome {
    /// Client-side validation failed; no request, no status change.
    Skipped,
    Succeeded,
    Failed,
}

/// Status strings for one action.
struct Phrases {
    pending: &'static str,
    done: &'static str,
    failed: &'static str,
}

const ADD: Phrases = Phrases {
    pending: "Adding...",
    done: "Added successfully!",
    failed: "Error adding Q&A.",
};

const UPDATE: Phrases = Phrases {
    pending: "Updating...",
    done: "Updated successfully!",
    failed: "Error updating Q&A.",
};

const DELETE: Phrases = Phrases {
    pending: "Deleting...",
    done: "Deleted successfully!",
    failed: "Error deleting Q&A.",
};

/// CRUD surface over a [`RecordStore`].
#[derive(Clone)]
pub struct RecordDesk {
    store: Arc<dyn RecordStore>,
    status: Arc<dyn StatusDisplay>,
}

impl RecordDesk {
    pub fn new(store: Arc<dyn RecordStore>, status: Arc<dyn StatusDisplay>) -> Self {
        Self { store, status }
    }

    fn report<T>(&self, phrases: &Phrases, result: Result<T, ClientError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.status.set_status(phrases.done);
                Some(value)
            }
            Err(e) => {
                warn!(error = %e, "{}", phrases.failed);
                self.status.set_status(phrases.failed);
                None
            }
        }
    }

    pub async fn add(&self, form: &mut AddForm) -> CrudOutcome {
        let question = form.question.trim();
        let answer = form.answer.trim();
        if question.is_empty() || answer.is_empty() {
            return CrudOutcome::Skipped;
        }
        self.status.set_status(ADD.pending);
        let draft = RecordDraft::new(question, answer);
        let result = self.store.create(&draft).await;
        match self.report(&ADD, result) {
            Some(()) => {
                *form = AddForm::default();
                CrudOutcome::Succeeded
            }
            None => CrudOutcome::Failed,
        }
    }

    /// Fetches the current record, merges the form over it, then writes it back.
    pub async fn update(&self, form: &mut UpdateForm) -> CrudOutcome {
        let id = form.id.trim();
        if id.is_empty() || (form.question.trim().is_empty() && form.answer.trim().is_empty()) {
            return CrudOutcome::Skipped;
        }
        self.status.set_status(UPDATE.pending);
        let id = RecordId::new(id);
        let result = async {
            let current = self.store.get(&id).await?;
            let draft = RecordDraft::merged(&form.question, &form.answer, &current);
            self.store.update(&id, &draft).await
        }
        .await;
        match self.report(&UPDATE, result) {
            Some(()) => {
                *form = UpdateForm::default();
                CrudOutcome::Succeeded
            }
            None => CrudOutcome::Failed,
        }
    }

    pub async fn delete(&self, form: &mut DeleteForm) -> CrudOutcome {
        let id = form.id.trim();
        if id.is_empty() {
            return CrudOutcome::Skipped;
        }
        self.status.set_status(DELETE.pending);
        let result = self.store.delete(&RecordId::new(id)).await;
        match self.report(&DELETE, result) {
            Some(()) => {
                *form = DeleteForm::default();
                CrudOutcome::Succeeded
            }
            None => CrudOutcome::Failed,
        }
    }

    /// Loads every record; `None` after reporting a failure.
    pub async fn list(&self) -> Option<Vec<Record>> {
        self.status.set_status("Loading...");
        match self.store.list().await {
            Ok(records) => {
                self.status
                    .set_status(&format!("Loaded {} Q&A pairs.", records.len()));
                Some(records)
            }
            Err(e) => {
                warn!(error = %e, "listing Q&A records failed");
                self.status.set_status("Error loading Q&A.");
                None
            }
        }
    }
}
