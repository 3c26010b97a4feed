//! Data-flow contracts for the admin editors, kept free of any presentation
//! concerns: the story-creation state machine, the optimistic-removal
//! primitive used by list editors, and the single notification channel all
//! editor failures report through.

use crate::error::truncate_diagnostic;

/// One user-facing notification: a short human message, plus truncated
/// diagnostics only when the debug flag was set when it was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub diagnostic: Option<String>,
}

/// Collects editor notifications. Diagnostics are dropped unless `debug` is
/// on, so internal error structures never leak to end users by default.
#[derive(Debug, Default)]
pub struct Notifier {
    debug: bool,
    notices: Vec<Notice>,
}

impl Notifier {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            notices: Vec::new(),
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            message: message.into(),
            diagnostic: None,
        });
    }

    pub fn notify_with_detail(&mut self, message: impl Into<String>, detail: &str) {
        let diagnostic = self.debug.then(|| truncate_diagnostic(detail));
        self.notices.push(Notice {
            message: message.into(),
            diagnostic,
        });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorPhase {
    Idle,
    Uploading { completed: usize, total: usize },
    Submitting,
    Created { id: String },
    Failed,
}

impl EditorPhase {
    fn name(&self) -> &'static str {
        match self {
            EditorPhase::Idle => "idle",
            EditorPhase::Uploading { .. } => "uploading",
            EditorPhase::Submitting => "submitting",
            EditorPhase::Created { .. } => "created",
            EditorPhase::Failed => "failed",
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct InvalidTransition {
    pub from: &'static str,
    pub action: &'static str,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot {} while {}", self.action, self.from)
    }
}

impl std::error::Error for InvalidTransition {}

/// Form fields an admin fills in before submitting a story. Preserved
/// across failures so a retry never requires re-entering data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryForm {
    pub title: String,
    pub summary: String,
    pub body: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
}

/// Story-creation flow: `idle -> uploading(0..n) -> submitting ->
/// {created | failed}`, with `failed` returning to `idle` on retry.
#[derive(Debug)]
pub struct StoryEditor {
    form: StoryForm,
    phase: EditorPhase,
    uploaded: Vec<String>,
}

impl StoryEditor {
    pub fn new(form: StoryForm) -> Self {
        Self {
            form,
            phase: EditorPhase::Idle,
            uploaded: Vec::new(),
        }
    }

    pub fn phase(&self) -> &EditorPhase {
        &self.phase
    }

    pub fn form(&self) -> &StoryForm {
        &self.form
    }

    /// Image URLs gathered from completed uploads, in completion order.
    pub fn uploaded_images(&self) -> &[String] {
        &self.uploaded
    }

    /// Leave `Idle`: straight to `Submitting` when there is nothing to
    /// upload, otherwise through `Uploading`.
    pub fn begin_submit(&mut self, pending_uploads: usize) -> Result<(), InvalidTransition> {
        self.expect_phase("begin submit", &EditorPhase::Idle)?;
        self.uploaded.clear();
        self.phase = if pending_uploads == 0 {
            EditorPhase::Submitting
        } else {
            EditorPhase::Uploading {
                completed: 0,
                total: pending_uploads,
            }
        };
        Ok(())
    }

    pub fn upload_finished(&mut self, url: impl Into<String>) -> Result<(), InvalidTransition> {
        match self.phase {
            EditorPhase::Uploading { completed, total } => {
                self.uploaded.push(url.into());
                let completed = completed + 1;
                self.phase = if completed == total {
                    EditorPhase::Submitting
                } else {
                    EditorPhase::Uploading { completed, total }
                };
                Ok(())
            }
            _ => Err(self.invalid("finish an upload")),
        }
    }

    pub fn upload_failed(&mut self, notifier: &mut Notifier, detail: &str) {
        notifier.notify_with_detail("Image upload failed", detail);
        self.phase = EditorPhase::Failed;
    }

    pub fn submit_succeeded(&mut self, id: impl Into<String>) -> Result<(), InvalidTransition> {
        self.expect_phase("complete submit", &EditorPhase::Submitting)?;
        self.phase = EditorPhase::Created { id: id.into() };
        Ok(())
    }

    pub fn submit_failed(&mut self, notifier: &mut Notifier, detail: &str) {
        notifier.notify_with_detail("Could not save the story", detail);
        self.phase = EditorPhase::Failed;
    }

    /// Return from `Failed` to `Idle`. The form survives untouched.
    pub fn retry(&mut self) -> Result<(), InvalidTransition> {
        self.expect_phase("retry", &EditorPhase::Failed)?;
        self.phase = EditorPhase::Idle;
        Ok(())
    }

    fn expect_phase(
        &self,
        action: &'static str,
        expected: &EditorPhase,
    ) -> Result<(), InvalidTransition> {
        if std::mem::discriminant(&self.phase) == std::mem::discriminant(expected) {
            Ok(())
        } else {
            Err(InvalidTransition {
                from: self.phase.name(),
                action,
            })
        }
    }

    fn invalid(&self, action: &'static str) -> InvalidTransition {
        InvalidTransition {
            from: self.phase.name(),
            action,
        }
    }
}

/// A removed element that can still be put back. Dropping it commits the
/// removal; `OptimisticList::revert` restores it at its original position.
#[derive(Debug)]
pub struct Removed<T> {
    index: usize,
    item: T,
}

/// List editors remove entries locally before the server confirms, and
/// revert on error.
#[derive(Debug, Default)]
pub struct OptimisticList<T> {
    items: Vec<T>,
}

impl<T> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<Removed<T>> {
        let index = self.items.iter().position(&mut pred)?;
        Some(Removed {
            index,
            item: self.items.remove(index),
        })
    }

    pub fn revert(&mut self, removed: Removed<T>) {
        let index = removed.index.min(self.items.len());
        self.items.insert(index, removed.item);
    }

    pub fn commit(removed: Removed<T>) -> T {
        removed.item
    }
}
