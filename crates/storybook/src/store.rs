//! Application state: a reducer over typed actions plus the effects that
//! keep it in sync with the gateway and settings stores.
//!
//! State changes only through [`AppState::apply`]. [`Store`] owns the state
//! and runs effects: it applies the optimistic part of an action first and
//! then performs the gateway call.

use crate::LocalSettingsStore;
use std::collections::HashSet;
use std::sync::Arc;
use storybook_core::{
    Book, BookPatch, BookSummary, ImageEngine, ListQuery, PageUpdate, Settings, SharedSettings,
    StoryRequest, ValidationResult,
};
use storybook_error::{StorybookResult, ValidationError};
use storybook_generation::{GenerationReport, Orchestrator, ProxyClient};
use storybook_interface::{BookRepository, SettingsRepository};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Wait for a shared-settings push to finish.
///
/// Returns false when the push task panicked or was cancelled.
pub async fn wait_for_push(push: JoinHandle<()>) -> bool {
    match push.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Shared settings push did not complete");
            false
        }
    }
}

/// A delete the gateway rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    /// Book id
    pub id: String,
    /// Gateway error
    pub message: String,
}

/// Everything the application shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Library listing
    pub books: Vec<BookSummary>,
    /// Book open in the editor
    pub current_book: Option<Book>,
    /// A generation is running
    pub is_generating: bool,
    /// Brand, engine and key settings
    pub settings: Settings,
    /// Ids hidden while their delete is in flight
    pub pending_deletes: HashSet<String>,
    /// Deletes that failed after the book was hidden
    pub failed_deletes: Vec<DeleteFailure>,
    /// Outcome of the last generation
    pub last_report: Option<GenerationReport>,
}

/// State transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the listing
    SetBooks(Vec<BookSummary>),
    /// Put a new book at the top of the listing
    AddBook(BookSummary),
    /// Open or close a book
    SetCurrentBook(Option<Book>),
    /// Toggle the generation flag
    SetGenerating(bool),
    /// Edit a page of the open book
    UpdatePage {
        /// Page to change
        page_number: i32,
        /// Fields to replace
        update: PageUpdate,
    },
    /// Hide a book while its delete is in flight
    MarkPendingDelete(String),
    /// The gateway deleted the book
    ConfirmDelete(String),
    /// The gateway failed to delete the book
    FailDelete {
        /// Book id
        id: String,
        /// Gateway error
        message: String,
    },
    /// Hide every book while a delete-all is in flight
    MarkAllPendingDelete,
    /// Brand name, logo icon and uploaded logo
    SetBrand {
        /// Brand name
        name: String,
        /// Built-in logo icon
        logo: String,
        /// Uploaded logo
        logo_url: String,
    },
    /// Select the image engine
    SetImageEngine(ImageEngine),
    /// Overlay the server's shared record, keeping local keys
    MergeShared(SharedSettings),
    /// Replace the user key overrides
    SetApiKeys {
        /// Gemini key
        gemini: Option<String>,
        /// Freepik key
        freepik: Option<String>,
    },
    /// Record a key validation outcome
    SetValidation(ValidationResult),
    /// Record a generation outcome
    SetReport(GenerationReport),
}

impl AppState {
    /// State with the given settings.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Apply one action.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetBooks(books) => self.books = books,
            Action::AddBook(book) => {
                self.books.retain(|b| b.id != book.id);
                self.books.insert(0, book);
            }
            Action::SetCurrentBook(book) => self.current_book = book,
            Action::SetGenerating(flag) => self.is_generating = flag,
            Action::UpdatePage {
                page_number,
                update,
            } => {
                if let Some(page) = self
                    .current_book
                    .as_mut()
                    .and_then(|book| book.page_mut(page_number))
                {
                    update.apply_to(page);
                }
            }
            Action::MarkPendingDelete(id) => {
                self.pending_deletes.insert(id);
            }
            Action::ConfirmDelete(id) => {
                self.pending_deletes.remove(&id);
                self.books.retain(|b| b.id != id);
                if self.current_book.as_ref().is_some_and(|b| b.id == id) {
                    self.current_book = None;
                }
            }
            Action::FailDelete { id, message } => {
                self.pending_deletes.remove(&id);
                self.books.retain(|b| b.id != id);
                self.failed_deletes.push(DeleteFailure { id, message });
            }
            Action::MarkAllPendingDelete => {
                self.pending_deletes
                    .extend(self.books.iter().map(|b| b.id.clone()));
            }
            Action::SetBrand {
                name,
                logo,
                logo_url,
            } => {
                self.settings.brand_name = name;
                self.settings.brand_logo = logo;
                self.settings.brand_logo_url = logo_url;
            }
            Action::SetImageEngine(engine) => self.settings.image_engine = engine,
            Action::MergeShared(shared) => self.settings.merge_shared(&shared),
            Action::SetApiKeys { gemini, freepik } => {
                self.settings.gemini_api_key = gemini.filter(|k| !k.trim().is_empty());
                self.settings.freepik_api_key = freepik.filter(|k| !k.trim().is_empty());
            }
            Action::SetValidation(result) => self.settings.last_validation = Some(result),
            Action::SetReport(report) => self.last_report = Some(report),
        }
    }

    /// Books not hidden by an in-flight delete.
    pub fn visible_books(&self) -> Vec<&BookSummary> {
        self.books
            .iter()
            .filter(|b| !self.pending_deletes.contains(&b.id))
            .collect()
    }
}

/// A delete whose gateway call is in flight.
#[derive(Debug)]
pub struct DeleteTicket {
    id: String,
    call: JoinHandle<StorybookResult<()>>,
}

impl DeleteTicket {
    /// Book being deleted.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Owns [`AppState`] and performs its effects.
pub struct Store {
    state: AppState,
    books: Arc<dyn BookRepository>,
    shared: Option<Arc<dyn SettingsRepository>>,
    local: Option<LocalSettingsStore>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Store over `books` with default settings.
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self {
            state: AppState::default(),
            books,
            shared: None,
            local: None,
        }
    }

    /// Push brand and engine changes to a shared settings record.
    pub fn with_shared_settings(mut self, shared: Arc<dyn SettingsRepository>) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Load settings from, and persist them to, `local`.
    pub fn with_local_settings(mut self, local: LocalSettingsStore) -> Self {
        self.state.settings = local.load();
        self.local = Some(local);
        self
    }

    /// Current state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply an in-memory-only action.
    pub fn dispatch(&mut self, action: Action) {
        self.state.apply(action);
    }

    /// Reload the listing.
    ///
    /// # Errors
    ///
    /// Gateway failures.
    #[instrument(skip(self))]
    pub async fn refresh_books(&mut self, query: &ListQuery) -> StorybookResult<()> {
        let books = self.books.list_books(query).await?;
        debug!(count = books.len(), "Books loaded");
        self.dispatch(Action::SetBooks(books));
        Ok(())
    }

    /// Open a book in the editor.
    ///
    /// # Errors
    ///
    /// Gateway failures, including not-found.
    #[instrument(skip(self))]
    pub async fn open_book(&mut self, id: &str) -> StorybookResult<()> {
        let book = self.books.get_book(id).await?;
        self.dispatch(Action::SetCurrentBook(Some(book)));
        Ok(())
    }

    /// Generate a book and open it.
    ///
    /// The generation flag is set for the duration of the call, whatever
    /// the outcome.
    ///
    /// # Errors
    ///
    /// Drafting or saving failures from the orchestrator.
    #[instrument(skip(self, request, orchestrator), fields(theme = %request.theme))]
    pub async fn generate_book(
        &mut self,
        request: &StoryRequest,
        orchestrator: &Orchestrator,
    ) -> StorybookResult<GenerationReport> {
        self.dispatch(Action::SetGenerating(true));
        let result = orchestrator.generate(request).await;
        self.dispatch(Action::SetGenerating(false));

        let report = result?;
        let book = report.book().clone();
        self.dispatch(Action::AddBook(book.summary()));
        self.dispatch(Action::SetCurrentBook(Some(book)));
        self.dispatch(Action::SetReport(report.clone()));
        Ok(report)
    }

    /// Save the open book, pages included.
    ///
    /// # Errors
    ///
    /// A validation error when no book is open; gateway failures otherwise.
    #[instrument(skip(self))]
    pub async fn save_current_book(&mut self) -> StorybookResult<Book> {
        let book = self
            .state
            .current_book
            .as_ref()
            .ok_or_else(|| ValidationError::new("no book is open"))?;
        let patch = BookPatch {
            title: Some(book.title.clone()),
            theme: Some(book.theme.clone()),
            target_age: Some(book.target_age.clone()),
            moral_value: Some(book.moral_value.clone()),
            cover_image_url: book.cover_image_url.clone(),
            pages: Some(book.pages.clone()),
        };
        let saved = self.books.update_book(&book.id, &patch).await?;
        info!(book_id = %saved.id, "Book saved");
        self.dispatch(Action::SetCurrentBook(Some(saved.clone())));
        Ok(saved)
    }

    /// Redraw one page of the open book with its current prompt.
    ///
    /// The new image is applied in memory only; call
    /// [`Store::save_current_book`] to persist it.
    ///
    /// # Errors
    ///
    /// A validation error when the page does not exist; image engine failures.
    #[instrument(skip(self, orchestrator))]
    pub async fn regenerate_page_image(
        &mut self,
        page_number: i32,
        orchestrator: &Orchestrator,
    ) -> StorybookResult<String> {
        let prompt = self
            .state
            .current_book
            .as_ref()
            .and_then(|book| book.page(page_number))
            .map(|page| page.image_prompt.clone())
            .ok_or_else(|| ValidationError::new(format!("page {} is not open", page_number)))?;

        let image_url = orchestrator.regenerate_page_image(&prompt).await?;
        self.dispatch(Action::UpdatePage {
            page_number,
            update: PageUpdate {
                image_url: Some(image_url.clone()),
                ..PageUpdate::default()
            },
        });
        Ok(image_url)
    }

    /// Hide a book and start deleting it.
    ///
    /// The book disappears from [`AppState::visible_books`] immediately.
    pub fn begin_delete(&mut self, id: &str) -> DeleteTicket {
        self.dispatch(Action::MarkPendingDelete(id.to_string()));
        let books = self.books.clone();
        let owned = id.to_string();
        let call = tokio::spawn(async move { books.delete_book(&owned).await });
        DeleteTicket {
            id: id.to_string(),
            call,
        }
    }

    /// Settle a delete started with [`Store::begin_delete`].
    ///
    /// Returns whether the gateway confirmed it. A failed delete stays
    /// hidden until the next refresh and is recorded in
    /// [`AppState::failed_deletes`].
    pub async fn complete_delete(&mut self, ticket: DeleteTicket) -> bool {
        let outcome = match ticket.call.await {
            Ok(result) => result.map_err(|e| e.message()),
            Err(e) => Err(e.to_string()),
        };
        match outcome {
            Ok(()) => {
                self.dispatch(Action::ConfirmDelete(ticket.id));
                true
            }
            Err(message) => {
                warn!(book_id = %ticket.id, error = %message, "Delete failed");
                self.dispatch(Action::FailDelete {
                    id: ticket.id,
                    message,
                });
                false
            }
        }
    }

    /// Delete one book optimistically.
    #[instrument(skip(self))]
    pub async fn delete_book(&mut self, id: &str) -> bool {
        let ticket = self.begin_delete(id);
        self.complete_delete(ticket).await
    }

    /// Delete every book optimistically.
    ///
    /// Returns the number removed, or `None` when the gateway failed.
    #[instrument(skip(self))]
    pub async fn delete_all_books(&mut self) -> Option<usize> {
        self.dispatch(Action::MarkAllPendingDelete);
        let ids: Vec<String> = self.state.pending_deletes.iter().cloned().collect();
        match self.books.delete_all_books().await {
            Ok(deleted) => {
                for id in ids {
                    self.dispatch(Action::ConfirmDelete(id));
                }
                self.dispatch(Action::SetBooks(Vec::new()));
                self.dispatch(Action::SetCurrentBook(None));
                info!(deleted, "All books deleted");
                Some(deleted)
            }
            Err(e) => {
                warn!(error = %e.message(), "Delete all failed");
                for id in ids {
                    self.dispatch(Action::FailDelete {
                        id,
                        message: e.message(),
                    });
                }
                None
            }
        }
    }

    /// Change the brand, persist locally and push to the shared record.
    pub fn set_brand(
        &mut self,
        name: impl Into<String>,
        logo: impl Into<String>,
        logo_url: impl Into<String>,
    ) -> Option<JoinHandle<()>> {
        self.dispatch(Action::SetBrand {
            name: name.into(),
            logo: logo.into(),
            logo_url: logo_url.into(),
        });
        self.persist_local();
        self.push_shared()
    }

    /// Select the image engine, persist locally and push to the shared record.
    pub fn set_image_engine(&mut self, engine: ImageEngine) -> Option<JoinHandle<()>> {
        self.dispatch(Action::SetImageEngine(engine));
        self.persist_local();
        self.push_shared()
    }

    /// Replace the user key overrides. Keys are only stored locally.
    pub fn set_api_keys(&mut self, gemini: Option<String>, freepik: Option<String>) {
        self.dispatch(Action::SetApiKeys { gemini, freepik });
        self.persist_local();
    }

    /// Check a Gemini key through the proxy and record the outcome.
    pub async fn validate_gemini_key(&mut self, client: &ProxyClient, key: &str) -> ValidationResult {
        let result = client.validate_gemini_key(key).await;
        self.dispatch(Action::SetValidation(result.clone()));
        self.persist_local();
        result
    }

    /// Overlay the shared record onto local settings.
    ///
    /// # Errors
    ///
    /// Gateway failures. Without a shared repository this does nothing.
    pub async fn load_shared_settings(&mut self) -> StorybookResult<()> {
        let Some(shared) = &self.shared else {
            return Ok(());
        };
        if let Some(record) = shared.load_shared().await? {
            self.dispatch(Action::MergeShared(record));
            self.persist_local();
        }
        Ok(())
    }

    fn persist_local(&self) {
        if let Some(local) = &self.local {
            match local.save(&self.state.settings) {
                Ok(outcome) => debug!(?outcome, "Settings persisted"),
                Err(e) => warn!(error = %e, "Failed to persist settings"),
            }
        }
    }

    fn push_shared(&self) -> Option<JoinHandle<()>> {
        let shared = self.shared.clone()?;
        let record = self.state.settings.shared();
        Some(tokio::spawn(async move {
            if let Err(e) = shared.save_shared(&record).await {
                warn!(error = %e.message(), "Failed to push shared settings");
            }
        }))
    }
}
