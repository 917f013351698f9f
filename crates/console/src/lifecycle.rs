//! Lifecycle controller: create, update, delete and activation flows of one
//! screen, written once for every [`Managed`] kind.
//!
//! Every action runs validate → guard → remote → refetch to completion. The
//! controller never touches the list on failure; the only side effects are
//! remote calls, cache invalidation and notifications.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use supplydesk_access::{Permission, Role, User};
use supplydesk_core::{EntityKind, FieldErrors};

use crate::capability::{Capabilities, NotificationKind};
use crate::error::{ConsoleError, ConsoleResult};
use crate::guard::{self, GuardDecision};
use crate::inflight::{InFlight, OpTarget, Stage};
use crate::managed::Managed;
use crate::projection::{ListProjection, ListView};
use crate::store::DataStore;
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Update,
}

/// Where the screen's edit surface is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Browsing,
    Editing(EditMode),
    Persisting(EditMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The operator answered "no"; nothing was sent.
    Declined,
}

#[derive(Debug)]
struct EditSession<D> {
    mode: EditMode,
    draft: D,
    persisting: bool,
}

#[derive(Debug)]
struct ScreenState<E: Managed> {
    edit: Option<EditSession<E::Draft>>,
    details: Option<E>,
    errors: FieldErrors,
    projection: ListProjection<E>,
}

/// Kinds whose cached lists embed data of `kind` and go stale with it.
fn related_kinds(kind: EntityKind) -> &'static [EntityKind] {
    match kind {
        // Roles carry their users; users show their role's name.
        EntityKind::User => &[EntityKind::Role],
        EntityKind::Role => &[EntityKind::User],
        EntityKind::Category => &[],
    }
}

pub struct LifecycleController<E: Managed> {
    store: Arc<DataStore>,
    caps: Capabilities,
    inflight: Arc<InFlight>,
    state: Mutex<ScreenState<E>>,
}

impl<E: Managed> core::fmt::Debug for LifecycleController<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("kind", &E::KIND)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl<E: Managed> LifecycleController<E> {
    pub fn new(store: Arc<DataStore>, caps: Capabilities, inflight: Arc<InFlight>, page_size: usize) -> Self {
        Self {
            store,
            caps,
            inflight,
            state: Mutex::new(ScreenState {
                edit: None,
                details: None,
                errors: FieldErrors::new(),
                projection: ListProjection::new(page_size),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ScreenState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, kind: NotificationKind, message: &str) {
        self.caps.notify.notify(kind, message);
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Never list the entity with this id (e.g. the signed-in user).
    pub fn hide(&self, id: Option<E::Id>) {
        self.state().projection.hide(id);
    }

    // ---- list ----

    /// Load the list (from cache when valid) and return the current page.
    pub async fn load(&self) -> ConsoleResult<ListView<E>> {
        let snapshot = self.store.snapshot::<E>().await.map_err(|err| {
            tracing::error!(kind = %E::KIND, error = %err, "failed to load list");
            ConsoleError::from(err)
        })?;
        let mut state = self.state();
        state.projection.set_source(snapshot.shared());
        Ok(state.projection.view().clone())
    }

    /// Drop the cached list and fetch it again.
    pub async fn reload(&self) -> ConsoleResult<ListView<E>> {
        self.store.invalidate(E::KIND);
        self.load().await
    }

    pub fn view(&self) -> ListView<E> {
        self.state().projection.view().clone()
    }

    /// Every loaded entity, ignoring search and paging.
    pub fn loaded(&self) -> Vec<E> {
        self.state().projection.source().to_vec()
    }

    pub fn set_search(&self, search: &str) -> ListView<E> {
        let mut state = self.state();
        state.projection.set_search(search);
        state.projection.view().clone()
    }

    pub fn go_to_page(&self, page: usize) -> ListView<E> {
        let mut state = self.state();
        state.projection.set_page(page);
        state.projection.view().clone()
    }

    async fn refetch_after_mutation(&self) {
        self.store.invalidate(E::KIND);
        for related in related_kinds(E::KIND) {
            self.store.invalidate(*related);
        }
        match self.store.snapshot::<E>().await {
            Ok(snapshot) => self.state().projection.set_source(snapshot.shared()),
            Err(err) => tracing::warn!(kind = %E::KIND, error = %err, "refetch after mutation failed"),
        }
    }

    // ---- edit surface ----

    pub fn phase(&self) -> Phase {
        match &self.state().edit {
            None => Phase::Browsing,
            Some(session) if session.persisting => Phase::Persisting(session.mode),
            Some(session) => Phase::Editing(session.mode),
        }
    }

    pub fn open_create(&self) -> ConsoleResult<()> {
        self.open_session(EditMode::Create, E::blank_draft())
    }

    /// Open `entity` in a detached edit buffer.
    pub fn open_edit(&self, entity: &E) -> ConsoleResult<()> {
        if !entity.is_active() {
            return Err(ConsoleError::Inactive(E::KIND));
        }
        self.open_session(EditMode::Update, entity.to_draft())
    }

    fn open_session(&self, mode: EditMode, draft: E::Draft) -> ConsoleResult<()> {
        let mut state = self.state();
        if state.edit.as_ref().is_some_and(|s| s.persisting) {
            return Err(ConsoleError::Busy(E::KIND));
        }
        state.edit = Some(EditSession {
            mode,
            draft,
            persisting: false,
        });
        state.errors = FieldErrors::new();
        Ok(())
    }

    /// Change the buffer; the error shown for `field` is cleared.
    pub fn edit<F>(&self, field: &str, change: F) -> ConsoleResult<()>
    where
        F: FnOnce(&mut E::Draft),
    {
        let mut state = self.state();
        let session = state.edit.as_mut().ok_or(ConsoleError::NoEditSession)?;
        if session.persisting {
            return Err(ConsoleError::Busy(E::KIND));
        }
        change(&mut session.draft);
        state.errors.clear_field(field);
        Ok(())
    }

    pub fn draft(&self) -> Option<E::Draft> {
        self.state().edit.as_ref().map(|s| s.draft.clone())
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.state().errors.clone()
    }

    pub fn cancel_edit(&self) -> ConsoleResult<()> {
        let mut state = self.state();
        if state.edit.as_ref().is_some_and(|s| s.persisting) {
            return Err(ConsoleError::Busy(E::KIND));
        }
        state.edit = None;
        state.errors = FieldErrors::new();
        Ok(())
    }

    /// Validate the buffer and persist it.
    ///
    /// On validation failure the errors are kept on the screen and nothing
    /// is sent. On remote failure the buffer stays open and intact.
    pub async fn save(&self) -> ConsoleResult<EditMode> {
        let messages = E::messages();

        let (mode, draft, _running) = {
            let mut state = self.state();
            let session = state.edit.as_ref().ok_or(ConsoleError::NoEditSession)?;
            if session.persisting {
                return Err(ConsoleError::Busy(E::KIND));
            }
            let (mode, draft) = (session.mode, session.draft.clone());

            let errors = validation::validate(&E::tag_draft(draft.clone()));
            if !errors.is_empty() {
                tracing::debug!(kind = %E::KIND, %errors, "edit buffer rejected");
                state.errors = errors.clone();
                drop(state);
                if let Some(message) = messages.invalid_form {
                    self.notify(NotificationKind::Error, message);
                }
                return Err(ConsoleError::Validation(errors));
            }

            let target = match E::draft_id(&draft) {
                Some(id) => OpTarget::entity(E::KIND, id),
                None => OpTarget::Create(E::KIND),
            };
            let running = self
                .inflight
                .try_begin(target, Stage::Persisting)
                .ok_or(ConsoleError::Busy(E::KIND))?;

            state.errors = FieldErrors::new();
            if let Some(session) = state.edit.as_mut() {
                session.persisting = true;
            }
            (mode, draft, running)
        };

        let gateway = self.store.gateway::<E>();
        let result = match E::draft_id(&draft) {
            Some(id) => gateway.update(id, &draft).await,
            None => gateway.create(&draft).await,
        };

        match result {
            Ok(()) => {
                self.state().edit = None;
                self.refetch_after_mutation().await;
                let message = match mode {
                    EditMode::Create => messages.created,
                    EditMode::Update => messages.updated,
                };
                tracing::info!(kind = %E::KIND, ?mode, "saved");
                self.notify(NotificationKind::Success, message);
                Ok(mode)
            }
            Err(err) => {
                if let Some(session) = self.state().edit.as_mut() {
                    session.persisting = false;
                }
                tracing::error!(kind = %E::KIND, ?mode, error = %err, "save failed");
                self.notify(NotificationKind::Error, messages.save_failed);
                Err(ConsoleError::Transient(err))
            }
        }
    }

    // ---- details ----

    pub fn open_details(&self, entity: &E) -> ConsoleResult<()> {
        if !entity.is_active() {
            return Err(ConsoleError::Inactive(E::KIND));
        }
        self.state().details = Some(entity.clone());
        Ok(())
    }

    pub fn details(&self) -> Option<E> {
        self.state().details.clone()
    }

    pub fn close_details(&self) {
        self.state().details = None;
    }

    // ---- destructive transitions ----

    /// Ask for confirmation, then delete `entity` remotely.
    pub async fn delete(&self, entity: &E) -> ConsoleResult<DeleteOutcome> {
        if !entity.is_active() {
            return Err(ConsoleError::Inactive(E::KIND));
        }
        let messages = E::messages();
        let running = self
            .inflight
            .try_begin(OpTarget::entity(E::KIND, entity.id()), Stage::AwaitingConfirmation)
            .ok_or(ConsoleError::Busy(E::KIND))?;

        let prompt = messages.delete_prompt(entity.name());
        if !self.caps.confirm.confirm(&prompt).await {
            tracing::debug!(kind = %E::KIND, id = %entity.id(), "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        running.advance(Stage::Persisting);
        match self.store.gateway::<E>().delete(entity.id()).await {
            Ok(()) => {
                {
                    let mut state = self.state();
                    if state.details.as_ref().is_some_and(|d| d.id() == entity.id()) {
                        state.details = None;
                    }
                }
                self.refetch_after_mutation().await;
                tracing::info!(kind = %E::KIND, id = %entity.id(), "deleted");
                self.notify(NotificationKind::Success, messages.deleted);
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                let err = guard::delete_failure::<E>(err);
                match &err {
                    ConsoleError::Conflict { message } => self.notify(NotificationKind::Error, message),
                    other => {
                        tracing::error!(kind = %E::KIND, id = %entity.id(), error = %other, "delete failed");
                        self.notify(NotificationKind::Error, messages.delete_failed);
                    }
                }
                Err(err)
            }
        }
    }

    /// Flip the active flag of `entity`; returns the new state.
    ///
    /// Deactivation consults the referential guard first; a veto sends no
    /// remote patch.
    pub async fn toggle_active(&self, entity: &E) -> ConsoleResult<bool> {
        let messages = E::messages();
        let running = self
            .inflight
            .try_begin(OpTarget::entity(E::KIND, entity.id()), Stage::ToggleRequested)
            .ok_or(ConsoleError::Busy(E::KIND))?;

        if entity.is_active() {
            let decision = guard::check_deactivation(&self.store, &entity.clone().into_record())
                .await
                .map_err(|err| {
                    tracing::error!(kind = %E::KIND, id = %entity.id(), error = %err, "guard check failed");
                    self.notify(NotificationKind::Error, messages.toggle_failed);
                    ConsoleError::Transient(err)
                })?;
            if let GuardDecision::Vetoed { reason, blocking } = decision {
                self.notify(NotificationKind::Warning, &reason);
                return Err(ConsoleError::GuardVeto { reason, blocking });
            }
        }

        running.advance(Stage::Persisting);
        let next = !entity.is_active();
        match self.store.gateway::<E>().set_active(entity.id(), next).await {
            Ok(()) => {
                self.refetch_after_mutation().await;
                tracing::info!(kind = %E::KIND, id = %entity.id(), active = next, "status changed");
                self.notify(NotificationKind::Success, &messages.toggled(next));
                Ok(next)
            }
            Err(err) => {
                tracing::error!(kind = %E::KIND, id = %entity.id(), error = %err, "status change failed");
                self.notify(NotificationKind::Error, messages.toggle_failed);
                Err(ConsoleError::Transient(err))
            }
        }
    }
}

impl LifecycleController<Role> {
    /// Catalog the permission checkboxes are drawn from.
    pub async fn permission_catalog(&self) -> ConsoleResult<Arc<[Permission]>> {
        Ok(self.store.permissions().await?)
    }

    /// Check or uncheck `permission` in the open buffer; `Ok(false)` when
    /// the checkbox is locked.
    pub fn toggle_permission(&self, permission: &Permission) -> ConsoleResult<bool> {
        let mut changed = false;
        self.edit("permissions", |draft| changed = draft.toggle_permission(permission))?;
        Ok(changed)
    }
}

impl LifecycleController<User> {
    /// Display name of the user's role, `"Role not found"` when the catalog
    /// has no such role.
    pub async fn role_name(&self, user: &User) -> ConsoleResult<String> {
        let roles = self.store.role_catalog().await?;
        Ok(user.role_name(roles.items()).to_string())
    }

    /// Current page with each user's role name resolved.
    pub async fn rows_with_role_names(&self) -> ConsoleResult<Vec<(User, String)>> {
        let roles = self.store.role_catalog().await?;
        Ok(self
            .view()
            .rows
            .into_iter()
            .map(|user| {
                let role = user.role_name(roles.items()).to_string();
                (user, role)
            })
            .collect())
    }
}
