//! Admin dashboard: analytics, parcel management and user management.

use chrono::Utc;

use parcelhub_auth::{Role, Session, UpdateUser, User, authorize_command};
use parcelhub_client::{PageQuery, Paginated, ParcelApi, UpdateParcelPayload, UserApi};
use parcelhub_core::{Aggregate, DomainError, DomainResult, ParcelId, UserId};
use parcelhub_parcels::{
    Parcel, ParcelAnalytics, ParcelCommand, ParcelStatus, SetBlocked, UpdateStatus, admin_search,
};

use super::ViewState;
use crate::{ActionError, Notification};

pub const PARCELS_LOAD_FAILED: &str = "Failed to load parcels. Please try again later.";
pub const USERS_LOAD_FAILED: &str = "Failed to load users. Please try again later.";

/// Page size used when pulling every parcel for analytics.
pub const ANALYTICS_PAGE_LIMIT: u32 = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Analytics
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AnalyticsView {
    state: ViewState<ParcelAnalytics>,
}

impl AnalyticsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<ParcelAnalytics> {
        &self.state
    }

    /// Fetch every page of the admin listing and aggregate it.
    pub async fn load(&mut self, api: &dyn ParcelApi) {
        self.state = ViewState::Loading;
        self.state = match fetch_all_parcels(api).await {
            Ok(parcels) => ViewState::Ready(ParcelAnalytics::compute(&parcels)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load analytics");
                ViewState::Error(PARCELS_LOAD_FAILED.to_string())
            }
        };
    }
}

async fn fetch_all_parcels(api: &dyn ParcelApi) -> Result<Vec<Parcel>, parcelhub_client::ApiError> {
    let mut query = PageQuery::new(1, ANALYTICS_PAGE_LIMIT);
    let mut parcels = Vec::new();
    loop {
        let page = api.all_parcels(query).await?;
        let fetched = page.data.len();
        parcels.extend(page.data);
        if fetched == 0 || query.page >= page.meta.total_pages {
            break;
        }
        query = PageQuery::new(query.page + 1, query.limit);
    }
    Ok(parcels)
}

// ─────────────────────────────────────────────────────────────────────────────
// Parcel management
// ─────────────────────────────────────────────────────────────────────────────

/// The admin's status update dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusForm {
    pub status: Option<ParcelStatus>,
    pub location: String,
    pub note: String,
}

impl StatusForm {
    pub fn new(status: ParcelStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Blank location or note are dropped by the command itself.
    pub fn to_command(&self, parcel_id: &ParcelId, actor: Option<UserId>) -> DomainResult<UpdateStatus> {
        let status = self
            .status
            .ok_or_else(|| DomainError::validation("Status is required"))?;
        Ok(UpdateStatus {
            parcel_id: parcel_id.clone(),
            actor,
            status,
            location: Some(self.location.clone()),
            note: Some(self.note.clone()),
            occurred_at: Utc::now(),
        })
    }
}

/// Paginated, searchable list of every parcel.
#[derive(Debug, Clone)]
pub struct ManageParcelsView {
    page: PageQuery,
    search: String,
    state: ViewState<Paginated<Parcel>>,
}

impl Default for ManageParcelsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ManageParcelsView {
    pub fn new() -> Self {
        Self {
            page: PageQuery::default(),
            search: String::new(),
            state: ViewState::Idle,
        }
    }

    pub fn page(&self) -> PageQuery {
        self.page
    }

    /// Select a page; takes effect on the next [`ManageParcelsView::load`].
    pub fn set_page(&mut self, page: u32) {
        self.page = PageQuery::new(page, self.page.limit);
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn state(&self) -> &ViewState<Paginated<Parcel>> {
        &self.state
    }

    pub async fn load(&mut self, api: &dyn ParcelApi) {
        self.state = ViewState::Loading;
        self.state = match api.all_parcels(self.page).await {
            Ok(page) => ViewState::Ready(page),
            Err(err) => {
                tracing::warn!(page = self.page.page, error = %err, "failed to load parcels");
                ViewState::Error(PARCELS_LOAD_FAILED.to_string())
            }
        };
    }

    /// Current page narrowed by the search box.
    pub fn visible(&self) -> Vec<&Parcel> {
        match &self.state {
            ViewState::Ready(page) => admin_search(&page.data, &self.search),
            _ => Vec::new(),
        }
    }

    pub async fn update_status(
        &mut self,
        api: &dyn ParcelApi,
        session: &Session,
        parcel_id: &ParcelId,
        form: &StatusForm,
    ) -> Notification {
        match self.try_update_status(api, session, parcel_id, form).await {
            Ok(parcel) => {
                tracing::info!(tracking_id = %parcel.tracking_id(), status = %parcel.status(), "parcel status updated");
                self.load(api).await;
                Notification::success("Parcel status updated successfully!")
            }
            Err(err) => Notification::failure("Failed to update parcel status", &err),
        }
    }

    pub async fn toggle_block(
        &mut self,
        api: &dyn ParcelApi,
        session: &Session,
        parcel_id: &ParcelId,
    ) -> Notification {
        let was_blocked = self.find(parcel_id).map(Parcel::is_blocked).unwrap_or(false);
        match self.try_toggle_block(api, session, parcel_id).await {
            Ok(_) => {
                self.load(api).await;
                Notification::success(if was_blocked {
                    "Parcel unblocked successfully!"
                } else {
                    "Parcel blocked successfully!"
                })
            }
            Err(err) => Notification::failure("Failed to update parcel", &err),
        }
    }

    async fn try_update_status(
        &self,
        api: &dyn ParcelApi,
        session: &Session,
        parcel_id: &ParcelId,
        form: &StatusForm,
    ) -> Result<Parcel, ActionError> {
        let parcel = self.find(parcel_id)?;
        let command = form.to_command(parcel_id, session.user_id().cloned())?;
        authorize_command(session, &ParcelCommand::UpdateStatus(command.clone()))?;
        let payload = UpdateParcelPayload::status_update(parcel, command)?;
        Ok(api.update_parcel(parcel_id, &payload).await?)
    }

    async fn try_toggle_block(
        &self,
        api: &dyn ParcelApi,
        session: &Session,
        parcel_id: &ParcelId,
    ) -> Result<Parcel, ActionError> {
        let parcel = self.find(parcel_id)?;
        let payload = UpdateParcelPayload::block_toggle(parcel);
        authorize_command(session, &payload)?;
        let command = ParcelCommand::SetBlocked(SetBlocked {
            parcel_id: parcel_id.clone(),
            actor: session.user_id().cloned(),
            blocked: !parcel.is_blocked(),
            occurred_at: Utc::now(),
        });
        parcel.handle(&command)?;
        Ok(api.update_parcel(parcel_id, &payload).await?)
    }

    fn find(&self, parcel_id: &ParcelId) -> DomainResult<&Parcel> {
        self.state
            .data()
            .and_then(|page| page.data.iter().find(|p| p.id_typed() == parcel_id))
            .ok_or_else(DomainError::not_found)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User management
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ManageUsersView {
    page: PageQuery,
    search: String,
    state: ViewState<Paginated<User>>,
}

impl Default for ManageUsersView {
    fn default() -> Self {
        Self::new()
    }
}

impl ManageUsersView {
    pub fn new() -> Self {
        Self {
            page: PageQuery::default(),
            search: String::new(),
            state: ViewState::Idle,
        }
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = PageQuery::new(page, self.page.limit);
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn state(&self) -> &ViewState<Paginated<User>> {
        &self.state
    }

    pub async fn load(&mut self, api: &dyn UserApi) {
        self.state = ViewState::Loading;
        self.state = match api.all_users(self.page).await {
            Ok(page) => ViewState::Ready(page),
            Err(err) => {
                tracing::warn!(page = self.page.page, error = %err, "failed to load users");
                ViewState::Error(USERS_LOAD_FAILED.to_string())
            }
        };
    }

    pub fn visible(&self) -> Vec<&User> {
        match &self.state {
            ViewState::Ready(page) => page.data.iter().filter(|u| u.matches_search(&self.search)).collect(),
            _ => Vec::new(),
        }
    }

    /// Send `patch` for `user_id`, then reload.
    pub async fn update_user(
        &mut self,
        api: &dyn UserApi,
        session: &Session,
        user_id: &UserId,
        patch: &UpdateUser,
    ) -> Notification {
        match try_update_user(api, session, user_id, patch).await {
            Ok(user) => {
                tracing::info!(user = %user.email, "user updated");
                self.load(api).await;
                Notification::success("User updated successfully!")
            }
            Err(err) => Notification::failure("Failed to update user", &err),
        }
    }

    /// Add or remove one role on a loaded user.
    pub async fn toggle_role(
        &mut self,
        api: &dyn UserApi,
        session: &Session,
        user_id: &UserId,
        role: Role,
    ) -> Notification {
        let current = self
            .state
            .data()
            .and_then(|page| page.data.iter().find(|u| &u.id == user_id))
            .map(|u| u.roles.clone());

        let Some(current) = current else {
            let err = ActionError::from(DomainError::not_found());
            return Notification::failure("Failed to update user", &err);
        };

        let mut patch = UpdateUser::default();
        patch.toggle_role(&current, role);
        self.update_user(api, session, user_id, &patch).await
    }
}

async fn try_update_user(
    api: &dyn UserApi,
    session: &Session,
    user_id: &UserId,
    patch: &UpdateUser,
) -> Result<User, ActionError> {
    authorize_command(session, patch)?;
    if patch.is_empty() {
        return Err(DomainError::validation("Nothing to update").into());
    }
    Ok(api.update_user(user_id, patch).await?)
}
