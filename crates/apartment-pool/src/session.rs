//! Browsing session: view state, reservations and the catalog in one place.
//!
//! [`ViewState`] is plain data changed only through [`apply`]. [`Session`] owns
//! the catalog, the reservation store and the current view state, and is the
//! single place where reservation requests are checked against the catalog.
//!
//! A session is created with [`Session::hydrate`], which reads persisted
//! reservations before anything is rendered.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::catalog::{Apartment, ApartmentId, Catalog, Section};
use crate::error::{Error, Result};
use crate::query::{
    self, EffectiveStatus, FloorSelection, FloorView, Query, Stats, StatusFilter,
};
use crate::reservations::{LoadReport, ReservationStore};
use crate::storage::StateBackend;

/// Which floor plan drawing is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanDrawing {
    /// Floor 1.
    FirstFloor,
    /// Floors 2-15.
    TypicalFloor,
}

/// Everything the user has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Section, floor and status filters.
    pub query: Query,
    /// Apartment whose details are open.
    pub selected_apartment: Option<ApartmentId>,
    /// Drawing that is open.
    pub selected_plan: Option<PlanDrawing>,
}

/// A user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Switch section; resets the floor filter and closes the open apartment.
    SelectSection(Section),
    /// Change the floor filter.
    SelectFloor(FloorSelection),
    /// Change the status filter.
    SelectStatus(StatusFilter),
    /// Open an apartment's details.
    OpenApartment(ApartmentId),
    /// Close the apartment details.
    CloseApartment,
    /// Open a floor plan drawing.
    OpenPlan(PlanDrawing),
    /// Close the drawing.
    ClosePlan,
}

/// Next view state after `action`.
#[must_use]
pub fn apply(state: &ViewState, action: Action) -> ViewState {
    let mut next = *state;
    match action {
        Action::SelectSection(section) => {
            next.query.section = section;
            next.query.floor = FloorSelection::All;
            next.selected_apartment = None;
        }
        Action::SelectFloor(floor) => next.query.floor = floor,
        Action::SelectStatus(status) => next.query.status = status,
        Action::OpenApartment(id) => next.selected_apartment = Some(id),
        Action::CloseApartment => next.selected_apartment = None,
        Action::OpenPlan(plan) => next.selected_plan = Some(plan),
        Action::ClosePlan => next.selected_plan = None,
    }
    next
}

/// One apartment together with its reservation state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApartmentDetails<'a> {
    /// Catalog entry.
    pub apartment: &'a Apartment,
    /// Effective status.
    pub status: EffectiveStatus,
    /// Buyer, if reserved locally.
    pub buyer: Option<&'a str>,
    /// When it was reserved, if known.
    pub reserved_at: Option<DateTime<Utc>>,
}

/// Everything needed to render the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View<'a> {
    /// Selected section.
    pub section: Section,
    /// Selected floor.
    #[serde(serialize_with = "serialize_display")]
    pub floor: FloorSelection,
    /// Floors with at least one matching apartment.
    pub floors: Vec<FloorView<'a>>,
    /// Counts for the selected section.
    pub section_stats: Stats,
    /// Counts for the building.
    pub building_stats: Stats,
    /// Floors that can be selected.
    pub floor_options: Vec<u8>,
    /// Details of the open apartment.
    pub selected_apartment: Option<ApartmentDetails<'a>>,
    /// Path of the open drawing.
    pub selected_plan_image: Option<String>,
}

fn serialize_display<T: std::fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Catalog, reservations and view state of one user.
#[derive(Debug)]
pub struct Session<B> {
    catalog: Catalog,
    store: ReservationStore<B>,
    state: ViewState,
}

impl<B: StateBackend + 'static> Session<B> {
    /// Load persisted reservations and build a session.
    ///
    /// The backend is read on a blocking task; the returned future resolves
    /// once the store holds the persisted map. Unreadable state yields an
    /// empty store, described in the returned [`LoadReport`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the loading task itself could not run.
    pub async fn hydrate(
        catalog: Catalog,
        backend: B,
        key: impl Into<String>,
    ) -> Result<(Self, LoadReport)> {
        let key = key.into();
        let fingerprint = catalog.fingerprint();

        let (store, report) = tokio::task::spawn_blocking(move || {
            let mut store = ReservationStore::new(backend, key).with_catalog_fingerprint(fingerprint);
            let report = store.load();
            (store, report)
        })
        .await
        .map_err(|e| Error::internal(format!("reservation loading task failed: {e}")))?;

        debug!(reservations = store.len(), "Session hydrated");
        Ok((Self::new(catalog, store), report))
    }
}

impl<B: StateBackend> Session<B> {
    /// Build a session around an already loaded store.
    pub fn new(catalog: Catalog, store: ReservationStore<B>) -> Self {
        Self {
            catalog,
            store,
            state: ViewState::default(),
        }
    }

    /// Apply a user interaction to the view state.
    pub fn dispatch(&mut self, action: Action) {
        self.state = apply(&self.state, action);
    }

    /// Reserve `id` for `buyer_name`.
    ///
    /// Closes the apartment details if `id` was open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownApartment`] if `id` is not in the catalog,
    /// [`Error::ApartmentNotFree`] unless its effective status is free,
    /// [`Error::InvalidBuyerName`] for a blank name,
    /// [`Error::StateReadOnly`] if stored reservations could not be loaded,
    /// and [`Error::PersistenceWrite`] if saving failed. Nothing changes on
    /// error.
    pub fn reserve(&mut self, id: ApartmentId, buyer_name: &str) -> Result<()> {
        if self.effective_status(&id)? != EffectiveStatus::Free {
            return Err(Error::ApartmentNotFree { id: id.to_string() });
        }
        if buyer_name.trim().is_empty() {
            return Err(Error::InvalidBuyerName);
        }

        self.store.reserve(id, buyer_name)?;
        if self.state.selected_apartment == Some(id) {
            self.dispatch(Action::CloseApartment);
        }
        Ok(())
    }

    /// Reserve the apartment whose details are open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoApartmentSelected`] if none is open, otherwise the
    /// same errors as [`reserve`](Self::reserve).
    pub fn reserve_selected(&mut self, buyer_name: &str) -> Result<ApartmentId> {
        let id = self
            .state
            .selected_apartment
            .ok_or(Error::NoApartmentSelected)?;
        self.reserve(id, buyer_name)?;
        Ok(id)
    }

    /// Cancel the reservation for `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateReadOnly`] if stored reservations could not be
    /// loaded, and [`Error::PersistenceWrite`] if saving failed.
    pub fn cancel(&mut self, id: ApartmentId) -> Result<bool> {
        self.store.cancel(id)
    }
}

impl<B> Session<B> {
    /// The catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The reservation store.
    #[must_use]
    pub fn store(&self) -> &ReservationStore<B> {
        &self.store
    }

    /// The current view state.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Effective status of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownApartment`] if `id` is not in the catalog.
    pub fn effective_status(&self, id: &ApartmentId) -> Result<EffectiveStatus> {
        self.details(id).map(|d| d.status)
    }

    /// Catalog entry and reservation state of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownApartment`] if `id` is not in the catalog.
    pub fn details(&self, id: &ApartmentId) -> Result<ApartmentDetails<'_>> {
        let apartment = query::find_apartment(&self.catalog, id)
            .ok_or_else(|| Error::UnknownApartment { id: id.to_string() })?;
        let reservation = self.store.get(id);

        Ok(ApartmentDetails {
            apartment,
            status: query::effective_status(apartment, self.store.reservations()),
            buyer: reservation.map(|r| r.buyer_name.as_str()),
            reserved_at: reservation.and_then(|r| r.reserved_at),
        })
    }

    /// Reservations whose apartment is not in the current catalog.
    #[must_use]
    pub fn orphaned_reservations(&self) -> Vec<ApartmentId> {
        self.store
            .reservations()
            .keys()
            .filter(|id| !self.catalog.contains(id))
            .copied()
            .collect()
    }

    /// Render the current state.
    #[must_use]
    pub fn view(&self) -> View<'_> {
        let reservations = self.store.reservations();
        let selection = self.state.query;

        View {
            section: selection.section,
            floor: selection.floor,
            floors: query::filter_floors(&self.catalog, &selection, reservations),
            section_stats: query::section_stats(&self.catalog, selection.section, reservations),
            building_stats: query::building_stats(&self.catalog, reservations),
            floor_options: query::floor_options(&self.catalog, selection.section),
            selected_apartment: self
                .state
                .selected_apartment
                .and_then(|id| self.details(&id).ok()),
            selected_plan_image: self.state.selected_plan.map(|plan| {
                let images = selection.section.images();
                match plan {
                    PlanDrawing::FirstFloor => images.first_floor,
                    PlanDrawing::TypicalFloor => images.typical_floor,
                }
            }),
        }
    }
}
