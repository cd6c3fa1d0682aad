//! Registration form state and reducer.
//!
//! The form is modeled as one explicit state object plus a reducer:
//! [`RegistrationForm::apply`] takes an event, updates the state, and
//! returns the async effects the embedding driver must execute. All
//! workflow rules live here, so they are testable by feeding events in
//! any order - including the orders a real network produces.
//!
//! Two rules deserve naming:
//!
//! - City-list responses carry the request token minted when their state
//!   was selected; a response whose token no longer matches the current
//!   one is discarded, so a fetch for an abandoned selection can never
//!   overwrite the list for the current one.
//! - A manual map pin always wins: once the user has tapped the map, a
//!   later geocoded position does not move the marker.

use std::collections::BTreeSet;
use std::time::Duration;

use ecoponto_core::{Coordinates, Email, ItemId, Phone, Uf};

use crate::api::{CatalogItem, PickedImage, PointSubmission};
use crate::geo::UfEntry;
use crate::location::{AcquiredPosition, CityContext, PositionError};

/// How long the success confirmation stays on screen before the UI
/// navigates back to the entry screen.
pub const CONFIRMATION_DELAY: Duration = Duration::from_secs(2);

/// Submission lifecycle of the form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    /// Accepting input.
    #[default]
    Editing,
    /// A submission is in flight; the submit control is disabled.
    Submitting,
    /// The server accepted the submission.
    Succeeded,
    /// The submission failed; the form is editable again.
    Failed(String),
}

/// Everything that can happen to the form, from the UI or from a
/// completed effect.
#[derive(Debug, Clone)]
pub enum FormEvent {
    /// The screen mounted.
    Started,
    StatesLoaded(Vec<UfEntry>),
    StatesFailed(String),
    CatalogLoaded(Vec<CatalogItem>),
    CatalogFailed(String),
    StateSelected(Uf),
    CitiesLoaded { token: u64, cities: Vec<String> },
    CitiesFailed { token: u64, reason: String },
    CitySelected(String),
    PositionAcquired(AcquiredPosition),
    PositionUnavailable(PositionError),
    MapClicked(Coordinates),
    NameChanged(String),
    EmailChanged(String),
    PhoneChanged(String),
    ItemToggled(ItemId),
    ImagePicked(PickedImage),
    SubmitRequested,
    SubmitSucceeded(ecoponto_core::PointId),
    SubmitFailed(String),
}

/// Async commands the reducer asks the driver to run.
#[derive(Debug, Clone)]
pub enum Effect {
    LoadStates,
    LoadCatalog,
    LoadCities { uf: Uf, token: u64 },
    AcquirePosition { city: Option<CityContext> },
    Submit(PointSubmission),
}

/// A per-field validation message, mirrored from the server's contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Client half of the point registration workflow.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub states: Vec<UfEntry>,
    pub states_error: Option<String>,
    pub catalog: Vec<CatalogItem>,
    pub catalog_error: Option<String>,
    pub cities: Vec<String>,
    pub cities_error: Option<String>,
    pub selected_uf: Option<Uf>,
    pub selected_city: Option<String>,
    pub selected_items: BTreeSet<ItemId>,
    pub map_position: Option<Coordinates>,
    pub picked_image: Option<PickedImage>,
    pub status: FormStatus,
    /// Set when position acquisition failed; the UI prompts for manual
    /// map placement.
    pub location_fallback: bool,
    manual_pin: bool,
    city_token: u64,
}

impl RegistrationForm {
    /// Create a pristine form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token the next `CitiesLoaded` response must carry to be applied.
    #[must_use]
    pub const fn city_token(&self) -> u64 {
        self.city_token
    }

    /// Whether the user has placed the pin by hand.
    #[must_use]
    pub const fn manual_pin(&self) -> bool {
        self.manual_pin
    }

    /// Apply one event, returning the effects to execute.
    pub fn apply(&mut self, event: FormEvent) -> Vec<Effect> {
        match event {
            FormEvent::Started => vec![
                Effect::LoadStates,
                Effect::LoadCatalog,
                Effect::AcquirePosition { city: None },
            ],

            FormEvent::StatesLoaded(states) => {
                self.states = states;
                self.states_error = None;
                Vec::new()
            }
            FormEvent::StatesFailed(reason) => {
                // Non-fatal: the catalog section keeps working, retry is
                // user-initiated.
                self.states_error = Some(reason);
                Vec::new()
            }

            FormEvent::CatalogLoaded(catalog) => {
                self.catalog = catalog;
                self.catalog_error = None;
                Vec::new()
            }
            FormEvent::CatalogFailed(reason) => {
                self.catalog_error = Some(reason);
                Vec::new()
            }

            FormEvent::StateSelected(uf) => self.select_state(uf),

            FormEvent::CitiesLoaded { token, cities } => {
                if token != self.city_token {
                    // Response for an abandoned state selection.
                    return Vec::new();
                }
                self.cities = cities;
                self.cities_error = None;

                let still_valid = self
                    .selected_city
                    .as_ref()
                    .is_some_and(|city| self.cities.contains(city));
                if self.selected_city.is_some() && !still_valid {
                    self.selected_city = None;
                    // City changed (cleared): re-run position acquisition.
                    return vec![Effect::AcquirePosition { city: None }];
                }
                Vec::new()
            }
            FormEvent::CitiesFailed { token, reason } => {
                if token == self.city_token {
                    self.cities_error = Some(reason);
                }
                Vec::new()
            }

            FormEvent::CitySelected(city) => {
                self.selected_city = Some(city.clone());
                vec![Effect::AcquirePosition {
                    city: Some(CityContext {
                        city,
                        uf: self.selected_uf,
                    }),
                }]
            }

            FormEvent::PositionAcquired(acquired) => {
                self.location_fallback = false;

                // Manual pin placement takes precedence over geocoding.
                if !self.manual_pin {
                    self.map_position = Some(acquired.position);
                }

                let mut effects = Vec::new();
                if let Some(uf) = acquired.uf
                    && self.selected_uf != Some(uf)
                {
                    effects.extend(self.select_state(uf));
                }
                if let Some(city) = acquired.city {
                    // Back-filled silently: the acquisition already
                    // supplied the position, so no re-acquisition here.
                    self.selected_city = Some(city);
                }
                effects
            }
            FormEvent::PositionUnavailable(error) => {
                tracing::debug!(%error, "position acquisition failed, manual placement");
                self.location_fallback = true;
                Vec::new()
            }

            FormEvent::MapClicked(position) => {
                self.map_position = Some(position);
                self.manual_pin = true;
                Vec::new()
            }

            FormEvent::NameChanged(name) => {
                self.name = name;
                Vec::new()
            }
            FormEvent::EmailChanged(email) => {
                self.email = email;
                Vec::new()
            }
            FormEvent::PhoneChanged(phone) => {
                self.phone = phone;
                Vec::new()
            }

            FormEvent::ItemToggled(id) => {
                if !self.selected_items.remove(&id) {
                    self.selected_items.insert(id);
                }
                Vec::new()
            }

            FormEvent::ImagePicked(image) => {
                self.picked_image = Some(image);
                Vec::new()
            }

            FormEvent::SubmitRequested => self.submit(),

            FormEvent::SubmitSucceeded(id) => {
                tracing::info!(point_id = %id, "point registered");
                self.status = FormStatus::Succeeded;
                Vec::new()
            }
            FormEvent::SubmitFailed(reason) => {
                // The form becomes editable again; no automatic retry.
                self.status = FormStatus::Failed(reason);
                Vec::new()
            }
        }
    }

    /// Per-field validation, re-stated (not re-implemented) on the server.
    #[must_use]
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let mut push = |field, message: String| errors.push(FieldError { field, message });

        if self.name.trim().is_empty() {
            push("name", "name is required".to_owned());
        }

        match self.email.trim() {
            "" => push("email", "email is required".to_owned()),
            email => {
                if let Err(e) = Email::parse(email) {
                    push("email", e.to_string());
                }
            }
        }

        // Phone is optional; pattern-checked only when present.
        let phone = self.phone.trim();
        if !phone.is_empty()
            && let Err(e) = Phone::parse(phone)
        {
            push("phone", e.to_string());
        }

        if self.selected_uf.is_none() {
            push("uf", "state is required".to_owned());
        }
        if self.selected_city.is_none() {
            push("city", "city is required".to_owned());
        }

        errors
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.status != FormStatus::Submitting && self.field_errors().is_empty()
    }

    fn select_state(&mut self, uf: Uf) -> Vec<Effect> {
        self.selected_uf = Some(uf);
        self.cities.clear();
        self.cities_error = None;
        // Mint a fresh token; any in-flight city fetch becomes stale.
        self.city_token += 1;
        vec![Effect::LoadCities {
            uf,
            token: self.city_token,
        }]
    }

    fn submit(&mut self) -> Vec<Effect> {
        if !self.can_submit() {
            return Vec::new();
        }

        let (Ok(email), Some(uf), Some(city)) = (
            Email::parse(self.email.trim()),
            self.selected_uf,
            self.selected_city.clone(),
        ) else {
            return Vec::new();
        };

        let phone = match self.phone.trim() {
            "" => None,
            raw => Phone::parse(raw).ok(),
        };

        // The original clients submit the map position as-is, defaulting
        // to the origin when neither geolocation nor a pin produced one.
        let position = self
            .map_position
            .unwrap_or(Coordinates { lat: 0.0, lon: 0.0 });

        self.status = FormStatus::Submitting;

        vec![Effect::Submit(PointSubmission {
            name: self.name.trim().to_owned(),
            email,
            phone,
            uf,
            city,
            position,
            items: self.selected_items.iter().copied().collect(),
            image: self.picked_image.clone(),
        })]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uf(code: &str) -> Uf {
        Uf::parse(code).unwrap()
    }

    fn filled_form() -> RegistrationForm {
        let mut form = RegistrationForm::new();
        form.apply(FormEvent::NameChanged("Eco Center".to_owned()));
        form.apply(FormEvent::EmailChanged("e@x.com".to_owned()));
        form.apply(FormEvent::PhoneChanged("11999999999".to_owned()));
        form.apply(FormEvent::StateSelected(uf("SP")));
        let token = form.city_token();
        form.apply(FormEvent::CitiesLoaded {
            token,
            cities: vec!["São Paulo".to_owned(), "Campinas".to_owned()],
        });
        form.apply(FormEvent::CitySelected("São Paulo".to_owned()));
        form.apply(FormEvent::MapClicked(
            Coordinates::new(-23.5, -46.6).unwrap(),
        ));
        form.apply(FormEvent::ItemToggled(ItemId::new(1)));
        form.apply(FormEvent::ItemToggled(ItemId::new(3)));
        form
    }

    #[test]
    fn test_start_loads_lists_and_acquires_position() {
        let mut form = RegistrationForm::new();
        let effects = form.apply(FormEvent::Started);

        assert!(matches!(effects.first(), Some(Effect::LoadStates)));
        assert!(effects.iter().any(|e| matches!(e, Effect::LoadCatalog)));
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::AcquirePosition { city: None }))
        );
    }

    #[test]
    fn test_list_failures_are_independent_and_recoverable() {
        let mut form = RegistrationForm::new();
        form.apply(FormEvent::Started);
        form.apply(FormEvent::StatesFailed("timeout".to_owned()));
        form.apply(FormEvent::CatalogLoaded(vec![CatalogItem {
            id: ItemId::new(1),
            title: "Lâmpadas".to_owned(),
            image_url: "http://localhost:3333/uploads/lampadas.svg".to_owned(),
        }]));

        assert_eq!(form.states_error.as_deref(), Some("timeout"));
        assert_eq!(form.catalog.len(), 1);
        assert!(form.catalog_error.is_none());
    }

    #[test]
    fn test_stale_city_response_is_discarded() {
        let mut form = RegistrationForm::new();

        form.apply(FormEvent::StateSelected(uf("SP")));
        let sp_token = form.city_token();
        form.apply(FormEvent::StateSelected(uf("RJ")));
        let rj_token = form.city_token();

        // SP's response arrives after RJ was selected: discard it.
        form.apply(FormEvent::CitiesLoaded {
            token: sp_token,
            cities: vec!["São Paulo".to_owned()],
        });
        assert!(form.cities.is_empty());

        form.apply(FormEvent::CitiesLoaded {
            token: rj_token,
            cities: vec!["Rio de Janeiro".to_owned()],
        });
        assert_eq!(form.cities, vec!["Rio de Janeiro".to_owned()]);
    }

    #[test]
    fn test_stale_city_failure_is_discarded() {
        let mut form = RegistrationForm::new();
        form.apply(FormEvent::StateSelected(uf("SP")));
        let sp_token = form.city_token();
        form.apply(FormEvent::StateSelected(uf("RJ")));

        form.apply(FormEvent::CitiesFailed {
            token: sp_token,
            reason: "timeout".to_owned(),
        });
        assert!(form.cities_error.is_none());
    }

    #[test]
    fn test_selected_city_cleared_when_absent_from_fresh_list() {
        let mut form = RegistrationForm::new();
        form.apply(FormEvent::StateSelected(uf("SP")));
        let token = form.city_token();
        form.apply(FormEvent::CitiesLoaded {
            token,
            cities: vec!["São Paulo".to_owned()],
        });
        form.apply(FormEvent::CitySelected("São Paulo".to_owned()));

        form.apply(FormEvent::StateSelected(uf("RJ")));
        let token = form.city_token();
        let effects = form.apply(FormEvent::CitiesLoaded {
            token,
            cities: vec!["Rio de Janeiro".to_owned()],
        });

        assert!(form.selected_city.is_none());
        // The cleared city re-runs position acquisition.
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::AcquirePosition { city: None }))
        );
    }

    #[test]
    fn test_item_toggle_twice_restores_original_set() {
        let mut form = RegistrationForm::new();
        let original = form.selected_items.clone();

        form.apply(FormEvent::ItemToggled(ItemId::new(2)));
        assert!(form.selected_items.contains(&ItemId::new(2)));

        form.apply(FormEvent::ItemToggled(ItemId::new(2)));
        assert_eq!(form.selected_items, original);
    }

    #[test]
    fn test_manual_pin_wins_over_geocoded_position() {
        let mut form = RegistrationForm::new();
        let pin = Coordinates::new(-23.5, -46.6).unwrap();
        form.apply(FormEvent::MapClicked(pin));

        form.apply(FormEvent::PositionAcquired(AcquiredPosition {
            uf: None,
            city: None,
            position: Coordinates::new(-10.0, -50.0).unwrap(),
        }));

        assert_eq!(form.map_position, Some(pin));
    }

    #[test]
    fn test_position_backfills_state_and_city() {
        let mut form = RegistrationForm::new();
        let effects = form.apply(FormEvent::PositionAcquired(AcquiredPosition {
            uf: Some(uf("SP")),
            city: Some("São Paulo".to_owned()),
            position: Coordinates::new(-23.5, -46.6).unwrap(),
        }));

        assert_eq!(form.selected_uf, Some(uf("SP")));
        assert_eq!(form.selected_city.as_deref(), Some("São Paulo"));
        assert!(form.map_position.is_some());
        // Back-filling the state loads its city list for the dropdown.
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::LoadCities { .. }))
        );
    }

    #[test]
    fn test_position_failure_enables_manual_fallback() {
        let mut form = RegistrationForm::new();
        form.apply(FormEvent::PositionUnavailable(
            PositionError::PermissionDenied,
        ));
        assert!(form.location_fallback);
        assert_eq!(form.status, FormStatus::Editing);
    }

    #[test]
    fn test_city_selection_forwards_geocode_context() {
        let mut form = RegistrationForm::new();
        form.apply(FormEvent::StateSelected(uf("RJ")));
        let effects = form.apply(FormEvent::CitySelected("Niterói".to_owned()));

        match effects.first() {
            Some(Effect::AcquirePosition { city: Some(context) }) => {
                assert_eq!(context.city, "Niterói");
                assert_eq!(context.uf, Some(uf("RJ")));
            }
            other => panic!("expected forward geocode context, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_gates_submit() {
        let mut form = RegistrationForm::new();
        assert!(!form.can_submit());

        let fields: Vec<&str> = form.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "uf", "city"]);

        form.apply(FormEvent::EmailChanged("not-an-email".to_owned()));
        assert!(
            form.field_errors()
                .iter()
                .any(|e| e.field == "email" && e.message.contains("local@domain"))
        );
    }

    #[test]
    fn test_submit_builds_multipart_payload() {
        let mut form = filled_form();
        let effects = form.apply(FormEvent::SubmitRequested);

        let Some(Effect::Submit(submission)) = effects.first() else {
            panic!("expected submit effect, got {effects:?}");
        };
        assert_eq!(submission.name, "Eco Center");
        assert_eq!(submission.email.as_str(), "e@x.com");
        assert_eq!(submission.uf.as_str(), "SP");
        assert_eq!(submission.city, "São Paulo");
        assert_eq!(
            submission.items,
            vec![ItemId::new(1), ItemId::new(3)]
        );
        assert!(submission.image.is_none());
        assert_eq!(form.status, FormStatus::Submitting);
    }

    #[test]
    fn test_no_concurrent_submits() {
        let mut form = filled_form();
        form.apply(FormEvent::SubmitRequested);
        assert!(!form.can_submit());

        let effects = form.apply(FormEvent::SubmitRequested);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_submit_failure_restores_editable_form() {
        let mut form = filled_form();
        form.apply(FormEvent::SubmitRequested);
        form.apply(FormEvent::SubmitFailed("network error".to_owned()));

        assert_eq!(form.status, FormStatus::Failed("network error".to_owned()));
        assert!(form.can_submit());
    }

    #[test]
    fn test_submit_success() {
        let mut form = filled_form();
        form.apply(FormEvent::SubmitRequested);
        form.apply(FormEvent::SubmitSucceeded(ecoponto_core::PointId::new(7)));
        assert_eq!(form.status, FormStatus::Succeeded);
    }
}
