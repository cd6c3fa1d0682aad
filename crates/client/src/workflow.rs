//! Effect driver for the registration workflow.
//!
//! [`RegistrationWorkflow`] owns the form state and the network clients.
//! UI interactions go through the methods here; each one applies the
//! matching event to the reducer and executes whatever effects come back,
//! feeding completion events back in until the queue drains.
//!
//! The driver is generic over the device location seam and the geography
//! directory so the whole workflow runs under test without a network.

use std::collections::VecDeque;

use crate::api::ApiClient;
use crate::form::{Effect, FormEvent, RegistrationForm};
use crate::geo::GeoDirectory;
use crate::location::{LocationProvider, acquire_position};

/// Drives the registration form against the real (or mocked) services.
pub struct RegistrationWorkflow<L, G> {
    form: RegistrationForm,
    location: L,
    geo: G,
    api: ApiClient,
}

impl<L, G> RegistrationWorkflow<L, G>
where
    L: LocationProvider,
    G: GeoDirectory,
{
    /// Create a workflow with a pristine form.
    pub fn new(location: L, geo: G, api: ApiClient) -> Self {
        Self {
            form: RegistrationForm::new(),
            location,
            geo,
            api,
        }
    }

    /// Current form state, for rendering.
    #[must_use]
    pub const fn form(&self) -> &RegistrationForm {
        &self.form
    }

    /// Mount the screen: load the state list and item catalog
    /// concurrently, then run the initial position acquisition.
    ///
    /// Failure of either list is recorded on the form and does not block
    /// the other.
    pub async fn start(&mut self) {
        let effects = self.form.apply(FormEvent::Started);

        let mut load_states = false;
        let mut load_catalog = false;
        let mut rest = Vec::new();
        for effect in effects {
            match effect {
                Effect::LoadStates => load_states = true,
                Effect::LoadCatalog => load_catalog = true,
                other => rest.push(other),
            }
        }

        if load_states && load_catalog {
            let (states, catalog) = tokio::join!(self.geo.states(), self.api.list_items());
            let states_event = match states {
                Ok(states) => FormEvent::StatesLoaded(states),
                Err(e) => FormEvent::StatesFailed(e.to_string()),
            };
            let catalog_event = match catalog {
                Ok(catalog) => FormEvent::CatalogLoaded(catalog),
                Err(e) => FormEvent::CatalogFailed(e.to_string()),
            };
            rest.extend(self.form.apply(states_event));
            rest.extend(self.form.apply(catalog_event));
        }

        self.run(rest).await;
    }

    /// User selected a state in the dropdown.
    pub async fn select_state(&mut self, uf: ecoponto_core::Uf) {
        let effects = self.form.apply(FormEvent::StateSelected(uf));
        self.run(effects).await;
    }

    /// User selected a city in the dropdown.
    pub async fn select_city(&mut self, city: impl Into<String>) {
        let effects = self.form.apply(FormEvent::CitySelected(city.into()));
        self.run(effects).await;
    }

    /// User edited the name field.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let _ = self.form.apply(FormEvent::NameChanged(name.into()));
    }

    /// User edited the email field.
    pub fn set_email(&mut self, email: impl Into<String>) {
        let _ = self.form.apply(FormEvent::EmailChanged(email.into()));
    }

    /// User edited the phone field.
    pub fn set_phone(&mut self, phone: impl Into<String>) {
        let _ = self.form.apply(FormEvent::PhoneChanged(phone.into()));
    }

    /// User toggled an item card.
    pub fn toggle_item(&mut self, id: ecoponto_core::ItemId) {
        let _ = self.form.apply(FormEvent::ItemToggled(id));
    }

    /// User tapped the map.
    pub fn click_map(&mut self, position: ecoponto_core::Coordinates) {
        let _ = self.form.apply(FormEvent::MapClicked(position));
    }

    /// User picked an image file.
    pub fn pick_image(&mut self, image: crate::api::PickedImage) {
        let _ = self.form.apply(FormEvent::ImagePicked(image));
    }

    /// User pressed submit. No-op unless the form validates and no
    /// submission is already in flight.
    pub async fn submit(&mut self) {
        let effects = self.form.apply(FormEvent::SubmitRequested);
        self.run(effects).await;
    }

    /// Execute effects until the queue drains, feeding completion events
    /// back through the reducer.
    async fn run(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let event = self.execute(effect).await;
            queue.extend(self.form.apply(event));
        }
    }

    async fn execute(&mut self, effect: Effect) -> FormEvent {
        match effect {
            Effect::LoadStates => match self.geo.states().await {
                Ok(states) => FormEvent::StatesLoaded(states),
                Err(e) => FormEvent::StatesFailed(e.to_string()),
            },
            Effect::LoadCatalog => match self.api.list_items().await {
                Ok(catalog) => FormEvent::CatalogLoaded(catalog),
                Err(e) => FormEvent::CatalogFailed(e.to_string()),
            },
            Effect::LoadCities { uf, token } => match self.geo.cities(uf).await {
                Ok(cities) => FormEvent::CitiesLoaded { token, cities },
                Err(e) => FormEvent::CitiesFailed {
                    token,
                    reason: e.to_string(),
                },
            },
            Effect::AcquirePosition { city } => {
                match acquire_position(&mut self.location, &self.geo, city.as_ref()).await {
                    Ok(acquired) => FormEvent::PositionAcquired(acquired),
                    Err(e) => FormEvent::PositionUnavailable(e),
                }
            }
            Effect::Submit(submission) => match self.api.create_point(&submission).await {
                Ok(created) => FormEvent::SubmitSucceeded(created.id),
                Err(e) => FormEvent::SubmitFailed(e.to_string()),
            },
        }
    }
}
