use std::sync::Arc;

use log::{debug, info};
use tokio::sync::watch;

use crate::client::{ClientFactory, StorageClient};
use crate::core::console::{Console, MenuGroup};
use crate::core::errors::{Error, Result};
use crate::storage::{Profile, ProfileForm, ProfileStore};

/// The selected profile together with the client built from it.
pub struct ActiveSession {
    profile: Profile,
    client: Arc<dyn StorageClient>,
}

impl ActiveSession {
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn client(&self) -> Arc<dyn StorageClient> {
        Arc::clone(&self.client)
    }
}

/// Owns the current session.
///
/// The session lives in a `watch` channel: every change swaps the whole
/// `Arc<ActiveSession>`, and a running interval probe picks up the new value
/// on its next attempt through [`SessionManager::subscribe`].
pub struct SessionManager {
    store: ProfileStore,
    factory: Arc<dyn ClientFactory>,
    current: watch::Sender<Option<Arc<ActiveSession>>>,
}

impl SessionManager {
    pub fn new(store: ProfileStore, factory: Arc<dyn ClientFactory>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            store,
            factory,
            current,
        }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn current(&self) -> Option<Arc<ActiveSession>> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<ActiveSession>>> {
        self.current.subscribe()
    }

    /// Every stored profile, in store order.
    pub fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.store.list()?)
    }

    /// Build a client for `profile` and make it current, replacing whatever
    /// was current before. The old client is simply dropped.
    pub fn set_current(&self, profile: Profile) -> Result<()> {
        let client = self.factory.build(
            profile.host(),
            profile.access_key(),
            profile.secret_key(),
            profile.secure(),
        )?;
        info!("Current connection is now '{}' ({})", profile.alias(), profile.host());
        self.current
            .send_replace(Some(Arc::new(ActiveSession { profile, client })));
        Ok(())
    }

    /// Create a profile from `form`, append it to the store and activate it.
    ///
    /// `progress` is told about each step before it runs.
    pub fn add_and_activate(
        &self,
        form: ProfileForm,
        mut progress: impl FnMut(&str),
    ) -> Result<Profile> {
        progress("Generating model.");
        let profile = Profile::create(form);
        debug!("Generated connection id {}", profile.id());

        if !self.store.dir().is_dir() {
            progress("Creating application directory.");
            self.store.ensure_dir()?;
        }

        progress("Reading data.");
        let mut profiles = self.store.list()?;
        profiles.push(profile.clone());

        progress("Writing data.");
        self.store.save_all(&profiles)?;

        self.set_current(profile.clone())?;
        Ok(profile)
    }

    /// Let the operator pick a stored profile and make it current.
    ///
    /// Fails with [`Error::EmptyStore`] (leaving the session as it was) when
    /// there is nothing to pick from.
    pub async fn change_current(&self, console: &mut dyn Console) -> Result<Profile> {
        let profiles = self.store.read_all()?.unwrap_or_default();
        if profiles.is_empty() {
            return Err(Error::EmptyStore);
        }

        let choices = [MenuGroup {
            title: "Connections".into(),
            items: profiles.iter().map(Profile::label).collect(),
        }];
        let index = console.select("Select a connection", &choices).await?;

        // rows are whole profiles, so two entries sharing a host stay distinct
        let profile = profiles
            .into_iter()
            .nth(index)
            .ok_or(Error::InvalidSelection(index))?;

        self.set_current(profile.clone())?;
        Ok(profile)
    }
}
