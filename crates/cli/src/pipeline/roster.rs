//! Roster junction - one `Person` model per seed, keyed by id
//!
//! Two update streams feed the junction: renames and birthdays. Both locate
//! their target through the same id directory.

use contracts::{RosterBlueprint, ScriptedUpdate};
use junction::{
    Binding, Directory, JunctionBuilder, JunctionError, JunctionHandle, ModelRef, Models,
    OutputSlot, SnapshotStream, Termination,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Roster model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: u32,
    pub name: String,
    pub age: u32,
}

#[derive(Debug)]
pub struct Rename {
    pub id: u32,
    pub name: String,
}

#[derive(Debug)]
pub struct Birthday {
    pub id: u32,
}

/// A running junction over the roster plus the sending side of its inputs
pub struct RosterJunction {
    handle: JunctionHandle,
    snapshots: SnapshotStream<Person>,
    directory: Directory<u32, Person>,
    people: Vec<ModelRef<Person>>,
    renames: mpsc::Sender<Rename>,
    birthdays: mpsc::Sender<Birthday>,
}

impl RosterJunction {
    /// Seed the models and spawn the junction
    pub fn start(roster: &RosterBlueprint, buffer_size: usize) -> Result<Self, JunctionError> {
        let mut models = Models::new();
        let directory = Directory::new();
        let mut people = Vec::with_capacity(roster.people.len());
        for seed in &roster.people {
            let person = models.insert(Person {
                id: seed.id,
                name: seed.name.clone(),
                age: seed.age,
            });
            directory.insert(seed.id, person);
            people.push(person);
        }

        let (renames, rename_rx) = mpsc::channel(buffer_size.max(1));
        let (birthdays, birthday_rx) = mpsc::channel(buffer_size.max(1));

        let rename = Binding::new(rename_rx, |person: &mut Person, update: Rename| {
            person.name = update.name
        })
        .resolved(directory.resolver(|update: &Rename| update.id))
        .named("rename");

        let birthday = Binding::new(birthday_rx, |person: &mut Person, _: Birthday| {
            person.age += 1
        })
        .resolved(directory.resolver(|update: &Birthday| update.id))
        .named("birthday");

        let mut output = OutputSlot::snapshots::<Person>();
        let handle = JunctionBuilder::new(roster.junction.clone())
            .models(models)
            .bind(rename)
            .bind(birthday)
            .spawn(&mut output)?;

        let snapshots = output
            .take::<Person>()
            .ok_or_else(|| JunctionError::worker(handle.name(), "snapshot stream not installed"))?;

        info!(
            junction = %handle.name(),
            people = people.len(),
            "Roster junction started"
        );

        Ok(Self {
            handle,
            snapshots,
            directory,
            people,
            renames,
            birthdays,
        })
    }

    /// Whether an update for `id` will find a model
    pub fn knows(&self, id: u32) -> bool {
        self.directory.get(&id).is_some()
    }

    /// References to the seeded models, in roster order
    pub fn people(&self) -> &[ModelRef<Person>] {
        &self.people
    }

    pub fn handle(&self) -> &JunctionHandle {
        &self.handle
    }

    pub fn snapshots(&mut self) -> &mut SnapshotStream<Person> {
        &mut self.snapshots
    }

    /// Push one scripted update into its input stream
    pub async fn send(&self, update: &ScriptedUpdate) -> Result<(), JunctionError> {
        let sent = match update {
            ScriptedUpdate::Rename { id, name } => self
                .renames
                .send(Rename {
                    id: *id,
                    name: name.clone(),
                })
                .await
                .is_ok(),
            ScriptedUpdate::Birthday { id } => {
                self.birthdays.send(Birthday { id: *id }).await.is_ok()
            }
        };

        if sent {
            debug!(id = update.id(), "Update sent");
            Ok(())
        } else {
            Err(JunctionError::worker(
                self.handle.name(),
                "junction stopped accepting updates",
            ))
        }
    }

    /// Close both inputs and the snapshot stream, then wait for the junction
    ///
    /// A snapshot still unread at this point is discarded and the junction
    /// reports its consumer gone.
    pub async fn finish(self) -> Result<Termination, JunctionError> {
        let Self {
            handle,
            snapshots,
            renames,
            birthdays,
            ..
        } = self;
        drop(renames);
        drop(birthdays);
        drop(snapshots);
        handle.join().await
    }

    /// Cancel the junction without closing the inputs first
    pub async fn stop(self) -> Result<Termination, JunctionError> {
        self.handle.stop().await
    }
}
