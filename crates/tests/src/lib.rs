//! # Integration Tests
//!
//! End-to-end behaviour of a junction seen from the outside:
//! - construction-time validation outcomes
//! - fixed and keyed bindings feeding one snapshot stream
//! - roster files loaded through the config loader and run to termination

#[cfg(test)]
mod contract_tests {
    use contracts::{ClosurePolicy, JunctionConfig, TypeDescriptor};

    #[test]
    fn test_contracts_compile() {
        let config = JunctionConfig::default();
        assert_eq!(config.closure_policy, ClosurePolicy::Terminate);
        assert!(TypeDescriptor::of::<String>().is::<String>());
    }
}

#[cfg(test)]
mod validation_tests {
    use junction::{Apply, Binding, Junction, Locate, Models, OutputSlot, Resolver, ValidationError};
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: String,
        age: u32,
    }

    #[derive(Debug, Clone)]
    struct Pet {
        species: String,
    }

    fn set_name() -> Apply {
        Apply::new(|p: &mut Person, name: String| p.name = name)
    }

    fn jeff(models: &mut Models) -> junction::ModelRef<Person> {
        models.insert(Person {
            name: "Jeff".to_string(),
            age: 56,
        })
    }

    #[tokio::test]
    async fn test_well_typed_bindings_validate() {
        let mut models = Models::new();
        let person = jeff(&mut models);
        let (_tx, rx) = mpsc::channel::<String>(1);

        let out = OutputSlot::snapshots::<Person>();
        let bindings = vec![Binding::with_apply(rx, set_name()).fixed(person)];
        assert_eq!(Junction::validate(&out, &bindings), Ok(()));
    }

    #[tokio::test]
    async fn test_written_slot_is_not_writable() {
        let mut out = OutputSlot::snapshots::<Person>();
        let _first = Junction::new(&mut out, Models::new(), Vec::new()).unwrap();

        let err = Junction::validate(&out, &[]).unwrap_err();
        assert!(matches!(err, ValidationError::OutputNotWritableSlot { .. }));
    }

    #[tokio::test]
    async fn test_non_stream_slot() {
        let out = OutputSlot::expecting::<Vec<Person>>();
        let err = Junction::validate(&out, &[]).unwrap_err();
        assert!(matches!(err, ValidationError::OutputNotStreamType { .. }));
    }

    #[tokio::test]
    async fn test_fixed_model_of_wrong_type() {
        let mut models = Models::new();
        let pet = models.insert(Pet {
            species: "cat".to_string(),
        });
        assert_eq!(models.get(pet).unwrap().species, "cat");
        let (_tx, rx) = mpsc::channel::<String>(1);

        let out = OutputSlot::snapshots::<Person>();
        let bindings = vec![Binding::with_apply(rx, set_name()).fixed(pet)];
        let err = Junction::validate(&out, &bindings).unwrap_err();
        assert!(matches!(err, ValidationError::ModelTypeMismatch { .. }));
        assert_eq!(err.binding(), Some(0));
    }

    #[tokio::test]
    async fn test_resolver_with_wrong_parameter() {
        let mut models = Models::new();
        let person = jeff(&mut models);
        let (_tx, rx) = mpsc::channel::<String>(1);

        let resolver = Resolver::new(move |_: &u64| Some(person));
        let out = OutputSlot::snapshots::<Person>();
        let bindings = vec![Binding::with_apply(rx, set_name()).resolved(resolver)];
        let err = Junction::validate(&out, &bindings).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidResolverSignature { .. }));
    }

    #[tokio::test]
    async fn test_missing_locator() {
        let (_tx, rx) = mpsc::channel::<String>(1);
        let out = OutputSlot::snapshots::<Person>();
        let bindings = vec![Binding::with_apply(rx, set_name()).locate(Locate::Unset)];
        let err = Junction::validate(&out, &bindings).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidModelKind { .. }));
    }

    #[tokio::test]
    async fn test_failed_validation_spawns_nothing() {
        let (_tx, rx) = mpsc::channel::<String>(1);
        let mut out = OutputSlot::snapshots::<Person>();
        let bindings = vec![Binding::with_apply(rx, set_name())];
        let result = Junction::new(&mut out, Models::new(), bindings);
        assert!(result.is_err());
        assert!(!out.is_written());
        assert!(out.take::<Person>().is_none());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use contracts::ClosurePolicy;
    use junction::{
        Binding, Directory, Junction, JunctionConfig, Models, OutputSlot, TerminationCause,
        TryRecvError,
    };
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: String,
        age: u32,
    }

    fn person(name: &str, age: u32) -> Person {
        Person {
            name: name.to_string(),
            age,
        }
    }

    struct NameUpdate {
        id: u32,
        name: String,
    }

    struct Birthday {
        id: u32,
    }

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_zero_bindings_never_publishes() {
        let mut out = OutputSlot::snapshots::<Person>();
        let handle = Junction::new(&mut out, Models::new(), Vec::new()).unwrap();
        let mut snapshots = out.take::<Person>().unwrap();

        tokio::task::yield_now().await;
        assert!(matches!(snapshots.try_recv(), Err(TryRecvError::Empty)));

        let termination = handle.stop().await.unwrap();
        assert_eq!(termination.cause, TerminationCause::Cancelled);
        assert_eq!(termination.metrics.published, 0);
    }

    #[tokio::test]
    async fn test_fixed_binding_sets_name() {
        let mut models = Models::new();
        let jeff = models.insert(person("Jeff", 56));
        let (tx, rx) = mpsc::channel::<String>(1);

        let mut out = OutputSlot::snapshots::<Person>();
        let handle = Junction::new(
            &mut out,
            models,
            vec![Binding::new(rx, |p: &mut Person, n: String| p.name = n).fixed(jeff)],
        )
        .unwrap();
        let mut snapshots = out.take::<Person>().unwrap();

        tokio::task::yield_now().await;
        assert!(matches!(snapshots.try_recv(), Err(TryRecvError::Empty)));

        tx.send("Fishy Bob".to_string()).await.unwrap();
        let snapshot = timeout(WAIT, snapshots.recv()).await.unwrap();
        assert_eq!(snapshot, Some(person("Fishy Bob", 56)));

        drop(tx);
        let termination = handle.join().await.unwrap();
        assert_eq!(termination.models.get(jeff), Some(&person("Fishy Bob", 56)));
        assert_eq!(termination.metrics.published, 1);
    }

    #[tokio::test]
    async fn test_fixed_binding_sets_age() {
        let mut models = Models::new();
        let jeff = models.insert(person("Jeff", 56));
        // The element type is fixed by the update rule alone.
        let (tx, rx) = mpsc::unbounded_channel();

        let mut out = OutputSlot::snapshots::<Person>();
        let _handle = Junction::builder()
            .models(models)
            .bind(Binding::new(rx, |p: &mut Person, a: u32| p.age = a).fixed(jeff))
            .spawn(&mut out)
            .unwrap();
        let mut snapshots = out.take::<Person>().unwrap();

        tx.send(57).unwrap();
        let snapshot = timeout(WAIT, snapshots.recv()).await.unwrap();
        assert_eq!(snapshot, Some(person("Jeff", 57)));
    }

    #[tokio::test]
    async fn test_keyed_updates_stay_with_their_model() {
        let mut models = Models::new();
        let ann = models.insert(person("Ann", 23));
        let bob = models.insert(person("Bob", 21));
        let directory = Directory::new();
        directory.insert(123u32, ann);
        directory.insert(456u32, bob);

        let (names_tx, names_rx) = mpsc::channel::<NameUpdate>(1);
        let (ages_tx, ages_rx) = mpsc::channel::<Birthday>(1);

        let mut out = OutputSlot::snapshots::<Person>();
        let handle = Junction::builder()
            .config(JunctionConfig::named("keyed"))
            .models(models)
            .bind(
                Binding::new(names_rx, |p: &mut Person, u: NameUpdate| p.name = u.name)
                    .resolved(directory.resolver(|u: &NameUpdate| u.id)),
            )
            .bind(
                Binding::new(ages_rx, |p: &mut Person, _: Birthday| p.age += 1)
                    .resolved(directory.resolver(|u: &Birthday| u.id)),
            )
            .spawn(&mut out)
            .unwrap();
        let mut snapshots = out.take::<Person>().unwrap();

        names_tx
            .send(NameUpdate {
                id: 123,
                name: "Anne".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(snapshots.recv().await, Some(person("Anne", 23)));

        ages_tx.send(Birthday { id: 123 }).await.unwrap();
        assert_eq!(snapshots.recv().await, Some(person("Anne", 24)));

        ages_tx.send(Birthday { id: 456 }).await.unwrap();
        assert_eq!(snapshots.recv().await, Some(person("Bob", 22)));

        drop(names_tx);
        let termination = timeout(WAIT, handle.join()).await.unwrap().unwrap();
        assert!(matches!(
            termination.cause,
            TerminationCause::SourceClosed { binding: 0, .. }
        ));
        assert_eq!(termination.models.get(ann), Some(&person("Anne", 24)));
        assert_eq!(termination.models.get(bob), Some(&person("Bob", 22)));
    }

    #[tokio::test]
    async fn test_sequential_updates_accumulate() {
        let mut models = Models::new();
        let jeff = models.insert(person("Jeff", 56));
        let (tx, rx) = mpsc::channel::<u32>(1);

        let mut out = OutputSlot::snapshots::<Person>();
        let handle = Junction::new(
            &mut out,
            models,
            vec![Binding::new(rx, |p: &mut Person, years: u32| p.age += years).fixed(jeff)],
        )
        .unwrap();
        let mut snapshots = out.take::<Person>().unwrap();

        for expected in [57, 58, 59] {
            tx.send(1).await.unwrap();
            assert_eq!(snapshots.recv().await, Some(person("Jeff", expected)));
        }

        let termination = handle.stop().await.unwrap();
        assert_eq!(termination.models.get(jeff).unwrap().age, 59);
    }

    #[tokio::test]
    async fn test_unresolved_id_publishes_nothing() {
        let mut models = Models::new();
        let ann = models.insert(person("Ann", 23));
        let directory = Directory::new();
        directory.insert(123u32, ann);

        let (tx, rx) = mpsc::channel::<Birthday>(4);
        let mut out = OutputSlot::snapshots::<Person>();
        let handle = Junction::builder()
            .config(JunctionConfig {
                name: "unresolved".to_string(),
                closure_policy: ClosurePolicy::Detach,
            })
            .models(models)
            .bind(
                Binding::new(rx, |p: &mut Person, _: Birthday| p.age += 1)
                    .resolved(directory.resolver(|u: &Birthday| u.id)),
            )
            .spawn(&mut out)
            .unwrap();
        let mut snapshots = out.take::<Person>().unwrap();

        tx.send(Birthday { id: 999 }).await.unwrap();
        drop(tx);

        let termination = timeout(WAIT, handle.join()).await.unwrap().unwrap();
        assert_eq!(termination.cause, TerminationCause::AllSourcesClosed);
        assert_eq!(termination.metrics.unresolved, 1);
        assert_eq!(termination.metrics.published, 0);
        assert_eq!(termination.models.get(ann), Some(&person("Ann", 23)));
        assert_eq!(snapshots.recv().await, None);
    }
}

#[cfg(test)]
mod roster_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::ScriptedUpdate;
    use junction::{Binding, Directory, Junction, Models, OutputSlot, TerminationCause};
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: u32,
        name: String,
        age: u32,
    }

    const ROSTER: &str = r#"
[junction]
name = "roster-e2e"

[[people]]
id = 123
name = "Ann"
age = 23

[[people]]
id = 456
name = "Bob"
age = 21

[[updates]]
kind = "rename"
id = 123
name = "Anne"

[[updates]]
kind = "birthday"
id = 123

[[updates]]
kind = "birthday"
id = 456
"#;

    #[tokio::test]
    async fn test_roster_file_drives_junction() {
        let roster = ConfigLoader::load_from_str(ROSTER, ConfigFormat::Toml).unwrap();

        let mut models = Models::new();
        let directory = Directory::new();
        for seed in &roster.people {
            let r = models.insert(Person {
                id: seed.id,
                name: seed.name.clone(),
                age: seed.age,
            });
            directory.insert(seed.id, r);
        }

        let (tx, rx) = mpsc::channel(1);
        let binding = Binding::new(rx, |p: &mut Person, update: ScriptedUpdate| match update {
            ScriptedUpdate::Rename { name, .. } => p.name = name,
            ScriptedUpdate::Birthday { .. } => p.age += 1,
        })
        .resolved(directory.resolver(|u: &ScriptedUpdate| u.id()));

        let mut out = OutputSlot::snapshots::<Person>();
        let handle = Junction::builder()
            .config(roster.junction.clone())
            .models(models)
            .bind(binding)
            .spawn(&mut out)
            .unwrap();
        let mut snapshots = out.take::<Person>().unwrap();

        let mut seen = Vec::new();
        for update in roster.updates.clone() {
            tx.send(update).await.unwrap();
            let p = snapshots.recv().await.unwrap();
            seen.push((p.id, p.name, p.age));
        }
        assert_eq!(
            seen,
            vec![
                (123, "Anne".to_string(), 23),
                (123, "Anne".to_string(), 24),
                (456, "Bob".to_string(), 22),
            ]
        );

        drop(tx);
        let termination = handle.join().await.unwrap();
        assert!(matches!(
            termination.cause,
            TerminationCause::SourceClosed { binding: 0, .. }
        ));
        assert_eq!(termination.metrics.received, 3);
    }
}
