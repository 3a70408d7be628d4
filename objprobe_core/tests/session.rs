use objprobe_core::{Error, Profile};

mod common;
use common::fake_client::{FakeClientFactory, FakeStorageClient, Outcome};
use common::scripted_console::{Reply, ScriptedConsole};
use common::{form, init_test_logging, sessions_in};

fn factory() -> std::sync::Arc<FakeClientFactory> {
    FakeClientFactory::new(FakeStorageClient::new([Outcome::ok(1)])).shared()
}

#[test]
fn add_on_an_absent_store_persists_one_profile_and_activates_it() -> anyhow::Result<()> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let factory = factory();
    let sessions = sessions_in(&dir.path().join("cli"), &factory);

    let mut steps = Vec::new();
    let profile = sessions.add_and_activate(form("play.min.io", "demo"), |s| {
        steps.push(s.to_string())
    })?;

    assert_eq!(
        steps,
        [
            "Generating model.",
            "Creating application directory.",
            "Reading data.",
            "Writing data."
        ]
    );
    let stored = sessions.store().read_all()?.expect("store written");
    assert_eq!(stored, vec![profile.clone()]);

    let current = sessions.current().expect("new profile is current");
    assert_eq!(current.profile(), &profile);
    assert_eq!(factory.builds().len(), 1);
    assert!(factory.builds()[0].secure);
    Ok(())
}

#[test]
fn second_add_appends_and_skips_directory_creation() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sessions = sessions_in(dir.path(), &factory());

    let first = sessions.add_and_activate(form("a.example", "a"), |_| {})?;
    let mut steps = Vec::new();
    let second = sessions.add_and_activate(form("b.example", "b"), |s| steps.push(s.to_string()))?;

    assert!(!steps.iter().any(|s| s.contains("directory")));
    assert_eq!(sessions.list()?, vec![first, second.clone()]);
    assert_eq!(sessions.current().unwrap().profile(), &second);
    Ok(())
}

#[test]
fn failed_client_build_keeps_the_saved_profile_but_not_the_session() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sessions = sessions_in(dir.path(), &factory());

    let error = sessions
        .add_and_activate(form("", "no-host"), |_| {})
        .expect_err("the fake factory rejects an empty host");

    assert!(matches!(error, Error::Client(_)));
    assert_eq!(sessions.list()?.len(), 1, "save happened before activation");
    assert!(sessions.current().is_none());
    Ok(())
}

#[tokio::test]
async fn change_on_an_absent_store_fails_and_keeps_the_session() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sessions = sessions_in(dir.path(), &factory());
    let mut console = ScriptedConsole::default();

    let error = sessions
        .change_current(&mut console)
        .await
        .expect_err("nothing to choose from");
    assert!(matches!(error, Error::EmptyStore));
    assert!(sessions.current().is_none());
    assert!(console.select_titles.is_empty(), "no prompt is shown");
    Ok(())
}

#[tokio::test]
async fn change_on_an_empty_list_keeps_the_previous_session() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sessions = sessions_in(dir.path(), &factory());
    let kept = Profile::create(form("kept.example", "kept"));
    sessions.set_current(kept.clone())?;
    sessions.store().save_all(&[])?;

    let error = sessions
        .change_current(&mut ScriptedConsole::default())
        .await
        .expect_err("empty list");
    assert!(matches!(error, Error::EmptyStore));
    assert_eq!(sessions.current().unwrap().profile(), &kept);
    Ok(())
}

#[tokio::test]
async fn profiles_sharing_a_host_are_told_apart() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sessions = sessions_in(dir.path(), &factory());
    let first = Profile::create(form("shared.example", "first"));
    let second = Profile::create(form("shared.example", "second"));
    sessions.store().save_all(&[first.clone(), second.clone()])?;

    let mut console = ScriptedConsole::new([Reply::Select(1)]);
    let chosen = sessions.change_current(&mut console).await?;

    assert_eq!(chosen.id(), second.id());
    assert_eq!(sessions.current().unwrap().profile().id(), second.id());
    assert_eq!(
        console.select_groups[0][0].items,
        vec![
            "first (shared.example)".to_string(),
            "second (shared.example)".to_string()
        ]
    );
    Ok(())
}

#[tokio::test]
async fn out_of_range_selection_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sessions = sessions_in(dir.path(), &factory());
    sessions
        .store()
        .save_all(&[Profile::create(form("only.example", "only"))])?;

    let error = sessions
        .change_current(&mut ScriptedConsole::new([Reply::Select(7)]))
        .await
        .expect_err("index 7 does not exist");
    assert!(matches!(error, Error::InvalidSelection(7)));
    assert!(sessions.current().is_none());
    Ok(())
}

#[test]
fn set_current_replaces_and_notifies_subscribers() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let factory = factory();
    let sessions = sessions_in(dir.path(), &factory);
    let watcher = sessions.subscribe();

    let mut insecure = form("plain.example", "plain");
    insecure.secure = false;
    sessions.set_current(Profile::create(form("tls.example", "tls")))?;
    sessions.set_current(Profile::create(insecure))?;

    let seen = watcher.borrow().clone().expect("subscriber sees the latest session");
    assert_eq!(seen.profile().alias(), "plain");
    let builds = factory.builds();
    assert_eq!(builds.len(), 2);
    assert_eq!(builds[1].host, "plain.example");
    assert!(!builds[1].secure);
    assert_eq!((builds[1].access_key.as_str(), builds[1].secret_key.as_str()), ("AK", "SK"));
    Ok(())
}
