use cucumber::{given, then};
use rostersync::application::Error;

use crate::state;

#[given("the mailing list exists")]
async fn list_exists(world: &mut state::TestWorld) {
    world.serve_list().await;
}

#[given("the mailing list refuses our api key")]
async fn list_refused(world: &mut state::TestWorld) {
    world.refuse_list().await;
}

#[given(regex = r#"^the mailing list has the member "(\S+)"$"#)]
async fn known_member(world: &mut state::TestWorld, email: String) {
    world.serve_member(&email, &email, 1).await;
}

#[given(regex = r#"^the mailing list has "(\S+)" registered as "(\S+)"$"#)]
async fn mismatched_member(world: &mut state::TestWorld, email: String, registered_as: String) {
    world.serve_member(&email, &registered_as, 0).await;
}

#[given(regex = r#"^the mailing list does not have the member "(\S+)"$"#)]
async fn unknown_member(world: &mut state::TestWorld, email: String) {
    world.serve_unknown_member(&email).await;
}

#[then(regex = r#"^the upload updated "(\S+)"$"#)]
async fn updated(world: &mut state::TestWorld, email: String) {
    let hash = state::TestWorld::hash(&email);
    assert!(world.report().updated.contains(&hash));
}

#[then(regex = r#"^the upload reported "(\S+)" as not found$"#)]
async fn not_found(world: &mut state::TestWorld, email: String) {
    let hash = state::TestWorld::hash(&email);
    assert!(world.report().not_found.contains(&hash));
}

#[then(regex = r#"^the upload reported "(\S+)" as mismatched$"#)]
async fn mismatched(world: &mut state::TestWorld, email: String) {
    let hash = state::TestWorld::hash(&email);
    assert!(world.report().mismatched.contains(&hash));
}

#[then("the upload failed")]
async fn upload_failed(world: &mut state::TestWorld) {
    assert!(matches!(world.outcome, Some(Err(Error::Upload { .. }))));
}

#[then("the batch was still printed")]
async fn still_printed(world: &mut state::TestWorld) {
    assert!(!world.output.is_empty());
    assert!(world.printed().is_array());
}

#[then("nothing was uploaded")]
async fn nothing_uploaded(world: &mut state::TestWorld) {
    assert!(world.result().report.is_none());
    let requests = world
        .mailchimp_server
        .received_requests()
        .await
        .unwrap_or_default();
    assert!(requests.is_empty());
}
