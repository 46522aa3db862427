use cucumber::when;

use crate::state;

#[when("the roster is synced")]
async fn sync(world: &mut state::TestWorld) {
    world.sync(false).await;
}

#[when("the roster is synced and uploaded")]
async fn sync_and_upload(world: &mut state::TestWorld) {
    world.sync(true).await;
}
