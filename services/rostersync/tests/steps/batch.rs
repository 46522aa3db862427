use cucumber::then;

use crate::state;

fn member<'a>(batch: &'a serde_json::Value, email: &str) -> &'a serde_json::Value {
    batch
        .as_array()
        .expect("a JSON array")
        .iter()
        .find(|member| member["email_address"] == email)
        .unwrap_or_else(|| panic!("no member {email} in {batch}"))
}

#[then(regex = r"^the batch holds (\d+) members?$")]
async fn batch_size(world: &mut state::TestWorld, count: usize) {
    let printed = world.printed();
    assert_eq!(printed.as_array().expect("a JSON array").len(), count);
    assert_eq!(world.result().roster.len(), count);
}

#[then(regex = r#"^the batch lists the emails "(.*)"$"#)]
async fn batch_order(world: &mut state::TestWorld, emails: String) {
    let printed = world.printed();
    let listed: Vec<&str> = printed
        .as_array()
        .expect("a JSON array")
        .iter()
        .filter_map(|member| member["email_address"].as_str())
        .collect();
    let expected: Vec<&str> = emails.split(", ").collect();
    assert_eq!(listed, expected);
}

#[then(regex = r#"^member "(\S+)" is tagged "([^"]+)" and "([^"]+)"$"#)]
async fn member_tags(world: &mut state::TestWorld, email: String, payment: String, date: String) {
    let printed = world.printed();
    let member = member(&printed, &email);
    assert_eq!(
        member["tags"],
        serde_json::json!([{ "name": payment }, { "name": date }])
    );
}

#[then(regex = r#"^member "(\S+)" has the id "([0-9a-f]{32})"$"#)]
async fn member_id(world: &mut state::TestWorld, email: String, id: String) {
    let printed = world.printed();
    assert_eq!(member(&printed, &email)["id"], serde_json::json!(id));
}

#[then(regex = r"^(\d+) rows? (?:was|were) rejected$")]
async fn rejected(world: &mut state::TestWorld, count: usize) {
    assert_eq!(world.result().roster.rejected().len(), count);
}

#[then(regex = r"^the output is exactly (.+)$")]
async fn exact_output(world: &mut state::TestWorld, expected: String) {
    assert_eq!(String::from_utf8_lossy(&world.output), expected);
}
