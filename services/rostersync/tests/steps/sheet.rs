use chrono::NaiveDate;
use cucumber::{gherkin::Step, given};
use rostersync::domain::RunDate;

use crate::state;

// The first line of the table names the columns, and is not sent.
#[given("the roster sheet holds the rows:")]
async fn sheet_rows(world: &mut state::TestWorld, step: &Step) {
    let table = step.table.as_ref().expect("a table of rows");
    world.rows.extend(
        table
            .rows
            .iter()
            .skip(1)
            .map(|row| serde_json::json!(row)),
    );
}

#[given("the roster sheet is empty")]
async fn sheet_empty(world: &mut state::TestWorld) {
    world.rows.clear();
}

#[given(regex = r#"^the roster sheet holds a row with only the email "(\S+)"$"#)]
async fn short_row(world: &mut state::TestWorld, email: String) {
    world.rows.push(serde_json::json!([email]));
}

#[given(regex = r#"^the roster sheet holds a row with the number (\d+) as email$"#)]
async fn number_row(world: &mut state::TestWorld, number: u64) {
    world.rows.push(serde_json::json!([number, "", "", "Paid"]));
}

#[given("the roster sheet holds an empty row")]
async fn empty_row(world: &mut state::TestWorld) {
    world.rows.push(serde_json::json!([]));
}

#[given(regex = r#"^the sync runs on "(\d{4}-\d{2}-\d{2})"$"#)]
async fn run_date(world: &mut state::TestWorld, date: String) {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").expect("a date");
    world.date = RunDate::from(date);
}
