//! The demonstration scenarios run by the CLI.
//!
//! Each scenario builds its queries, runs them through a [`TripPinClient`]
//! and returns typed results; rendering is left to the caller.

use serde::Serialize;
use trippin_api::types::{Airline, Person, PersonGender};
use trippin_api::{BatchRequest, EntitySetQuery, Filter, OrderKey, SortDirection};

use crate::client::TripPinClient;
use crate::error::TripPinError;
use crate::local::{self, Projection};

/// Fields shown by [`male_people_named`].
pub const NAME_PROJECTION: [&str; 4] = ["FirstName", "LastName", "UserName", "Gender"];

/// Every person, sorted locally by first name.
pub async fn people_by_first_name(client: &TripPinClient) -> Result<Vec<Person>, TripPinError> {
    let mut people = client.execute(&EntitySetQuery::<Person>::new()).await?;
    local::sort_local(
        &mut people,
        &[OrderKey {
            field: "FirstName".to_string(),
            direction: SortDirection::Asc,
        }],
    );
    Ok(people)
}

/// People with exactly this first name, filtered after fetching the whole set.
pub async fn people_named(
    client: &TripPinClient,
    first_name: &str,
) -> Result<Vec<Person>, TripPinError> {
    let people = client.execute(&EntitySetQuery::<Person>::new()).await?;
    let filter = Filter::eq("FirstName", first_name);
    Ok(local::filter_local(&people, &filter).into_iter().cloned().collect())
}

/// People whose first name ends with `suffix`, filtered by the service.
pub async fn people_with_suffix(
    client: &TripPinClient,
    suffix: &str,
) -> Result<Vec<Person>, TripPinError> {
    let query = EntitySetQuery::<Person>::new().filter(Filter::ends_with("FirstName", suffix))?;
    client.execute(&query).await
}

pub async fn person(client: &TripPinClient, user_name: &str) -> Result<Person, TripPinError> {
    client.get_by_key::<Person>(user_name).await
}

pub async fn user_names(client: &TripPinClient) -> Result<Vec<String>, TripPinError> {
    let people = client.execute(&EntitySetQuery::<Person>::new()).await?;
    Ok(people.into_iter().map(|p| p.user_name).collect())
}

/// The signed-in user (`Me`) with `Trips` loaded in a second request.
pub async fn my_trips(client: &TripPinClient) -> Result<Person, TripPinError> {
    let mut me: Person = client.get_singleton("Me").await?;
    client.load_navigation(&mut me, "Trips").await?;
    Ok(me)
}

/// Outcome of the People + Airlines batch. Each part succeeds or fails on its own.
#[derive(Debug)]
pub struct PeopleAndAirlines {
    pub people: Result<Vec<Person>, TripPinError>,
    pub airlines: Result<Vec<Airline>, TripPinError>,
}

/// Fetches People and Airlines in one `$batch` exchange on a session root.
pub async fn people_and_airlines(client: &TripPinClient) -> Result<PeopleAndAirlines, TripPinError> {
    let session = client.open_session().await?;
    let mut batch = BatchRequest::new();
    let people = batch.add(&EntitySetQuery::<Person>::new());
    let airlines = batch.add(&EntitySetQuery::<Airline>::new());
    let response = session.execute_batch(&batch).await?;
    Ok(PeopleAndAirlines {
        people: response.take(people).map_err(TripPinError::from),
        airlines: response.take(airlines).map_err(TripPinError::from),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub people: u64,
    pub airlines: u64,
}

/// Counts both entity sets with two concurrent requests.
pub async fn entity_counts(client: &TripPinClient) -> Result<EntityCounts, TripPinError> {
    let people_query = EntitySetQuery::<Person>::new();
    let airlines_query = EntitySetQuery::<Airline>::new();
    let (people, airlines) =
        tokio::try_join!(client.count(&people_query), client.count(&airlines_query))?;
    Ok(EntityCounts { people, airlines })
}

/// Male people with this first name, ordered by user name and projected to
/// [`NAME_PROJECTION`].
pub async fn male_people_named(
    client: &TripPinClient,
    first_name: &str,
) -> Result<Vec<Projection>, TripPinError> {
    let query = EntitySetQuery::<Person>::new()
        .filter(Filter::eq("Gender", PersonGender::Male).and(Filter::eq("FirstName", first_name)))?
        .order_by("UserName")?
        .select(NAME_PROJECTION)?;
    let people = client.execute(&query).await?;
    people
        .iter()
        .map(|p| local::project(p, &NAME_PROJECTION))
        .collect()
}

/// People with this first name, fetched with `Trips` expanded.
pub async fn people_with_trips(
    client: &TripPinClient,
    first_name: &str,
) -> Result<Vec<Person>, TripPinError> {
    let query = EntitySetQuery::<Person>::new()
        .expand("Trips")?
        .filter(Filter::eq("FirstName", first_name))?;
    client.execute(&query).await
}
