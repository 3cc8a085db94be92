use trippin_api::types::{Airline, Person, PersonGender};
use trippin_api::{EntitySetQuery, Error, Filter, Query, SortDirection};
use url::Url;

fn base_url() -> Url {
    Url::parse("https://example.com/People").unwrap()
}

fn option(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[test]
fn query_defaults_render_nothing() {
    let url = EntitySetQuery::<Person>::new().add_to_url(&base_url());
    assert!(url.query().is_none());
    assert_eq!(EntitySetQuery::<Person>::new().resource_path(), "People");
    assert_eq!(EntitySetQuery::<Airline>::new().entity_set(), "Airlines");
}

#[test]
fn repeated_filters_are_conjoined() {
    let query = EntitySetQuery::<Person>::new()
        .filter(Filter::eq("Gender", PersonGender::Male))
        .unwrap()
        .filter(Filter::eq("FirstName", "Vincent"))
        .unwrap();
    let url = query.add_to_url(&base_url());
    assert_eq!(
        option(&url, "$filter").unwrap(),
        "Gender eq Microsoft.OData.SampleService.Models.TripPin.PersonGender'Male' and FirstName eq 'Vincent'"
    );
}

#[test]
fn ends_with_filter() {
    let url = EntitySetQuery::<Person>::new()
        .filter(Filter::ends_with("FirstName", "Clyde"))
        .unwrap()
        .add_to_url(&base_url());
    assert_eq!(option(&url, "$filter").unwrap(), "endswith(FirstName,'Clyde')");
}

#[test]
fn order_keys_concatenate_first_is_primary() {
    let query = EntitySetQuery::<Person>::new()
        .order_by("LastName")
        .unwrap()
        .order_by_direction("FirstName", SortDirection::Desc)
        .unwrap();
    assert_eq!(query.order_keys()[0].field, "LastName");
    let url = query.add_to_url(&base_url());
    assert_eq!(option(&url, "$orderby").unwrap(), "LastName,FirstName desc");
}

#[test]
fn select_and_expand_deduplicate() {
    let query = EntitySetQuery::<Person>::new()
        .select(["FirstName", "LastName"])
        .unwrap()
        .select(vec!["LastName".to_string(), "UserName".to_string()])
        .unwrap()
        .expand("Trips")
        .unwrap()
        .expand("Trips")
        .unwrap();
    let url = query.add_to_url(&base_url());
    assert_eq!(option(&url, "$select").unwrap(), "FirstName,LastName,UserName");
    assert_eq!(option(&url, "$expand").unwrap(), "Trips");
}

#[test]
fn top_and_skip_last_wins() {
    let url = EntitySetQuery::<Person>::new()
        .top(10)
        .top(3)
        .skip(1)
        .add_to_url(&base_url());
    assert_eq!(option(&url, "$top").unwrap(), "3");
    assert_eq!(option(&url, "$skip").unwrap(), "1");
}

#[test]
fn unknown_fields_fail_at_build_time() {
    let err = EntitySetQuery::<Person>::new()
        .filter(Filter::eq("Nickname", "Vince"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQueryField { entity: "Person", .. }));

    assert!(EntitySetQuery::<Person>::new().order_by("Age").is_err());
    assert!(EntitySetQuery::<Person>::new().select(["FirstName", "Age"]).is_err());
    assert!(EntitySetQuery::<Person>::new().expand("Photos").is_err());
    assert!(EntitySetQuery::<Airline>::new().expand("Trips").is_err());
}

#[test]
fn fields_used_in_the_wrong_position_fail() {
    // navigation properties are not selectable or sortable
    assert!(EntitySetQuery::<Person>::new().select(["Trips"]).is_err());
    assert!(EntitySetQuery::<Person>::new().order_by("Trips").is_err());
    // collections cannot be sorted, structural properties cannot be expanded
    assert!(EntitySetQuery::<Person>::new().order_by("Emails").is_err());
    assert!(EntitySetQuery::<Person>::new().expand("FirstName").is_err());
    // enum literal of the wrong type
    assert!(EntitySetQuery::<Person>::new()
        .filter(Filter::eq("Gender", "Male"))
        .is_err());
}

#[test]
fn invalid_field_error_message() {
    let err = EntitySetQuery::<Person>::new().order_by("Age").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid query field `Age` on Person: unknown property"
    );
}
