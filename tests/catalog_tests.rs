use dutyroute::catalog::{self, RouteCatalog};

fn catalog() -> RouteCatalog {
    let path = format!("{}/tests/fixtures/routes.json", env!("CARGO_MANIFEST_DIR"));
    RouteCatalog::from_path(path).unwrap()
}

#[test]
fn load_fixture() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 3);
    let summaries = catalog.list_routes();
    let ids: Vec<&str> = summaries.iter().map(|r| r.id.as_ref()).collect();
    assert_eq!(ids, vec!["31", "32", "33"]);
    assert_eq!(summaries[2].station_count, 7);
}

#[test]
fn route_detail_keeps_station_order() {
    let catalog = catalog();
    let route = catalog.route("31").unwrap();
    let names: Vec<&str> = route.stations.iter().map(|s| s.name.as_ref()).collect();
    assert_eq!(names, vec!["Hauptbahnhof", "Bismarckplatz", "Neuenheim"]);
    assert_eq!(route.stations[1].coordinate.latitude, 49.4093);
    assert_eq!(route.hops().count(), 2);
}

#[test]
fn shared_station_names_resolve_per_route() {
    let catalog = catalog();
    let route_32 = catalog.route("32").unwrap();
    let route_33 = catalog.route("33").unwrap();
    assert_eq!(catalog.station_index(route_32, "Bismarckplatz").unwrap(), 2);
    assert_eq!(catalog.station_index(route_33, "bismarckplatz").unwrap(), 3);
    assert!(matches!(
        catalog.station_index(route_32, "Neuenheim"),
        Err(catalog::Error::StationNotFound { .. })
    ));
}

#[test]
fn unknown_route() {
    let catalog = catalog();
    assert!(matches!(
        catalog.route("99"),
        Err(catalog::Error::RouteNotFound(id)) if id == "99"
    ));
}

#[test]
fn missing_file() {
    let result = RouteCatalog::from_path("/nonexistent/routes.json");
    assert!(matches!(result, Err(catalog::Error::Io(_))));
}

#[test]
fn circular_route_is_flagged() {
    let result = RouteCatalog::from_json_str(
        r#"[{ "route_number": "7", "name": "Ring", "stations": [
            { "name": "Bismarckplatz", "coords": [49.4093, 8.6937] },
            { "name": "Hauptbahnhof", "coords": [49.4037, 8.6756] },
            { "name": "Bismarckplatz", "coords": [49.4093, 8.6937] }
        ]}]"#,
    );
    assert!(matches!(
        result,
        Err(catalog::Error::RepeatedStation { route, station }) if route == "7" && station == "Bismarckplatz"
    ));
}
