use dutyroute::{
    catalog::RouteCatalog,
    dispatch::{Request, Response, Service, UploadFormat},
    schedule::ScheduleStore,
};
use std::{sync::Arc, thread};

fn service() -> Service {
    let path = format!("{}/tests/fixtures/routes.json", env!("CARGO_MANIFEST_DIR"));
    Service::new(RouteCatalog::from_path(path).unwrap(), ScheduleStore::new())
}

fn upload(service: &Service, driver: &str, body: &str) -> usize {
    match service
        .handle(Request::Upload {
            driver: driver.into(),
            format: UploadFormat::Csv,
            body: body.into(),
        })
        .unwrap()
    {
        Response::Upload(result) => result.accepted,
        other => panic!("expected an upload result, got {other:?}"),
    }
}

#[test]
fn upload_then_query_then_navigate() {
    let service = service();
    assert_eq!(upload(&service, "4711", "2025-04-17,U1,08:00,12:00,\"31,32\""), 1);

    let Response::Schedule(view) = service
        .handle(Request::Schedule {
            driver: "4711".into(),
            date: Some("2025-04-17".parse().unwrap()),
        })
        .unwrap()
    else {
        panic!("expected a schedule");
    };
    let shift = &view.shifts[0];
    assert_eq!(&*shift.umlauf, "U1");
    assert_eq!(shift.start_time.to_string(), "08:00");
    assert_eq!(shift.end_time.to_string(), "12:00");

    let line = shift.routes[0].id.to_string();
    let Response::Navigate(itinerary) = service
        .handle(Request::Navigate {
            line,
            from: "Hauptbahnhof".into(),
            to: "Neuenheim".into(),
        })
        .unwrap()
    else {
        panic!("expected an itinerary");
    };
    assert_eq!(itinerary.stop_count(), 2);
    assert_eq!(itinerary.stations.len(), 3);
    assert_eq!(itinerary.directions.len(), 2);
}

#[test]
fn route_listing_and_detail() {
    let service = service();
    let Response::Routes(routes) = service.handle(Request::Routes).unwrap() else {
        panic!("expected routes");
    };
    assert_eq!(routes.len(), 3);

    let Response::Route(route) = service.handle(Request::Route { id: "32".into() }).unwrap() else {
        panic!("expected a route");
    };
    assert_eq!(route.stations.len(), 5);
    assert_eq!(&*route.stations[0].name, "Universitätsplatz");
}

#[test]
fn concurrent_uploads_for_different_drivers() {
    let service = Arc::new(service());
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let body: String = (1..=20)
                    .map(|day| format!("2025-05-{day:02},U{n},06:00,14:00,33\n"))
                    .collect();
                upload(&service, &format!("driver-{n}"), &body)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 20);
    }
    assert_eq!(service.store().driver_count(), 8);
    for n in 0..8 {
        let driver = format!("driver-{n}");
        assert_eq!(service.store().shift_count(&driver.as_str().into()).unwrap(), 20);
    }
}

#[test]
fn total_duration_of_a_crowded_day() {
    let service = service();
    let body: String = (0..50)
        .map(|i| format!("2025-04-17,U{i},00:00,23:59,31\n"))
        .collect();
    assert_eq!(upload(&service, "4711", &body), 50);

    let Response::Schedule(view) = service
        .handle(Request::Schedule {
            driver: "4711".into(),
            date: Some("2025-04-17".parse().unwrap()),
        })
        .unwrap()
    else {
        panic!("expected a schedule");
    };
    assert_eq!(view.shifts.len(), 50);
    assert_eq!(view.total_duration().as_minutes(), 50 * 1439);
}
