use crate::config::DirectionsConfig;
use dutyroute::navigation::{Itinerary, Leg};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("Provider returned an empty hint")]
    Empty,
}

/// Asks an external service for a turn-by-turn hint per leg.
///
/// The provider is called as `GET {url}?from=lat,lon&to=lat,lon` and must
/// answer with the hint as plain text. All legs are requested at once and
/// share one deadline.
pub struct DirectionsClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl DirectionsClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &DirectionsConfig) -> Option<Self> {
        config
            .url
            .as_ref()
            .map(|url| Self::new(url.clone(), config.timeout()))
    }

    /// Replaces the generated direction lines of `itinerary` with provider
    /// hints. A leg without an answer before the deadline keeps its generated line.
    pub async fn enrich(&self, itinerary: &mut Itinerary) {
        let now = Instant::now();
        let mut requests = JoinSet::new();
        for (i, leg) in itinerary.legs.iter().enumerate() {
            let client = self.client.clone();
            let url = request_url(&self.url, leg);
            requests.spawn(async move { (i, fetch(&client, &url).await) });
        }

        let legs = &itinerary.legs;
        let mut hints: Vec<Option<String>> = vec![None; legs.len()];
        let collect = async {
            while let Some(joined) = requests.join_next().await {
                match joined {
                    Ok((i, Ok(hint))) => hints[i] = Some(hint),
                    Ok((i, Err(err))) => warn!(
                        "Directions for {} -> {} unavailable, using station hint: {err}",
                        legs[i].from.name, legs[i].to.name
                    ),
                    Err(err) => warn!("Directions request failed: {err}"),
                }
            }
        };
        if tokio::time::timeout(self.timeout, collect).await.is_err() {
            warn!(
                "Directions provider did not answer within {:?}, using station hints",
                self.timeout
            );
        }
        // Dropping the set aborts requests still in flight
        drop(requests);

        let mut fallbacks = 0;
        for (line, hint) in itinerary.directions.iter_mut().zip(hints) {
            match hint {
                Some(hint) => *line = hint,
                None => fallbacks += 1,
            }
        }
        debug!(
            "Directions for {} legs took {:?} ({} fallbacks)",
            itinerary.legs.len(),
            now.elapsed(),
            fallbacks
        );
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<String, self::Error> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(self::Error::Status(response.status()));
    }
    let text = response.text().await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(self::Error::Empty);
    }
    Ok(text.to_string())
}

fn request_url(base: &str, leg: &Leg) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!(
        "{base}{separator}from={}&to={}",
        leg.from.coordinate, leg.to.coordinate
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dutyroute::{catalog::RouteCatalog, navigation::Resolver};

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    fn catalog() -> RouteCatalog {
        RouteCatalog::from_json_str(
            r#"[{ "route_number": "33", "name": "Köpfel - Emmertsgrund", "stations": [
                { "name": "Hauptbahnhof", "coords": [49.4037, 8.6756] },
                { "name": "Bismarckplatz", "coords": [49.4093, 8.6937] },
                { "name": "Alte Brücke", "coords": [49.4139, 8.7108] },
                { "name": "Ziegelhausen Brücke", "coords": [49.4128, 8.7290] },
                { "name": "Köpfel", "coords": [49.4117, 8.7411] }
            ]}]"#,
        )
        .unwrap()
    }

    fn itinerary() -> Itinerary {
        Resolver::new(&catalog())
            .navigate("33", "Hauptbahnhof", "Bismarckplatz")
            .unwrap()
    }

    fn long_itinerary() -> Itinerary {
        Resolver::new(&catalog())
            .navigate("33", "Hauptbahnhof", "Köpfel")
            .unwrap()
    }

    /// Accepts connections and never answers.
    async fn silent_provider() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });
        format!("http://{addr}/hint")
    }

    /// Answers every request with `hint`.
    async fn answering_provider(hint: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 2048];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{hint}",
                        hint.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}/hint")
    }

    #[test]
    fn url_carries_leg_coordinates() {
        let itinerary = itinerary();
        assert_eq!(
            request_url("http://localhost:9000/hint", &itinerary.legs[0]),
            "http://localhost:9000/hint?from=49.4037,8.6756&to=49.4093,8.6937"
        );
        assert_eq!(
            request_url("http://localhost:9000/hint?lang=de", &itinerary.legs[0]),
            "http://localhost:9000/hint?lang=de&from=49.4037,8.6756&to=49.4093,8.6937"
        );
    }

    #[tokio::test]
    async fn unreachable_provider_keeps_generated_hints() {
        let mut itinerary = itinerary();
        let client = DirectionsClient::new("http://127.0.0.1:9/hint", Duration::from_millis(200));
        client.enrich(&mut itinerary).await;
        assert_eq!(
            itinerary.directions,
            vec!["Continue from Hauptbahnhof to Bismarckplatz"]
        );
    }

    #[test]
    fn disabled_without_url() {
        assert!(DirectionsClient::from_config(&DirectionsConfig::default()).is_none());
    }

    #[tokio::test]
    async fn hanging_provider_is_bounded_by_one_deadline() {
        let mut itinerary = long_itinerary();
        assert_eq!(itinerary.legs.len(), 4);
        let client = DirectionsClient::new(silent_provider().await, Duration::from_millis(300));

        let started = Instant::now();
        client.enrich(&mut itinerary).await;
        assert!(started.elapsed() < Duration::from_millis(1000));
        assert_eq!(itinerary.directions[3], "Continue from Ziegelhausen Brücke to Köpfel");
    }

    #[tokio::test]
    async fn provider_hints_replace_every_leg() {
        let mut itinerary = long_itinerary();
        let client = DirectionsClient::new(
            answering_provider("Turn right at the bridge").await,
            Duration::from_secs(5),
        );
        client.enrich(&mut itinerary).await;
        assert_eq!(itinerary.directions.len(), 4);
        assert!(itinerary.directions.iter().all(|line| line == "Turn right at the bridge"));
    }
}
