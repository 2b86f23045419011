// src/services/geolocation.rs
// DOCUMENTATION: Geolocation provider seam
// PURPOSE: Current-position lookups and position update streams with timeouts

use crate::errors::PlacesError;
use crate::models::Coordinate;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Options for a position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// How long to wait for a fix before failing with GeolocationTimeout
    pub timeout: Duration,
    /// Oldest cached fix that may be returned
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(1),
        }
    }
}

/// Source of device positions
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// One position fix
    /// Fails with GeolocationDenied, GeolocationUnsupported or GeolocationTimeout
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinate, PlacesError>;

    /// Subscribe to position updates
    fn watch_position(&self, options: &PositionOptions) -> Result<PositionSubscription, PlacesError>;
}

#[derive(Debug, Clone, Copy)]
struct Fix {
    coordinate: Coordinate,
    received_at: Instant,
}

#[derive(Debug, Clone, Copy)]
enum FeedState {
    Pending,
    Fix(Fix),
    Denied,
    Unsupported,
}

fn timeout_error(timeout: Duration) -> PlacesError {
    PlacesError::GeolocationTimeout(timeout.as_millis() as u64)
}

/// Channel-backed geolocation provider
/// DOCUMENTATION: The host pushes fixes in (device bridge, client uploads);
/// consumers read them through GeolocationProvider
pub struct PositionFeed {
    sender: watch::Sender<FeedState>,
}

impl Default for PositionFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionFeed {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(FeedState::Pending);
        Self { sender }
    }

    /// Push a new fix to current and future subscribers
    pub fn publish(&self, coordinate: Coordinate) {
        self.sender.send_replace(FeedState::Fix(Fix {
            coordinate,
            received_at: Instant::now(),
        }));
    }

    /// The user refused location permission
    pub fn deny(&self) {
        self.sender.send_replace(FeedState::Denied);
    }

    /// The device has no positioning
    pub fn mark_unsupported(&self) {
        self.sender.send_replace(FeedState::Unsupported);
    }
}

#[async_trait]
impl GeolocationProvider for PositionFeed {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinate, PlacesError> {
        let mut receiver = self.sender.subscribe();
        let maximum_age = options.maximum_age;

        let wait = async move {
            loop {
                let state = *receiver.borrow_and_update();
                match state {
                    FeedState::Fix(fix) if fix.received_at.elapsed() <= maximum_age => {
                        return Ok(fix.coordinate)
                    }
                    FeedState::Denied => return Err(PlacesError::GeolocationDenied),
                    FeedState::Unsupported => return Err(PlacesError::GeolocationUnsupported),
                    _ => {}
                }

                if receiver.changed().await.is_err() {
                    return Err(PlacesError::GeolocationUnsupported);
                }
            }
        };

        tokio::time::timeout(options.timeout, wait)
            .await
            .map_err(|_| timeout_error(options.timeout))?
    }

    fn watch_position(&self, options: &PositionOptions) -> Result<PositionSubscription, PlacesError> {
        let mut receiver = self.sender.subscribe();
        let state = *receiver.borrow_and_update();

        match state {
            FeedState::Denied => Err(PlacesError::GeolocationDenied),
            FeedState::Unsupported => Err(PlacesError::GeolocationUnsupported),
            _ => Ok(PositionSubscription {
                receiver,
                timeout: options.timeout,
            }),
        }
    }
}

/// Handle on a stream of position updates
/// Dropping it ends the subscription
pub struct PositionSubscription {
    receiver: watch::Receiver<FeedState>,
    timeout: Duration,
}

impl PositionSubscription {
    /// Wait for the next update
    /// Returns None once the feed is gone
    pub async fn next(&mut self) -> Option<Result<Coordinate, PlacesError>> {
        loop {
            match tokio::time::timeout(self.timeout, self.receiver.changed()).await {
                Err(_) => return Some(Err(timeout_error(self.timeout))),
                Ok(Err(_)) => return None,
                Ok(Ok(())) => {}
            }

            let state = *self.receiver.borrow_and_update();
            match state {
                FeedState::Fix(fix) => return Some(Ok(fix.coordinate)),
                FeedState::Denied => return Some(Err(PlacesError::GeolocationDenied)),
                FeedState::Unsupported => return Some(Err(PlacesError::GeolocationUnsupported)),
                FeedState::Pending => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const ZARAGOZA: Coordinate = Coordinate::new(41.6488, -0.8891);

    #[tokio::test(start_paused = true)]
    async fn test_current_position_returns_fresh_fix() {
        let feed = PositionFeed::new();
        feed.publish(ZARAGOZA);

        let position = feed.current_position(&PositionOptions::default()).await;
        assert_eq!(position, Ok(ZARAGOZA));
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_position_times_out_without_fix() {
        let feed = PositionFeed::new();

        let result = feed.current_position(&PositionOptions::default()).await;
        assert_eq!(result, Err(PlacesError::GeolocationTimeout(10_000)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fix_waits_for_new_one() {
        let feed = Arc::new(PositionFeed::new());
        feed.publish(ZARAGOZA);
        tokio::time::advance(Duration::from_secs(5)).await;

        let publisher = feed.clone();
        let next = Coordinate::new(41.6500, -0.8800);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            publisher.publish(next);
        });

        let position = feed.current_position(&PositionOptions::default()).await;
        assert_eq!(position, Ok(next));
    }

    #[tokio::test]
    async fn test_denied_and_unsupported() {
        let feed = PositionFeed::new();
        feed.deny();
        assert_eq!(
            feed.current_position(&PositionOptions::default()).await,
            Err(PlacesError::GeolocationDenied)
        );
        assert!(feed.watch_position(&PositionOptions::default()).is_err());

        feed.mark_unsupported();
        assert_eq!(
            feed.current_position(&PositionOptions::default()).await,
            Err(PlacesError::GeolocationUnsupported)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_position_streams_updates() {
        let feed = PositionFeed::new();
        let mut subscription = feed.watch_position(&PositionOptions::default()).unwrap();

        feed.publish(ZARAGOZA);
        assert_eq!(subscription.next().await, Some(Ok(ZARAGOZA)));

        // No further fixes within the timeout
        assert_eq!(
            subscription.next().await,
            Some(Err(PlacesError::GeolocationTimeout(10_000)))
        );

        drop(feed);
        assert_eq!(subscription.next().await, None);
    }
}
