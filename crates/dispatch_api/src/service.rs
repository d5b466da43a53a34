//! The shared dispatch handle: one mutex around the engine, every operation a
//! lock + clock advance + engine call. The engine stays the single source of
//! truth for assignments and ports; this layer only validates input and maps
//! errors to client-visible codes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use dispatch_core::config::DispatchParams;
use dispatch_core::engine::DispatchEngine;

use crate::error::ApiError;
use crate::types::{
    BookRideRequest, BookRideResponse, CompleteRideResponse, DriverIdRequest, DriverSummary,
    DriverView, RegisterDriverRequest, RegisterDriverResponse, ResourceSummary, RideIdRequest,
    RideView,
};

/// Where engine-clock milliseconds come from. Wall time in production,
/// a shared counter under test.
#[derive(Debug, Clone)]
pub enum TimeSource {
    Wall(Instant),
    Manual(Arc<AtomicU64>),
}

impl TimeSource {
    pub fn wall() -> Self {
        TimeSource::Wall(Instant::now())
    }

    /// A manually driven source plus the handle to advance it.
    pub fn manual() -> (Self, Arc<AtomicU64>) {
        let handle = Arc::new(AtomicU64::new(0));
        (TimeSource::Manual(handle.clone()), handle)
    }

    fn now_ms(&self) -> u64 {
        match self {
            TimeSource::Wall(epoch) => epoch.elapsed().as_millis() as u64,
            TimeSource::Manual(ms) => ms.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone)]
pub struct SharedDispatch {
    engine: Arc<Mutex<DispatchEngine>>,
    time: TimeSource,
}

fn require_filled(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

impl SharedDispatch {
    pub fn new(params: DispatchParams) -> Self {
        Self::with_time_source(params, TimeSource::wall())
    }

    pub fn with_time_source(params: DispatchParams, time: TimeSource) -> Self {
        Self {
            engine: Arc::new(Mutex::new(DispatchEngine::new(params))),
            time,
        }
    }

    /// Locks the engine and advances its clock to the present, so due sweeps
    /// and match retries run before the operation observes state.
    fn lock(&self) -> MutexGuard<'_, DispatchEngine> {
        let mut engine = self
            .engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        engine.advance_to(self.time.now_ms());
        engine
    }

    /// Drives periodic work without performing an operation; what the
    /// background [crate::Ticker] calls.
    pub fn tick(&self) {
        drop(self.lock());
    }

    pub fn now_ms(&self) -> u64 {
        self.engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .now_ms()
    }

    pub fn book_ride(&self, req: BookRideRequest) -> Result<BookRideResponse, ApiError> {
        require_filled("user_id", &req.user_id)?;
        require_filled("start", &req.start)?;
        require_filled("destination", &req.destination)?;

        let mut engine = self.lock();
        let ride = engine.book_ride(req.user_id, req.start, req.destination)?;
        let driver = match ride.driver {
            Some(driver_id) => {
                let driver = engine.driver(driver_id)?;
                Some(DriverSummary {
                    driver_id,
                    name: driver.name,
                })
            }
            None => None,
        };
        tracing::debug!(ride = ride.id.0, assigned = driver.is_some(), "ride booked");
        Ok(BookRideResponse {
            ride_id: ride.id,
            status: ride.status,
            driver,
            resource: ride.resource.map(|r| ResourceSummary {
                port: r.port,
                container_handle: r.container_handle,
            }),
        })
    }

    pub fn queue(&self) -> Vec<RideView> {
        self.lock().queue().into_iter().map(RideView::from).collect()
    }

    pub fn next_ride(&self) -> Option<RideView> {
        self.lock().next_ride().map(RideView::from)
    }

    pub fn complete_ride(&self, req: RideIdRequest) -> Result<CompleteRideResponse, ApiError> {
        let ride = self.lock().complete_ride(req.ride_id)?;
        Ok(CompleteRideResponse {
            ride_id: ride.id,
            status: ride.status,
        })
    }

    pub fn register_driver(
        &self,
        req: RegisterDriverRequest,
    ) -> Result<RegisterDriverResponse, ApiError> {
        require_filled("name", &req.name)?;
        require_filled("location", &req.location)?;
        let driver_id = self.lock().register_driver(req.name, req.location);
        Ok(RegisterDriverResponse { driver_id })
    }

    pub fn go_online(&self, req: DriverIdRequest) -> Result<(), ApiError> {
        self.lock().go_online(req.driver_id)?;
        Ok(())
    }

    pub fn go_offline(&self, req: DriverIdRequest) -> Result<(), ApiError> {
        self.lock().go_offline(req.driver_id)?;
        Ok(())
    }

    pub fn heartbeat(&self, req: DriverIdRequest) -> Result<(), ApiError> {
        self.lock().heartbeat(req.driver_id)?;
        Ok(())
    }

    pub fn available_drivers(&self) -> Vec<DriverView> {
        self.lock()
            .available_drivers()
            .into_iter()
            .map(DriverView::from)
            .collect()
    }
}
