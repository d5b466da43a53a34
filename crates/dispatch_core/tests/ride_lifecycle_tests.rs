mod support;

use dispatch_core::ecs::{DriverPresence, RideStatus};
use dispatch_core::error::DispatchError;

#[test]
fn one_ride_end_to_end() {
    let mut engine = support::engine();
    let d1 = engine.register_driver("d1", "downtown");
    engine.go_online(d1).expect("online");

    let ride = engine.book_ride("u1", "A", "B").expect("booked");
    assert_eq!(ride.status, RideStatus::Assigned);
    assert_eq!(ride.driver, Some(d1));
    let resource = ride.resource.clone().expect("resource");
    assert_eq!(resource.port, 7100);
    assert!(!resource.container_handle.is_empty());
    assert_eq!(
        engine.driver(d1).expect("driver").presence,
        DriverPresence::OnTrip
    );

    let completed = engine.complete_ride(ride.id).expect("completed");
    assert_eq!(completed.status, RideStatus::Completed);
    assert_eq!(
        engine.driver(d1).expect("driver").presence,
        DriverPresence::Online
    );
    // The record keeps its assignment for audit.
    assert_eq!(completed.driver, Some(d1));
    assert_eq!(completed.resource, Some(resource));
}

#[test]
fn completion_is_rejected_from_any_state_but_assigned() {
    let mut engine = support::engine();

    let pending = engine.book_ride("u1", "A", "B").expect("booked");
    assert!(matches!(
        engine.complete_ride(pending.id),
        Err(DispatchError::InvalidRideTransition { .. })
    ));

    assert!(matches!(
        engine.complete_ride(dispatch_core::ecs::RideId(999)),
        Err(DispatchError::RideNotFound { .. })
    ));

    // Fresh engine so the driver picks up this booking and nothing else.
    let mut engine = support::engine();
    let d1 = support::online_driver(&mut engine, "d1");
    let _ = d1;
    let ride = engine.book_ride("u2", "A", "B").expect("booked");
    engine.complete_ride(ride.id).expect("completed");
    assert!(matches!(
        engine.complete_ride(ride.id),
        Err(DispatchError::InvalidRideTransition { .. })
    ));
}

#[test]
fn lifecycle_timestamps_never_decrease() {
    let mut engine = support::engine();
    let booked_at = 1_000;
    let online_at = 2_500;
    let completed_at = 4_000;

    engine.advance_to(booked_at);
    let ride = engine.book_ride("u1", "A", "B").expect("booked");

    engine.advance_to(online_at);
    let d1 = support::online_driver(&mut engine, "d1");
    let _ = d1;

    engine.advance_to(completed_at);
    let done = engine.complete_ride(ride.id).expect("completed");

    assert_eq!(done.created_at_ms, booked_at);
    let assigned = done.assigned_at_ms.expect("assigned_at");
    let completed = done.completed_at_ms.expect("completed_at");
    assert!(done.created_at_ms <= assigned);
    assert!(assigned <= completed);
}

#[test]
fn driver_offline_mid_trip_orphans_nothing() {
    let mut engine = support::engine();
    let d1 = support::online_driver(&mut engine, "d1");
    let ride = engine.book_ride("u1", "A", "B").expect("booked");
    assert_eq!(ride.driver, Some(d1));

    // Disconnect beacon fires while the trip is running.
    engine.go_offline(d1).expect("offline");
    let mid_trip = engine.ride(ride.id).expect("ride");
    assert_eq!(mid_trip.status, RideStatus::Assigned);
    assert_eq!(mid_trip.driver, Some(d1));

    // Completion still works; the disconnected driver is not resurrected.
    engine.complete_ride(ride.id).expect("completed");
    assert_eq!(
        engine.driver(d1).expect("driver").presence,
        DriverPresence::Offline
    );
}

#[test]
fn queue_snapshot_reflects_every_committed_write() {
    let mut engine = support::engine();
    let d1 = support::online_driver(&mut engine, "d1");
    let _ = d1;
    let r1 = engine.book_ride("u1", "A", "B").expect("booked");
    let r2 = engine.book_ride("u2", "C", "D").expect("booked");
    engine.complete_ride(r1.id).expect("completed");

    let queue = engine.queue();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0].id, r1.id);
    assert_eq!(queue[0].status, RideStatus::Completed);
    assert_eq!(queue[1].id, r2.id);
    // d1 freed up, so the post-completion match pass picked up r2.
    assert_eq!(queue[1].status, RideStatus::Assigned);
}

#[test]
fn next_ride_peeks_without_dequeuing() {
    let mut engine = support::engine();
    assert!(engine.next_ride().is_none());

    let r1 = engine.book_ride("u1", "A", "B").expect("booked");
    let r2 = engine.book_ride("u2", "C", "D").expect("booked");
    let _ = r2;

    let first_peek = engine.next_ride().expect("pending ride");
    let second_peek = engine.next_ride().expect("pending ride");
    assert_eq!(first_peek.id, r1.id);
    assert_eq!(second_peek.id, r1.id);
    assert_eq!(engine.queue().len(), 2);
}
