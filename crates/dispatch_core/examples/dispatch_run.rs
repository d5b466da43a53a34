//! Drive a small dispatch day: three drivers, a couple of bookings, a driver
//! that stops heartbeating, and the resulting queue snapshot.
//!
//! Run with: cargo run -p dispatch_core --example dispatch_run

use dispatch_core::config::DispatchParams;
use dispatch_core::engine::DispatchEngine;

fn main() {
    let params = DispatchParams::default();
    let liveness = params.liveness_timeout_ms;
    let sweep = params.sweep_interval_ms;
    let mut engine = DispatchEngine::new(params);

    let drivers: Vec<_> = ["alice", "bashir", "chen"]
        .into_iter()
        .map(|name| engine.register_driver(name, "midtown"))
        .collect();
    for driver in &drivers {
        if let Err(err) = engine.go_online(*driver) {
            eprintln!("go_online failed: {err}");
            return;
        }
    }

    for (user, (start, destination)) in [
        ("u1", ("Jayanagar", "Indiranagar")),
        ("u2", ("Koramangala", "Whitefield")),
    ] {
        match engine.book_ride(user, start, destination) {
            Ok(ride) => println!(
                "booked ride {} for {user}: {} (driver {:?}, port {:?})",
                ride.id,
                ride.status,
                ride.driver,
                ride.resource.as_ref().map(|r| r.port),
            ),
            Err(err) => eprintln!("booking failed: {err}"),
        }
    }

    // alice and bashir are on trips and exempt from the sweep; chen stays
    // online but silent and is demoted once the liveness window passes.
    engine.advance_to(liveness + sweep + 1);

    match engine.book_ride("u3", "MG Road", "Jayanagar") {
        Ok(ride) => println!(
            "booked ride {} for u3: {} (no driver left, stays pending)",
            ride.id, ride.status,
        ),
        Err(err) => eprintln!("booking failed: {err}"),
    }

    println!("\n--- queue after {} ms ---", engine.now_ms());
    for ride in engine.queue() {
        println!(
            "ride {}  user={}  {} -> {}  status={}  driver={:?}",
            ride.id, ride.user_id, ride.start, ride.destination, ride.status, ride.driver,
        );
    }
    println!(
        "available drivers: {:?}",
        engine
            .available_drivers()
            .into_iter()
            .map(|d| d.name)
            .collect::<Vec<_>>(),
    );
}
