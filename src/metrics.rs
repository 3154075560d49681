use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, register_counter, register_gauge};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gate_requests_total", "Total number of requests seen by the gate").unwrap();
    pub static ref REJECTED_TOTAL: Counter =
        register_counter!("gate_requests_rejected_total", "Requests rejected by the rate limit").unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("gate_tracked_clients", "Current number of client windows held").unwrap();
}
