use cswap_telemetry::{TelemetryConfig, TelemetryHandle};

fn main() {
    let telemetry = TelemetryHandle::from_config(TelemetryConfig::sample("pool"));

    for _ in 0..3 {
        telemetry
            .record_counter("pool.swap", 1)
            .expect("within u64 range");
    }
    telemetry.record_counter("pool.abort", 1).expect("within u64 range");
    telemetry.record_latency_ms("pool.call_ms", 3);

    let snapshot = telemetry.flush();
    println!("[cswap-telemetry] {}", snapshot.to_json());
}
