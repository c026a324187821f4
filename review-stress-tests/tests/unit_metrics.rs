use review_stress_tests::metrics::Metrics;

fn make(latency_ns: Vec<u64>, errors_5xx: u64, requests_total: u64, elapsed_secs: f64) -> Metrics {
    Metrics { requests_total, errors_5xx, conflicts: 0, latency_ns, elapsed_secs }
}

#[test]
fn test_percentiles_unsorted_input() {
    // sorted: [100, 200, 300, 400, 500], n=5
    // p50: index floor(0.50 * 5) = 2 → 300
    // p99: index floor(0.99 * 5) = 4 → 500
    let m = make(vec![500, 100, 300, 200, 400], 0, 5, 1.0);
    assert_eq!(m.p50_ns(), 300);
    assert_eq!(m.p99_ns(), 500);
}

#[test]
fn test_percentiles_empty_returns_zero() {
    let m = make(vec![], 0, 0, 1.0);
    assert_eq!(m.p50_ns(), 0);
    assert_eq!(m.p99_ns(), 0);
}

#[test]
fn test_error_rate_and_throughput() {
    let m = make(vec![], 1, 10, 2.0);
    assert_eq!(m.error_rate(), 0.1);
    assert_eq!(m.throughput_rps(), 5.0);
}

#[test]
fn test_idle_run_has_zero_rates() {
    let m = make(vec![], 0, 0, 0.0);
    assert_eq!(m.error_rate(), 0.0);
    assert_eq!(m.throughput_rps(), 0.0);
}
