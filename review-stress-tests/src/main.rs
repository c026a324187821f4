use clap::Parser;
use std::io::Write;
use std::process;
use std::time::Duration;
use review_stress_tests::history::ViolationKind;
use review_stress_tests::metrics::Metrics;
use review_stress_tests::server::ServerProcess;
use review_stress_tests::worker::{self, KeySpace};
use review_stress_tests::workload::WorkloadProfile;

#[derive(Parser)]
#[command(name = "review-stress", about = "Review service stress test harness")]
struct Args {
    /// How long to run (seconds)
    #[arg(long, default_value_t = 5)]
    duration: u64,

    /// Workload profile: read-heavy | balanced | write-heavy | create-only
    #[arg(long, default_value = "balanced")]
    workload: String,

    /// Number of distinct product ids
    #[arg(long, default_value_t = 10)]
    products: i32,

    /// Number of distinct review ids per product
    #[arg(long, default_value_t = 20)]
    reviews_per_product: i32,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Fail if the 5xx error rate exceeds this fraction
    #[arg(long, default_value_t = 0.01)]
    max_error_rate: f64,

    /// Fail if correctness violations exceed this count
    #[arg(long, default_value_t = 0)]
    max_violations: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let profile = WorkloadProfile::from_name(&args.workload).unwrap_or_else(|| {
        eprintln!(
            "Unknown workload {:?}. Valid values: read-heavy, balanced, write-heavy, create-only",
            args.workload
        );
        process::exit(3);
    });

    if args.products < 1 || args.reviews_per_product < 1 || args.concurrency == 0 {
        eprintln!("--products, --reviews-per-product and --concurrency must be at least 1");
        process::exit(3);
    }

    let server = ServerProcess::build_and_spawn().unwrap_or_else(|e| {
        eprintln!("Failed to start review-server: {e}");
        process::exit(3);
    });

    println!("Server ready:  {}", server.addr);

    let key_space = KeySpace {
        products: args.products,
        reviews_per_product: args.reviews_per_product,
    };
    let duration = Duration::from_secs(args.duration);

    print!("Running {}s {} workload ", args.duration, profile.as_name());
    std::io::stdout().flush().ok();

    let dot_handle = tokio::spawn(async {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await; // consume the immediate first tick
        loop {
            interval.tick().await;
            print!(".");
            std::io::stdout().flush().ok();
        }
    });

    let (metrics, history) = worker::run(
        server.addr.to_string(),
        profile,
        key_space,
        args.concurrency,
        duration,
    )
    .await;

    dot_handle.abort();
    println!();

    drop(server);

    let violations = history.check_correctness();
    let violation_count = violations.len() as u64;

    print_report(&args, &metrics, violation_count, profile);

    for v in &violations {
        let detail = match &v.kind {
            ViolationKind::DuplicateAccepted { first_start_ts, second_start_ts } => format!(
                "DuplicateAccepted: second create started {:?} after the first",
                second_start_ts.saturating_duration_since(*first_start_ts)
            ),
            ViolationKind::ConflictWithoutCreate => {
                "ConflictWithoutCreate: duplicate key reported before any create".to_string()
            }
            ViolationKind::UnknownReviewListed => {
                "UnknownReviewListed: list returned a review that was never created".to_string()
            }
            ViolationKind::ListOutOfOrder => {
                "ListOutOfOrder: list not sorted by review id".to_string()
            }
        };
        eprintln!("VIOLATION product={} review={} {}", v.product_id, v.review_id, detail);
    }

    let error_rate_exceeded = metrics.error_rate() > args.max_error_rate;
    let violations_exceeded = violation_count > args.max_violations;

    let exit_code = if error_rate_exceeded {
        1
    } else if violations_exceeded {
        2
    } else {
        0
    };

    process::exit(exit_code);
}

fn print_report(args: &Args, metrics: &Metrics, violation_count: u64, profile: WorkloadProfile) {
    let pass_fail = |exceeded: bool| if exceeded { "✗" } else { "✓" };

    let error_rate_exceeded = metrics.error_rate() > args.max_error_rate;
    let violations_exceeded = violation_count > args.max_violations;
    let overall_pass = !error_rate_exceeded && !violations_exceeded;

    println!("Review Service Stress Test Results");
    println!("==================================");
    println!("Duration:              {:.1} s", args.duration as f64);
    println!("Workload:              {}", profile.as_name());
    println!("Key space:             {} products x {} reviews", args.products, args.reviews_per_product);
    println!("Workers:               {}", args.concurrency);
    println!();
    println!("Requests:              {}", format_thousands(metrics.requests_total));
    println!("Throughput:            {:.1} rps", metrics.throughput_rps());
    println!("P50 latency:           {:.1} ms", ns_to_ms(metrics.p50_ns()));
    println!("P99 latency:           {:.1} ms", ns_to_ms(metrics.p99_ns()));
    println!("Duplicate conflicts:   {}", format_thousands(metrics.conflicts));
    println!();
    println!("5xx errors:            {}", format_thousands(metrics.errors_5xx));
    println!(
        "Error rate:            {:.3}%    [threshold: {:.3}%]  {}",
        metrics.error_rate() * 100.0,
        args.max_error_rate * 100.0,
        pass_fail(error_rate_exceeded),
    );
    println!();
    println!(
        "Correctness violations: {}        [threshold: {}]        {}",
        violation_count,
        args.max_violations,
        pass_fail(violations_exceeded),
    );
    println!();
    println!("Result: {}", if overall_pass { "PASS" } else { "FAIL" });
}

fn format_thousands(n: u64) -> String {
    if n >= 1_000_000 {
        format!("~{}M", n / 1_000_000)
    } else if n >= 1_000 {
        format!("~{}K", n / 1_000)
    } else {
        n.to_string()
    }
}

fn ns_to_ms(ns: u64) -> f64 {
    ns as f64 / 1_000_000.0
}
